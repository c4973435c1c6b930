//! Supported networks and their static parameters.
//!
//! Every network the toolchain can target is a variant of [`Network`]. The
//! chain identifier, RPC endpoint, account source and explorer service of a
//! network are fixed here and consumed by the assembler.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::config::ConfigError;
use crate::explorer::ExplorerService;

/// Networks known to the toolchain, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Network {
    /// In-process simulated network
    Hardhat,
    /// Ethereum Sepolia testnet
    Sepolia,
    /// Ethereum Holesky testnet
    Holesky,
    /// Arbitrum Sepolia testnet
    ArbitrumSepolia,
    /// Arbitrum One
    Arbitrum,
    /// Scroll Sepolia testnet
    ScrollSepolia,
    /// Scroll mainnet
    Scroll,
    /// Base Sepolia testnet
    BaseSepolia,
    /// Base mainnet
    Base,
    /// BEVM testnet
    BevmTestnet,
    /// Linea Sepolia testnet
    LineaSepolia,
    /// Ethereum mainnet
    Mainnet,
}

/// Where a network's RPC endpoint comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcEndpoint {
    /// Simulated in-process; no URL.
    Local,
    /// Fixed public endpoint.
    Public(&'static str),
    /// Metered provider; the API key from `key_var` is appended to `base`.
    Metered {
        base: &'static str,
        key_var: &'static str,
    },
}

/// Which account policy a network uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountSource {
    /// Mnemonic derivation with the well-known public test mnemonic.
    TestMnemonic,
    /// Mnemonic derivation with the `MNEMONIC` seed phrase.
    Mnemonic,
    /// The single `PRIVATE_KEY` account.
    PrivateKey,
}

impl Network {
    pub const ALL: [Network; 12] = [
        Network::Hardhat,
        Network::Sepolia,
        Network::Holesky,
        Network::ArbitrumSepolia,
        Network::Arbitrum,
        Network::ScrollSepolia,
        Network::Scroll,
        Network::BaseSepolia,
        Network::Base,
        Network::BevmTestnet,
        Network::LineaSepolia,
        Network::Mainnet,
    ];

    /// Get network name as used by the toolchain
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Hardhat => "hardhat",
            Network::Sepolia => "sepolia",
            Network::Holesky => "holesky",
            Network::ArbitrumSepolia => "arbitrumSepolia",
            Network::Arbitrum => "arbitrum",
            Network::ScrollSepolia => "scrollSepolia",
            Network::Scroll => "scroll",
            Network::BaseSepolia => "baseSepolia",
            Network::Base => "base",
            Network::BevmTestnet => "bevmTestnet",
            Network::LineaSepolia => "lineaSepolia",
            Network::Mainnet => "mainnet",
        }
    }

    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Hardhat => 1337,
            Network::Sepolia => 11155111,
            Network::Holesky => 17000,
            Network::ArbitrumSepolia => 421614,
            Network::Arbitrum => 42161,
            Network::ScrollSepolia => 534351,
            Network::Scroll => 534352,
            Network::BaseSepolia => 84532,
            Network::Base => 8453,
            Network::BevmTestnet => 11503,
            Network::LineaSepolia => 59141,
            Network::Mainnet => 1,
        }
    }

    pub fn rpc_endpoint(&self) -> RpcEndpoint {
        match self {
            Network::Hardhat => RpcEndpoint::Local,
            Network::Sepolia => {
                RpcEndpoint::Public("https://endpoints.omniatech.io/v1/eth/sepolia/public")
            }
            Network::Holesky => {
                RpcEndpoint::Public("https://ethereum-holesky.blockpi.network/v1/rpc/public")
            }
            Network::ArbitrumSepolia => {
                RpcEndpoint::Public("https://arbitrum-sepolia.blockpi.network/v1/rpc/public")
            }
            Network::Arbitrum => RpcEndpoint::Public("https://arbitrum.drpc.org"),
            Network::ScrollSepolia => {
                RpcEndpoint::Public("https://rpc.ankr.com/scroll_sepolia_testnet")
            }
            Network::Scroll => RpcEndpoint::Public("https://scroll.drpc.org"),
            Network::BaseSepolia => RpcEndpoint::Public("https://sepolia.base.org"),
            Network::Base => RpcEndpoint::Public("https://base.drpc.org"),
            Network::BevmTestnet => RpcEndpoint::Public("https://testnet.bevm.io"),
            Network::LineaSepolia => RpcEndpoint::Public("https://rpc.sepolia.linea.build"),
            Network::Mainnet => RpcEndpoint::Metered {
                base: "https://eth-mainnet.g.alchemy.com/v2/",
                key_var: crate::config::ALCHEMY_API_MAINNET_KEY,
            },
        }
    }

    pub fn account_source(&self) -> AccountSource {
        match self {
            Network::Hardhat => AccountSource::TestMnemonic,
            Network::Sepolia | Network::Holesky | Network::ScrollSepolia => {
                AccountSource::Mnemonic
            }
            _ => AccountSource::PrivateKey,
        }
    }

    /// Block explorer used to verify contracts on this network.
    pub fn explorer(&self) -> Option<ExplorerService> {
        match self {
            Network::Hardhat => None,
            Network::Sepolia | Network::Holesky | Network::Mainnet => {
                Some(ExplorerService::Etherscan)
            }
            Network::ArbitrumSepolia | Network::Arbitrum => Some(ExplorerService::Arbiscan),
            Network::ScrollSepolia | Network::Scroll => Some(ExplorerService::Scrollscan),
            Network::BaseSepolia | Network::Base => Some(ExplorerService::Basescan),
            Network::BevmTestnet => Some(ExplorerService::Blockscout),
            Network::LineaSepolia => Some(ExplorerService::Lineascan),
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self.rpc_endpoint(), RpcEndpoint::Local)
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    /// Parse a network name, ignoring ASCII case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Network::ALL
            .into_iter()
            .find(|n| n.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::InvalidNetwork(s.to_string()))
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Serialized as the plain name so networks work as map keys in JSON and TOML.
impl Serialize for Network {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Network {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
