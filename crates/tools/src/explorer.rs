//! Block-explorer registrations used for contract verification.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::network::Network;

/// Explorer services that issue API keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExplorerService {
    Etherscan,
    Scrollscan,
    Basescan,
    Arbiscan,
    Blockscout,
    Lineascan,
}

impl ExplorerService {
    pub const ALL: [ExplorerService; 6] = [
        ExplorerService::Etherscan,
        ExplorerService::Scrollscan,
        ExplorerService::Basescan,
        ExplorerService::Arbiscan,
        ExplorerService::Blockscout,
        ExplorerService::Lineascan,
    ];

    /// Environment variable holding this service's API key
    pub fn env_var(&self) -> &'static str {
        match self {
            ExplorerService::Etherscan => "ETHERSCAN_API_KEY",
            ExplorerService::Scrollscan => "SCROLLSCAN_API_KEY",
            ExplorerService::Basescan => "BASESCAN_API_KEY",
            ExplorerService::Arbiscan => "ARBISCAN_API_KEY",
            ExplorerService::Blockscout => "BLOCKSCOUT_API_KEY",
            ExplorerService::Lineascan => "LINEASCAN_API_KEY",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExplorerService::Etherscan => "etherscan",
            ExplorerService::Scrollscan => "scrollscan",
            ExplorerService::Basescan => "basescan",
            ExplorerService::Arbiscan => "arbiscan",
            ExplorerService::Blockscout => "blockscout",
            ExplorerService::Lineascan => "lineascan",
        }
    }
}

impl fmt::Display for ExplorerService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerUrls {
    #[serde(rename = "apiURL")]
    pub api_url: String,
    #[serde(rename = "browserURL")]
    pub browser_url: String,
}

/// A custom chain registration for the verification plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerDescriptor {
    pub network: Network,
    pub chain_id: u64,
    pub urls: ExplorerUrls,
}

struct ChainEntry {
    network: Network,
    chain_id: u64,
    api_url: &'static str,
    browser_url: &'static str,
}

// Chain ids are declared independently of `Network::chain_id` and
// cross-checked during validation.
const CUSTOM_CHAINS: &[ChainEntry] = &[
    ChainEntry {
        network: Network::ScrollSepolia,
        chain_id: 534351,
        api_url: "https://api-sepolia.scrollscan.com/api",
        browser_url: "https://sepolia.scrollscan.dev/",
    },
    ChainEntry {
        network: Network::Scroll,
        chain_id: 534352,
        api_url: "https://api.scrollscan.com/api",
        browser_url: "https://scrollscan.com/",
    },
    ChainEntry {
        network: Network::Sepolia,
        chain_id: 11155111,
        api_url: "https://api-sepolia.etherscan.io/api",
        browser_url: "https://sepolia.etherscan.io/",
    },
    ChainEntry {
        network: Network::Holesky,
        chain_id: 17000,
        api_url: "https://api-holesky.etherscan.io/api",
        browser_url: "https://holesky.etherscan.io/",
    },
    ChainEntry {
        network: Network::Mainnet,
        chain_id: 1,
        api_url: "https://api.etherscan.io/api",
        browser_url: "https://etherscan.io/",
    },
    ChainEntry {
        network: Network::BaseSepolia,
        chain_id: 84532,
        api_url: "https://api-sepolia.basescan.org/api",
        browser_url: "https://sepolia.basescan.org/",
    },
    ChainEntry {
        network: Network::Base,
        chain_id: 8453,
        api_url: "https://api.basescan.org/api",
        browser_url: "https://basescan.org/",
    },
    ChainEntry {
        network: Network::ArbitrumSepolia,
        chain_id: 421614,
        api_url: "https://api-sepolia.arbiscan.io/api",
        browser_url: "https://sepolia.arbiscan.io/",
    },
    ChainEntry {
        network: Network::Arbitrum,
        chain_id: 42161,
        api_url: "https://api.arbiscan.io/api",
        browser_url: "https://arbiscan.io/",
    },
    ChainEntry {
        network: Network::BevmTestnet,
        chain_id: 11503,
        api_url: "https://scan-testnet.bevm.io/api",
        browser_url: "https://scan-testnet.bevm.io",
    },
    ChainEntry {
        network: Network::LineaSepolia,
        chain_id: 59141,
        api_url: "https://api-sepolia.lineascan.build/api",
        browser_url: "https://sepolia.lineascan.build/",
    },
];

/// Custom chain registrations in declaration order.
pub fn custom_chains() -> Vec<ExplorerDescriptor> {
    CUSTOM_CHAINS
        .iter()
        .map(|entry| ExplorerDescriptor {
            network: entry.network,
            chain_id: entry.chain_id,
            urls: ExplorerUrls {
                api_url: entry.api_url.to_string(),
                browser_url: entry.browser_url.to_string(),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_chain_order() {
        let names: Vec<&str> = custom_chains().iter().map(|c| c.network.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "scrollSepolia",
                "scroll",
                "sepolia",
                "holesky",
                "mainnet",
                "baseSepolia",
                "base",
                "arbitrumSepolia",
                "arbitrum",
                "bevmTestnet",
                "lineaSepolia",
            ]
        );
    }

    #[test]
    fn test_custom_chains_match_network_table() {
        for chain in custom_chains() {
            assert_eq!(chain.chain_id, chain.network.chain_id(), "{}", chain.network);
            assert!(chain.network.explorer().is_some(), "{}", chain.network);
        }
    }

    #[test]
    fn test_base_descriptor() {
        let base = custom_chains()
            .into_iter()
            .find(|c| c.network == Network::Base)
            .unwrap();
        assert_eq!(base.chain_id, 8453);
        assert_eq!(base.urls.api_url, "https://api.basescan.org/api");
        assert_eq!(base.urls.browser_url, "https://basescan.org/");
    }

    #[test]
    fn test_env_vars_distinct() {
        let mut vars: Vec<&str> = ExplorerService::ALL.iter().map(|s| s.env_var()).collect();
        vars.sort_unstable();
        vars.dedup();
        assert_eq!(vars.len(), ExplorerService::ALL.len());
    }

    #[test]
    fn test_descriptor_serializes_toolchain_field_names() {
        let value = serde_json::to_value(&custom_chains()[0]).unwrap();
        assert_eq!(value["network"], "scrollSepolia");
        assert_eq!(value["chainId"], 534351);
        assert_eq!(value["urls"]["apiURL"], "https://api-sepolia.scrollscan.com/api");
        assert_eq!(value["urls"]["browserURL"], "https://sepolia.scrollscan.dev/");
    }
}
