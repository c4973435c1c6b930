//! The assembled configuration record and its validation.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::accounts::{self, AccountPolicy};
use crate::config::ConfigError;
use crate::explorer::ExplorerDescriptor;
use crate::network::{Network, RpcEndpoint};

/// Complete toolchain configuration, built once and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationRecord {
    pub solidity: SoliditySettings,
    pub typechain: TypechainSettings,
    pub etherscan: EtherscanSettings,
    pub networks: BTreeMap<Network, NetworkDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoliditySettings {
    pub version: String,
}

/// Contract binding generation options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypechainSettings {
    pub out_dir: String,
    pub target: String,
    pub always_generate_overloads: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtherscanSettings {
    pub api_key: BTreeMap<Network, String>,
    pub custom_chains: Vec<ExplorerDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDescriptor {
    pub chain_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub accounts: AccountPolicy,
}

/// A broken invariant found by [`ConfigurationRecord::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("chain id {chain_id} declared by both {first} and {second}")]
    DuplicateChainId {
        chain_id: u64,
        first: Network,
        second: Network,
    },

    #[error("explorer entry for {0} has no network descriptor")]
    ExplorerWithoutNetwork(Network),

    #[error("{network}: explorer chain id {explorer} differs from network chain id {declared}")]
    ExplorerChainMismatch {
        network: Network,
        explorer: u64,
        declared: u64,
    },

    #[error("{0}: no RPC URL configured")]
    MissingRpcUrl(Network),

    #[error("{network}: RPC URL must start with http:// or https://: {url}")]
    InvalidRpcUrl { network: Network, url: String },

    #[error("{0}: mnemonic is empty (set MNEMONIC)")]
    EmptyMnemonic(Network),

    #[error("{0}: private key is unset (set PRIVATE_KEY)")]
    MissingPrivateKey(Network),

    #[error("{0}: private key is not 0x followed by 64 hex digits")]
    InvalidPrivateKey(Network),
}

impl ConfigurationRecord {
    /// Check the record's invariants. An empty list means the record is usable
    /// against every network.
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        let mut seen: HashMap<u64, Network> = HashMap::new();
        for (&network, descriptor) in &self.networks {
            if let Some(&first) = seen.get(&descriptor.chain_id) {
                issues.push(ValidationIssue::DuplicateChainId {
                    chain_id: descriptor.chain_id,
                    first,
                    second: network,
                });
            } else {
                seen.insert(descriptor.chain_id, network);
            }

            match (&descriptor.url, network.is_local()) {
                (None, false) => issues.push(ValidationIssue::MissingRpcUrl(network)),
                (Some(url), _) if !url.starts_with("http://") && !url.starts_with("https://") => {
                    issues.push(ValidationIssue::InvalidRpcUrl {
                        network,
                        url: url.clone(),
                    })
                }
                _ => {}
            }

            match &descriptor.accounts {
                AccountPolicy::Mnemonic(hd) if hd.mnemonic.trim().is_empty() => {
                    issues.push(ValidationIssue::EmptyMnemonic(network))
                }
                AccountPolicy::Mnemonic(_) => {}
                AccountPolicy::PrivateKeys(keys) => {
                    if keys.iter().any(|k| accounts::is_placeholder_key(k)) {
                        issues.push(ValidationIssue::MissingPrivateKey(network));
                    } else if !keys.iter().all(|k| accounts::is_well_formed_key(k)) {
                        issues.push(ValidationIssue::InvalidPrivateKey(network));
                    }
                }
            }
        }

        for chain in &self.etherscan.custom_chains {
            match self.networks.get(&chain.network) {
                None => issues.push(ValidationIssue::ExplorerWithoutNetwork(chain.network)),
                Some(descriptor) if descriptor.chain_id != chain.chain_id => {
                    issues.push(ValidationIssue::ExplorerChainMismatch {
                        network: chain.network,
                        explorer: chain.chain_id,
                        declared: descriptor.chain_id,
                    })
                }
                Some(_) => {}
            }
        }

        issues
    }

    /// Fail with every validation issue joined into one error.
    pub fn ensure_valid(&self) -> Result<(), ConfigError> {
        let issues = self.validate();
        if issues.is_empty() {
            return Ok(());
        }
        let joined = issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(ConfigError::ValidationError(joined))
    }

    /// Copy with mnemonics, private keys and API keys masked.
    pub fn redacted(&self) -> Self {
        let mut record = self.clone();
        for key in record.etherscan.api_key.values_mut() {
            *key = accounts::redact(key);
        }
        for (network, descriptor) in record.networks.iter_mut() {
            descriptor.accounts = descriptor.accounts.redacted();
            // Metered endpoints carry their API key in the URL. An overridden
            // URL may embed it anywhere, so only scheme and host survive.
            if let (RpcEndpoint::Metered { base, .. }, Some(url)) =
                (network.rpc_endpoint(), descriptor.url.as_mut())
            {
                *url = match url.strip_prefix(base) {
                    Some(key) => format!("{base}{}", accounts::redact(key)),
                    None => mask_url_path(url),
                };
            }
        }
        record
    }

    pub fn network(&self, network: Network) -> Option<&NetworkDescriptor> {
        self.networks.get(&network)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Print a redacted, human-readable summary, optionally for one network.
    pub fn print_summary(&self, only: Option<Network>) {
        let record = self.redacted();
        println!("╔════════════════════════════════════════════════════════════════╗");
        println!("║           TOOLCHAIN CONFIGURATION RESOLVED                     ║");
        println!("╚════════════════════════════════════════════════════════════════╝");
        println!("  Solidity:            {}", record.solidity.version);
        println!(
            "  Typechain:           {} -> {}{}",
            record.typechain.target,
            record.typechain.out_dir,
            if record.typechain.always_generate_overloads {
                " (overloads)"
            } else {
                ""
            }
        );

        for (network, descriptor) in &record.networks {
            if only.is_some_and(|n| n != *network) {
                continue;
            }
            println!();
            println!("  Network:             {network}");
            println!("    Chain ID:          {}", descriptor.chain_id);
            println!(
                "    RPC URL:           {}",
                descriptor.url.as_deref().unwrap_or("(in-process)")
            );
            println!("    Accounts:          {}", descriptor.accounts.describe());

            match record.etherscan.api_key.get(network) {
                Some(key) if key.is_empty() => println!("    Explorer key:      (not configured)"),
                Some(key) => println!("    Explorer key:      {key}"),
                None => {}
            }
            if let Some(chain) = record
                .etherscan
                .custom_chains
                .iter()
                .find(|c| c.network == *network)
            {
                println!("    Explorer:          {}", chain.urls.browser_url);
            }
        }

        println!("╚════════════════════════════════════════════════════════════════╝");
    }
}

/// Keep `scheme://host[:port]` and mask userinfo, path and query.
fn mask_url_path(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return accounts::redact(url);
    };
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let authority = &rest[..end];
    let host = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    if end == rest.len() && host.len() == authority.len() {
        return url.to_string();
    }
    format!("{scheme}://{host}/{}", accounts::REDACTED)
}
