//! Configuration inputs for the assembler
//!
//! Every externally supplied value is captured once in [`ConfigInputs`], so
//! assembly is a pure function of its inputs. Values are resolved as follows:
//!
//! 1. `.env` in the working directory, if present
//! 2. Process environment variables (unset variables become empty strings)
//! 3. Optional `chainconf.toml` overrides for the compiler and RPC URLs
//!
//! # Examples
//!
//! ```rust,no_run
//! use chainconf_tools::config::{ConfigInputs, ConfigOverrides};
//! use chainconf_tools::assembler::assemble;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let inputs = ConfigInputs::from_env().with_overrides(ConfigOverrides::load(None)?);
//! let record = assemble(&inputs);
//! println!("Compiler: {}", record.solidity.version);
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::explorer::ExplorerService;
use crate::network::Network;

pub const MNEMONIC: &str = "MNEMONIC";
pub const PRIVATE_KEY: &str = "PRIVATE_KEY";
pub const SKIP_LOAD: &str = "SKIP_LOAD";
pub const ALCHEMY_API_MAINNET_KEY: &str = "ALCHEMY_API_MAINNET_KEY";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON serialize error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid network: {0}")]
    InvalidNetwork(String),

    #[error("Overrides file not found: {0}")]
    MissingOverrides(PathBuf),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Everything the assembler reads from outside the process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigInputs {
    /// Seed phrase for mnemonic-derived accounts
    pub mnemonic: String,
    /// Raw `PRIVATE_KEY`, `None` when unset
    pub private_key: Option<String>,
    /// Skip extension loading (`SKIP_LOAD=true`)
    pub skip_load: bool,
    /// API key per explorer service
    pub explorer_keys: BTreeMap<ExplorerService, String>,
    /// Key appended to the metered mainnet endpoint
    pub alchemy_mainnet_key: String,
    pub overrides: ConfigOverrides,
}

/// Read a variable through `lookup`, defaulting to the empty string.
pub fn resolve_secret<F>(lookup: &F, name: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).unwrap_or_default()
}

/// Load `.env` from the working directory or an ancestor into the process
/// environment. Variables already set are kept. Returns the file used.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

impl ConfigInputs {
    /// Load `.env` if it exists, then read the process environment.
    pub fn from_env() -> Self {
        if let Some(path) = load_dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build inputs from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let explorer_keys = ExplorerService::ALL
            .into_iter()
            .map(|service| (service, resolve_secret(&lookup, service.env_var())))
            .collect();

        ConfigInputs {
            mnemonic: resolve_secret(&lookup, MNEMONIC),
            private_key: lookup(PRIVATE_KEY),
            skip_load: lookup(SKIP_LOAD).as_deref() == Some("true"),
            explorer_keys,
            alchemy_mainnet_key: resolve_secret(&lookup, ALCHEMY_API_MAINNET_KEY),
            overrides: ConfigOverrides::default(),
        }
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// API key for `service`, empty when not configured
    pub fn explorer_key(&self, service: ExplorerService) -> &str {
        self.explorer_keys
            .get(&service)
            .map(String::as_str)
            .unwrap_or_default()
    }
}

/// Optional overrides file (`chainconf.toml`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    #[serde(default)]
    pub solidity: Option<SolidityOverride>,
    #[serde(default)]
    pub networks: BTreeMap<Network, NetworkOverride>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SolidityOverride {
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkOverride {
    pub url: Option<String>,
}

impl ConfigOverrides {
    pub const DEFAULT_FILE: &'static str = "chainconf.toml";

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::TomlError)
    }

    /// Load overrides from `path`, or from [`Self::DEFAULT_FILE`] when it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - an explicit `path` does not exist
    /// - the file cannot be read or parsed
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::MissingOverrides(path.to_path_buf()))
            }
            Some(path) => path,
            None => {
                let default = Path::new(Self::DEFAULT_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let overrides = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), networks = overrides.networks.len(), "loaded overrides");
        Ok(overrides)
    }

    pub fn solidity_version(&self) -> Option<&str> {
        self.solidity.as_ref()?.version.as_deref()
    }

    pub fn rpc_url(&self, network: Network) -> Option<&str> {
        self.networks.get(&network)?.url.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_resolve_secret_defaults_to_empty() {
        let lookup = lookup_from(&[("SET", "value")]);
        assert_eq!(resolve_secret(&lookup, "SET"), "value");
        assert_eq!(resolve_secret(&lookup, "UNSET"), "");
    }

    #[test]
    fn test_empty_environment() {
        let inputs = ConfigInputs::from_lookup(lookup_from(&[]));
        assert_eq!(inputs.mnemonic, "");
        assert_eq!(inputs.private_key, None);
        assert!(!inputs.skip_load);
        assert_eq!(inputs.alchemy_mainnet_key, "");
        for service in ExplorerService::ALL {
            assert_eq!(inputs.explorer_key(service), "");
        }
    }

    #[test]
    fn test_skip_load_requires_exact_true() {
        for (value, expected) in [
            ("true", true),
            ("TRUE", false),
            ("1", false),
            ("yes", false),
            (" true", false),
            ("", false),
        ] {
            let inputs = ConfigInputs::from_lookup(lookup_from(&[("SKIP_LOAD", value)]));
            assert_eq!(inputs.skip_load, expected, "SKIP_LOAD={value:?}");
        }
    }

    #[test]
    fn test_explorer_keys_read_per_service() {
        let inputs = ConfigInputs::from_lookup(lookup_from(&[
            ("ETHERSCAN_API_KEY", "eth"),
            ("BASESCAN_API_KEY", "base"),
        ]));
        assert_eq!(inputs.explorer_key(ExplorerService::Etherscan), "eth");
        assert_eq!(inputs.explorer_key(ExplorerService::Basescan), "base");
        assert_eq!(inputs.explorer_key(ExplorerService::Arbiscan), "");
    }

    #[test]
    fn test_private_key_keeps_set_but_empty() {
        let inputs = ConfigInputs::from_lookup(lookup_from(&[("PRIVATE_KEY", "")]));
        assert_eq!(inputs.private_key.as_deref(), Some(""));
    }

    #[test]
    fn test_parse_overrides() {
        let overrides = ConfigOverrides::parse(
            r#"
            [solidity]
            version = "0.8.24"

            [networks.sepolia]
            url = "https://rpc.example/sepolia"

            [networks.baseSepolia]
            "#,
        )
        .unwrap();
        assert_eq!(overrides.solidity_version(), Some("0.8.24"));
        assert_eq!(
            overrides.rpc_url(Network::Sepolia),
            Some("https://rpc.example/sepolia")
        );
        assert_eq!(overrides.rpc_url(Network::BaseSepolia), None);
        assert_eq!(overrides.rpc_url(Network::Mainnet), None);
    }

    #[test]
    fn test_overrides_reject_unknown_network() {
        let result = ConfigOverrides::parse("[networks.polygon]\nurl = \"https://x\"\n");
        assert!(matches!(result, Err(ConfigError::TomlError(_))));
    }

    #[test]
    fn test_overrides_reject_unknown_field() {
        let result = ConfigOverrides::parse("[solidity]\noptimizer = true\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let result = ConfigOverrides::load(Some(Path::new("/nonexistent/chainconf.toml")));
        assert!(matches!(result, Err(ConfigError::MissingOverrides(_))));
    }
}
