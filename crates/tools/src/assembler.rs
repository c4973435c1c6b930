//! Builds the [`ConfigurationRecord`] from [`ConfigInputs`] and the static
//! network and explorer tables.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::accounts::{self, build_account_policy, AccountPolicy};
use crate::config::{ConfigError, ConfigInputs};
use crate::explorer;
use crate::network::{AccountSource, Network, RpcEndpoint};
use crate::record::{
    ConfigurationRecord, EtherscanSettings, NetworkDescriptor, SoliditySettings,
    TypechainSettings,
};

pub const SOLIDITY_VERSION: &str = "0.8.21";
pub const TYPECHAIN_OUT_DIR: &str = "typechain";
pub const TYPECHAIN_TARGET: &str = "ethers-v6";

/// Assemble the configuration record. Pure: equal inputs give equal records.
pub fn assemble(inputs: &ConfigInputs) -> ConfigurationRecord {
    let default_accounts = build_account_policy(&inputs.mnemonic);
    let private_key = accounts::private_key_entry(inputs.private_key.as_deref());
    if inputs.private_key.is_none() {
        warn!("PRIVATE_KEY is unset; single-key networks get a placeholder key");
    }

    let networks: BTreeMap<Network, NetworkDescriptor> = Network::ALL
        .into_iter()
        .map(|network| {
            let accounts = match network.account_source() {
                AccountSource::TestMnemonic => build_account_policy(accounts::TEST_MNEMONIC),
                AccountSource::Mnemonic => default_accounts.clone(),
                AccountSource::PrivateKey => AccountPolicy::PrivateKeys(vec![private_key.clone()]),
            };
            let descriptor = NetworkDescriptor {
                chain_id: network.chain_id(),
                url: rpc_url(network, inputs),
                accounts,
            };
            (network, descriptor)
        })
        .collect();

    let api_key = Network::ALL
        .into_iter()
        .filter_map(|network| {
            let service = network.explorer()?;
            Some((network, inputs.explorer_key(service).to_string()))
        })
        .collect();

    let solidity_version = inputs
        .overrides
        .solidity_version()
        .unwrap_or(SOLIDITY_VERSION)
        .to_string();

    debug!(
        networks = networks.len(),
        solidity = %solidity_version,
        "assembled configuration record"
    );

    ConfigurationRecord {
        solidity: SoliditySettings {
            version: solidity_version,
        },
        typechain: TypechainSettings {
            out_dir: TYPECHAIN_OUT_DIR.to_string(),
            target: TYPECHAIN_TARGET.to_string(),
            always_generate_overloads: true,
        },
        etherscan: EtherscanSettings {
            api_key,
            custom_chains: explorer::custom_chains(),
        },
        networks,
    }
}

/// Assemble and fail fast on any validation issue, including an unset
/// `PRIVATE_KEY`.
pub fn assemble_strict(inputs: &ConfigInputs) -> Result<ConfigurationRecord, ConfigError> {
    let record = assemble(inputs);
    record.ensure_valid()?;
    Ok(record)
}

fn rpc_url(network: Network, inputs: &ConfigInputs) -> Option<String> {
    if let Some(url) = inputs.overrides.rpc_url(network) {
        return Some(url.trim().to_string());
    }
    match network.rpc_endpoint() {
        RpcEndpoint::Local => None,
        RpcEndpoint::Public(url) => Some(url.to_string()),
        RpcEndpoint::Metered { base, key_var } => {
            if inputs.alchemy_mainnet_key.is_empty() {
                warn!(%network, "{key_var} is unset; RPC URL has no API key");
            }
            Some(format!("{base}{}", inputs.alchemy_mainnet_key))
        }
    }
}
