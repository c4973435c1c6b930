//! Account resolution policies.
//!
//! A network either derives its accounts from a seed phrase or uses a fixed
//! list of private keys. Key derivation itself belongs to the toolchain.

use serde::{Deserialize, Serialize};

/// Derivation path prefix for the default account policy.
pub const DEFAULT_HD_PATH: &str = "m/44'/60'/0'/0";
pub const DEFAULT_INITIAL_INDEX: u32 = 0;
pub const DEFAULT_ACCOUNT_COUNT: u32 = 20;

/// Public seed phrase used by the simulated network.
pub const TEST_MNEMONIC: &str = "test test test test test test test test test test test junk";

/// Prepended to every configured private key.
pub const PRIVATE_KEY_PREFIX: &str = "0x";

/// Stands in for the key material when `PRIVATE_KEY` is unset.
pub const MISSING_PRIVATE_KEY: &str = "undefined";

pub(crate) const REDACTED: &str = "***";

/// Mnemonic derivation parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HdAccounts {
    pub mnemonic: String,
    pub path: String,
    pub initial_index: u32,
    pub count: u32,
}

/// How a network resolves its signing accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AccountPolicy {
    Mnemonic(HdAccounts),
    PrivateKeys(Vec<String>),
}

/// Default policy: derive [`DEFAULT_ACCOUNT_COUNT`] accounts from `mnemonic`.
pub fn build_account_policy(mnemonic: &str) -> AccountPolicy {
    AccountPolicy::Mnemonic(HdAccounts {
        mnemonic: mnemonic.to_string(),
        path: DEFAULT_HD_PATH.to_string(),
        initial_index: DEFAULT_INITIAL_INDEX,
        count: DEFAULT_ACCOUNT_COUNT,
    })
}

/// Build the private key entry from the raw `PRIVATE_KEY` value.
///
/// The prefix is always applied. An unset value yields `0xundefined`, which
/// [`is_placeholder_key`] recognises and validation rejects.
pub fn private_key_entry(raw: Option<&str>) -> String {
    format!("{PRIVATE_KEY_PREFIX}{}", raw.unwrap_or(MISSING_PRIVATE_KEY))
}

pub fn is_placeholder_key(key: &str) -> bool {
    key.strip_prefix(PRIVATE_KEY_PREFIX) == Some(MISSING_PRIVATE_KEY)
}

/// `0x` followed by 64 hex digits.
pub fn is_well_formed_key(key: &str) -> bool {
    key.strip_prefix(PRIVATE_KEY_PREFIX)
        .is_some_and(|hex| hex.len() == 64 && hex.bytes().all(|b| b.is_ascii_hexdigit()))
}

impl AccountPolicy {
    /// Copy with secret material masked. The public test mnemonic and the
    /// unset-key placeholder are left readable.
    pub fn redacted(&self) -> Self {
        match self {
            AccountPolicy::Mnemonic(hd) => {
                let mut hd = hd.clone();
                if hd.mnemonic != TEST_MNEMONIC {
                    hd.mnemonic = redact(&hd.mnemonic);
                }
                AccountPolicy::Mnemonic(hd)
            }
            AccountPolicy::PrivateKeys(keys) => AccountPolicy::PrivateKeys(
                keys.iter()
                    .map(|k| if is_placeholder_key(k) { k.clone() } else { redact(k) })
                    .collect(),
            ),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            AccountPolicy::Mnemonic(hd) => format!(
                "mnemonic {}/{}..{}",
                hd.path,
                hd.initial_index,
                hd.initial_index + hd.count
            ),
            AccountPolicy::PrivateKeys(keys) => format!("{} private key(s)", keys.len()),
        }
    }
}

/// Mask a secret, keeping empty values visibly empty.
pub fn redact(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        REDACTED.to_string()
    }
}
