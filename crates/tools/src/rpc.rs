//! Chain identifier check over JSON-RPC.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::network::Network;
use crate::record::ConfigurationRecord;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("no RPC URL configured")]
    NoUrl,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("response carried neither result nor error")]
    EmptyResponse,

    #[error("invalid chain id quantity: {0}")]
    InvalidQuantity(String),
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    result: Option<String>,
    error: Option<JsonRpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorBody {
    code: i64,
    message: String,
}

/// Outcome of checking one network.
#[derive(Debug)]
pub struct ChainIdCheck {
    pub network: Network,
    pub declared: u64,
    pub reported: Result<u64, RpcError>,
}

impl ChainIdCheck {
    pub fn matches(&self) -> bool {
        matches!(self.reported, Ok(id) if id == self.declared)
    }
}

/// Parse a `0x`-prefixed hex quantity.
pub fn parse_chain_id(quantity: &str) -> Result<u64, RpcError> {
    let digits = quantity
        .strip_prefix("0x")
        .or_else(|| quantity.strip_prefix("0X"))
        .filter(|d| !d.is_empty())
        .ok_or_else(|| RpcError::InvalidQuantity(quantity.to_string()))?;
    u64::from_str_radix(digits, 16).map_err(|_| RpcError::InvalidQuantity(quantity.to_string()))
}

/// Ask the endpoint at `url` for its chain identifier.
pub async fn fetch_chain_id(client: &reqwest::Client, url: &str) -> Result<u64, RpcError> {
    let body = serde_json::json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "eth_chainId",
        "params": [],
    });
    let response: JsonRpcResponse = client
        .post(url)
        .json(&body)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    match (response.result, response.error) {
        (_, Some(err)) => Err(RpcError::Rpc {
            code: err.code,
            message: err.message,
        }),
        (Some(result), None) => parse_chain_id(&result),
        (None, None) => Err(RpcError::EmptyResponse),
    }
}

/// Check `networks` concurrently. Local networks are skipped. Results come
/// back in the order of `networks`.
pub async fn check_chain_ids(
    record: &ConfigurationRecord,
    networks: &[Network],
    timeout: Duration,
) -> Result<Vec<ChainIdCheck>, RpcError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;

    let mut set = JoinSet::new();
    for (index, &network) in networks.iter().enumerate() {
        let Some(descriptor) = record.network(network) else {
            continue;
        };
        if network.is_local() {
            continue;
        }
        let client = client.clone();
        let url = descriptor.url.clone();
        let declared = descriptor.chain_id;
        set.spawn(async move {
            let reported = match url {
                Some(url) => fetch_chain_id(&client, &url).await,
                None => Err(RpcError::NoUrl),
            };
            (
                index,
                ChainIdCheck {
                    network,
                    declared,
                    reported,
                },
            )
        });
    }

    let mut results = Vec::with_capacity(set.len());
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(result) => results.push(result),
            Err(e) => warn!("chain id request task failed: {e}"),
        }
    }
    results.sort_by_key(|(index, _)| *index);

    let results: Vec<ChainIdCheck> = results.into_iter().map(|(_, r)| r).collect();
    debug!(checked = results.len(), "chain id check finished");
    Ok(results)
}
