//! Shared RPC utilities for interacting with Ethereum JSON-RPC endpoints.

use std::time::Duration;

use alloy_core::primitives::{Address, B256, Bytes};
use anyhow::Context;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Default timeout for RPC requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Interval between receipt polls while waiting for a transaction to mine.
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Receipt of a mined transaction, trimmed to the fields the deployer needs.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    /// Hash of the transaction.
    pub transaction_hash: B256,
    /// Address of the created contract, for creation transactions.
    #[serde(default)]
    pub contract_address: Option<Address>,
    /// Block in which the transaction was mined.
    #[serde(deserialize_with = "deserialize_u64_from_hex")]
    pub block_number: u64,
    /// Gas consumed by the transaction.
    #[serde(deserialize_with = "deserialize_u64_from_hex")]
    pub gas_used: u64,
    /// Execution status: 1 for success, 0 for revert.
    #[serde(deserialize_with = "deserialize_u64_from_hex")]
    pub status: u64,
}

/// Create an HTTP client configured for JSON-RPC requests.
pub fn create_client() -> Result<reqwest::Client, anyhow::Error> {
    reqwest::Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .build()
        .context("Failed to create HTTP client")
}

/// Make a JSON-RPC call and deserialize the result.
///
/// # Arguments
/// * `client` - The HTTP client to use
/// * `url` - The RPC endpoint URL
/// * `method` - The RPC method name
/// * `params` - The method parameters
///
/// # Returns
/// The deserialized result, or an error if the request failed or returned an error response.
pub async fn json_rpc_call<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    method: &str,
    params: Vec<Value>,
) -> Result<T, anyhow::Error> {
    let response = client
        .post(url)
        .json(&serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        }))
        .send()
        .await
        .with_context(|| format!("Failed to send {} request", method))?;

    let result: Value = response
        .json()
        .await
        .with_context(|| format!("Failed to parse {} response", method))?;

    if let Some(error) = result.get("error") {
        anyhow::bail!(
            "RPC error: {}",
            error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown")
        );
    }

    let result_value = result
        .get("result")
        .context("No result in response")?
        .clone();

    serde_json::from_value(result_value)
        .with_context(|| format!("Failed to deserialize {} result", method))
}

/// The accounts the node holds keys for (`eth_accounts`).
pub async fn accounts(client: &reqwest::Client, url: &str) -> Result<Vec<Address>, anyhow::Error> {
    json_rpc_call(client, url, "eth_accounts", vec![]).await
}

/// The chain ID reported by the node (`eth_chainId`).
pub async fn chain_id(client: &reqwest::Client, url: &str) -> Result<u64, anyhow::Error> {
    let hex_id: String = json_rpc_call(client, url, "eth_chainId", vec![]).await?;
    u64_from_hex(&hex_id).context("Failed to parse chain ID")
}

/// Ask the node for a gas estimate for `tx` (`eth_estimateGas`).
pub async fn estimate_gas(
    client: &reqwest::Client,
    url: &str,
    tx: &Value,
) -> Result<u64, anyhow::Error> {
    let hex_gas: String = json_rpc_call(client, url, "eth_estimateGas", vec![tx.clone()]).await?;
    u64_from_hex(&hex_gas).context("Failed to parse gas estimate")
}

/// Submit `tx` for signing and inclusion by the node (`eth_sendTransaction`).
///
/// The sender's key must be held by the node; signing is not done locally.
pub async fn send_transaction(
    client: &reqwest::Client,
    url: &str,
    tx: &Value,
) -> Result<B256, anyhow::Error> {
    json_rpc_call(client, url, "eth_sendTransaction", vec![tx.clone()]).await
}

/// Fetch the receipt for `tx_hash`, or `None` while the transaction is pending.
pub async fn transaction_receipt(
    client: &reqwest::Client,
    url: &str,
    tx_hash: B256,
) -> Result<Option<TransactionReceipt>, anyhow::Error> {
    json_rpc_call(
        client,
        url,
        "eth_getTransactionReceipt",
        vec![serde_json::json!(format!("{tx_hash}"))],
    )
    .await
}

/// The code deployed at `address` (`eth_getCode`).
pub async fn code_at(
    client: &reqwest::Client,
    url: &str,
    address: Address,
) -> Result<Bytes, anyhow::Error> {
    json_rpc_call(
        client,
        url,
        "eth_getCode",
        vec![
            serde_json::json!(format!("{address}")),
            serde_json::json!("latest"),
        ],
    )
    .await
}

/// The value of storage `slot` at `address` (`eth_getStorageAt`).
pub async fn storage_at(
    client: &reqwest::Client,
    url: &str,
    address: Address,
    slot: B256,
) -> Result<B256, anyhow::Error> {
    json_rpc_call(
        client,
        url,
        "eth_getStorageAt",
        vec![
            serde_json::json!(format!("{address}")),
            serde_json::json!(format!("{slot}")),
            serde_json::json!("latest"),
        ],
    )
    .await
}

/// Poll for the receipt of `tx_hash` until it is mined or `timeout_secs` elapses.
///
/// A receipt with a failed status is returned as-is; interpreting the status
/// is the caller's job. An RPC failure while polling aborts the wait.
pub async fn wait_for_receipt(
    client: &reqwest::Client,
    url: &str,
    tx_hash: B256,
    timeout_secs: u64,
) -> Result<TransactionReceipt, anyhow::Error> {
    let start = std::time::Instant::now();
    let max_duration = Duration::from_secs(timeout_secs);

    loop {
        if let Some(receipt) = transaction_receipt(client, url, tx_hash).await? {
            return Ok(receipt);
        }

        if start.elapsed() > max_duration {
            anyhow::bail!(
                "Timeout waiting for transaction {} to be mined",
                tx_hash
            );
        }

        tracing::trace!(tx_hash = %tx_hash, "Transaction pending, retrying...");
        tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
    }
}

/// Parse a `0x`-prefixed hex quantity into a u64.
pub(crate) fn u64_from_hex(s: &str) -> Result<u64, anyhow::Error> {
    u64::from_str_radix(s.trim_start_matches("0x"), 16)
        .with_context(|| format!("Invalid hex quantity: '{}'", s))
}

/// Deserialize a u64 from a hex string (with 0x prefix).
fn deserialize_u64_from_hex<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    u64::from_str_radix(s.trim_start_matches("0x"), 16).map_err(serde::de::Error::custom)
}
