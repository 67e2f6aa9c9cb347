//! Minimal JSON-RPC 2.0 client for the ledger endpoint.
//!
//! Only the two queries the matcher needs, deserializing only the fields it
//! consumes. Commitment is pinned to `confirmed`: the auth flow wants to see
//! a payment quickly, and a later fork dropping it only costs a retry.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use url::Url;

const RPC_TIMEOUT: Duration = Duration::from_secs(10);

/// Failures talking to the ledger. All of them are transient from the
/// caller's point of view: polling degrades to "no match this round".
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("ledger rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("malformed ledger response: {0}")]
    Malformed(String),
}

#[derive(Debug, Deserialize)]
struct RpcEnvelope<T> {
    result: Option<T>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// One entry of a `getSignaturesForAddress` response, newest first.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureInfo {
    pub signature: String,
    pub slot: u64,
    /// Non-null when the transaction failed on-chain.
    #[serde(default)]
    pub err: Option<serde_json::Value>,
    #[serde(default)]
    pub block_time: Option<i64>,
}

/// The subset of a `getTransaction` response the matcher evaluates.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetail {
    pub slot: u64,
    #[serde(default)]
    pub block_time: Option<i64>,
    #[serde(default)]
    pub meta: Option<TransactionMeta>,
    pub transaction: TransactionEnvelope,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMeta {
    #[serde(default)]
    pub err: Option<serde_json::Value>,
    /// Account balances before/after, indexed like `account_keys`.
    pub pre_balances: Vec<u64>,
    pub post_balances: Vec<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEnvelope {
    pub message: TransactionMessage,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMessage {
    /// First entry is the fee payer and first signer.
    pub account_keys: Vec<String>,
}

pub struct RpcClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl RpcClient {
    /// Build a client for the configured endpoint.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(endpoint: Url) -> Result<Self, LedgerError> {
        let http = reqwest::Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(RPC_TIMEOUT)
            .build()?;
        Ok(Self { http, endpoint })
    }

    /// Recent confirmed transaction signatures touching `address`, newest
    /// first, bounded by `limit`.
    ///
    /// # Errors
    /// Returns a [`LedgerError`] on transport failure or an RPC-level error.
    pub async fn signatures_for_address(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<SignatureInfo>, LedgerError> {
        self.call(
            "getSignaturesForAddress",
            json!([address, {"limit": limit, "commitment": "confirmed"}]),
        )
        .await?
        .ok_or_else(|| {
            LedgerError::Malformed("getSignaturesForAddress returned no result".to_string())
        })
    }

    /// Fetch one confirmed transaction. `Ok(None)` means the ledger does not
    /// know the signature (or it is not yet confirmed); that is an answer,
    /// not an error.
    ///
    /// # Errors
    /// Returns a [`LedgerError`] on transport failure or an RPC-level error.
    pub async fn transaction(
        &self,
        signature: &str,
    ) -> Result<Option<TransactionDetail>, LedgerError> {
        self.call(
            "getTransaction",
            json!([signature, {
                "commitment": "confirmed",
                "encoding": "json",
                "maxSupportedTransactionVersion": 0
            }]),
        )
        .await
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<Option<T>, LedgerError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let envelope: RpcEnvelope<T> = response.json().await?;
        if let Some(error) = envelope.error {
            return Err(LedgerError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        Ok(envelope.result)
    }
}
