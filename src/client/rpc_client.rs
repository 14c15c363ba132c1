use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tracing::debug;

use crate::{
    basic_elements::felt::{felt_from_str, felt_to_hex},
    constants::PublicRpcUrl,
    error::{Error, Result},
    types::{
        BlockId, BroadcastedInvokeTransaction, ExecutionStatus, Felt, FunctionCall,
        InvokeTransactionResult, TransactionReceipt, TransactionStatus,
    },
};

use super::provider::Provider;

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct RawTransactionStatus {
    finality_status: String,
    #[serde(default)]
    execution_status: Option<ExecutionStatus>,
    #[serde(default)]
    failure_reason: Option<String>,
}

/// Starknet JSON-RPC client over HTTP.
#[derive(Debug, Clone)]
pub struct JsonRpcClient {
    pub http_client: Client,
    pub rpc_url: Url,
    next_id: Arc<AtomicU64>,
}

impl JsonRpcClient {
    pub fn new(rpc_url: &str) -> Result<Self> {
        Self::with_client(Client::new(), rpc_url)
    }

    /// Reuses an existing HTTP client (timeouts, proxies, headers).
    pub fn with_client(http_client: Client, rpc_url: &str) -> Result<Self> {
        let rpc_url = Url::parse(rpc_url)
            .map_err(|e| Error::invalid_argument(format!("invalid RPC url '{}': {}", rpc_url, e)))?;

        Ok(Self {
            http_client,
            rpc_url,
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    pub fn new_mainnet() -> Result<Self> {
        Self::new(PublicRpcUrl::Mainnet.url())
    }

    pub fn new_sepolia() -> Result<Self> {
        Self::new(PublicRpcUrl::Sepolia.url())
    }

    /// Sends one request and deserializes its `result`.
    pub async fn send_request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        debug!(method, id, "sending rpc request");

        let response = self
            .http_client
            .post(self.rpc_url.clone())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        let parsed: JsonRpcResponse = serde_json::from_str(&body).map_err(|e| {
            Error::Transport(format!(
                "{} answered {} with an unreadable body: {}",
                method, status, e
            ))
        })?;

        if let Some(error) = parsed.error {
            let message = match error.data {
                Some(data) => format!("{}: {}", error.message, data),
                None => error.message,
            };
            return Err(Error::Rpc {
                code: error.code,
                message,
            });
        }

        let result = parsed
            .result
            .ok_or_else(|| Error::Transport(format!("{} returned neither result nor error", method)))?;

        serde_json::from_value(result)
            .map_err(|e| Error::Transport(format!("unexpected {} result: {}", method, e)))
    }

    async fn send_felt_request(&self, method: &str, params: Value) -> Result<Felt> {
        let raw: String = self.send_request(method, params).await?;
        felt_from_str(&raw).map_err(|e| Error::Transport(format!("{} result: {}", method, e)))
    }
}

#[async_trait]
impl Provider for JsonRpcClient {
    async fn chain_id(&self) -> Result<Felt> {
        self.send_felt_request("starknet_chainId", json!([])).await
    }

    async fn get_nonce(&self, block_id: BlockId, contract_address: Felt) -> Result<Felt> {
        self.send_felt_request(
            "starknet_getNonce",
            json!({
                "block_id": block_id.to_json(),
                "contract_address": felt_to_hex(&contract_address),
            }),
        )
        .await
    }

    async fn call(&self, request: &FunctionCall, block_id: BlockId) -> Result<Vec<Felt>> {
        let raw: Vec<String> = self
            .send_request(
                "starknet_call",
                json!({
                    "request": request,
                    "block_id": block_id.to_json(),
                }),
            )
            .await?;

        raw.iter()
            .map(|value| {
                felt_from_str(value)
                    .map_err(|e| Error::Transport(format!("starknet_call result: {}", e)))
            })
            .collect()
    }

    async fn get_class_at(&self, block_id: BlockId, contract_address: Felt) -> Result<Value> {
        self.send_request(
            "starknet_getClassAt",
            json!({
                "block_id": block_id.to_json(),
                "contract_address": felt_to_hex(&contract_address),
            }),
        )
        .await
    }

    async fn add_invoke_transaction(
        &self,
        transaction: &BroadcastedInvokeTransaction,
    ) -> Result<InvokeTransactionResult> {
        self.send_request(
            "starknet_addInvokeTransaction",
            json!({ "invoke_transaction": transaction.to_json() }),
        )
        .await
    }

    async fn get_transaction_status(&self, transaction_hash: Felt) -> Result<TransactionStatus> {
        let raw: RawTransactionStatus = self
            .send_request(
                "starknet_getTransactionStatus",
                json!({ "transaction_hash": felt_to_hex(&transaction_hash) }),
            )
            .await?;

        Ok(TransactionStatus {
            finality_status: raw.finality_status.parse()?,
            execution_status: raw.execution_status,
            failure_reason: raw.failure_reason,
        })
    }

    async fn get_transaction_receipt(&self, transaction_hash: Felt) -> Result<TransactionReceipt> {
        self.send_request(
            "starknet_getTransactionReceipt",
            json!({ "transaction_hash": felt_to_hex(&transaction_hash) }),
        )
        .await
    }
}
