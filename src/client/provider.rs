use async_trait::async_trait;
use serde_json::Value;

use crate::{
    error::Result,
    types::{
        BlockId, BroadcastedInvokeTransaction, Felt, FunctionCall, InvokeTransactionResult,
        TransactionReceipt, TransactionStatus,
    },
};

/// The JSON-RPC requests this crate issues. `JsonRpcClient` implements it over
/// HTTP; tests swap in an in-memory node.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn chain_id(&self) -> Result<Felt>;

    async fn get_nonce(&self, block_id: BlockId, contract_address: Felt) -> Result<Felt>;

    async fn call(&self, request: &FunctionCall, block_id: BlockId) -> Result<Vec<Felt>>;

    /// Raw contract class deployed at `contract_address`.
    async fn get_class_at(&self, block_id: BlockId, contract_address: Felt) -> Result<Value>;

    async fn add_invoke_transaction(
        &self,
        transaction: &BroadcastedInvokeTransaction,
    ) -> Result<InvokeTransactionResult>;

    async fn get_transaction_status(&self, transaction_hash: Felt) -> Result<TransactionStatus>;

    async fn get_transaction_receipt(&self, transaction_hash: Felt) -> Result<TransactionReceipt>;
}
