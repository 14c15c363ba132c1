pub mod hash;
pub mod signer;

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::{
    basic_elements::{calldata::Calldata, felt::felt_to_padded_hex},
    client::Provider,
    error::{Error, Result},
    types::{
        BlockId, BroadcastedInvokeTransaction, Call, Felt, InvokeTransactionResult,
        TransactionVersion,
    },
};

use hash::{InvokeV3Fields, invoke_v1_hash, invoke_v3_hash};
pub use signer::SigningKey;

/// The configured account: an address, the key that signs for it and the
/// provider transactions go through.
pub struct Account {
    address: Felt,
    signer: SigningKey,
    provider: Arc<dyn Provider>,
    chain_id: OnceCell<Felt>,
}

impl Account {
    pub fn new(address: Felt, signer: SigningKey, provider: Arc<dyn Provider>) -> Self {
        Self {
            address,
            signer,
            provider,
            chain_id: OnceCell::new(),
        }
    }

    pub fn address(&self) -> Felt {
        self.address
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    /// Chain id of the provider, asked once and remembered.
    pub async fn chain_id(&self) -> Result<Felt> {
        self.chain_id
            .get_or_try_init(|| self.provider.chain_id())
            .await
            .copied()
    }

    /// Wraps calls into the calldata of the account's `__execute__` entry
    /// point (Cairo 1 multicall layout).
    pub fn execute_calldata(calls: &[Call]) -> Vec<Felt> {
        let mut calldata = Calldata::new();
        calldata.add_felt(Felt::from(calls.len() as u64));

        for call in calls {
            calldata
                .add_felt(call.to)
                .add_felt(call.selector)
                .add_felt_array(&call.calldata);
        }

        calldata.into_felts()
    }

    /// Signs `calls` as one invoke transaction and sends it. The returned
    /// hash is provisional until the transaction is accepted.
    pub async fn execute(
        &self,
        calls: &[Call],
        version: &TransactionVersion,
    ) -> Result<InvokeTransactionResult> {
        if calls.is_empty() {
            return Err(Error::invalid_argument("nothing to execute"));
        }

        let chain_id = self.chain_id().await?;
        let nonce = self.provider.get_nonce(BlockId::Pending, self.address).await?;
        let calldata = Self::execute_calldata(calls);

        let hash = match version {
            TransactionVersion::V1 { max_fee } => {
                invoke_v1_hash(self.address, &calldata, *max_fee, chain_id, nonce)
            }
            TransactionVersion::V3 {
                resource_bounds,
                tip,
            } => invoke_v3_hash(&InvokeV3Fields {
                sender_address: self.address,
                calldata: &calldata,
                chain_id,
                nonce,
                resource_bounds,
                tip: *tip,
            }),
        };

        let signature = self.signer.sign(&hash)?;

        debug!(
            hash = %format!("{:#x}", hash),
            nonce = %format!("{:#x}", nonce),
            version = version.number(),
            "signed invoke transaction"
        );

        let transaction = BroadcastedInvokeTransaction {
            sender_address: self.address,
            calldata,
            signature: signature.to_vec(),
            nonce,
            version: *version,
        };

        let result = self.provider.add_invoke_transaction(&transaction).await?;

        info!(
            account = %felt_to_padded_hex(&self.address),
            methods = ?calls.iter().map(|call| call.method.as_str()).collect::<Vec<_>>(),
            transaction_hash = %format!("{:#x}", result.transaction_hash),
            "transaction dispatched"
        );

        Ok(result)
    }
}
