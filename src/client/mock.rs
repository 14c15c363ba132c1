//! In-memory Starknet node used by the tests of the layers above the RPC
//! client.

use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};

use alloy_primitives::U256;
use async_trait::async_trait;
use serde_json::{Value, json};

use crate::{
    basic_elements::{
        amount::u256_to_low_high,
        calldata::Calldata,
        felt::{felt_from_u128, felt_to_hex, felt_to_u128, selector_from_name},
    },
    error::{Error, Result},
    types::{
        BlockId, BroadcastedInvokeTransaction, ExecutionStatus, Felt, FinalityStatus,
        FunctionCall, InvokeTransactionResult, TransactionReceipt, TransactionStatus,
    },
};

use super::provider::Provider;

// SN_SEPOLIA
pub const CHAIN_ID: u128 = 0x534e5f5345504f4c4941;

#[derive(Default)]
struct MockState {
    nonce: u64,
    next_hash: u64,
    balances: HashMap<String, U256>,
    view_results: HashMap<String, Vec<Felt>>,
    classes: HashMap<String, Value>,
    receipts: HashMap<String, Value>,
    statuses: VecDeque<Result<TransactionStatus>>,
    submitted: Vec<BroadcastedInvokeTransaction>,
    status_queries: usize,
}

/// Answers reads from canned values and "executes" ERC-20 transfers found in
/// submitted `__execute__` calldata against an in-memory balance table.
#[derive(Default)]
pub struct MockProvider {
    state: Mutex<MockState>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balance(self, account: Felt, balance: U256) -> Self {
        self.state.lock().unwrap().balances.insert(felt_to_hex(&account), balance);
        self
    }

    pub fn with_view_result(self, method: &str, result: Vec<Felt>) -> Self {
        let selector = selector_from_name(method).unwrap();
        self.state
            .lock()
            .unwrap()
            .view_results
            .insert(felt_to_hex(&selector), result);
        self
    }

    pub fn with_class(self, address: Felt, class: Value) -> Self {
        self.state.lock().unwrap().classes.insert(felt_to_hex(&address), class);
        self
    }

    /// Receipt answered for `transaction_hash` instead of the generated one.
    pub fn with_receipt(self, transaction_hash: Felt, receipt: Value) -> Self {
        self.state
            .lock()
            .unwrap()
            .receipts
            .insert(felt_to_hex(&transaction_hash), receipt);
        self
    }

    /// Statuses handed out, in order, by `get_transaction_status`. Once the
    /// queue is empty every query answers `ACCEPTED_ON_L2` / `SUCCEEDED`.
    pub fn with_statuses(self, statuses: Vec<Result<TransactionStatus>>) -> Self {
        self.state.lock().unwrap().statuses = statuses.into();
        self
    }

    pub fn submitted(&self) -> Vec<BroadcastedInvokeTransaction> {
        self.state.lock().unwrap().submitted.clone()
    }

    pub fn status_queries(&self) -> usize {
        self.state.lock().unwrap().status_queries
    }

    pub fn balance_of(&self, account: &Felt) -> U256 {
        self.state
            .lock()
            .unwrap()
            .balances
            .get(&felt_to_hex(account))
            .copied()
            .unwrap_or_default()
    }

    pub fn status(finality: FinalityStatus, execution: Option<ExecutionStatus>) -> TransactionStatus {
        TransactionStatus {
            finality_status: finality,
            execution_status: execution,
            failure_reason: None,
        }
    }

    fn transfer_events(transaction: &BroadcastedInvokeTransaction) -> Result<Vec<Value>> {
        let transfer = felt_to_hex(&selector_from_name("Transfer")?);
        let mut reader = Calldata::from_felts(transaction.calldata.clone());
        let calls = reader.next_u128()?;

        let mut events = Vec::new();
        for _ in 0..calls {
            let to = reader.next_felt()?;
            let _selector = reader.next_felt()?;
            let len = reader.next_u128()?;
            for _ in 0..len {
                reader.next_felt()?;
            }

            events.push(json!({
                "from_address": felt_to_hex(&to),
                "keys": [transfer, felt_to_hex(&transaction.sender_address)],
                "data": []
            }));
        }

        Ok(events)
    }

    // Applies the ERC-20 transfers of a multicall `__execute__` calldata
    fn apply_transfers(state: &mut MockState, sender: Felt, calldata: &[Felt]) -> Result<()> {
        let transfer = selector_from_name("transfer")?;
        let mut reader = Calldata::from_felts(calldata.to_vec());
        let calls = reader.next_u128()?;

        for _ in 0..calls {
            let _to = reader.next_felt()?;
            let selector = reader.next_felt()?;
            let len = reader.next_u128()? as usize;
            let mut args = Vec::with_capacity(len);
            for _ in 0..len {
                args.push(reader.next_felt()?);
            }

            if selector == transfer {
                let mut args = Calldata::from_felts(args);
                let recipient = args.next_felt()?;
                let amount = args.next_u256()?;

                let sender_balance = state.balances.entry(felt_to_hex(&sender)).or_default();
                *sender_balance = sender_balance
                    .checked_sub(amount)
                    .ok_or_else(|| Error::invalid_argument("insufficient balance"))?;
                *state.balances.entry(felt_to_hex(&recipient)).or_default() += amount;
            }
        }

        Ok(())
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn chain_id(&self) -> Result<Felt> {
        Ok(felt_from_u128(CHAIN_ID))
    }

    async fn get_nonce(&self, _block_id: BlockId, _contract_address: Felt) -> Result<Felt> {
        Ok(Felt::from(self.state.lock().unwrap().nonce))
    }

    async fn call(&self, request: &FunctionCall, _block_id: BlockId) -> Result<Vec<Felt>> {
        let state = self.state.lock().unwrap();

        if request.entry_point_selector == selector_from_name("balance_of")? {
            let account = request.calldata.first().copied().unwrap_or(Felt::ZERO);
            let balance = state.balances.get(&felt_to_hex(&account)).copied().unwrap_or_default();
            let (low, high) = u256_to_low_high(balance);
            return Ok(vec![felt_from_u128(low), felt_from_u128(high)]);
        }

        state
            .view_results
            .get(&felt_to_hex(&request.entry_point_selector))
            .cloned()
            .ok_or_else(|| Error::Rpc {
                code: 21,
                message: "Requested entrypoint does not exist in the contract".to_string(),
            })
    }

    async fn get_class_at(&self, _block_id: BlockId, contract_address: Felt) -> Result<Value> {
        self.state
            .lock()
            .unwrap()
            .classes
            .get(&felt_to_hex(&contract_address))
            .cloned()
            .ok_or_else(|| Error::Rpc {
                code: 20,
                message: "Contract not found".to_string(),
            })
    }

    async fn add_invoke_transaction(
        &self,
        transaction: &BroadcastedInvokeTransaction,
    ) -> Result<InvokeTransactionResult> {
        let mut state = self.state.lock().unwrap();

        Self::apply_transfers(&mut state, transaction.sender_address, &transaction.calldata)
            .map_err(|e| Error::Rpc {
                code: 55,
                message: format!("Account validation failed: {}", e),
            })?;

        state.nonce += 1;
        state.next_hash += 1;
        state.submitted.push(transaction.clone());

        Ok(InvokeTransactionResult {
            transaction_hash: Felt::from(0x7000 + state.next_hash),
        })
    }

    async fn get_transaction_status(&self, _transaction_hash: Felt) -> Result<TransactionStatus> {
        let mut state = self.state.lock().unwrap();
        state.status_queries += 1;

        state.statuses.pop_front().unwrap_or_else(|| {
            Ok(Self::status(
                FinalityStatus::AcceptedOnL2,
                Some(ExecutionStatus::Succeeded),
            ))
        })
    }

    /// Each call of the transaction emits one `Transfer` event keyed by the
    /// sender.
    async fn get_transaction_receipt(&self, transaction_hash: Felt) -> Result<TransactionReceipt> {
        let events = {
            let state = self.state.lock().unwrap();
            if let Some(receipt) = state.receipts.get(&felt_to_hex(&transaction_hash)) {
                return serde_json::from_value(receipt.clone()).map_err(Error::transport);
            }

            let index = felt_to_u128(&transaction_hash)
                .ok()
                .and_then(|hash| hash.checked_sub(0x7001))
                .and_then(|index| state.submitted.get(index as usize));

            match index {
                Some(transaction) => Self::transfer_events(transaction)?,
                None => vec![],
            }
        };

        let receipt = json!({
            "transaction_hash": format!("{:#x}", transaction_hash),
            "execution_status": "SUCCEEDED",
            "finality_status": "ACCEPTED_ON_L2",
            "block_number": 1,
            "actual_fee": { "amount": "0x1", "unit": "FRI" },
            "events": events
        });

        serde_json::from_value(receipt).map_err(Error::transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_applies_transfer_calldata() {
        let sender = Felt::from(0xau64);
        let recipient = Felt::from(0xbu64);
        let provider = MockProvider::new().with_balance(sender, U256::from(1_000u64));

        let mut calldata = Calldata::new();
        calldata
            .add_felt(Felt::ONE)
            .add_felt(Felt::from(0x49du64))
            .add_felt(selector_from_name("transfer").unwrap())
            .add_felt(Felt::THREE)
            .add_felt(recipient)
            .add_u256(U256::from(400u64));

        let mut state = provider.state.lock().unwrap();
        MockProvider::apply_transfers(&mut state, sender, calldata.as_slice()).unwrap();
        drop(state);

        assert_eq!(provider.balance_of(&sender), U256::from(600u64));
        assert_eq!(provider.balance_of(&recipient), U256::from(400u64));
    }
}
