use std::{sync::Arc, time::Duration};

use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::{
    account::Account,
    constants::{DEFAULT_MAX_WAIT_SECS, DEFAULT_POLL_INTERVAL_MS},
    error::{Error, Result},
    types::{
        Call, ExecutionStatus, Felt, FinalityStatus, TransactionReceipt, TransactionStatus,
        TransactionVersion,
    },
};

/// Signs and dispatches calls through the account, then polls the node until
/// the transaction is final.
pub struct TransactionSubmitter {
    account: Arc<Account>,
    version: TransactionVersion,
    poll_interval: Duration,
    max_wait: Duration,
}

impl TransactionSubmitter {
    pub fn new(account: Arc<Account>, version: TransactionVersion) -> Self {
        Self {
            account,
            version,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            max_wait: Duration::from_secs(DEFAULT_MAX_WAIT_SECS),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    /// Submits one call and waits for it. The call is consumed: it is sent
    /// exactly once and never retried.
    pub async fn submit(&self, call: Call) -> Result<TransactionReceipt> {
        let method = call.method.clone();
        let dispatched = self.account.execute(&[call], &self.version).await?;

        let receipt = self.wait_for_transaction(dispatched.transaction_hash).await?;

        info!(
            method = %method,
            transaction_hash = %format!("{:#x}", receipt.transaction_hash),
            finality_status = %receipt.finality_status,
            block_number = ?receipt.block_number,
            actual_fee = ?receipt.actual_fee.as_ref().map(|fee| format!("{:#x} {}", fee.amount, fee.unit)),
            events = receipt.events.len(),
            "transaction accepted"
        );

        Ok(receipt)
    }

    /// Waits until `transaction_hash` is accepted or rejected, for at most
    /// `max_wait`. Dropping the future stops the polling.
    pub async fn wait_for_transaction(&self, transaction_hash: Felt) -> Result<TransactionReceipt> {
        match timeout(self.max_wait, self.poll_until_final(transaction_hash)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    transaction_hash = %format!("{:#x}", transaction_hash),
                    max_wait_secs = self.max_wait.as_secs(),
                    "transaction still pending"
                );
                Err(Error::Timeout { transaction_hash })
            }
        }
    }

    async fn poll_until_final(&self, transaction_hash: Felt) -> Result<TransactionReceipt> {
        let provider = self.account.provider();

        loop {
            match provider.get_transaction_status(transaction_hash).await {
                Ok(status) if status.finality_status.is_terminal() => {
                    return self.conclude(transaction_hash, status).await;
                }
                Ok(status) => {
                    debug!(
                        transaction_hash = %format!("{:#x}", transaction_hash),
                        finality_status = %status.finality_status,
                        "transaction pending"
                    );
                }
                // The node has not seen the transaction yet
                Err(e) if e.is_transaction_not_found() => {
                    debug!(transaction_hash = %format!("{:#x}", transaction_hash), "transaction not found yet");
                }
                Err(e) => return Err(e),
            }

            sleep(self.poll_interval).await;
        }
    }

    async fn conclude(
        &self,
        transaction_hash: Felt,
        status: TransactionStatus,
    ) -> Result<TransactionReceipt> {
        if status.finality_status == FinalityStatus::Rejected {
            return Err(Error::TransactionFailed {
                transaction_hash,
                reason: status
                    .failure_reason
                    .unwrap_or_else(|| "rejected".to_string()),
            });
        }

        if status.execution_status == Some(ExecutionStatus::Reverted) {
            let reason = match status.failure_reason {
                Some(reason) => reason,
                None => self.revert_reason(transaction_hash).await,
            };
            return Err(Error::TransactionFailed {
                transaction_hash,
                reason,
            });
        }

        let receipt = self
            .account
            .provider()
            .get_transaction_receipt(transaction_hash)
            .await?;

        if receipt.transaction_hash != transaction_hash {
            return Err(Error::transport(format!(
                "asked for the receipt of {:#x}, got {:#x}",
                transaction_hash, receipt.transaction_hash
            )));
        }

        if receipt.execution_status == ExecutionStatus::Reverted {
            return Err(Error::TransactionFailed {
                transaction_hash,
                reason: receipt
                    .revert_reason
                    .unwrap_or_else(|| "reverted".to_string()),
            });
        }

        Ok(receipt)
    }

    // Best effort: the status already told us it reverted
    async fn revert_reason(&self, transaction_hash: Felt) -> String {
        self.account
            .provider()
            .get_transaction_receipt(transaction_hash)
            .await
            .ok()
            .and_then(|receipt| receipt.revert_reason)
            .unwrap_or_else(|| "reverted".to_string())
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::U256;

    use super::*;
    use crate::{
        account::SigningKey,
        basic_elements::felt::selector_from_name,
        client::mock::MockProvider,
    };

    const SENDER: u64 = 0xa;

    fn transfer_call() -> Call {
        Call {
            to: Felt::from(0x49du64),
            selector: selector_from_name("transfer").unwrap(),
            calldata: vec![Felt::from(0xbu64), Felt::from(5u64), Felt::ZERO],
            method: "transfer".to_string(),
        }
    }

    fn submitter(provider: Arc<MockProvider>) -> TransactionSubmitter {
        let account = Account::new(
            Felt::from(SENDER),
            SigningKey::from_string("0x1234").unwrap(),
            provider,
        );

        TransactionSubmitter::new(Arc::new(account), TransactionVersion::default())
            .with_poll_interval(Duration::from_millis(1))
            .with_max_wait(Duration::from_secs(5))
    }

    fn funded(statuses: Vec<Result<TransactionStatus>>) -> Arc<MockProvider> {
        Arc::new(
            MockProvider::new()
                .with_balance(Felt::from(SENDER), U256::from(100u64))
                .with_statuses(statuses),
        )
    }

    #[tokio::test]
    async fn test_accepted_returns_receipt_of_dispatched_hash() {
        let provider = funded(vec![
            Ok(MockProvider::status(FinalityStatus::Received, None)),
            Ok(MockProvider::status(
                FinalityStatus::AcceptedOnL2,
                Some(ExecutionStatus::Succeeded),
            )),
        ]);

        let receipt = submitter(provider.clone()).submit(transfer_call()).await.unwrap();

        assert_eq!(receipt.transaction_hash, Felt::from(0x7001u64));
        assert_eq!(receipt.execution_status, ExecutionStatus::Succeeded);
        assert_eq!(provider.status_queries(), 2);
    }

    #[tokio::test]
    async fn test_rejected_is_a_failure_carrying_the_hash() {
        let provider = funded(vec![Ok(TransactionStatus {
            finality_status: FinalityStatus::Rejected,
            execution_status: None,
            failure_reason: Some("Invalid transaction nonce".to_string()),
        })]);

        let err = submitter(provider).submit(transfer_call()).await.unwrap_err();

        match err {
            Error::TransactionFailed {
                transaction_hash,
                reason,
            } => {
                assert_eq!(transaction_hash, Felt::from(0x7001u64));
                assert_eq!(reason, "Invalid transaction nonce");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_reverted_is_a_failure() {
        let provider = funded(vec![Ok(TransactionStatus {
            finality_status: FinalityStatus::AcceptedOnL2,
            execution_status: Some(ExecutionStatus::Reverted),
            failure_reason: Some("u256_sub Overflow".to_string()),
        })]);

        let err = submitter(provider).submit(transfer_call()).await.unwrap_err();

        assert_failed(err, "u256_sub Overflow");
    }

    fn reverted_receipt(transaction_hash: &str) -> serde_json::Value {
        serde_json::json!({
            "transaction_hash": transaction_hash,
            "execution_status": "REVERTED",
            "finality_status": "ACCEPTED_ON_L2",
            "revert_reason": "Error in the called contract: ERC20: insufficient balance",
            "events": []
        })
    }

    fn assert_failed(err: Error, expected_reason: &str) {
        match err {
            Error::TransactionFailed {
                transaction_hash,
                reason,
            } => {
                assert_eq!(transaction_hash, Felt::from(0x7001u64));
                assert_eq!(reason, expected_reason);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_reverted_status_takes_reason_from_receipt() {
        let provider = Arc::new(
            MockProvider::new()
                .with_balance(Felt::from(SENDER), U256::from(100u64))
                .with_receipt(Felt::from(0x7001u64), reverted_receipt("0x7001"))
                .with_statuses(vec![Ok(MockProvider::status(
                    FinalityStatus::AcceptedOnL2,
                    Some(ExecutionStatus::Reverted),
                ))]),
        );

        let err = submitter(provider).submit(transfer_call()).await.unwrap_err();

        assert_failed(
            err,
            "Error in the called contract: ERC20: insufficient balance",
        );
    }

    #[tokio::test]
    async fn test_reverted_receipt_after_accepted_status() {
        // The status has no execution status yet, only the receipt knows
        let provider = Arc::new(
            MockProvider::new()
                .with_balance(Felt::from(SENDER), U256::from(100u64))
                .with_receipt(Felt::from(0x7001u64), reverted_receipt("0x7001"))
                .with_statuses(vec![Ok(MockProvider::status(
                    FinalityStatus::AcceptedOnL2,
                    None,
                ))]),
        );

        let err = submitter(provider).submit(transfer_call()).await.unwrap_err();

        assert_failed(
            err,
            "Error in the called contract: ERC20: insufficient balance",
        );
    }

    #[tokio::test]
    async fn test_receipt_of_another_transaction_is_a_transport_error() {
        let mut receipt = reverted_receipt("0x9999");
        receipt["execution_status"] = serde_json::json!("SUCCEEDED");
        let provider = Arc::new(
            MockProvider::new()
                .with_balance(Felt::from(SENDER), U256::from(100u64))
                .with_receipt(Felt::from(0x7001u64), receipt),
        );

        let err = submitter(provider).submit(transfer_call()).await.unwrap_err();

        assert!(matches!(err, Error::Transport(_)));
    }

    #[tokio::test]
    async fn test_unknown_hash_keeps_polling() {
        let not_found = || Error::Rpc {
            code: 29,
            message: "Transaction hash not found".to_string(),
        };
        let provider = funded(vec![
            Err(not_found()),
            Err(not_found()),
            Ok(MockProvider::status(FinalityStatus::PreConfirmed, None)),
        ]);

        let receipt = submitter(provider.clone()).submit(transfer_call()).await.unwrap();

        // Two misses, one pending, then the default accepted status
        assert_eq!(provider.status_queries(), 4);
        assert_eq!(receipt.transaction_hash, Felt::from(0x7001u64));
    }

    #[tokio::test]
    async fn test_transport_error_while_waiting_is_not_a_failure() {
        let provider = funded(vec![
            Ok(MockProvider::status(FinalityStatus::Received, None)),
            Err(Error::transport("connection reset by peer")),
        ]);

        let err = submitter(provider).submit(transfer_call()).await.unwrap_err();

        assert!(matches!(err, Error::Transport(_)));
    }

    #[tokio::test]
    async fn test_wait_is_bounded() {
        let pending = (0..10_000)
            .map(|_| Ok(MockProvider::status(FinalityStatus::Received, None)))
            .collect();
        let provider = funded(pending);

        let err = submitter(provider)
            .with_poll_interval(Duration::from_millis(5))
            .with_max_wait(Duration::from_millis(50))
            .submit(transfer_call())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Timeout { transaction_hash } if transaction_hash == Felt::from(0x7001u64)
        ));
    }

    #[tokio::test]
    async fn test_refused_dispatch_never_waits() {
        let provider = funded(vec![]);
        let account = Account::new(
            Felt::from(SENDER),
            SigningKey::from_string("0x1234").unwrap(),
            provider.clone(),
        );
        let submitter = TransactionSubmitter::new(Arc::new(account), TransactionVersion::default());

        // More than the account holds: the node refuses it at dispatch
        let mut call = transfer_call();
        call.calldata[1] = Felt::from(1_000u64);

        assert!(submitter.submit(call).await.is_err());
        assert_eq!(provider.status_queries(), 0);
    }
}
