//! The scenarios the command line runs: configuration, provider, account,
//! contract interfaces and bindings, then one fixed sequence of calls. The
//! first error ends the sequence.

use std::{path::Path, sync::Arc};

use alloy_primitives::U256;
use tracing::info;

use crate::{
    abi_loader::{InterfaceSource, export_interface, resolve_interface},
    account::Account,
    basic_elements::felt::{felt_from_str, felt_to_padded_hex},
    builder::TransactionBuilder,
    client::{JsonRpcClient, Provider},
    config::Config,
    constants::{ADDR_ETH, DEPLOYED_CONTRACT},
    contract::Contract,
    error::Result,
    helpers::events::events_named,
    invoker,
    metadata::TokenMetadataMap,
    submitter::TransactionSubmitter,
    types::{EventDetails, Felt, TransactionReceipt, abi::Abi},
};

/// Addresses of the two contracts the scenarios work with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Addresses {
    pub nft: Felt,
    pub erc20: Felt,
}

impl Addresses {
    /// The ERC-721 collection and the ETH token.
    pub fn deployed() -> Result<Self> {
        Ok(Self {
            nft: felt_from_str(DEPLOYED_CONTRACT)?,
            erc20: felt_from_str(ADDR_ETH)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct TransferOutcome {
    pub balance_before: U256,
    pub receipt: TransactionReceipt,
    pub balance_after: U256,
}

#[derive(Debug, Clone)]
pub struct MintOutcome {
    pub receipt: TransactionReceipt,
    /// `Transfer` events emitted by the mint.
    pub transfer_events: Vec<EventDetails>,
    pub balance: U256,
    pub token_uri: String,
    pub total_supply: U256,
}

/// Everything a run needs once the configuration is loaded.
pub struct Session {
    account: Arc<Account>,
    submitter: TransactionSubmitter,
    metadata: TokenMetadataMap,
}

impl Session {
    pub fn new(config: &Config, provider: Arc<dyn Provider>, metadata: TokenMetadataMap) -> Self {
        let account = Arc::new(Account::new(
            config.account_address,
            config.signing_key.clone(),
            provider,
        ));

        let submitter = TransactionSubmitter::new(account.clone(), config.transaction_version)
            .with_poll_interval(config.poll_interval)
            .with_max_wait(config.max_wait);

        Self {
            account,
            submitter,
            metadata,
        }
    }

    /// Session over JSON-RPC at the configured url.
    pub fn connect(config: &Config, metadata: TokenMetadataMap) -> Result<Self> {
        let client = JsonRpcClient::new(config.rpc_url.as_str())?;

        info!(
            rpc_url = %config.rpc_url,
            account = %felt_to_padded_hex(&config.account_address),
            version = config.transaction_version.number(),
            "connected"
        );

        Ok(Self::new(config, Arc::new(client), metadata))
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        self.account.provider()
    }

    pub fn metadata(&self) -> &TokenMetadataMap {
        &self.metadata
    }

    pub async fn bind(&self, address: Felt, source: &InterfaceSource) -> Result<Contract> {
        let abi = resolve_interface(source, self.provider().as_ref(), address).await?;

        Ok(Contract::new(abi, address, self.provider().clone()))
    }

    /// ETH balance, transfer, ETH balance.
    pub async fn transfer(
        &self,
        erc20: &Contract,
        recipient: &str,
        amount: &str,
    ) -> Result<TransferOutcome> {
        let address = self.account.address();
        let call = TransactionBuilder::new(erc20).transfer(recipient, amount)?;

        let balance_before = invoker::token_balance(erc20, address).await?;
        let receipt = self.submitter.submit(call).await?;
        let balance_after = invoker::token_balance(erc20, address).await?;

        Ok(TransferOutcome {
            balance_before,
            receipt,
            balance_after,
        })
    }

    /// Mints `token_id`'s metadata to the account, then reads the balance,
    /// the token uri and the total supply back.
    pub async fn mint(&self, nft: &Contract, token_id: u64) -> Result<MintOutcome> {
        let address = self.account.address();
        let uri = self.metadata.require(token_id)?;
        let call = TransactionBuilder::new(nft).mint(&felt_to_padded_hex(&address), uri)?;

        let receipt = self.submitter.submit(call).await?;
        let transfer_events = events_named(&receipt, "Transfer")?;
        for event in &transfer_events {
            info!(
                contract = %event.from_address,
                keys = ?event.keys,
                "minted"
            );
        }

        let balance = invoker::balance_of(nft, address).await?;
        let token_uri = invoker::token_uri(nft, token_id).await?;
        let total_supply = invoker::total_supply(nft).await?;

        Ok(MintOutcome {
            receipt,
            transfer_events,
            balance,
            token_uri,
            total_supply,
        })
    }

    pub async fn contract_name(&self, nft: &Contract) -> Result<String> {
        invoker::name(nft).await
    }

    pub async fn export_abi(&self, address: Felt, path: impl AsRef<Path>) -> Result<Abi> {
        export_interface(self.provider().as_ref(), address, path).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::tempdir;

    use super::*;
    use crate::{
        abi_loader::save_interface,
        basic_elements::calldata::Calldata,
        client::mock::MockProvider,
        constants::{DEFAULT_RECIPIENT, DEFAULT_TRANSFER_AMOUNT},
        error::Error,
        types::{
            ExecutionStatus,
            abi::tests::{erc20_abi_json, erc721_abi_json},
        },
    };

    const ACCOUNT: &str = "0x0123";

    fn config() -> Config {
        Config::from_lookup(|key: &str| match key {
            "STARKNET_RPC_URL" => Some("http://localhost:5050".to_string()),
            "STARKNET_ADDRESS" => Some(ACCOUNT.to_string()),
            "STARKNET_PRIVATE_KEY" => Some("0x0456".to_string()),
            "STARKNET_POLL_INTERVAL_MS" => Some("1".to_string()),
            _ => None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_transfer_scenario_end_to_end() {
        let account = felt_from_str(ACCOUNT).unwrap();
        let recipient = felt_from_str(DEFAULT_RECIPIENT).unwrap();
        let addresses = Addresses::deployed().unwrap();
        let initial = U256::from(1_000_000_000_000u64);

        let provider = Arc::new(MockProvider::new().with_balance(account, initial));
        let session = Session::new(&config(), provider.clone(), TokenMetadataMap::default());

        let dir = tempdir().unwrap();
        let path = dir.path().join("erc20.json");
        save_interface(&path, &Abi::from_class_abi(&erc20_abi_json()).unwrap()).unwrap();

        let erc20 = session
            .bind(addresses.erc20, &InterfaceSource::Cache(path))
            .await
            .unwrap();
        let outcome = session
            .transfer(&erc20, DEFAULT_RECIPIENT, DEFAULT_TRANSFER_AMOUNT)
            .await
            .unwrap();

        let sent = U256::from(100_000_000u64);
        assert_eq!(outcome.balance_before, initial);
        assert_eq!(outcome.balance_after, initial - sent);
        assert_eq!(outcome.receipt.execution_status, ExecutionStatus::Succeeded);
        assert_eq!(
            outcome.receipt.transaction_hash,
            Felt::from(0x7001u64)
        );
        assert_eq!(provider.balance_of(&recipient), sent);

        // v3 by default
        assert_eq!(provider.submitted()[0].version.number(), 3);
    }

    #[tokio::test]
    async fn test_mint_scenario() {
        let account = felt_from_str(ACCOUNT).unwrap();
        let metadata = TokenMetadataMap::default();
        let uri = metadata.require(3).unwrap().to_string();
        let mut encoded_uri = Calldata::new();
        encoded_uri.add_byte_array(&uri);

        let addresses = Addresses::deployed().unwrap();
        let provider = Arc::new(
            MockProvider::new()
                .with_balance(account, U256::from(1u64))
                .with_class(addresses.nft, json!({ "abi": erc721_abi_json().to_string() }))
                .with_view_result("get_token_uri", encoded_uri.into_felts())
                .with_view_result("total_supply", vec![Felt::THREE, Felt::ZERO]),
        );
        let session = Session::new(&config(), provider.clone(), metadata);

        let nft = session
            .bind(addresses.nft, &InterfaceSource::Network)
            .await
            .unwrap();
        let outcome = session.mint(&nft, 3).await.unwrap();

        assert_eq!(outcome.token_uri, uri);
        assert_eq!(outcome.total_supply, U256::from(3u64));
        assert_eq!(outcome.balance, U256::from(1u64));
        assert_eq!(provider.submitted().len(), 1);
        assert_eq!(outcome.transfer_events.len(), 1);
        assert_eq!(
            outcome.transfer_events[0].from_address,
            felt_to_padded_hex(&addresses.nft)
        );
    }

    #[tokio::test]
    async fn test_mint_of_unknown_token_dispatches_nothing() {
        let addresses = Addresses::deployed().unwrap();
        let provider = Arc::new(
            MockProvider::new().with_class(addresses.nft, json!({ "abi": erc721_abi_json() })),
        );
        let session = Session::new(&config(), provider.clone(), TokenMetadataMap::default());
        let nft = session
            .bind(addresses.nft, &InterfaceSource::Network)
            .await
            .unwrap();

        let err = session.mint(&nft, 42).await.unwrap_err();

        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(provider.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_missing_cache_stops_before_any_call() {
        let provider = Arc::new(MockProvider::new());
        let session = Session::new(&config(), provider.clone(), TokenMetadataMap::default());
        let dir = tempdir().unwrap();

        let err = session
            .bind(Felt::ONE, &InterfaceSource::Cache(dir.path().join("labels.json")))
            .await
            .err()
            .unwrap();

        assert!(matches!(err, Error::InterfaceUnavailable(_)));
        assert_eq!(provider.status_queries(), 0);
    }
}
