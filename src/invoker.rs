//! Read-only queries against the bound contracts. Each query logs what it
//! read and hands the decoded value back.

use alloy_primitives::U256;
use tracing::info;

use crate::{
    basic_elements::{amount::format_token_amount, cairo_value::CairoValue, felt::felt_to_padded_hex},
    contract::Contract,
    error::{Error, Result},
    types::Felt,
};

fn expect_u256(method: &str, value: CairoValue) -> Result<U256> {
    value
        .as_u256()
        .ok_or_else(|| Error::transport(format!("'{}' returned {} instead of a number", method, value)))
}

fn expect_text(method: &str, value: CairoValue) -> Result<String> {
    value
        .as_text()
        .ok_or_else(|| Error::transport(format!("'{}' returned {} instead of text", method, value)))
}

pub async fn total_supply(contract: &Contract) -> Result<U256> {
    let value = contract.call_single("total_supply", &[]).await?;
    let total_supply = expect_u256("total_supply", value)?;

    info!(%total_supply, "total supply");

    Ok(total_supply)
}

pub async fn token_uri(contract: &Contract, token_id: u64) -> Result<String> {
    let value = contract
        .call_single("get_token_uri", &[CairoValue::U256(U256::from(token_id))])
        .await?;
    let uri = expect_text("get_token_uri", value)?;

    info!(token_id, %uri, "token uri");

    Ok(uri)
}

/// Raw `balance_of`, no scaling (NFT counts).
pub async fn balance_of(contract: &Contract, address: Felt) -> Result<U256> {
    let value = contract
        .call_single("balance_of", &[CairoValue::Address(address)])
        .await?;
    let balance = expect_u256("balance_of", value)?;

    info!(account = %felt_to_padded_hex(&address), %balance, "token balance");

    Ok(balance)
}

pub async fn name(contract: &Contract) -> Result<String> {
    let value = contract.call_single("name", &[]).await?;
    let name = expect_text("name", value)?;

    info!(%name, "contract name");

    Ok(name)
}

/// ERC-20 balance in base units. The log line shows it divided by 10^18.
pub async fn token_balance(contract: &Contract, address: Felt) -> Result<U256> {
    let value = contract
        .call_single("balance_of", &[CairoValue::Address(address)])
        .await?;
    let balance = expect_u256("balance_of", value)?;

    info!(
        account = %felt_to_padded_hex(&address),
        balance = %format_token_amount(balance),
        "token balance"
    );

    Ok(balance)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        basic_elements::calldata::Calldata,
        client::mock::MockProvider,
        types::abi::{
            Abi,
            tests::{erc20_abi_json, erc721_abi_json},
        },
    };

    const URI: &str = "ipfs://bafkreigjgrjetsnmsb4ouzu7o5i4jfuktrxu5egbxzhpntetwq2teq5pp4";

    fn bind(abi: serde_json::Value, provider: MockProvider) -> Contract {
        Contract::new(
            Abi::from_class_abi(&abi).unwrap(),
            Felt::from(0x62217u64),
            Arc::new(provider),
        )
    }

    #[tokio::test]
    async fn test_nft_queries() {
        let mut uri = Calldata::new();
        uri.add_byte_array(URI);
        let mut collection = Calldata::new();
        collection.add_byte_array("Labels");

        let owner = Felt::from(0xau64);
        let contract = bind(
            erc721_abi_json(),
            MockProvider::new()
                .with_balance(owner, U256::from(2u64))
                .with_view_result("total_supply", vec![Felt::from(6u64), Felt::ZERO])
                .with_view_result("get_token_uri", uri.into_felts())
                .with_view_result("name", collection.into_felts()),
        );

        assert_eq!(total_supply(&contract).await.unwrap(), U256::from(6u64));
        assert_eq!(token_uri(&contract, 1).await.unwrap(), URI);
        assert_eq!(balance_of(&contract, owner).await.unwrap(), U256::from(2u64));
        assert_eq!(name(&contract).await.unwrap(), "Labels");
    }

    #[tokio::test]
    async fn test_token_balance_is_in_base_units() {
        let owner = Felt::from(0xau64);
        let balance = U256::from(1_500_000_000_000_000_000u128);
        let contract = bind(erc20_abi_json(), MockProvider::new().with_balance(owner, balance));

        let read = token_balance(&contract, owner).await.unwrap();

        assert_eq!(read, balance);
        assert_eq!(format_token_amount(read), "1.5");
    }

    #[tokio::test]
    async fn test_missing_entrypoint_surfaces_rpc_error() {
        let contract = bind(erc721_abi_json(), MockProvider::new());

        assert!(matches!(
            total_supply(&contract).await,
            Err(Error::Rpc { code: 21, .. })
        ));
    }
}
