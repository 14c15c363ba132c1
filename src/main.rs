mod cli;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use starknet_web3::{
    abi_loader::InterfaceSource,
    basic_elements::amount::format_token_amount,
    config::Config,
    metadata::TokenMetadataMap,
    orchestrator::{Addresses, Session},
};

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    let session = Session::connect(&config, TokenMetadataMap::default())
        .context("Failed to create the RPC client")?;
    let addresses = Addresses::deployed()?;

    let source = |cache: &Path| {
        if cli.fetch_abi {
            InterfaceSource::Network
        } else {
            InterfaceSource::Cache(cache.to_path_buf())
        }
    };

    match cli.command() {
        Command::Transfer { recipient, amount } => {
            let erc20 = session
                .bind(addresses.erc20, &source(&config.erc20_abi_path))
                .await
                .context("Failed to load the ERC-20 interface")?;

            let outcome = session
                .transfer(&erc20, &recipient, &amount)
                .await
                .with_context(|| format!("Failed to transfer {} ETH to {}", amount, recipient))?;

            info!(
                before = %format_token_amount(outcome.balance_before),
                after = %format_token_amount(outcome.balance_after),
                "transfer done"
            );
        }

        Command::Mint { token_id } => {
            let nft = session
                .bind(addresses.nft, &source(&config.abi_path))
                .await
                .context("Failed to load the ERC-721 interface")?;

            let outcome = session
                .mint(&nft, token_id)
                .await
                .with_context(|| format!("Failed to mint token {}", token_id))?;

            info!(
                token_id,
                balance = %outcome.balance,
                total_supply = %outcome.total_supply,
                "mint done"
            );
        }

        Command::Name => {
            let nft = session
                .bind(addresses.nft, &source(&config.abi_path))
                .await
                .context("Failed to load the ERC-721 interface")?;

            session
                .contract_name(&nft)
                .await
                .context("Failed to read the contract name")?;
        }

        Command::ExportAbi { out } => {
            let path = out.unwrap_or_else(|| config.abi_path.clone());

            session
                .export_abi(addresses.nft, &path)
                .await
                .with_context(|| format!("Failed to export the interface to {}", path.display()))?;
        }
    }

    Ok(())
}
