use clap::{Parser, Subcommand};
use std::path::PathBuf;

use starknet_web3::constants::{DEFAULT_RECIPIENT, DEFAULT_TRANSFER_AMOUNT};

/// Starknet account utility: ERC-20 transfers, ERC-721 mints and reads
#[derive(Parser, Debug)]
#[command(version, about = "Starknet account utility")]
pub struct Cli {
    /// Read contract interfaces from the network instead of the local cache files
    #[arg(long, global = true)]
    pub fetch_abi: bool,

    /// Runs `transfer` with its defaults when omitted
    #[command(subcommand)]
    pub cmd: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the ETH balance, transfer ETH, show the balance again
    Transfer {
        /// Recipient address
        #[arg(long, default_value = DEFAULT_RECIPIENT)]
        recipient: String,

        /// Amount in ETH (decimal, 18 decimals)
        #[arg(long, default_value = DEFAULT_TRANSFER_AMOUNT)]
        amount: String,
    },

    /// Mint a token of the collection to the account, then read it back
    Mint {
        /// Token id whose metadata URI gets minted (1 to 6)
        #[arg(long)]
        token_id: u64,
    },

    /// Print the name of the ERC-721 contract
    Name,

    /// Fetch the ERC-721 interface and write it to the cache file
    ExportAbi {
        /// Output path (default: STARKNET_ABI_PATH)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

impl Cli {
    pub fn command(&self) -> Command {
        self.cmd.clone().unwrap_or(Command::Transfer {
            recipient: DEFAULT_RECIPIENT.to_string(),
            amount: DEFAULT_TRANSFER_AMOUNT.to_string(),
        })
    }
}
