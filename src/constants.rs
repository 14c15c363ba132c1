// ERC-721 collection deployed for the mint scenario
pub const DEPLOYED_CONTRACT: &str =
    "0x062217de4d51800c4c627d98bf820d9b6d16a1c4d8cd5f0f91645bf8f22bab5e";

// ETH ERC-20 token, same address on mainnet and sepolia
pub const ADDR_ETH: &str = "0x049d36570d4e46f48e99674bd3fcc84644ddd6b96f7c741b1562b82f9e004dc7";

// Recipient of the reference transfer
pub const DEFAULT_RECIPIENT: &str =
    "0x0536e6dc3bf60e99a18540614aa3246bcb4f9e68c0e6e681c0d3557b208cebec";
pub const DEFAULT_TRANSFER_AMOUNT: &str = "0.0000000001";

pub const DEFAULT_ABI_PATH: &str = "./labels.json";
pub const DEFAULT_ERC20_ABI_PATH: &str = "./erc20.json";

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_MAX_WAIT_SECS: u64 = 300;

// Default cap for v1 transactions: 0.001 ETH
pub const DEFAULT_V1_MAX_FEE: u128 = 1_000_000_000_000_000;

pub enum PublicRpcUrl {
    Mainnet,
    Sepolia,
}

impl PublicRpcUrl {
    pub fn url(&self) -> &'static str {
        match self {
            PublicRpcUrl::Mainnet => "https://starknet-mainnet.public.blastapi.io/rpc/v0_8",
            PublicRpcUrl::Sepolia => "https://starknet-sepolia.public.blastapi.io/rpc/v0_8",
        }
    }
}
