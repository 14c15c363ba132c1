//! Run configuration, read once from the environment (and `.env`).

use std::{fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use reqwest::Url;

use crate::{
    account::SigningKey,
    basic_elements::felt::{felt_from_str, felt_from_u128},
    constants::{
        DEFAULT_ABI_PATH, DEFAULT_ERC20_ABI_PATH, DEFAULT_MAX_WAIT_SECS, DEFAULT_POLL_INTERVAL_MS,
        DEFAULT_V1_MAX_FEE, PublicRpcUrl,
    },
    error::{Error, Result},
    types::{Felt, ResourceBounds, ResourceBoundsMapping, TransactionVersion},
};

pub const RPC_URL: &str = "STARKNET_RPC_URL";
pub const ADDRESS: &str = "STARKNET_ADDRESS";
pub const PRIVATE_KEY: &str = "STARKNET_PRIVATE_KEY";
pub const TX_VERSION: &str = "STARKNET_TX_VERSION";
pub const POLL_INTERVAL_MS: &str = "STARKNET_POLL_INTERVAL_MS";
pub const MAX_WAIT_SECS: &str = "STARKNET_MAX_WAIT_SECS";
pub const ABI_PATH: &str = "STARKNET_ABI_PATH";
pub const ERC20_ABI_PATH: &str = "STARKNET_ERC20_ABI_PATH";
pub const L1_GAS: &str = "STARKNET_L1_GAS";
pub const L1_GAS_PRICE: &str = "STARKNET_L1_GAS_PRICE";
pub const L2_GAS: &str = "STARKNET_L2_GAS";
pub const L2_GAS_PRICE: &str = "STARKNET_L2_GAS_PRICE";
pub const L1_DATA_GAS: &str = "STARKNET_L1_DATA_GAS";
pub const L1_DATA_GAS_PRICE: &str = "STARKNET_L1_DATA_GAS_PRICE";
pub const MAX_FEE: &str = "STARKNET_MAX_FEE";

#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: Url,
    pub account_address: Felt,
    pub signing_key: SigningKey,
    pub transaction_version: TransactionVersion,
    pub poll_interval: Duration,
    pub max_wait: Duration,
    pub abi_path: PathBuf,
    pub erc20_abi_path: PathBuf,
}

// Accepts `0x` hex or decimal
fn parse_number<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr + TryFrom<u128>,
    <T as FromStr>::Err: Display,
{
    let invalid = |reason: String| Error::InvalidConfiguration {
        key: key.to_string(),
        reason,
    };

    match raw.strip_prefix("0x") {
        Some(hex) => {
            let value = u128::from_str_radix(hex, 16).map_err(|e| invalid(e.to_string()))?;
            T::try_from(value).map_err(|_| invalid(format!("{} is out of range", raw)))
        }
        None => raw.parse().map_err(|e: <T as FromStr>::Err| invalid(e.to_string())),
    }
}

struct Lookup<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Lookup<F> {
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn required(&self, key: &str) -> Result<String> {
        self.optional(key)
            .ok_or_else(|| Error::ConfigurationMissing(key.to_string()))
    }

    fn number_or<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr + TryFrom<u128>,
        <T as FromStr>::Err: Display,
    {
        match self.optional(key) {
            Some(raw) => parse_number(key, &raw),
            None => Ok(default),
        }
    }

    fn bounds_or(&self, amount_key: &str, price_key: &str, default: ResourceBounds) -> Result<ResourceBounds> {
        Ok(ResourceBounds {
            max_amount: self.number_or(amount_key, default.max_amount)?,
            max_price_per_unit: self.number_or(price_key, default.max_price_per_unit)?,
        })
    }
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Required values are
    /// checked first, before anything else is parsed.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self> {
        let env = Lookup { lookup };

        let rpc_url = env.required(RPC_URL)?;
        let address = env.required(ADDRESS)?;
        let private_key = env.required(PRIVATE_KEY)?;

        let rpc_url = match rpc_url.as_str() {
            "mainnet" => PublicRpcUrl::Mainnet.url().to_string(),
            "sepolia" => PublicRpcUrl::Sepolia.url().to_string(),
            _ => rpc_url,
        };
        let rpc_url = Url::parse(&rpc_url).map_err(|e| Error::InvalidConfiguration {
            key: RPC_URL.to_string(),
            reason: e.to_string(),
        })?;

        let account_address = felt_from_str(&address).map_err(|e| Error::InvalidConfiguration {
            key: ADDRESS.to_string(),
            reason: e.to_string(),
        })?;

        let signing_key =
            SigningKey::from_string(&private_key).map_err(|e| Error::InvalidConfiguration {
                key: PRIVATE_KEY.to_string(),
                reason: e.to_string(),
            })?;

        let transaction_version = match env.optional(TX_VERSION).as_deref() {
            None | Some("3") | Some("v3") => {
                let defaults = ResourceBoundsMapping::default();
                TransactionVersion::V3 {
                    resource_bounds: ResourceBoundsMapping {
                        l1_gas: env.bounds_or(L1_GAS, L1_GAS_PRICE, defaults.l1_gas)?,
                        l1_data_gas: env.bounds_or(
                            L1_DATA_GAS,
                            L1_DATA_GAS_PRICE,
                            defaults.l1_data_gas,
                        )?,
                        l2_gas: env.bounds_or(L2_GAS, L2_GAS_PRICE, defaults.l2_gas)?,
                    },
                    tip: 0,
                }
            }
            Some("1") | Some("v1") => TransactionVersion::V1 {
                max_fee: felt_from_u128(env.number_or(MAX_FEE, DEFAULT_V1_MAX_FEE)?),
            },
            Some(other) => {
                return Err(Error::InvalidConfiguration {
                    key: TX_VERSION.to_string(),
                    reason: format!("unsupported transaction version '{}', use 1 or 3", other),
                });
            }
        };

        let poll_interval =
            Duration::from_millis(env.number_or(POLL_INTERVAL_MS, DEFAULT_POLL_INTERVAL_MS)?);
        let max_wait = Duration::from_secs(env.number_or(MAX_WAIT_SECS, DEFAULT_MAX_WAIT_SECS)?);

        if poll_interval.is_zero() {
            return Err(Error::InvalidConfiguration {
                key: POLL_INTERVAL_MS.to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if max_wait.is_zero() {
            return Err(Error::InvalidConfiguration {
                key: MAX_WAIT_SECS.to_string(),
                reason: "must be positive".to_string(),
            });
        }

        Ok(Self {
            rpc_url,
            account_address,
            signing_key,
            transaction_version,
            poll_interval,
            max_wait,
            abi_path: env
                .optional(ABI_PATH)
                .unwrap_or_else(|| DEFAULT_ABI_PATH.to_string())
                .into(),
            erc20_abi_path: env
                .optional(ERC20_ABI_PATH)
                .unwrap_or_else(|| DEFAULT_ERC20_ABI_PATH.to_string())
                .into(),
        })
    }
}
