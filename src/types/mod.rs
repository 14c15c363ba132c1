pub mod abi;
pub mod event;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    basic_elements::felt::{felt_to_hex, serde_felt},
    error::{Error, Result},
};

pub use event::EventDetails;

/// Starknet field element, the unit of every address, hash and calldata word.
pub type Felt = starknet_crypto::FieldElement;

/// Block a read is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockId {
    #[default]
    Latest,
    Pending,
    Number(u64),
    Hash(Felt),
}

impl BlockId {
    pub fn to_json(&self) -> Value {
        match self {
            BlockId::Latest => json!("latest"),
            BlockId::Pending => json!("pending"),
            BlockId::Number(number) => json!({ "block_number": number }),
            BlockId::Hash(hash) => json!({ "block_hash": felt_to_hex(hash) }),
        }
    }
}

/// A read-only invocation, as sent to `starknet_call`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    #[serde(with = "serde_felt")]
    pub contract_address: Felt,
    #[serde(with = "serde_felt")]
    pub entry_point_selector: Felt,
    #[serde(with = "serde_felt::vec")]
    pub calldata: Vec<Felt>,
}

/// Call Descriptor: one unsigned contract call, built once and consumed by
/// the submitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub to: Felt,
    pub selector: Felt,
    pub calldata: Vec<Felt>,
    /// Method name the selector was derived from, kept for logging.
    pub method: String,
}

/// Gas limits of one resource in a v3 transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceBounds {
    pub max_amount: u64,
    pub max_price_per_unit: u128,
}

impl ResourceBounds {
    pub fn to_json(&self) -> Value {
        json!({
            "max_amount": format!("{:#x}", self.max_amount),
            "max_price_per_unit": format!("{:#x}", self.max_price_per_unit),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceBoundsMapping {
    pub l1_gas: ResourceBounds,
    pub l1_data_gas: ResourceBounds,
    pub l2_gas: ResourceBounds,
}

impl Default for ResourceBoundsMapping {
    fn default() -> Self {
        Self {
            l1_gas: ResourceBounds {
                max_amount: 0,
                max_price_per_unit: 100_000_000_000_000,
            },
            l1_data_gas: ResourceBounds {
                max_amount: 2_000,
                max_price_per_unit: 100_000_000_000,
            },
            l2_gas: ResourceBounds {
                max_amount: 20_000_000,
                max_price_per_unit: 20_000_000_000,
            },
        }
    }
}

impl ResourceBoundsMapping {
    pub fn to_json(&self) -> Value {
        json!({
            "l1_gas": self.l1_gas.to_json(),
            "l1_data_gas": self.l1_data_gas.to_json(),
            "l2_gas": self.l2_gas.to_json(),
        })
    }
}

/// Invoke transaction flavour. V3 pays fees in STRK under explicit resource
/// bounds, V1 pays in ETH up to `max_fee`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionVersion {
    V1 { max_fee: Felt },
    V3 {
        resource_bounds: ResourceBoundsMapping,
        tip: u64,
    },
}

impl TransactionVersion {
    pub fn number(&self) -> u8 {
        match self {
            TransactionVersion::V1 { .. } => 1,
            TransactionVersion::V3 { .. } => 3,
        }
    }
}

impl Default for TransactionVersion {
    fn default() -> Self {
        TransactionVersion::V3 {
            resource_bounds: ResourceBoundsMapping::default(),
            tip: 0,
        }
    }
}

/// A signed invoke transaction, ready for `starknet_addInvokeTransaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastedInvokeTransaction {
    pub sender_address: Felt,
    pub calldata: Vec<Felt>,
    pub signature: Vec<Felt>,
    pub nonce: Felt,
    pub version: TransactionVersion,
}

impl BroadcastedInvokeTransaction {
    pub fn to_json(&self) -> Value {
        let hex_list = |felts: &[Felt]| felts.iter().map(felt_to_hex).collect::<Vec<_>>();

        match &self.version {
            TransactionVersion::V1 { max_fee } => json!({
                "type": "INVOKE",
                "version": "0x1",
                "sender_address": felt_to_hex(&self.sender_address),
                "calldata": hex_list(&self.calldata),
                "signature": hex_list(&self.signature),
                "nonce": felt_to_hex(&self.nonce),
                "max_fee": felt_to_hex(max_fee),
            }),
            TransactionVersion::V3 {
                resource_bounds,
                tip,
            } => json!({
                "type": "INVOKE",
                "version": "0x3",
                "sender_address": felt_to_hex(&self.sender_address),
                "calldata": hex_list(&self.calldata),
                "signature": hex_list(&self.signature),
                "nonce": felt_to_hex(&self.nonce),
                "resource_bounds": resource_bounds.to_json(),
                "tip": format!("{:#x}", tip),
                "paymaster_data": [],
                "account_deployment_data": [],
                "nonce_data_availability_mode": "L1",
                "fee_data_availability_mode": "L1",
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    Succeeded,
    Reverted,
}

/// Finality as reported by `starknet_getTransactionStatus`. Statuses this
/// crate does not know are kept verbatim and treated as still pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalityStatus {
    Received,
    Candidate,
    PreConfirmed,
    AcceptedOnL2,
    AcceptedOnL1,
    Rejected,
    Other(String),
}

impl FinalityStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FinalityStatus::AcceptedOnL2 | FinalityStatus::AcceptedOnL1 | FinalityStatus::Rejected
        )
    }
}

impl FromStr for FinalityStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "RECEIVED" => FinalityStatus::Received,
            "CANDIDATE" => FinalityStatus::Candidate,
            "PRE_CONFIRMED" => FinalityStatus::PreConfirmed,
            "ACCEPTED_ON_L2" => FinalityStatus::AcceptedOnL2,
            "ACCEPTED_ON_L1" => FinalityStatus::AcceptedOnL1,
            "REJECTED" => FinalityStatus::Rejected,
            other => FinalityStatus::Other(other.to_string()),
        })
    }
}

impl fmt::Display for FinalityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FinalityStatus::Received => "RECEIVED",
            FinalityStatus::Candidate => "CANDIDATE",
            FinalityStatus::PreConfirmed => "PRE_CONFIRMED",
            FinalityStatus::AcceptedOnL2 => "ACCEPTED_ON_L2",
            FinalityStatus::AcceptedOnL1 => "ACCEPTED_ON_L1",
            FinalityStatus::Rejected => "REJECTED",
            FinalityStatus::Other(other) => other,
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionStatus {
    pub finality_status: FinalityStatus,
    pub execution_status: Option<ExecutionStatus>,
    pub failure_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeePayment {
    #[serde(with = "serde_felt")]
    pub amount: Felt,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(with = "serde_felt")]
    pub from_address: Felt,
    #[serde(with = "serde_felt::vec")]
    pub keys: Vec<Felt>,
    #[serde(with = "serde_felt::vec")]
    pub data: Vec<Felt>,
}

/// Receipt of a transaction that reached a terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    #[serde(with = "serde_felt")]
    pub transaction_hash: Felt,
    pub execution_status: ExecutionStatus,
    pub finality_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revert_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_fee: Option<FeePayment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct InvokeTransactionResult {
    #[serde(with = "serde_felt")]
    pub transaction_hash: Felt,
}
