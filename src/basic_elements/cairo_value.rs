use std::fmt;

use alloy_primitives::U256;

use crate::{
    error::{Error, Result},
    types::Felt,
};

use super::{
    calldata::Calldata,
    felt::{felt_to_hex, felt_to_padded_hex, felt_to_short_string},
};

/// The ABI types this crate knows how to encode and decode. Names are matched
/// with and without their `core::` path so both Cairo 1 and legacy ABIs work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CairoType {
    Felt,
    Bool,
    Uint(u16),
    U256,
    ContractAddress,
    ClassHash,
    ByteArray,
}

impl CairoType {
    pub fn parse(type_name: &str) -> Result<Self> {
        let short = type_name.rsplit("::").next().unwrap_or(type_name);

        let parsed = match short {
            "felt252" | "felt" => CairoType::Felt,
            "bool" => CairoType::Bool,
            "u8" => CairoType::Uint(8),
            "u16" => CairoType::Uint(16),
            "u32" => CairoType::Uint(32),
            "u64" => CairoType::Uint(64),
            "u128" => CairoType::Uint(128),
            "u256" | "Uint256" => CairoType::U256,
            "ContractAddress" => CairoType::ContractAddress,
            "ClassHash" => CairoType::ClassHash,
            "ByteArray" => CairoType::ByteArray,
            _ => {
                return Err(Error::invalid_argument(format!(
                    "unsupported ABI type '{}'",
                    type_name
                )));
            }
        };

        Ok(parsed)
    }

    pub fn decode(&self, calldata: &mut Calldata) -> Result<CairoValue> {
        let value = match self {
            CairoType::Felt => CairoValue::Felt(calldata.next_felt()?),
            CairoType::Bool => CairoValue::Bool(calldata.next_bool()?),
            CairoType::Uint(bits) => {
                let value = calldata.next_u128()?;
                if *bits < 128 && (value >> *bits) != 0 {
                    return Err(Error::invalid_argument(format!(
                        "{} does not fit in u{}",
                        value, bits
                    )));
                }
                CairoValue::Uint(value)
            }
            CairoType::U256 => CairoValue::U256(calldata.next_u256()?),
            CairoType::ContractAddress | CairoType::ClassHash => {
                CairoValue::Address(calldata.next_felt()?)
            }
            CairoType::ByteArray => CairoValue::ByteArray(calldata.next_byte_array()?),
        };

        Ok(value)
    }

    /// Appends `value` to `calldata`, failing when the value does not match
    /// this type.
    pub fn encode(&self, value: &CairoValue, calldata: &mut Calldata) -> Result<()> {
        match (self, value) {
            (CairoType::Felt, CairoValue::Felt(felt)) => {
                calldata.add_felt(*felt);
            }
            (CairoType::Bool, CairoValue::Bool(flag)) => {
                calldata.add_bool(*flag);
            }
            (CairoType::Uint(bits), CairoValue::Uint(value)) => {
                if *bits < 128 && (value >> *bits) != 0 {
                    return Err(Error::invalid_argument(format!(
                        "{} does not fit in u{}",
                        value, bits
                    )));
                }
                calldata.add_u128(*value);
            }
            (CairoType::U256, CairoValue::U256(value)) => {
                calldata.add_u256(*value);
            }
            (CairoType::U256, CairoValue::Uint(value)) => {
                calldata.add_u256(U256::from(*value));
            }
            (CairoType::ContractAddress | CairoType::ClassHash, CairoValue::Address(felt))
            | (CairoType::ContractAddress | CairoType::ClassHash, CairoValue::Felt(felt)) => {
                calldata.add_felt(*felt);
            }
            (CairoType::ByteArray, CairoValue::ByteArray(text)) => {
                calldata.add_byte_array(text);
            }
            (expected, got) => {
                return Err(Error::invalid_argument(format!(
                    "expected a {:?} argument, got {:?}",
                    expected, got
                )));
            }
        }

        Ok(())
    }
}

/// A decoded (or to-be-encoded) Cairo value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CairoValue {
    Felt(Felt),
    Bool(bool),
    Uint(u128),
    U256(U256),
    Address(Felt),
    ByteArray(String),
}

impl CairoValue {
    /// Numeric view of the value, `u256` wide.
    pub fn as_u256(&self) -> Option<U256> {
        match self {
            CairoValue::U256(value) => Some(*value),
            CairoValue::Uint(value) => Some(U256::from(*value)),
            CairoValue::Felt(felt) => Some(super::felt::felt_to_u256(felt)),
            _ => None,
        }
    }

    /// Textual view: a `ByteArray`, or a felt holding a short string.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CairoValue::ByteArray(text) => Some(text.clone()),
            CairoValue::Felt(felt) => felt_to_short_string(felt),
            _ => None,
        }
    }
}

impl fmt::Display for CairoValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CairoValue::Felt(felt) => write!(f, "{}", felt_to_hex(felt)),
            CairoValue::Bool(flag) => write!(f, "{}", flag),
            CairoValue::Uint(value) => write!(f, "{}", value),
            CairoValue::U256(value) => write!(f, "{}", value),
            CairoValue::Address(felt) => write!(f, "{}", felt_to_padded_hex(felt)),
            CairoValue::ByteArray(text) => write!(f, "{}", text),
        }
    }
}
