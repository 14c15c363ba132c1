use alloy_primitives::{U256, keccak256};

use crate::{
    error::{Error, Result},
    types::Felt,
};

// Short strings pack at most 31 ASCII bytes into a single felt
pub const SHORT_STRING_MAX_LEN: usize = 31;

/// Parses a `0x`-prefixed hex felt, or a decimal one when there is no prefix.
pub fn felt_from_str(value: &str) -> Result<Felt> {
    let value = value.trim();
    let hex_digits = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X"));

    // The field parsers read an empty digit string as zero
    if hex_digits.unwrap_or(value).is_empty() {
        return Err(Error::invalid_argument(format!(
            "'{}' is not a valid felt: no digits",
            value
        )));
    }

    let parsed = match hex_digits {
        Some(digits) => Felt::from_hex_be(digits),
        None => Felt::from_dec_str(value),
    };

    parsed.map_err(|e| Error::invalid_argument(format!("'{}' is not a valid felt: {}", value, e)))
}

pub fn felt_to_hex(felt: &Felt) -> String {
    format!("{:#x}", felt)
}

/// Same as `felt_to_hex` but zero padded to 64 nibbles, the usual way
/// addresses are printed.
pub fn felt_to_padded_hex(felt: &Felt) -> String {
    format!("{:#066x}", felt)
}

pub fn felt_to_u256(felt: &Felt) -> U256 {
    U256::from_be_bytes(felt.to_bytes_be())
}

pub fn felt_from_u128(value: u128) -> Felt {
    let mut bytes = [0u8; 32];
    bytes[16..].copy_from_slice(&value.to_be_bytes());
    // Any 128-bit value is below the field modulus
    Felt::from_bytes_be(&bytes).unwrap_or(Felt::ZERO)
}

pub fn felt_to_u128(felt: &Felt) -> Result<u128> {
    let bytes = felt.to_bytes_be();
    let (high, low) = bytes.split_at(16);

    if high.iter().any(|b| *b != 0) {
        return Err(Error::invalid_argument(format!(
            "{:#x} does not fit in 128 bits",
            felt
        )));
    }

    let mut buf = [0u8; 16];
    buf.copy_from_slice(low);
    Ok(u128::from_be_bytes(buf))
}

/// Computes the entry point selector of a function name: keccak256 truncated
/// to 250 bits.
pub fn selector_from_name(name: &str) -> Result<Felt> {
    let mut hash = keccak256(name.as_bytes()).0;
    hash[0] &= 0x03;

    Felt::from_bytes_be(&hash)
        .map_err(|_| Error::invalid_argument(format!("selector of '{}' is out of range", name)))
}

/// Packs an ASCII string of at most 31 bytes into a felt.
pub fn short_string_to_felt(value: &str) -> Result<Felt> {
    if !value.is_ascii() {
        return Err(Error::invalid_argument(format!(
            "short string '{}' must be ASCII",
            value
        )));
    }

    if value.len() > SHORT_STRING_MAX_LEN {
        return Err(Error::invalid_argument(format!(
            "short string '{}' is longer than {} bytes",
            value, SHORT_STRING_MAX_LEN
        )));
    }

    Felt::from_byte_slice_be(value.as_bytes())
        .map_err(|_| Error::invalid_argument(format!("cannot pack '{}' into a felt", value)))
}

/// Reads a felt back as a short string. Returns `None` when the bytes are not
/// printable ASCII, which usually means the felt is a number.
pub fn felt_to_short_string(felt: &Felt) -> Option<String> {
    let bytes = felt.to_bytes_be();
    let start = bytes.iter().position(|b| *b != 0)?;
    let text = &bytes[start..];

    if text.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
        Some(String::from_utf8_lossy(text).into_owned())
    } else {
        None
    }
}

/// Serde adapters so that felts travel as `0x` strings in JSON-RPC payloads.
pub mod serde_felt {
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    use super::{felt_from_str, felt_to_hex};
    use crate::types::Felt;

    pub fn serialize<S: Serializer>(felt: &Felt, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&felt_to_hex(felt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Felt, D::Error> {
        let raw = String::deserialize(deserializer)?;
        felt_from_str(&raw).map_err(D::Error::custom)
    }

    pub mod vec {
        use serde::{Deserialize, Deserializer, Serializer, de::Error as _, ser::SerializeSeq};

        use super::super::{felt_from_str, felt_to_hex};
        use crate::types::Felt;

        pub fn serialize<S: Serializer>(felts: &[Felt], serializer: S) -> Result<S::Ok, S::Error> {
            let mut seq = serializer.serialize_seq(Some(felts.len()))?;
            for felt in felts {
                seq.serialize_element(&felt_to_hex(felt))?;
            }
            seq.end()
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Vec<Felt>, D::Error> {
            let raw = Vec::<String>::deserialize(deserializer)?;
            raw.iter()
                .map(|value| felt_from_str(value).map_err(D::Error::custom))
                .collect()
        }
    }
}
