use alloy_primitives::U256;

use crate::{
    error::{Error, Result},
    types::Felt,
};

use super::{
    amount::{u256_from_low_high, u256_to_low_high},
    felt::{SHORT_STRING_MAX_LEN, felt_from_u128, felt_to_u128},
};

pub const DEFAULT_OFFSET: usize = 0;
// ByteArray words hold 31 bytes each
pub const BYTES31_LEN: usize = SHORT_STRING_MAX_LEN;

/// Ordered felt buffer used both to build call arguments (`add_*`) and to
/// read call results back (`next_*`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Calldata {
    felts: Vec<Felt>,
    offset: usize, // For deserialization
}

impl Calldata {
    pub fn new() -> Self {
        Self {
            felts: Vec::new(),
            offset: DEFAULT_OFFSET,
        }
    }

    /// Wraps felts returned by the node, ready for reading.
    pub fn from_felts(felts: Vec<Felt>) -> Self {
        Self {
            felts,
            offset: DEFAULT_OFFSET,
        }
    }

    pub fn get_offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.felts.len() - self.offset
    }

    pub fn as_slice(&self) -> &[Felt] {
        &self.felts
    }

    pub fn into_felts(self) -> Vec<Felt> {
        self.felts
    }

    /// Reads `len` felts from the current offset and advances past them.
    fn read_felts(&mut self, len: usize) -> Result<&[Felt]> {
        let current_offset = self.offset;
        let end_offset = current_offset.checked_add(len).ok_or_else(|| {
            Error::invalid_argument(format!(
                "offset overflow while reading {} felts from offset {}",
                len, current_offset
            ))
        })?;

        if end_offset > self.felts.len() {
            return Err(Error::invalid_argument(format!(
                "not enough felts: wanted {} from offset {}, but only {} are available",
                len,
                current_offset,
                self.felts.len()
            )));
        }

        self.offset = end_offset;
        Ok(&self.felts[current_offset..end_offset])
    }

    // --- Deserialization Methods (`next*`) ---

    pub fn next_felt(&mut self) -> Result<Felt> {
        Ok(self.read_felts(1)?[0])
    }

    pub fn next_u128(&mut self) -> Result<u128> {
        let felt = self.next_felt()?;
        felt_to_u128(&felt)
    }

    pub fn next_bool(&mut self) -> Result<bool> {
        let felt = self.next_felt()?;
        if felt == Felt::ZERO {
            Ok(false)
        } else if felt == Felt::ONE {
            Ok(true)
        } else {
            Err(Error::invalid_argument(format!(
                "{:#x} is not a boolean",
                felt
            )))
        }
    }

    /// Reads a `u256` stored as its (low, high) 128-bit halves.
    pub fn next_u256(&mut self) -> Result<U256> {
        let low = self.next_u128()?;
        let high = self.next_u128()?;
        Ok(u256_from_low_high(low, high))
    }

    /// Reads a Cairo `ByteArray`: word count, 31-byte words, pending word and
    /// its length.
    pub fn next_byte_array(&mut self) -> Result<String> {
        let words_len = usize::try_from(self.next_u128()?)
            .map_err(|_| Error::invalid_argument("ByteArray word count overflows usize"))?;

        let mut bytes = Vec::with_capacity(words_len.min(self.remaining()) * BYTES31_LEN);
        for word in self.read_felts(words_len)? {
            let be = word.to_bytes_be();
            bytes.extend_from_slice(&be[be.len() - BYTES31_LEN..]);
        }

        let pending_word = self.next_felt()?;
        let pending_len = usize::try_from(self.next_u128()?)
            .map_err(|_| Error::invalid_argument("ByteArray pending length overflows usize"))?;
        if pending_len >= BYTES31_LEN {
            return Err(Error::invalid_argument(format!(
                "ByteArray pending word length {} must be below {}",
                pending_len, BYTES31_LEN
            )));
        }

        let be = pending_word.to_bytes_be();
        bytes.extend_from_slice(&be[be.len() - pending_len..]);

        String::from_utf8(bytes)
            .map_err(|e| Error::invalid_argument(format!("ByteArray is not valid UTF-8: {}", e)))
    }

    // --- Serialization Methods (`add*`) ---

    pub fn add_felt(&mut self, value: Felt) -> &mut Self {
        self.felts.push(value);
        self
    }

    pub fn add_felts(&mut self, values: &[Felt]) -> &mut Self {
        self.felts.extend_from_slice(values);
        self
    }

    pub fn add_u128(&mut self, value: u128) -> &mut Self {
        self.add_felt(felt_from_u128(value))
    }

    pub fn add_bool(&mut self, value: bool) -> &mut Self {
        self.add_felt(if value { Felt::ONE } else { Felt::ZERO })
    }

    /// Adds a `u256` as (low, high).
    pub fn add_u256(&mut self, value: U256) -> &mut Self {
        let (low, high) = u256_to_low_high(value);
        self.add_u128(low).add_u128(high)
    }

    /// Adds a Cairo `ByteArray` holding the UTF-8 bytes of `value`.
    pub fn add_byte_array(&mut self, value: &str) -> &mut Self {
        let bytes = value.as_bytes();
        let chunks = bytes.chunks_exact(BYTES31_LEN);
        let pending = chunks.remainder();

        self.add_felt(Felt::from(chunks.len() as u64));
        for chunk in chunks {
            self.add_felt(bytes_to_felt(chunk));
        }
        self.add_felt(bytes_to_felt(pending));
        self.add_felt(Felt::from(pending.len() as u64))
    }

    /// Adds a length-prefixed felt array (`Array<felt252>` / `Span<felt252>`).
    pub fn add_felt_array(&mut self, values: &[Felt]) -> &mut Self {
        self.add_felt(Felt::from(values.len() as u64));
        self.add_felts(values)
    }
}

// At most 31 bytes, so the value is always below the field modulus
fn bytes_to_felt(bytes: &[u8]) -> Felt {
    let base = Felt::from(256u64);
    bytes
        .iter()
        .fold(Felt::ZERO, |acc, byte| acc * base + Felt::from(*byte))
}
