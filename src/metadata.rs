use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Token id to metadata URI lookup used when minting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetadataMap(BTreeMap<u64, String>);

impl TokenMetadataMap {
    pub fn new(entries: impl IntoIterator<Item = (u64, String)>) -> Self {
        Self(entries.into_iter().collect())
    }

    pub fn get(&self, token_id: u64) -> Option<&str> {
        self.0.get(&token_id).map(String::as_str)
    }

    pub fn require(&self, token_id: u64) -> Result<&str> {
        self.get(token_id)
            .ok_or_else(|| Error::invalid_argument(format!("no metadata for token {}", token_id)))
    }

    pub fn token_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.0.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The six pieces of the deployed collection.
impl Default for TokenMetadataMap {
    fn default() -> Self {
        Self::new(
            [
                "ipfs://bafkreigjgrjetsnmsb4ouzu7o5i4jfuktrxu5egbxzhpntetwq2teq5pp4",
                "ipfs://bafkreiga3py5q645lxjggsvmaoi6w3252j7ekrwezcouwbvzk2wnmf4gaq",
                "ipfs://bafkreigobjksa7dsdn7kebcuc2eyhje564qhwea35tjbjoo2nz5vsj73le",
                "ipfs://bafkreif3q4uq4jvv6xk54xrkxtx6zdh7entphgkx2mxpkxughtsw7ssu3m",
                "ipfs://bafkreihlo2qz3uhk5udvyauc3h4yv7oy7yorkeytuykwbr3amamkx74rjq",
                "ipfs://bafkreibyhanh2vrkpvhjsc5ouh7cdh3ee4aldcjxvvqpfqq3fp4lrg6dbm",
            ]
            .into_iter()
            .zip(1u64..)
            .map(|(uri, token_id)| (token_id, uri.to_string())),
        )
    }
}
