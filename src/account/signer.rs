use std::fmt;

use starknet_crypto::{get_public_key, rfc6979_generate_k, sign};

use crate::{
    basic_elements::felt::felt_from_str,
    error::{Error, Result},
    types::Felt,
};

/// Stark curve private key of the account.
#[derive(Clone)]
pub struct SigningKey {
    secret: Felt,
}

// Never print the secret
impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("public_key", &format_args!("{:#x}", self.public_key()))
            .finish()
    }
}

impl SigningKey {
    pub fn from_secret(secret: Felt) -> Result<Self> {
        if secret == Felt::ZERO {
            return Err(Error::invalid_argument("private key must not be zero"));
        }

        Ok(Self { secret })
    }

    /// Parses a `0x` hex (or decimal) private key.
    pub fn from_string(s: &str) -> Result<Self> {
        let secret = felt_from_str(s)
            .map_err(|_| Error::invalid_argument("private key is not a valid felt"))?;

        Self::from_secret(secret)
    }

    pub fn public_key(&self) -> Felt {
        get_public_key(&self.secret)
    }

    /// Signs a transaction hash, returning the `[r, s]` pair sent along with
    /// the transaction. The nonce `k` is derived deterministically (RFC 6979).
    pub fn sign(&self, hash: &Felt) -> Result<[Felt; 2]> {
        let k = rfc6979_generate_k(hash, &self.secret, None);

        let signature = sign(&self.secret, hash, &k)
            .map_err(|e| Error::invalid_argument(format!("cannot sign {:#x}: {:?}", hash, e)))?;

        Ok([signature.r, signature.s])
    }
}
