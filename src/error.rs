use thiserror::Error;

use crate::types::Felt;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every failure the library can surface. Nothing is retried internally: the
/// first error aborts the running sequence and reaches the caller as-is.
#[derive(Debug, Error)]
pub enum Error {
    /// A required environment value is absent.
    #[error("missing configuration value `{0}`")]
    ConfigurationMissing(String),

    /// A configuration value is present but cannot be parsed.
    #[error("invalid configuration value `{key}`: {reason}")]
    InvalidConfiguration { key: String, reason: String },

    /// The contract interface could not be fetched or read.
    #[error("contract interface unavailable: {0}")]
    InterfaceUnavailable(String),

    /// Malformed or missing argument, reported before anything is dispatched.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The node could not be reached or sent something we could not parse.
    #[error("transport error: {0}")]
    Transport(String),

    /// The node answered with a JSON-RPC error object.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The transaction reached a terminal rejected or reverted state.
    #[error("transaction {transaction_hash:#x} failed: {reason}")]
    TransactionFailed {
        transaction_hash: Felt,
        reason: String,
    },

    /// The confirmation wait ran past its configured bound. The transaction
    /// may still be included later.
    #[error("gave up waiting for transaction {transaction_hash:#x}")]
    Timeout { transaction_hash: Felt },
}

impl Error {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub fn transport(err: impl std::fmt::Display) -> Self {
        Error::Transport(err.to_string())
    }

    /// JSON-RPC code 29, `TXN_HASH_NOT_FOUND`.
    pub fn is_transaction_not_found(&self) -> bool {
        matches!(self, Error::Rpc { code: 29, .. })
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.to_string())
    }
}
