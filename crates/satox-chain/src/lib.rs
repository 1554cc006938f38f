//! # satox-chain
//!
//! Block entity and block-level validation for the Satox chain.
//!
//! A [`Block`] carries chain linkage, transactions and the proof-of-work
//! fields checked by [`satox_pow`]. Validation folds structural checks, the
//! PoW proof, the Merkle root, transaction validity and the timestamp window
//! into one verdict and never panics or returns an error across its boundary.
//!
//! ## Modules
//!
//! - [`block`] — Block entity and JSON round-trip
//! - [`builder`] — Block builder and sealing
//! - [`pow`] — Hex to byte conversion and PoW checks on a block
//! - [`transaction`] — Transaction collaborator contract
//! - [`validation`] — Composite validation and its configuration

pub mod block;
pub mod builder;
pub mod pow;
pub mod transaction;
pub mod validation;

pub use block::Block;
pub use builder::BlockBuilder;
pub use transaction::{Transaction, TransactionRecord};
pub use validation::{BlockRejection, ValidationConfig};

/// Error types for block operations.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// A hex field could not be decoded.
    #[error("invalid hex in {field}: {reason}")]
    InvalidHex {
        /// Field name.
        field: &'static str,
        /// Decoder message.
        reason: String,
    },

    /// A hex field is shorter than the bytes it must provide.
    #[error("{field} too short: need {expected} hex chars, got {actual}")]
    FieldTooShort {
        /// Field name.
        field: &'static str,
        /// Required hex length.
        expected: usize,
        /// Actual hex length.
        actual: usize,
    },

    /// JSON encoding or decoding failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The PoW engine failed.
    #[error("pow error: {0}")]
    Pow(#[from] satox_pow::PowError),

    /// Sealing exhausted its nonce budget.
    #[error("no nonce found in {attempts} attempts")]
    NonceNotFound {
        /// Nonces tried.
        attempts: u64,
    },
}

/// Convenience result type for block operations.
pub type Result<T> = std::result::Result<T, ChainError>;

/// Current wall-clock time in Unix seconds.
pub fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
