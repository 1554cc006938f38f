//! # satox-pow
//!
//! Memory-hard Proof-of-Work for the Satox chain (KawPoW-style).
//!
//! Every epoch owns a pseudo-random cache and a larger dataset derived from it.
//! A hash is computed by mixing dataset items selected by the running mix
//! state, so computing one is expensive without the dataset while verifying
//! one is cheap once the dataset is resident.
//!
//! ## Modules
//!
//! - [`params`] — Consensus parameter table and epoch sizing
//! - [`index`] — Modular index helpers for cache and dataset addressing
//! - [`generate`] — Cache and dataset generation
//! - [`hashimoto`] — Seed, mix and final hash computation
//! - [`target`] — Difficulty to target mapping and comparison
//! - [`engine`] — Per-instance engine owning its own buffers
//! - [`store`] — Process-wide epoch store shared across verifier threads
//! - [`search`] — Parallel nonce search over a shared epoch

pub mod engine;
pub mod generate;
pub mod hashimoto;
pub mod index;
pub mod params;
pub mod search;
pub mod store;
pub mod target;

pub use engine::PowEngine;
pub use hashimoto::PowOutput;
pub use params::PowParams;
pub use search::{search_nonce, Solution};
pub use store::{EpochData, EpochStore};
pub use target::{difficulty_to_target, meets_target, Target};

/// Error types for Proof-of-Work operations.
#[derive(Debug, thiserror::Error)]
pub enum PowError {
    /// The header passed to the hash function has the wrong length.
    #[error("invalid header length: expected {expected}, got {actual}")]
    InvalidHeaderLength {
        /// Expected header length.
        expected: usize,
        /// Actual header length.
        actual: usize,
    },

    /// The supplied mix hash has the wrong length.
    #[error("invalid mix hash length: expected {expected}, got {actual}")]
    InvalidMixHashLength {
        /// Expected mix hash length.
        expected: usize,
        /// Actual mix hash length.
        actual: usize,
    },

    /// The parameter table is not usable.
    #[error("invalid pow parameters: {0}")]
    InvalidParams(String),

    /// Cache or dataset size for the epoch does not fit in 128 bits.
    #[error("cache size overflow at epoch {epoch}")]
    SizeOverflow {
        /// Epoch whose size overflowed.
        epoch: u64,
    },

    /// A cache or dataset buffer could not be allocated.
    #[error("failed to allocate {bytes} bytes")]
    Allocation {
        /// Requested buffer size.
        bytes: u128,
    },

    /// Dataset generation was requested before the cache for its epoch.
    #[error("cache not initialized for epoch {epoch}")]
    CacheNotReady {
        /// Epoch the dataset was requested for.
        epoch: u64,
    },

    /// Generation was aborted by shutdown.
    #[error("generation cancelled")]
    Cancelled,
}

/// Convenience result type for PoW operations.
pub type Result<T> = std::result::Result<T, PowError>;
