//! Composite block validation.
//!
//! Order of checks:
//!
//! 1. `hash`, `previous_hash` and `merkle_root` are non-empty.
//! 2. `kawpow_mix_hash` and `kawpow_header_hash` are both empty or both set.
//! 3. Merkle root (accepted unconditionally unless enforcement is enabled).
//! 4. Every transaction reports itself valid.
//! 5. `now - timestamp <= max_timestamp_age_secs`. Future timestamps pass.
//! 6. When both PoW fields are set: the proof verifies and the hash meets
//!    the difficulty target. When both are empty the PoW check is skipped.
//!
//! The first failing check decides the [`BlockRejection`]; `is_valid` only
//! reports whether there was one.

use serde::{Deserialize, Serialize};
use satox_crypto::merkle::merkle_root;
use satox_crypto::{Digest, Sha256Digest};
use satox_pow::EpochStore;

use crate::block::Block;
use crate::transaction::Transaction;
use crate::unix_now;

/// Default maximum block age accepted by the timestamp check.
pub const DEFAULT_MAX_TIMESTAMP_AGE_SECS: i64 = 7200;

/// Block validation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Oldest accepted timestamp, in seconds before now.
    #[serde(default = "default_max_timestamp_age")]
    pub max_timestamp_age_secs: i64,
    /// Compare `merkle_root` against the transactions.
    #[serde(default)]
    pub enforce_merkle_root: bool,
}

fn default_max_timestamp_age() -> i64 {
    DEFAULT_MAX_TIMESTAMP_AGE_SECS
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_timestamp_age_secs: default_max_timestamp_age(),
            enforce_merkle_root: false,
        }
    }
}

/// Why a block was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BlockRejection {
    #[error("hash, previous_hash or merkle_root is empty")]
    MissingField,
    #[error("only one of kawpow_mix_hash and kawpow_header_hash is set")]
    AsymmetricKawpowFields,
    #[error("merkle root does not match transactions")]
    MerkleRootMismatch,
    #[error("transaction {index} is invalid")]
    InvalidTransaction {
        /// Position in the block.
        index: usize,
    },
    #[error("timestamp too old")]
    StaleTimestamp,
    #[error("kawpow proof invalid")]
    InvalidProof,
}

impl<T: Transaction> Block<T> {
    /// Validate against the global store, the default config and the
    /// current wall clock.
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(unix_now())
    }

    /// [`is_valid`](Self::is_valid) with an explicit clock.
    pub fn is_valid_at(&self, now: i64) -> bool {
        self.is_valid_with(EpochStore::global(), &ValidationConfig::default(), now)
    }

    /// Validate with an explicit store, config and clock.
    pub fn is_valid_with(&self, store: &EpochStore, config: &ValidationConfig, now: i64) -> bool {
        match self.check(store, config, now) {
            Ok(()) => true,
            Err(reason) => {
                tracing::debug!(height = self.height, hash = %self.hash, %reason, "block: rejected");
                false
            }
        }
    }

    /// Run every check and report the first failure.
    pub fn check(
        &self,
        store: &EpochStore,
        config: &ValidationConfig,
        now: i64,
    ) -> std::result::Result<(), BlockRejection> {
        if self.hash.is_empty() || self.previous_hash.is_empty() || self.merkle_root.is_empty() {
            return Err(BlockRejection::MissingField);
        }
        if self.kawpow_mix_hash.is_empty() != self.kawpow_header_hash.is_empty() {
            return Err(BlockRejection::AsymmetricKawpowFields);
        }
        if !self.verify_merkle_root(config) {
            return Err(BlockRejection::MerkleRootMismatch);
        }
        if let Some(index) = self.first_invalid_transaction() {
            return Err(BlockRejection::InvalidTransaction { index });
        }
        if !self.verify_timestamp(now, config.max_timestamp_age_secs) {
            return Err(BlockRejection::StaleTimestamp);
        }
        if self.has_kawpow_fields() && !self.verify_kawpow_with(store) {
            return Err(BlockRejection::InvalidProof);
        }
        Ok(())
    }

    /// Merkle root over the transaction ids, as lowercase hex.
    ///
    /// Each leaf is the SHA-256 of the txid string.
    pub fn compute_merkle_root(&self) -> String {
        let leaves: Vec<[u8; 32]> = self
            .transactions
            .iter()
            .map(|tx| Sha256Digest.digest(tx.txid().as_bytes()))
            .collect();
        hex::encode(merkle_root(&Sha256Digest, &leaves))
    }

    /// Merkle root check. Always passes unless `enforce_merkle_root` is set.
    pub fn verify_merkle_root(&self, config: &ValidationConfig) -> bool {
        if !config.enforce_merkle_root {
            return true;
        }
        self.merkle_root.eq_ignore_ascii_case(&self.compute_merkle_root())
    }

    /// Whether every transaction reports itself valid.
    pub fn verify_transactions(&self) -> bool {
        self.first_invalid_transaction().is_none()
    }

    /// Whether the block is at most `max_age_secs` older than `now`.
    pub fn verify_timestamp(&self, now: i64, max_age_secs: i64) -> bool {
        i128::from(now) - i128::from(self.timestamp) <= i128::from(max_age_secs)
    }

    fn first_invalid_transaction(&self) -> Option<usize> {
        self.transactions.iter().position(|tx| !tx.is_valid())
    }
}
