//! PoW checks on a block.
//!
//! The PoW header is the first 32 bytes of the block hash and the claimed mix
//! hash is the first 64 bytes of `kawpow_mix_hash`; longer strings contribute
//! only their prefix. The epoch is taken from the block height.
//!
//! Every `*_with` method takes the [`EpochStore`] to hash against; the plain
//! variants use the process-wide mainnet store.

use satox_pow::hashimoto::check_output;
use satox_pow::params::{HEADER_BYTES, MIX_BYTES};
use satox_pow::{difficulty_to_target, meets_target, EpochStore, PowOutput, Target};

use crate::block::Block;
use crate::transaction::Transaction;
use crate::{ChainError, Result};

/// Decode the first `N` bytes of a hex field.
pub fn decode_hex_prefix<const N: usize>(field: &'static str, hex_str: &str) -> Result<[u8; N]> {
    let prefix = hex_str
        .get(..N * 2)
        .ok_or(ChainError::FieldTooShort {
            field,
            expected: N * 2,
            actual: hex_str.len(),
        })?;
    let mut out = [0u8; N];
    hex::decode_to_slice(prefix, &mut out).map_err(|e| ChainError::InvalidHex {
        field,
        reason: e.to_string(),
    })?;
    Ok(out)
}

impl<T: Transaction> Block<T> {
    /// PoW header bytes from `hash`.
    pub fn header_bytes(&self) -> Result<[u8; HEADER_BYTES]> {
        decode_hex_prefix("hash", &self.hash)
    }

    /// Claimed mix hash bytes from `kawpow_mix_hash`.
    pub fn mix_hash_bytes(&self) -> Result<[u8; MIX_BYTES]> {
        decode_hex_prefix("kawpow_mix_hash", &self.kawpow_mix_hash)
    }

    /// Target derived from `difficulty`.
    pub fn target(&self) -> Target {
        difficulty_to_target(self.difficulty)
    }

    /// Recompute this block's PoW output.
    pub fn kawpow_output_with(&self, store: &EpochStore) -> Result<PowOutput> {
        let header = self.header_bytes()?;
        Ok(store.compute_hash(&header, self.nonce, self.height)?)
    }

    /// Check the claimed mix hash and the target against a recomputation.
    pub fn try_validate_kawpow_proof_with(&self, store: &EpochStore) -> Result<bool> {
        let header = self.header_bytes()?;
        let mix_hash = self.mix_hash_bytes()?;
        Ok(store.try_verify_hash(&header, self.nonce, self.height, &mix_hash, &self.target())?)
    }

    /// [`try_validate_kawpow_proof_with`](Self::try_validate_kawpow_proof_with),
    /// failing closed on any error.
    pub fn validate_kawpow_proof_with(&self, store: &EpochStore) -> bool {
        self.try_validate_kawpow_proof_with(store)
            .unwrap_or_else(|e| {
                tracing::debug!(height = self.height, error = %e, "block: pow proof rejected");
                false
            })
    }

    /// Whether the recomputed hash is below the difficulty target.
    pub fn verify_kawpow_difficulty_with(&self, store: &EpochStore) -> bool {
        match self.kawpow_output_with(store) {
            Ok(output) => meets_target(&output.hash, &self.target()),
            Err(e) => {
                tracing::debug!(height = self.height, error = %e, "block: difficulty check failed");
                false
            }
        }
    }

    /// Proof and difficulty checks on a single recomputation. Agrees with
    /// `validate_kawpow_proof_with(store) && verify_kawpow_difficulty_with(store)`.
    pub fn verify_kawpow_with(&self, store: &EpochStore) -> bool {
        let verdict = self.mix_hash_bytes().and_then(|mix_hash| {
            let output = self.kawpow_output_with(store)?;
            Ok(check_output(&output, &mix_hash, &self.target()))
        });
        verdict.unwrap_or_else(|e| {
            tracing::debug!(height = self.height, error = %e, "block: pow proof rejected");
            false
        })
    }

    /// Hex of the recomputed final hash, or an empty string on failure.
    pub fn calculate_kawpow_header_hash_with(&self, store: &EpochStore) -> String {
        self.kawpow_output_with(store)
            .map(|o| o.hash_hex())
            .unwrap_or_default()
    }

    /// Hex of the recomputed mix hash, or an empty string on failure.
    pub fn calculate_kawpow_mix_hash_with(&self, store: &EpochStore) -> String {
        self.kawpow_output_with(store)
            .map(|o| o.mix_hash_hex())
            .unwrap_or_default()
    }

    /// [`validate_kawpow_proof_with`](Self::validate_kawpow_proof_with) on the global store.
    pub fn validate_kawpow_proof(&self) -> bool {
        self.validate_kawpow_proof_with(EpochStore::global())
    }

    /// [`verify_kawpow_difficulty_with`](Self::verify_kawpow_difficulty_with) on the global store.
    pub fn verify_kawpow_difficulty(&self) -> bool {
        self.verify_kawpow_difficulty_with(EpochStore::global())
    }

    /// [`calculate_kawpow_header_hash_with`](Self::calculate_kawpow_header_hash_with) on the global store.
    pub fn calculate_kawpow_header_hash(&self) -> String {
        self.calculate_kawpow_header_hash_with(EpochStore::global())
    }

    /// [`calculate_kawpow_mix_hash_with`](Self::calculate_kawpow_mix_hash_with) on the global store.
    pub fn calculate_kawpow_mix_hash(&self) -> String {
        self.calculate_kawpow_mix_hash_with(EpochStore::global())
    }
}
