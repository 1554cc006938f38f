//! Consensus parameter table.
//!
//! All values are fixed for a network and must be identical across
//! implementations. [`PowParams::MAINNET`] is the consensus table;
//! [`PowParams::REGTEST`] keeps the same algorithm with tiny buffers so that
//! tests and local chains can cross epochs in milliseconds.
//!
//! ## Mainnet parameters
//!
//! | Parameter            | Value    |
//! |----------------------|----------|
//! | Epoch length         | 7500     |
//! | Period length        | 3        |
//! | Cache mix rounds     | 2048     |
//! | Dataset parents      | 256      |
//! | Initial cache size   | 64 KiB   |
//! | Cache growth         | 4 KiB    |
//! | Accesses per hash    | 64       |

use serde::{Deserialize, Serialize};

use crate::{PowError, Result};

/// Blocks per epoch.
pub const EPOCH_LENGTH: u64 = 7500;

/// Blocks per period.
pub const PERIOD_LENGTH: u64 = 3;

/// Passes over the cache after it is filled from the sponge.
pub const CACHE_ROUNDS: u32 = 2048;

/// Cache items mixed into every dataset item. Also the dataset/cache size ratio.
pub const DATASET_PARENTS: u32 = 256;

/// Cache size at epoch 0, in bytes.
pub const CACHE_BYTES_INIT: u64 = 1 << 16;

/// Cache sizes are rounded up to a multiple of this. Must be a power of two.
pub const CACHE_BYTES_GROWTH: u64 = 1 << 12;

/// Dataset accesses per hash.
///
/// Even. When the access sequence settles into a two-item cycle the items
/// cancel pairwise and the mix collapses to the zero-extended seed; with the
/// mainnet dataset this happens for roughly 0.7% of nonces. Such hashes are
/// still valid but do not depend on the dataset. Changing the count is a
/// consensus change. See [`crate::hashimoto`].
pub const ACCESSES: u32 = 64;

/// Mix buffer size in bytes.
pub const MIX_BYTES: usize = 64;

/// Final hash size in bytes.
pub const HASH_BYTES: usize = 32;

/// Nonce size in bytes.
pub const NONCE_BYTES: usize = 8;

/// Header size in bytes.
pub const HEADER_BYTES: usize = 32;

/// Size of one cache slot or dataset item.
pub const ITEM_BYTES: usize = 64;

/// Size of one cache word.
pub const WORD_BYTES: usize = 8;

/// Size of the cache seed.
pub const SEED_BYTES: usize = 32;

/// A complete PoW parameter table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowParams {
    /// Blocks per epoch.
    pub epoch_length: u64,
    /// Blocks per period.
    pub period_length: u64,
    /// Cache mix rounds.
    pub cache_rounds: u32,
    /// Parents per dataset item.
    pub dataset_parents: u32,
    /// Cache size at epoch 0.
    pub cache_bytes_init: u64,
    /// Cache size rounding increment.
    pub cache_bytes_growth: u64,
    /// Dataset accesses per hash.
    pub accesses: u32,
}

impl PowParams {
    /// Consensus parameters.
    pub const MAINNET: Self = Self {
        epoch_length: EPOCH_LENGTH,
        period_length: PERIOD_LENGTH,
        cache_rounds: CACHE_ROUNDS,
        dataset_parents: DATASET_PARENTS,
        cache_bytes_init: CACHE_BYTES_INIT,
        cache_bytes_growth: CACHE_BYTES_GROWTH,
        accesses: ACCESSES,
    };

    /// Small buffers for tests and local chains.
    pub const REGTEST: Self = Self {
        epoch_length: 16,
        period_length: PERIOD_LENGTH,
        cache_rounds: 3,
        dataset_parents: 8,
        cache_bytes_init: 1024,
        cache_bytes_growth: 256,
        // Odd, so a two-item cycle always leaves one item in the mix.
        accesses: 17,
    };

    /// Check that buffers sized from these parameters are well formed.
    pub fn validate(&self) -> Result<()> {
        if self.epoch_length == 0 {
            return Err(PowError::InvalidParams("epoch_length must be > 0".into()));
        }
        if self.period_length == 0 {
            return Err(PowError::InvalidParams("period_length must be > 0".into()));
        }
        if self.dataset_parents == 0 {
            return Err(PowError::InvalidParams("dataset_parents must be > 0".into()));
        }
        if self.accesses == 0 {
            return Err(PowError::InvalidParams("accesses must be > 0".into()));
        }
        let item = ITEM_BYTES as u64;
        if self.cache_bytes_init < item || self.cache_bytes_init % item != 0 {
            return Err(PowError::InvalidParams(format!(
                "cache_bytes_init must be a non-zero multiple of {item}"
            )));
        }
        if !self.cache_bytes_growth.is_power_of_two() || self.cache_bytes_growth < item {
            return Err(PowError::InvalidParams(format!(
                "cache_bytes_growth must be a power of two >= {item}"
            )));
        }
        Ok(())
    }

    /// Epoch containing `block_number`.
    pub fn epoch(&self, block_number: u64) -> u64 {
        block_number.checked_div(self.epoch_length).unwrap_or(0)
    }

    /// Period containing `block_number`.
    pub fn period(&self, block_number: u64) -> u64 {
        block_number.checked_div(self.period_length).unwrap_or(0)
    }

    /// First block of `epoch`.
    pub fn epoch_start(&self, epoch: u64) -> u64 {
        epoch.saturating_mul(self.epoch_length)
    }

    /// Cache seed for `epoch`: the little-endian bytes of the epoch's first
    /// block number, zero-padded to [`SEED_BYTES`].
    pub fn epoch_seed(&self, epoch: u64) -> [u8; SEED_BYTES] {
        let mut seed = [0u8; SEED_BYTES];
        seed[..8].copy_from_slice(&self.epoch_start(epoch).to_le_bytes());
        seed
    }

    /// Cache size in bytes for `epoch`.
    ///
    /// Starting from `cache_bytes_init`, each epoch multiplies by 3/2 and
    /// rounds up to a multiple of `cache_bytes_growth`.
    pub fn cache_size(&self, epoch: u64) -> Result<u128> {
        let growth = u128::from(self.cache_bytes_growth);
        let mask = growth.wrapping_sub(1);
        let mut size = u128::from(self.cache_bytes_init);
        for _ in 0..epoch {
            size = size
                .checked_mul(3)
                .map(|s| s / 2)
                .and_then(|s| s.checked_add(mask))
                .map(|s| s & !mask)
                .ok_or(PowError::SizeOverflow { epoch })?;
        }
        Ok(size)
    }

    /// Dataset size in bytes for `epoch`.
    pub fn dataset_size(&self, epoch: u64) -> Result<u128> {
        self.cache_size(epoch)?
            .checked_mul(u128::from(self.dataset_parents))
            .ok_or(PowError::SizeOverflow { epoch })
    }

    /// Cache size in bytes for the epoch containing `block_number`.
    pub fn cache_size_for_block(&self, block_number: u64) -> Result<u128> {
        self.cache_size(self.epoch(block_number))
    }

    /// Dataset size in bytes for the epoch containing `block_number`.
    pub fn dataset_size_for_block(&self, block_number: u64) -> Result<u128> {
        self.dataset_size(self.epoch(block_number))
    }
}

impl Default for PowParams {
    fn default() -> Self {
        Self::MAINNET
    }
}
