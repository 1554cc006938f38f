//! Hash computation over a resident dataset.
//!
//! ```text
//! seed     = D(header) XOR D(nonce_le)
//! mix      = seed, zero-extended to MIX_BYTES
//! repeat accesses times:
//!     mix ^= dataset[be_u64(mix[0..8]) mod dataset_items]
//! hash     = D(mix)
//! ```
//!
//! An empty dataset yields an all-zero mix.
//!
//! XORing an item into the mix also changes the selector bytes, so the
//! access sequence can fall into a two-item cycle `a, b, a, b, ...` (or a
//! fixed point when an item's selector bits are zero). Each pair cancels,
//! so with an even access count the mix reduces to the zero-extended seed
//! and the hash no longer depends on the dataset. With an odd count one
//! item always survives. [`PowParams::MAINNET`] uses an even count.

use satox_crypto::Digest;

use crate::generate::xor_into;
use crate::index::{dataset_index, item_count, item_offset};
use crate::params::{PowParams, HASH_BYTES, HEADER_BYTES, ITEM_BYTES, MIX_BYTES, SEED_BYTES};
use crate::target::meets_target;
use crate::{PowError, Result};

/// The output of one PoW hash computation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PowOutput {
    /// Final hash compared against the target.
    pub hash: [u8; HASH_BYTES],
    /// Final mix buffer, a public input to verification.
    pub mix_hash: [u8; MIX_BYTES],
}

impl PowOutput {
    /// Lowercase hex of the final hash.
    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }

    /// Lowercase hex of the mix hash.
    pub fn mix_hash_hex(&self) -> String {
        hex::encode(self.mix_hash)
    }
}

/// Check that `header` is exactly [`HEADER_BYTES`] long.
pub fn check_header(header: &[u8]) -> Result<()> {
    if header.len() != HEADER_BYTES {
        return Err(PowError::InvalidHeaderLength {
            expected: HEADER_BYTES,
            actual: header.len(),
        });
    }
    Ok(())
}

/// Check that `mix_hash` is exactly [`MIX_BYTES`] long.
pub fn check_mix_hash(mix_hash: &[u8]) -> Result<()> {
    if mix_hash.len() != MIX_BYTES {
        return Err(PowError::InvalidMixHashLength {
            expected: MIX_BYTES,
            actual: mix_hash.len(),
        });
    }
    Ok(())
}

/// Combine the header and nonce digests into the mix seed.
pub fn seed<D: Digest + ?Sized>(digest: &D, header: &[u8], nonce: u64) -> [u8; SEED_BYTES] {
    let header_hash = digest.digest(header);
    let nonce_hash = digest.digest(&nonce.to_le_bytes());
    let mut seed = [0u8; SEED_BYTES];
    for (i, byte) in seed.iter_mut().enumerate() {
        *byte = header_hash[i] ^ nonce_hash[i];
    }
    seed
}

/// Run the dataset access loop from `seed`.
pub fn mix(params: &PowParams, dataset: &[u8], seed: &[u8; SEED_BYTES]) -> [u8; MIX_BYTES] {
    let mut mix = [0u8; MIX_BYTES];
    let dataset_items = item_count(dataset.len());
    if dataset_items == 0 {
        return mix;
    }

    let n = SEED_BYTES.min(MIX_BYTES);
    mix[..n].copy_from_slice(&seed[..n]);

    for _ in 0..params.accesses {
        let offset = item_offset(dataset_index(&mix, dataset_items));
        xor_into(&mut mix, &dataset[offset..offset + ITEM_BYTES]);
    }
    mix
}

/// Compute `(hash, mix_hash)` for `header` and `nonce` over `dataset`.
pub fn hashimoto<D: Digest + ?Sized>(
    params: &PowParams,
    digest: &D,
    dataset: &[u8],
    header: &[u8],
    nonce: u64,
) -> Result<PowOutput> {
    check_header(header)?;
    let seed = seed(digest, header, nonce);
    let mix_hash = mix(params, dataset, &seed);
    let hash = digest.digest(&mix_hash);
    Ok(PowOutput { hash, mix_hash })
}

/// Compare a recomputed output against a claimed mix hash and a target.
///
/// The mix hash must match byte for byte and the hash must be strictly
/// below the target.
pub fn check_output(computed: &PowOutput, mix_hash: &[u8], target: &[u8]) -> bool {
    if computed.mix_hash.as_slice() != mix_hash {
        tracing::debug!("pow: mix hash mismatch");
        return false;
    }
    if !meets_target(&computed.hash, target) {
        tracing::debug!(hash = %computed.hash_hex(), "pow: hash above target");
        return false;
    }
    true
}
