//! Parallel nonce search.
//!
//! Scans a nonce range on the rayon pool against one shared epoch and
//! returns the lowest nonce whose hash meets the target.

use rayon::prelude::*;

use crate::hashimoto::{check_header, hashimoto, PowOutput};
use crate::store::EpochStore;
use crate::target::{leading_zero_bits, meets_target};
use crate::{PowError, Result};

/// A nonce together with the output it produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution {
    /// Winning nonce.
    pub nonce: u64,
    /// Hash and mix hash for `nonce`.
    pub output: PowOutput,
}

/// Search `count` nonces starting at `start` for one whose hash is below
/// `target`. Returns `Ok(None)` if the range is exhausted.
pub fn search_nonce(
    store: &EpochStore,
    header: &[u8],
    block_number: u64,
    target: &[u8],
    start: u64,
    count: u64,
) -> Result<Option<Solution>> {
    check_header(header)?;
    let data = store.get_for_block(block_number)?;
    let params = *store.params();
    let digest = satox_crypto::Sha256Digest;
    let end = start.saturating_add(count);

    let found = (start..end).into_par_iter().find_map_first(|nonce| {
        if store.is_shutdown() {
            return None;
        }
        let output = hashimoto(&params, &digest, data.dataset(), header, nonce).ok()?;
        meets_target(&output.hash, target).then_some(Solution { nonce, output })
    });

    if found.is_none() && store.is_shutdown() {
        return Err(PowError::Cancelled);
    }
    match &found {
        Some(solution) => tracing::debug!(
            block_number,
            nonce = solution.nonce,
            zero_bits = leading_zero_bits(&solution.output.hash),
            "pow: nonce found"
        ),
        None => tracing::debug!(block_number, start, count, "pow: nonce range exhausted"),
    }
    Ok(found)
}
