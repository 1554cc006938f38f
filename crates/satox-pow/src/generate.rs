//! Cache and dataset generation.
//!
//! The cache is filled by alternately absorbing the epoch seed into a sponge
//! and squeezing one 64-byte slot, then mixed `cache_rounds` times. Each
//! dataset item starts as a copy of one cache slot and has
//! `dataset_parents` further cache slots XORed into it. Dataset items are
//! independent and are generated on the rayon pool.
//!
//! Both generators take a cancellation flag that is polled between rounds and
//! items. A set flag aborts generation with [`PowError::Cancelled`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use satox_crypto::Sponge;

use crate::index::{cache_item_index, cache_word_offset, item_count, item_offset, parent_index};
use crate::params::{PowParams, ITEM_BYTES, WORD_BYTES};
use crate::{PowError, Result};

/// Allocate a zeroed buffer of `bytes` bytes, failing instead of aborting.
pub fn alloc_buffer(bytes: u128) -> Result<Vec<u8>> {
    let len = usize::try_from(bytes).map_err(|_| PowError::Allocation { bytes })?;
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| PowError::Allocation { bytes })?;
    buf.resize(len, 0);
    Ok(buf)
}

/// Generate the cache for `epoch`.
pub fn generate_cache<S: Sponge>(
    params: &PowParams,
    epoch: u64,
    mut sponge: S,
    cancel: &AtomicBool,
) -> Result<Vec<u8>> {
    let started = Instant::now();
    let size = params.cache_size(epoch)?;
    let mut cache = alloc_buffer(size)?;
    let seed = params.epoch_seed(epoch);

    for slot in cache.chunks_mut(ITEM_BYTES) {
        sponge.absorb(&seed);
        sponge.squeeze(slot);
    }

    mix_cache(&mut cache, params.cache_rounds, cancel)?;

    tracing::info!(
        epoch,
        bytes = cache.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "pow: cache generated"
    );
    Ok(cache)
}

/// Run `rounds` mixing passes over `cache`.
///
/// For every 64-byte slot the eight words at `cache_word_offset(slot, k)` are
/// XORed together and the combined value is XORed back into each of them.
pub fn mix_cache(cache: &mut [u8], rounds: u32, cancel: &AtomicBool) -> Result<()> {
    let len = cache.len();
    if len < ITEM_BYTES {
        return Ok(());
    }

    for _ in 0..rounds {
        if cancel.load(Ordering::Relaxed) {
            return Err(PowError::Cancelled);
        }
        for slot in (0..len).step_by(ITEM_BYTES) {
            let mut combined = 0u64;
            for k in 0..ITEM_BYTES / WORD_BYTES {
                combined ^= read_word(cache, cache_word_offset(slot, k, len));
            }
            for k in 0..ITEM_BYTES / WORD_BYTES {
                let offset = cache_word_offset(slot, k, len);
                let word = read_word(cache, offset) ^ combined;
                write_word(cache, offset, word);
            }
        }
    }
    Ok(())
}

/// Generate the dataset for `epoch` from its cache.
pub fn generate_dataset(
    params: &PowParams,
    cache: &[u8],
    epoch: u64,
    cancel: &AtomicBool,
) -> Result<Vec<u8>> {
    let started = Instant::now();
    if cache.len() as u128 != params.cache_size(epoch)? {
        return Err(PowError::CacheNotReady { epoch });
    }
    let size = params.dataset_size(epoch)?;
    let mut dataset = alloc_buffer(size)?;

    let cache_items = item_count(cache.len());
    let parents = params.dataset_parents;

    dataset
        .par_chunks_mut(ITEM_BYTES)
        .enumerate()
        .try_for_each(|(i, item)| {
            if cancel.load(Ordering::Relaxed) {
                return Err(PowError::Cancelled);
            }
            let i = i as u64;
            let src = item_offset(cache_item_index(i, cache_items));
            item.copy_from_slice(&cache[src..src + ITEM_BYTES]);
            for j in 0..parents {
                let parent = item_offset(parent_index(i, j, parents, cache_items));
                xor_into(item, &cache[parent..parent + ITEM_BYTES]);
            }
            Ok(())
        })?;

    tracing::info!(
        epoch,
        bytes = dataset.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "pow: dataset generated"
    );
    Ok(dataset)
}

/// XOR `src` into `dst` byte for byte, over the shorter of the two.
pub fn xor_into(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= s;
    }
}

fn read_word(buf: &[u8], offset: usize) -> u64 {
    let mut word = [0u8; WORD_BYTES];
    word.copy_from_slice(&buf[offset..offset + WORD_BYTES]);
    u64::from_le_bytes(word)
}

fn write_word(buf: &mut [u8], offset: usize, word: u64) {
    buf[offset..offset + WORD_BYTES].copy_from_slice(&word.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use satox_crypto::Blake3Sponge;

    fn never() -> AtomicBool {
        AtomicBool::new(false)
    }

    /// Sponge that squeezes a running counter, for checking fill order.
    #[derive(Default)]
    struct CountingSponge {
        absorbed: usize,
        next: u8,
    }

    impl Sponge for CountingSponge {
        fn absorb(&mut self, data: &[u8]) {
            self.absorbed += data.len();
        }

        fn squeeze(&mut self, out: &mut [u8]) {
            for b in out.iter_mut() {
                *b = self.next;
            }
            self.next = self.next.wrapping_add(1);
        }
    }

    #[test]
    fn test_cache_has_epoch_size() {
        let p = PowParams::REGTEST;
        for epoch in 0..3 {
            let cache = generate_cache(&p, epoch, Blake3Sponge::new(), &never()).expect("cache");
            assert_eq!(cache.len() as u128, p.cache_size(epoch).expect("size"));
        }
    }

    #[test]
    fn test_cache_deterministic_per_epoch() {
        let p = PowParams::REGTEST;
        let a = generate_cache(&p, 1, Blake3Sponge::new(), &never()).expect("cache");
        let b = generate_cache(&p, 1, Blake3Sponge::new(), &never()).expect("cache");
        assert_eq!(a, b);

        let c = generate_cache(&p, 0, Blake3Sponge::new(), &never()).expect("cache");
        assert_ne!(&a[..c.len()], &c[..]);
    }

    #[test]
    fn test_cache_fill_absorbs_seed_per_slot() {
        let mut p = PowParams::REGTEST;
        p.cache_rounds = 0;
        let sponge = CountingSponge::default();
        let cache = generate_cache(&p, 0, sponge, &never()).expect("cache");
        // Slot n is filled by the n-th squeeze.
        for (n, slot) in cache.chunks(ITEM_BYTES).enumerate() {
            assert!(slot.iter().all(|b| *b == n as u8));
        }
    }

    #[test]
    fn test_mix_round_pairs_cancel() {
        let mut cache: Vec<u8> = (0..256u32).map(|b| (b * 7) as u8).collect();
        let original = cache.clone();

        mix_cache(&mut cache, 1, &never()).expect("mix");
        assert_ne!(cache, original);

        // Each round XORs every word with the slot's combined value; with an
        // even number of words the combined value is unchanged, so a second
        // round restores the input.
        mix_cache(&mut cache, 1, &never()).expect("mix");
        assert_eq!(cache, original);
    }

    #[test]
    fn test_mix_single_slot_by_hand() {
        let mut cache = vec![0u8; 64];
        cache[0] = 1;
        mix_cache(&mut cache, 1, &never()).expect("mix");
        // combined = 1; word 0 becomes 0, the other seven become 1.
        assert_eq!(read_word(&cache, 0), 0);
        for k in 1..8 {
            assert_eq!(read_word(&cache, k * 8), 1);
        }
    }

    #[test]
    fn test_dataset_items_follow_parents() {
        let p = PowParams::REGTEST;
        let cache = generate_cache(&p, 0, Blake3Sponge::new(), &never()).expect("cache");
        let dataset = generate_dataset(&p, &cache, 0, &never()).expect("dataset");
        assert_eq!(
            dataset.len(),
            cache.len() * p.dataset_parents as usize
        );

        let cache_items = item_count(cache.len());
        for i in [0u64, 1, 5, item_count(dataset.len()) - 1] {
            let mut expected = [0u8; ITEM_BYTES];
            let src = item_offset(cache_item_index(i, cache_items));
            expected.copy_from_slice(&cache[src..src + ITEM_BYTES]);
            for j in 0..p.dataset_parents {
                let off = item_offset(parent_index(i, j, p.dataset_parents, cache_items));
                xor_into(&mut expected, &cache[off..off + ITEM_BYTES]);
            }
            let got = &dataset[item_offset(i)..item_offset(i) + ITEM_BYTES];
            assert_eq!(got, &expected[..], "item {i}");
        }
    }

    #[test]
    fn test_dataset_rejects_wrong_epoch_cache() {
        let p = PowParams::REGTEST;
        let cache = generate_cache(&p, 0, Blake3Sponge::new(), &never()).expect("cache");
        assert!(matches!(
            generate_dataset(&p, &cache, 1, &never()),
            Err(PowError::CacheNotReady { epoch: 1 })
        ));
    }

    #[test]
    fn test_cancelled_generation() {
        let p = PowParams::REGTEST;
        let cancel = AtomicBool::new(true);
        assert!(matches!(
            generate_cache(&p, 0, Blake3Sponge::new(), &cancel),
            Err(PowError::Cancelled)
        ));

        let cache = generate_cache(&p, 0, Blake3Sponge::new(), &never()).expect("cache");
        assert!(matches!(
            generate_dataset(&p, &cache, 0, &cancel),
            Err(PowError::Cancelled)
        ));
    }

    #[test]
    fn test_alloc_too_large() {
        assert!(matches!(
            alloc_buffer(u128::MAX),
            Err(PowError::Allocation { .. })
        ));
    }
}
