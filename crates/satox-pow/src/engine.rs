//! Per-instance PoW engine.
//!
//! A [`PowEngine`] owns its cache and dataset exclusively. Buffers start
//! empty and are generated lazily for the epoch of the block number being
//! hashed; asking again for the same epoch is a no-op. Moving to another
//! epoch regenerates the cache and invalidates the dataset.
//!
//! An engine is `Send` but takes `&mut self` for every operation that may
//! generate, so concurrent callers either own an engine each or share an
//! [`EpochStore`](crate::EpochStore) instead.

use std::marker::PhantomData;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use satox_crypto::{Blake3Sponge, Digest, Sha256Digest, Sponge};

use crate::generate::{generate_cache, generate_dataset};
use crate::hashimoto::{check_mix_hash, check_output, hashimoto, PowOutput};
use crate::params::PowParams;
use crate::{PowError, Result};

/// PoW engine with exclusively owned epoch buffers.
pub struct PowEngine<D = Sha256Digest, S = Blake3Sponge> {
    params: PowParams,
    digest: D,
    cache: Vec<u8>,
    dataset: Vec<u8>,
    current_epoch: u64,
    cache_ready: bool,
    dataset_ready: bool,
    cancel: Arc<AtomicBool>,
    _sponge: PhantomData<fn() -> S>,
}

impl PowEngine {
    /// Create an engine with the default SHA-256 / BLAKE3 backends.
    pub fn new(params: PowParams) -> Result<Self> {
        Self::with_backend(params, Sha256Digest)
    }
}

impl<D: Digest, S: Sponge + Default> PowEngine<D, S> {
    /// Create an engine with an explicit digest backend. The sponge backend
    /// is chosen by the `S` type parameter.
    pub fn with_backend(params: PowParams, digest: D) -> Result<Self> {
        params.validate()?;
        tracing::debug!(
            digest = digest.name(),
            accesses = params.accesses,
            "pow: engine created"
        );
        Ok(Self {
            params,
            digest,
            cache: Vec::new(),
            dataset: Vec::new(),
            current_epoch: 0,
            cache_ready: false,
            dataset_ready: false,
            cancel: Arc::new(AtomicBool::new(false)),
            _sponge: PhantomData,
        })
    }

    /// Parameters this engine was built with.
    pub fn params(&self) -> &PowParams {
        &self.params
    }

    /// Digest backend used for the seed and final hash.
    pub fn digest(&self) -> &D {
        &self.digest
    }

    /// Epoch of the resident cache.
    pub fn current_epoch(&self) -> u64 {
        self.current_epoch
    }

    /// Whether the cache is resident.
    pub fn is_cache_ready(&self) -> bool {
        self.cache_ready
    }

    /// Whether the dataset is resident.
    pub fn is_dataset_ready(&self) -> bool {
        self.dataset_ready
    }

    /// The resident cache; empty until initialized.
    pub fn cache(&self) -> &[u8] {
        &self.cache
    }

    /// The resident dataset; empty until initialized.
    pub fn dataset(&self) -> &[u8] {
        &self.dataset
    }

    /// Flag that aborts in-flight generation when set.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Make the cache for `block_number`'s epoch resident.
    pub fn initialize_cache(&mut self, block_number: u64) -> Result<()> {
        let epoch = self.params.epoch(block_number);
        if self.cache_ready && epoch == self.current_epoch {
            tracing::trace!(epoch, "pow: cache already resident");
            return Ok(());
        }

        if epoch != self.current_epoch {
            self.clear_dataset();
        }
        self.cache_ready = false;
        self.cache = generate_cache(&self.params, epoch, S::default(), &self.cancel)?;
        self.current_epoch = epoch;
        self.cache_ready = true;
        Ok(())
    }

    /// Make the dataset for `block_number`'s epoch resident. The cache for
    /// the same epoch must already be resident.
    pub fn initialize_dataset(&mut self, block_number: u64) -> Result<()> {
        let epoch = self.params.epoch(block_number);
        if !self.cache_ready || epoch != self.current_epoch {
            return Err(PowError::CacheNotReady { epoch });
        }
        if self.dataset_ready {
            tracing::trace!(epoch, "pow: dataset already resident");
            return Ok(());
        }

        self.dataset = generate_dataset(&self.params, &self.cache, epoch, &self.cancel)?;
        self.dataset_ready = true;
        Ok(())
    }

    /// Compute `(hash, mix_hash)` for a 32-byte header and nonce at
    /// `block_number`, generating epoch buffers as needed.
    pub fn compute_hash(
        &mut self,
        header: &[u8],
        nonce: u64,
        block_number: u64,
    ) -> Result<PowOutput> {
        crate::hashimoto::check_header(header)?;
        self.initialize_cache(block_number)?;
        self.initialize_dataset(block_number)?;
        hashimoto(&self.params, &self.digest, &self.dataset, header, nonce)
    }

    /// Recompute the hash and check it against a claimed mix hash and target.
    pub fn try_verify_hash(
        &mut self,
        header: &[u8],
        nonce: u64,
        block_number: u64,
        mix_hash: &[u8],
        target: &[u8],
    ) -> Result<bool> {
        check_mix_hash(mix_hash)?;
        let computed = self.compute_hash(header, nonce, block_number)?;
        Ok(check_output(&computed, mix_hash, target))
    }

    /// Like [`try_verify_hash`](Self::try_verify_hash), with every error
    /// reported as `false`.
    pub fn verify_hash(
        &mut self,
        header: &[u8],
        nonce: u64,
        block_number: u64,
        mix_hash: &[u8],
        target: &[u8],
    ) -> bool {
        match self.try_verify_hash(header, nonce, block_number, mix_hash, target) {
            Ok(valid) => valid,
            Err(e) => {
                tracing::debug!(error = %e, "pow: verification failed");
                false
            }
        }
    }

    /// Release the cache. The dataset is derived from it and goes too.
    pub fn clear_cache(&mut self) {
        self.cache = Vec::new();
        self.cache_ready = false;
        self.clear_dataset();
    }

    /// Release the dataset.
    pub fn clear_dataset(&mut self) {
        self.dataset = Vec::new();
        self.dataset_ready = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{HEADER_BYTES, MIX_BYTES};
    use std::collections::HashSet;
    use std::sync::atomic::Ordering;

    fn engine() -> PowEngine {
        PowEngine::new(PowParams::REGTEST).expect("engine")
    }

    fn header() -> [u8; HEADER_BYTES] {
        let mut h = [0u8; HEADER_BYTES];
        for (i, b) in h.iter_mut().enumerate() {
            *b = i as u8;
        }
        h
    }

    #[test]
    fn test_new_engine_is_empty() {
        let e = engine();
        assert!(!e.is_cache_ready());
        assert!(!e.is_dataset_ready());
        assert!(e.cache().is_empty());
        assert!(e.dataset().is_empty());
    }

    #[test]
    fn test_invalid_params_rejected() {
        let mut p = PowParams::REGTEST;
        p.accesses = 0;
        assert!(PowEngine::new(p).is_err());
    }

    #[test]
    fn test_initialize_is_lazy() {
        let mut e = engine();
        e.initialize_cache(0).expect("cache");
        let first = e.cache().as_ptr();
        // Same epoch: no regeneration.
        e.initialize_cache(PowParams::REGTEST.epoch_length - 1)
            .expect("cache");
        assert_eq!(e.cache().as_ptr(), first);
        assert_eq!(e.current_epoch(), 0);
    }

    #[test]
    fn test_dataset_requires_cache() {
        let mut e = engine();
        assert!(matches!(
            e.initialize_dataset(0),
            Err(PowError::CacheNotReady { epoch: 0 })
        ));
    }

    #[test]
    fn test_dataset_size_invariant() {
        let mut e = engine();
        e.initialize_cache(0).expect("cache");
        e.initialize_dataset(0).expect("dataset");
        assert!(e.is_dataset_ready());
        assert_eq!(
            e.dataset().len(),
            e.cache().len() * e.params().dataset_parents as usize
        );
    }

    #[test]
    fn test_epoch_change_invalidates_dataset() {
        let mut e = engine();
        let len = PowParams::REGTEST.epoch_length;
        e.compute_hash(&header(), 1, 0).expect("hash");
        assert!(e.is_dataset_ready());

        e.initialize_cache(len).expect("cache");
        assert_eq!(e.current_epoch(), 1);
        assert!(!e.is_dataset_ready());

        e.initialize_dataset(len).expect("dataset");
        assert_eq!(
            e.dataset().len() as u128,
            PowParams::REGTEST.dataset_size(1).expect("size")
        );
    }

    #[test]
    fn test_compute_is_deterministic() {
        let mut e = engine();
        let a = e.compute_hash(&header(), 42, 0).expect("hash");
        let b = e.compute_hash(&header(), 42, 0).expect("hash");
        assert_eq!(a, b);

        let mut other = engine();
        assert_eq!(other.compute_hash(&header(), 42, 0).expect("hash"), a);
    }

    #[test]
    fn test_epoch_affects_hash() {
        let mut e = engine();
        let a = e.compute_hash(&header(), 42, 0).expect("hash");
        let b = e
            .compute_hash(&header(), 42, PowParams::REGTEST.epoch_length)
            .expect("hash");
        assert_ne!(a, b);
    }

    #[test]
    fn test_nonce_sensitivity() {
        let mut e = engine();
        let mut hashes = HashSet::new();
        let mut mixes = HashSet::new();
        for _ in 0..1000 {
            let nonce: u64 = rand::random();
            let out = e.compute_hash(&header(), nonce, 0).expect("hash");
            let next = e
                .compute_hash(&header(), nonce.wrapping_add(1), 0)
                .expect("hash");
            assert_ne!(out.hash, next.hash);
            assert_ne!(out.mix_hash, next.mix_hash);
            hashes.insert(out.hash);
            mixes.insert(out.mix_hash.to_vec());
        }
        assert_eq!(hashes.len(), 1000);
        assert_eq!(mixes.len(), 1000);
    }

    #[test]
    fn test_verify_agrees_with_compute() {
        let mut e = engine();
        for nonce in [0u64, 1, 12345, u64::MAX] {
            let out = e.compute_hash(&header(), nonce, 0).expect("hash");
            assert!(e.verify_hash(&header(), nonce, 0, &out.mix_hash, &[0xFF; 32]));
        }
    }

    #[test]
    fn test_verify_rejects_any_flipped_bit() {
        let mut e = engine();
        let out = e.compute_hash(&header(), 7, 0).expect("hash");
        for byte in 0..MIX_BYTES {
            for bit in 0..8 {
                let mut bad = out.mix_hash;
                bad[byte] ^= 1 << bit;
                assert!(!e.verify_hash(&header(), 7, 0, &bad, &[0xFF; 32]));
            }
        }
    }

    #[test]
    fn test_verify_length_mismatch_is_false() {
        let mut e = engine();
        let out = e.compute_hash(&header(), 7, 0).expect("hash");
        assert!(!e.verify_hash(&header()[..31], 7, 0, &out.mix_hash, &[0xFF; 32]));
        assert!(!e.verify_hash(&header(), 7, 0, &out.mix_hash[..32], &[0xFF; 32]));
        assert!(matches!(
            e.try_verify_hash(&header(), 7, 0, &[0u8; 10], &[0xFF; 32]),
            Err(PowError::InvalidMixHashLength { .. })
        ));
    }

    #[test]
    fn test_verify_respects_target() {
        let mut e = engine();
        let out = e.compute_hash(&header(), 7, 0).expect("hash");
        assert!(!e.verify_hash(&header(), 7, 0, &out.mix_hash, &out.hash));
        assert!(!e.verify_hash(&header(), 7, 0, &out.mix_hash, &[0u8; 32]));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut e = engine();
        e.compute_hash(&header(), 1, 0).expect("hash");
        e.clear_dataset();
        assert!(!e.is_dataset_ready());
        assert!(e.is_cache_ready());
        e.clear_cache();
        e.clear_cache();
        e.clear_dataset();
        assert!(!e.is_cache_ready());
        assert!(!e.is_dataset_ready());
        assert!(e.cache().is_empty());
        assert!(e.dataset().is_empty());

        // Buffers come back on demand.
        e.compute_hash(&header(), 1, 0).expect("hash");
        assert!(e.is_dataset_ready());
    }

    #[test]
    fn test_cancelled_engine_fails_closed() {
        let mut e = engine();
        e.cancel_handle().store(true, Ordering::Relaxed);
        assert!(matches!(
            e.compute_hash(&header(), 1, 0),
            Err(PowError::Cancelled)
        ));
        assert!(!e.verify_hash(&header(), 1, 0, &[0u8; MIX_BYTES], &[0xFF; 32]));
        assert!(!e.is_cache_ready());
    }

    #[test]
    fn test_custom_sponge_backend() {
        #[derive(Default)]
        struct ZeroSponge;
        impl Sponge for ZeroSponge {
            fn absorb(&mut self, _data: &[u8]) {}
            fn squeeze(&mut self, out: &mut [u8]) {
                out.fill(0);
            }
        }

        let mut e: PowEngine<Sha256Digest, ZeroSponge> =
            PowEngine::with_backend(PowParams::REGTEST, Sha256Digest).expect("engine");
        assert_eq!(e.digest().name(), "sha256");
        e.initialize_cache(0).expect("cache");
        assert!(e.cache().iter().all(|b| *b == 0));

        let mut default = engine();
        assert_ne!(
            e.compute_hash(&header(), 5, 0).expect("hash"),
            default.compute_hash(&header(), 5, 0).expect("hash")
        );
    }

    #[test]
    fn test_custom_digest_backend() {
        use satox_crypto::Blake3Digest;

        let mut e: PowEngine<Blake3Digest> =
            PowEngine::with_backend(PowParams::REGTEST, Blake3Digest).expect("engine");
        assert_eq!(e.digest().name(), "blake3");

        let out = e.compute_hash(&header(), 5, 0).expect("hash");
        assert_eq!(out.hash, Blake3Digest.digest(&out.mix_hash));
        assert_ne!(out, engine().compute_hash(&header(), 5, 0).expect("hash"));
    }
}
