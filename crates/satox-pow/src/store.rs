//! Process-wide epoch store.
//!
//! Verifier threads share one read-only copy of each epoch's cache and
//! dataset. Lookups for a resident epoch take a read lock and clone an
//! [`Arc`]. A missing epoch is generated by a single writer: concurrent
//! callers for a missing epoch block on the writer lock and then find the
//! freshly published entry. Callers for resident epochs are never blocked by
//! a generation in progress.
//!
//! [`EpochStore::shutdown`] aborts any generation in flight and fails all
//! later lookups with [`PowError::Cancelled`].

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use satox_crypto::{Blake3Sponge, Digest, Sha256Digest};

use crate::generate::{generate_cache, generate_dataset};
use crate::hashimoto::{check_mix_hash, check_output, hashimoto, PowOutput};
use crate::params::PowParams;
use crate::{PowError, Result};

/// Epochs kept resident by default: the current one and its predecessor.
pub const DEFAULT_RETAIN_EPOCHS: usize = 2;

static GLOBAL: Lazy<EpochStore> =
    Lazy::new(|| EpochStore::from_validated(PowParams::MAINNET, DEFAULT_RETAIN_EPOCHS));

/// Immutable cache and dataset for one epoch.
#[derive(Debug)]
pub struct EpochData {
    epoch: u64,
    cache: Vec<u8>,
    dataset: Vec<u8>,
}

impl EpochData {
    /// Epoch number.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Cache bytes.
    pub fn cache(&self) -> &[u8] {
        &self.cache
    }

    /// Dataset bytes.
    pub fn dataset(&self) -> &[u8] {
        &self.dataset
    }
}

/// Epoch-indexed store of shared datasets.
pub struct EpochStore {
    params: PowParams,
    digest: Sha256Digest,
    retain: usize,
    epochs: RwLock<BTreeMap<u64, Arc<EpochData>>>,
    writer: Mutex<()>,
    shutdown: AtomicBool,
}

impl EpochStore {
    /// Create a store for `params` keeping at most `retain` epochs resident.
    pub fn new(params: PowParams, retain: usize) -> Result<Self> {
        params.validate()?;
        if retain == 0 {
            return Err(PowError::InvalidParams("retain must be > 0".into()));
        }
        let store = Self::from_validated(params, retain);
        tracing::debug!(
            digest = store.digest.name(),
            retain,
            epoch_length = params.epoch_length,
            "pow: epoch store created"
        );
        Ok(store)
    }

    fn from_validated(params: PowParams, retain: usize) -> Self {
        Self {
            params,
            digest: Sha256Digest,
            retain,
            epochs: RwLock::new(BTreeMap::new()),
            writer: Mutex::new(()),
            shutdown: AtomicBool::new(false),
        }
    }

    /// The process-wide mainnet store.
    pub fn global() -> &'static EpochStore {
        &GLOBAL
    }

    /// Parameters this store was built with.
    pub fn params(&self) -> &PowParams {
        &self.params
    }

    /// Epochs currently resident, ascending.
    pub fn resident_epochs(&self) -> Vec<u64> {
        self.epochs.read().keys().copied().collect()
    }

    /// Whether [`shutdown`](Self::shutdown) has been called.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    /// Abort in-flight generation and refuse further lookups.
    pub fn shutdown(&self) {
        tracing::info!("pow: epoch store shutting down");
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Data for `epoch`, generating it if it is not resident.
    pub fn get(&self, epoch: u64) -> Result<Arc<EpochData>> {
        if self.is_shutdown() {
            return Err(PowError::Cancelled);
        }
        if let Some(data) = self.lookup(epoch) {
            return Ok(data);
        }

        let _writer = self.writer.lock();
        if let Some(data) = self.lookup(epoch) {
            return Ok(data);
        }

        let cache = generate_cache(&self.params, epoch, Blake3Sponge::new(), &self.shutdown)?;
        let dataset = generate_dataset(&self.params, &cache, epoch, &self.shutdown)?;
        let data = Arc::new(EpochData {
            epoch,
            cache,
            dataset,
        });

        let mut epochs = self.epochs.write();
        epochs.insert(epoch, Arc::clone(&data));
        while epochs.len() > self.retain {
            let Some(victim) = epochs.keys().copied().find(|e| *e != epoch) else {
                break;
            };
            epochs.remove(&victim);
            tracing::debug!(epoch = victim, "pow: evicted epoch");
        }
        Ok(data)
    }

    /// Data for the epoch containing `block_number`.
    pub fn get_for_block(&self, block_number: u64) -> Result<Arc<EpochData>> {
        self.get(self.params.epoch(block_number))
    }

    /// Generate the epoch after `block_number`'s ahead of time.
    pub fn prefetch_next(&self, block_number: u64) -> Result<()> {
        let next = self.params.epoch(block_number).saturating_add(1);
        self.get(next).map(|_| ())
    }

    /// Compute `(hash, mix_hash)` for `header` and `nonce` at `block_number`.
    pub fn compute_hash(&self, header: &[u8], nonce: u64, block_number: u64) -> Result<PowOutput> {
        crate::hashimoto::check_header(header)?;
        let data = self.get_for_block(block_number)?;
        hashimoto(&self.params, &self.digest, data.dataset(), header, nonce)
    }

    /// Recompute the hash and check it against a claimed mix hash and target.
    pub fn try_verify_hash(
        &self,
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
        &self,
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

    fn lookup(&self, epoch: u64) -> Option<Arc<EpochData>> {
        let data = self.epochs.read().get(&epoch).cloned();
        if data.is_some() {
            tracing::trace!(epoch, "pow: epoch resident");
        }
        data
    }
}
