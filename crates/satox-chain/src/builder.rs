//! Block builder and sealing.

use serde_json::Value;
use satox_pow::{search_nonce, EpochStore};

use crate::block::Block;
use crate::transaction::Transaction;
use crate::{ChainError, Result};

/// Builds a [`Block`] field by field, optionally sealing it with a nonce
/// that meets its difficulty.
#[derive(Debug, Clone)]
pub struct BlockBuilder<T = crate::TransactionRecord> {
    block: Block<T>,
}

impl<T> Default for BlockBuilder<T> {
    fn default() -> Self {
        Self {
            block: Block::default(),
        }
    }
}

impl<T: Transaction> BlockBuilder<T> {
    /// Start from an empty block.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hash(mut self, hash: impl Into<String>) -> Self {
        self.block.hash = hash.into();
        self
    }

    pub fn previous_hash(mut self, previous_hash: impl Into<String>) -> Self {
        self.block.previous_hash = previous_hash.into();
        self
    }

    pub fn timestamp(mut self, timestamp: i64) -> Self {
        self.block.timestamp = timestamp;
        self
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        self.block.nonce = nonce;
        self
    }

    pub fn difficulty(mut self, difficulty: u32) -> Self {
        self.block.difficulty = difficulty;
        self
    }

    pub fn merkle_root(mut self, merkle_root: impl Into<String>) -> Self {
        self.block.merkle_root = merkle_root.into();
        self
    }

    pub fn version(mut self, version: u32) -> Self {
        self.block.version = version;
        self
    }

    pub fn height(mut self, height: u64) -> Self {
        self.block.height = height;
        self
    }

    pub fn miner_address(mut self, miner_address: impl Into<String>) -> Self {
        self.block.miner_address = miner_address.into();
        self
    }

    pub fn block_reward(mut self, block_reward: u64) -> Self {
        self.block.block_reward = block_reward;
        self
    }

    pub fn metadata(mut self, metadata: Value) -> Self {
        self.block.metadata = metadata;
        self
    }

    /// Append one transaction.
    pub fn transaction(mut self, tx: T) -> Self {
        self.block.transactions.push(tx);
        self
    }

    /// Replace the transaction list.
    pub fn transactions(mut self, txs: Vec<T>) -> Self {
        self.block.transactions = txs;
        self
    }

    /// Set `merkle_root` from the current transactions.
    pub fn merkle_root_from_transactions(mut self) -> Self {
        self.block.merkle_root = self.block.compute_merkle_root();
        self
    }

    /// Finish without touching the PoW fields.
    pub fn build(self) -> Block<T> {
        self.block
    }

    /// Search up to `max_attempts` nonces from `start_nonce` and fill in
    /// `nonce`, `kawpow_mix_hash` and `kawpow_header_hash`.
    pub fn seal(self, store: &EpochStore, start_nonce: u64, max_attempts: u64) -> Result<Block<T>> {
        let mut block = self.block;
        let header = block.header_bytes()?;
        let target = block.target();

        let solution = search_nonce(store, &header, block.height, &target, start_nonce, max_attempts)?
            .ok_or(ChainError::NonceNotFound {
                attempts: max_attempts,
            })?;

        block.nonce = solution.nonce;
        block.kawpow_mix_hash = solution.output.mix_hash_hex();
        block.kawpow_header_hash = solution.output.hash_hex();
        tracing::info!(
            height = block.height,
            nonce = block.nonce,
            difficulty = block.difficulty,
            "block: sealed"
        );
        Ok(block)
    }
}
