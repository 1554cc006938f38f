//! Integration test: one epoch store shared by many verifying threads.
//!
//! Blocks at several heights are sealed up front, then verified
//! concurrently. Every thread must agree, and the store must never hold
//! more epochs than it was told to retain.

use std::sync::Arc;
use std::thread;

use rand::Rng;
use satox_chain::{Block, BlockBuilder, ValidationConfig};
use satox_pow::{EpochStore, PowError, PowParams};

fn block_at(store: &EpochStore, height: u64) -> Block {
    BlockBuilder::new()
        .hash(hex::encode([(height % 251) as u8; 32]))
        .previous_hash("ff".repeat(32))
        .merkle_root("ee".repeat(32))
        .timestamp(1_000)
        .height(height)
        .seal(store, height * 1_000, 1_000)
        .expect("seal")
}

#[test]
fn concurrent_verification_agrees() {
    let store = Arc::new(EpochStore::new(PowParams::REGTEST, 2).expect("store"));
    let blocks: Arc<Vec<Block>> = Arc::new((0..6).map(|i| block_at(&store, i * 7)).collect());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            let blocks = Arc::clone(&blocks);
            thread::spawn(move || {
                let mut rng = rand::thread_rng();
                for _ in 0..20 {
                    let block = &blocks[rng.gen_range(0..blocks.len())];
                    assert!(block.is_valid_with(&store, &ValidationConfig::default(), 1_000));
                    assert!(store.resident_epochs().len() <= 2);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("verifier thread");
    }
}

#[test]
fn shutdown_fails_closed() {
    let store = EpochStore::new(PowParams::REGTEST, 2).expect("store");
    let block = block_at(&store, 3);
    assert!(block.validate_kawpow_proof_with(&store));

    store.shutdown();
    // Lookups are refused once the store is shut down.
    let mut far = block.clone();
    far.height = 10 * PowParams::REGTEST.epoch_length;
    assert!(!far.validate_kawpow_proof_with(&store));
    assert!(matches!(
        store.compute_hash(&[0u8; 32], 0, far.height),
        Err(PowError::Cancelled)
    ));
}
