//! End-to-end hashing with the consensus parameter table.

use satox_pow::params::{HASH_BYTES, HEADER_BYTES, MIX_BYTES};
use satox_pow::{EpochStore, PowEngine, PowParams};

fn sequential_header() -> [u8; HEADER_BYTES] {
    let mut header = [0u8; HEADER_BYTES];
    for (i, b) in header.iter_mut().enumerate() {
        *b = i as u8;
    }
    header
}

#[test]
fn mainnet_compute_then_verify() {
    let header = sequential_header();
    let nonce = 12345u64;

    let mut engine = PowEngine::new(PowParams::MAINNET).expect("engine");
    let out = engine.compute_hash(&header, nonce, 0).expect("compute");

    assert_eq!(out.hash.len(), HASH_BYTES);
    assert_eq!(out.mix_hash.len(), MIX_BYTES);
    assert_ne!(out.hash, [0u8; HASH_BYTES]);

    let mut m = out.mix_hash;
    assert!(engine.verify_hash(&header, nonce, 0, &m, &[0xFF; 32]));

    m[0] ^= 1;
    assert!(!engine.verify_hash(&header, nonce, 0, &m, &[0xFF; 32]));
}

#[test]
fn mainnet_engine_matches_global_store() {
    let header = sequential_header();
    let mut engine = PowEngine::new(PowParams::MAINNET).expect("engine");
    let from_engine = engine.compute_hash(&header, 777, 100).expect("engine");
    let from_store = EpochStore::global()
        .compute_hash(&header, 777, 100)
        .expect("store");
    assert_eq!(from_engine, from_store);
    assert_eq!(
        engine.dataset().len() as u128,
        PowParams::MAINNET.dataset_size(0).expect("size")
    );
}

#[test]
fn hex_helpers_are_lowercase() {
    let mut engine = PowEngine::new(PowParams::REGTEST).expect("engine");
    let out = engine
        .compute_hash(&sequential_header(), 1, 0)
        .expect("compute");
    let hash_hex = out.hash_hex();
    assert_eq!(hash_hex.len(), HASH_BYTES * 2);
    assert_eq!(out.mix_hash_hex().len(), MIX_BYTES * 2);
    assert_eq!(hash_hex, hash_hex.to_lowercase());
    assert_eq!(hex::decode(&hash_hex).expect("hex"), out.hash.to_vec());
}
