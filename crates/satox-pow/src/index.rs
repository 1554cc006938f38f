//! Index arithmetic for cache and dataset addressing.
//!
//! Every byte offset used during generation and mixing is computed here so
//! that the modulus and stride are explicit and testable on their own.
//! Item counts of zero map every index to 0; callers never address an empty
//! buffer.

use crate::params::{ITEM_BYTES, MIX_BYTES, WORD_BYTES};

/// Number of whole 64-byte items in a buffer of `len` bytes.
pub fn item_count(len: usize) -> u64 {
    (len / ITEM_BYTES) as u64
}

/// Byte offset of an item index.
pub fn item_offset(index: u64) -> usize {
    index as usize * ITEM_BYTES
}

/// Byte offset of the `k`-th word selected while mixing the cache slot at
/// `slot_offset`: `(slot_offset + k * 8) mod len`.
pub fn cache_word_offset(slot_offset: usize, k: usize, len: usize) -> usize {
    slot_offset
        .wrapping_add(k.wrapping_mul(WORD_BYTES))
        .checked_rem(len)
        .unwrap_or(0)
}

/// Cache item that seeds dataset item `i`: `i mod cache_items`.
pub fn cache_item_index(i: u64, cache_items: u64) -> u64 {
    i.checked_rem(cache_items).unwrap_or(0)
}

/// `j`-th parent of dataset item `i`: `(i * parents + j) mod cache_items`.
pub fn parent_index(i: u64, j: u32, parents: u32, cache_items: u64) -> u64 {
    i.wrapping_mul(u64::from(parents))
        .wrapping_add(u64::from(j))
        .checked_rem(cache_items)
        .unwrap_or(0)
}

/// Dataset item selected by the current mix state: the first 8 mix bytes as
/// a big-endian integer, modulo `dataset_items`.
pub fn dataset_index(mix: &[u8; MIX_BYTES], dataset_items: u64) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(&mix[..8]);
    u64::from_be_bytes(word)
        .checked_rem(dataset_items)
        .unwrap_or(0)
}
