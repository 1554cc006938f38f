//! Difficulty targets.
//!
//! A hash satisfies a target when it is strictly less than the target,
//! compared byte-wise with the most significant byte first.
//!
//! The difficulty mapping is coarse: the target is all `0xFF`
//! except the first byte, which is `0xFF >> (difficulty % 8)`. Only the low
//! three bits of the difficulty matter and larger values alias. Existing
//! chain data depends on this mapping.

use crate::params::HASH_BYTES;

/// A 32-byte big-endian target.
pub type Target = [u8; HASH_BYTES];

/// The easiest possible target.
pub const MAX_TARGET: Target = [0xFF; HASH_BYTES];

/// Map a block difficulty to its target.
pub fn difficulty_to_target(difficulty: u32) -> Target {
    let mut target = MAX_TARGET;
    target[0] = 0xFF >> (difficulty % 8);
    target
}

/// Whether `hash` is strictly below `target` in lexicographic byte order.
pub fn meets_target(hash: &[u8], target: &[u8]) -> bool {
    hash < target
}

/// Count leading zero bits in a byte slice.
pub fn leading_zero_bits(data: &[u8]) -> u32 {
    let mut count = 0u32;
    for byte in data {
        if *byte == 0 {
            count += 8;
        } else {
            count += byte.leading_zeros();
            break;
        }
    }
    count
}
