//! Binary Merkle root over 32-byte leaves.
//!
//! Parents are `D(left || right)`. A level with an odd number of nodes pairs
//! its last node with itself. The root of an empty tree is 32 zero bytes.

use crate::{Digest, Hash};

/// Compute the Merkle root of `leaves` using `digest` for inner nodes.
pub fn merkle_root<D: Digest + ?Sized>(digest: &D, leaves: &[Hash]) -> Hash {
    if leaves.is_empty() {
        return [0u8; 32];
    }

    let mut level: Vec<Hash> = leaves.to_vec();
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| {
                let left = &pair[0];
                let right = pair.get(1).unwrap_or(left);
                hash_pair(digest, left, right)
            })
            .collect();
    }
    level[0]
}

/// Hash two sibling nodes into their parent.
pub fn hash_pair<D: Digest + ?Sized>(digest: &D, left: &Hash, right: &Hash) -> Hash {
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(left);
    buf[32..].copy_from_slice(right);
    digest.digest(&buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Sha256Digest;

    #[test]
    fn test_empty_root() {
        assert_eq!(merkle_root(&Sha256Digest, &[]), [0u8; 32]);
    }

    #[test]
    fn test_single_leaf_is_root() {
        let leaf = [0xAB; 32];
        assert_eq!(merkle_root(&Sha256Digest, &[leaf]), leaf);
    }

    #[test]
    fn test_two_leaves() {
        let a = [1u8; 32];
        let b = [2u8; 32];
        let expected = hash_pair(&Sha256Digest, &a, &b);
        assert_eq!(merkle_root(&Sha256Digest, &[a, b]), expected);
    }

    #[test]
    fn test_odd_leaf_duplicated() {
        let a = [1u8; 32];
        let b = [2u8; 32];
        let c = [3u8; 32];
        let ab = hash_pair(&Sha256Digest, &a, &b);
        let cc = hash_pair(&Sha256Digest, &c, &c);
        let expected = hash_pair(&Sha256Digest, &ab, &cc);
        assert_eq!(merkle_root(&Sha256Digest, &[a, b, c]), expected);
    }

    #[test]
    fn test_order_matters() {
        let a = [1u8; 32];
        let b = [2u8; 32];
        assert_ne!(
            merkle_root(&Sha256Digest, &[a, b]),
            merkle_root(&Sha256Digest, &[b, a])
        );
    }
}
