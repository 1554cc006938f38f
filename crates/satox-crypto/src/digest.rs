//! Fixed-output digest backends.
//!
//! The PoW engine hashes the header, the little-endian nonce and the final
//! mix buffer through a [`Digest`]. Consensus uses [`Sha256Digest`].

use sha2::Digest as _;

use crate::Hash;

/// A deterministic 32-byte hash function.
pub trait Digest: Send + Sync {
    /// Hash `data` in one shot.
    fn digest(&self, data: &[u8]) -> Hash;

    /// Short backend name, used in log fields.
    fn name(&self) -> &'static str;
}

/// SHA-256 (FIPS 180-4).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sha256Digest;

impl Digest for Sha256Digest {
    fn digest(&self, data: &[u8]) -> Hash {
        let mut hasher = sha2::Sha256::new();
        hasher.update(data);
        hasher.finalize().into()
    }

    fn name(&self) -> &'static str {
        "sha256"
    }
}

/// BLAKE3 in plain hashing mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Blake3Digest;

impl Digest for Blake3Digest {
    fn digest(&self, data: &[u8]) -> Hash {
        *::blake3::hash(data).as_bytes()
    }

    fn name(&self) -> &'static str {
        "blake3"
    }
}
