//! # satox-crypto
//!
//! Hashing primitives consumed by the Satox proof-of-work engine.
//!
//! The engine never calls a hash function directly. It goes through the
//! [`Digest`] and [`Sponge`] capability traits so that alternate backends can
//! be substituted without touching cache, dataset or mix logic.
//!
//! ## Modules
//!
//! - [`digest`] — Fixed 32-byte digests (SHA-256 default, BLAKE3 alternate)
//! - [`sponge`] — Absorb/squeeze sponge used to fill the epoch cache
//! - [`merkle`] — Binary Merkle root over 32-byte leaves

pub mod digest;
pub mod merkle;
pub mod sponge;

pub use digest::{Blake3Digest, Digest, Sha256Digest};
pub use sponge::{Blake3Sponge, Sponge};

/// Output length of every [`Digest`] backend, in bytes.
pub const DIGEST_LEN: usize = 32;

/// A 32-byte digest value.
pub type Hash = [u8; DIGEST_LEN];
