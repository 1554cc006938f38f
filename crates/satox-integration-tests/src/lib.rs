//! Integration test crate for Satox proof-of-work and blocks.
//!
//! This crate has no library code. It only contains integration tests that
//! exercise block sealing, JSON transport and validation across the
//! workspace crates.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p satox-integration-tests
//! ```
