//! Cross-crate test suite for the Zoints staking client.
//!
//! Integration tests live under `tests/`. This library holds the proptest
//! strategies and captured account fixtures they share.

pub mod helpers;
