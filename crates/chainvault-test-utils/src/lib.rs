// SPDX-FileCopyrightText: 2026 Chainvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Chainvault integration tests.
//!
//! - [`fast_kdf`] - Argon2id parameters cheap enough for debug test runs
//! - [`TestVault`] - a saved vault in a temp directory, driven through the keeper

pub mod harness;

use chainvault_crypto::{KdfParams, SecureBuffer};

pub use harness::{TestVault, TestVaultBuilder, resolve};

/// 256 KiB, one pass, one lane.
pub fn fast_kdf() -> KdfParams {
    KdfParams {
        memory_cost: 256,
        iterations: 1,
        parallelism: 1,
    }
}

/// Wrap a test password in a secure buffer.
pub fn secret(text: &str) -> SecureBuffer {
    SecureBuffer::from_slice(text.as_bytes()).expect("allocate test secret")
}
