// SPDX-FileCopyrightText: 2026 Chainvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cryptographic primitives for the Chainvault password vault.
//!
//! Every secret produced here lives in a [`SecureBuffer`]. Protocol logic
//! belongs to `chainvault-vault`; this crate only exposes:
//!
//! - [`secure`]: the zero-on-drop buffer type
//! - [`random`]: system CSPRNG
//! - [`kdf`]: Argon2id password keys
//! - [`hash`]: SHA-256 digests
//! - [`chest`]: XChaCha20-Poly1305 sealing with caller-supplied nonces
//! - [`encoding`]: URL-safe base64

pub mod chest;
pub mod encoding;
pub mod hash;
pub mod kdf;
pub mod random;
pub mod secure;

pub use kdf::{KdfParams, derive_password_key};
pub use secure::SecureBuffer;
