// SPDX-FileCopyrightText: 2026 Chainvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Chainvault workspace.
//!
//! The variants follow the three failure classes of the unlock protocol:
//! validation errors are rejected locally, integrity errors are surfaced as
//! recoverable failures, and resource exhaustion always ends the session.

use thiserror::Error;

/// The primary error type used by every Chainvault layer.
#[derive(Debug, Error)]
pub enum ChainVaultError {
    /// Bad argument sizes, ranges, or empty inputs.
    #[error("validation error: {0}")]
    Validation(String),

    /// Authentication failure, malformed container framing, or a step count
    /// that does not match the data that follows it.
    #[error("integrity error: {0}")]
    Integrity(String),

    /// Secure allocation or OS randomness could not be obtained.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// File-system failure while reading or writing a vault or an attachment.
    #[error("{context}: {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },

    /// The entry-store document could not be produced or parsed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Configuration the vault cannot run with, such as Argon2id costs that
    /// the library rejects.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ChainVaultError {
    /// Wraps an I/O error with a short description of what was attempted.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Whether the session can no longer be trusted after this error.
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::ResourceExhausted(_))
    }
}
