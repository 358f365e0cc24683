// SPDX-FileCopyrightText: 2026 Chainvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Chainvault password vault.
//!
//! This crate provides the error taxonomy and the result codes shared by the
//! primitive, vault, and command-executor layers.

pub mod error;
pub mod types;

pub use error::ChainVaultError;
pub use types::{RaisedError, Transition};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_resource_exhaustion_is_critical() {
        assert!(ChainVaultError::ResourceExhausted("alloc".into()).is_critical());
        assert!(!ChainVaultError::Validation("size".into()).is_critical());
        assert!(!ChainVaultError::Integrity("mac".into()).is_critical());
        assert!(!ChainVaultError::Serialization("toml".into()).is_critical());
        assert!(!ChainVaultError::io("read", std::io::Error::other("gone")).is_critical());
    }

    #[test]
    fn io_error_display_includes_context() {
        let err = ChainVaultError::io(
            "failed to read vault.bin",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert_eq!(err.to_string(), "failed to read vault.bin: missing");
    }

    #[test]
    fn transition_display_round_trips() {
        use std::str::FromStr;

        let variants = [
            Transition::Failed,
            Transition::Success,
            Transition::SwitchToWelcome,
            Transition::SwitchToLogin,
            Transition::SwitchToMainView,
            Transition::SwitchToLockSetup,
            Transition::FetchNextHint,
            Transition::CriticalError,
            Transition::CloseVault,
        ];

        for variant in &variants {
            let parsed = Transition::from_str(&variant.to_string()).expect("should parse back");
            assert_eq!(*variant, parsed);
        }
    }
}
