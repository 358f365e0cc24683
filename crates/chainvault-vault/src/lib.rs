// SPDX-FileCopyrightText: 2026 Chainvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault layer for Chainvault.
//!
//! [`container`] owns the on-disk framing and [`vault`] the chained-unlock
//! protocol built on top of it. Neither holds any UI state: the command
//! executor in `chainvault-keeper` drives them one operation at a time.

pub mod container;
pub mod vault;

pub use vault::{MAX_LOCK_STEPS, Vault};
