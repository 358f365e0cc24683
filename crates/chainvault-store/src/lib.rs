// SPDX-FileCopyrightText: 2026 Chainvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Password entries held inside an unlocked vault.
//!
//! The vault layer only sees the serialized document as an opaque byte
//! payload; this crate owns its shape.

pub mod entries;
pub mod unsaved;

pub use entries::{EntryStore, EntryValue};
pub use unsaved::UnsavedState;
