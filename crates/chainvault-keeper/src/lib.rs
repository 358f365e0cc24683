// SPDX-FileCopyrightText: 2026 Chainvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command executor for Chainvault sessions.
//!
//! A [`VaultKeeper`] runs every vault mutation on one worker thread. The
//! front-end enqueues [`Command`]s, polls the returned [`CommandHandle`]s
//! and maps each resulting [`Transition`](chainvault_core::Transition) to a
//! view change. [`VaultContext`] bundles the keeper with the shared entry
//! store, the unsaved flag and the raised-error receiver.

pub mod chain;
pub mod command;
pub mod context;
pub mod keeper;
mod queue;
pub mod report;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use chain::{HintsGuard, KeyChain};
pub use command::{Command, CommandHandle, CommandStatus};
pub use context::VaultContext;
pub use keeper::VaultKeeper;
pub use report::{ErrorReporter, error_channel};

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
