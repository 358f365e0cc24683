// SPDX-FileCopyrightText: 2026 Chainvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::atomic::{AtomicBool, Ordering};

/// Whether the open vault has changes that are not on disk yet.
///
/// Shared between the entry store, the keeper worker and the front-end.
#[derive(Debug, Default)]
pub struct UnsavedState {
    changed: AtomicBool,
}

impl UnsavedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify_change(&self) {
        self.changed.store(true, Ordering::Release);
    }

    pub fn clear_change(&self) {
        self.changed.store(false, Ordering::Release);
    }

    pub fn has_changed(&self) -> bool {
        self.changed.load(Ordering::Acquire)
    }
}
