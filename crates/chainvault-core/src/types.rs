// SPDX-FileCopyrightText: 2026 Chainvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Result codes delivered from the command executor to the front-end.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The outcome of a queued vault command, mapped by the front-end to a view
/// change.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum Transition {
    /// The command was rejected; stay on the current view.
    Failed,
    /// The command completed; stay on the current view.
    Success,
    /// Return to the entry screen.
    SwitchToWelcome,
    /// A vault was opened and its first hint revealed.
    SwitchToLogin,
    /// The vault content is available.
    SwitchToMainView,
    /// Configure hints and passwords of an unsaved vault.
    SwitchToLockSetup,
    /// Another hint was revealed; prompt for the next password.
    FetchNextHint,
    /// The session can no longer be trusted; only exit remains.
    CriticalError,
    /// The vault was saved and should now be closed.
    CloseVault,
}

/// An error raised while executing a command, for display by the front-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaisedError {
    /// Human-readable description. Never contains secret material.
    pub message: String,
    /// Critical errors force the terminal error view.
    pub critical: bool,
}
