// SPDX-FileCopyrightText: 2026 Chainvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queued commands and the handles their results arrive on.

use std::path::PathBuf;

use chainvault_core::Transition;
use chainvault_crypto::SecureBuffer;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

/// A deferred vault operation, executed by the keeper worker.
#[derive(Debug, strum::IntoStaticStr)]
pub enum Command {
    Open(PathBuf),
    Create(PathBuf),
    Close,
    SubmitPassword(SecureBuffer),
    SetHintKey(usize, SecureBuffer),
    Save { close: bool },
    ResetSalts,
}

/// A command paired with the sender its result is delivered on.
#[derive(Debug)]
pub(crate) struct Task {
    pub(crate) command: Command,
    pub(crate) reply: oneshot::Sender<Transition>,
}

/// What a [`CommandHandle`] currently knows about its command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    /// Queued or executing.
    Pending,
    /// Executed with this result.
    Ready(Transition),
    /// Dropped unexecuted during shutdown. This is not a failure.
    Discarded,
}

#[derive(Debug)]
enum HandleState {
    Waiting(oneshot::Receiver<Transition>),
    Done(Transition),
    Discarded,
}

/// Receiving end of one queued command.
#[derive(Debug)]
pub struct CommandHandle {
    state: HandleState,
}

impl CommandHandle {
    pub(crate) fn pending(receiver: oneshot::Receiver<Transition>) -> Self {
        Self {
            state: HandleState::Waiting(receiver),
        }
    }

    pub(crate) fn ready(transition: Transition) -> Self {
        Self {
            state: HandleState::Done(transition),
        }
    }

    /// Non-blocking readiness check, meant to be called once per UI tick.
    pub fn poll(&mut self) -> CommandStatus {
        if let HandleState::Waiting(receiver) = &mut self.state {
            match receiver.try_recv() {
                Ok(transition) => self.state = HandleState::Done(transition),
                Err(TryRecvError::Empty) => return CommandStatus::Pending,
                Err(TryRecvError::Closed) => self.state = HandleState::Discarded,
            }
        }

        match self.state {
            HandleState::Done(transition) => CommandStatus::Ready(transition),
            _ => CommandStatus::Discarded,
        }
    }

    /// Block until the command has run. `None` means it was discarded.
    ///
    /// Must not be called from inside an async runtime.
    pub fn wait(self) -> Option<Transition> {
        match self.state {
            HandleState::Waiting(receiver) => receiver.blocking_recv().ok(),
            HandleState::Done(transition) => Some(transition),
            HandleState::Discarded => None,
        }
    }
}
