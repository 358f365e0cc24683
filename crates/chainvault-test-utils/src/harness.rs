// SPDX-FileCopyrightText: 2026 Chainvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Harness that builds a saved vault and replays unlock sequences.

use std::path::{Path, PathBuf};

use chainvault_core::{ChainVaultError, Transition};
use chainvault_keeper::{CommandHandle, VaultContext, VaultKeeper};
use secrecy::SecretString;
use tempfile::TempDir;
use tracing::debug;

use crate::{fast_kdf, secret};

/// Builder for a vault saved under a temp directory.
pub struct TestVaultBuilder {
    hints: Vec<(String, String)>,
    entries: Vec<(String, String)>,
}

impl TestVaultBuilder {
    fn new() -> Self {
        Self {
            hints: Vec::new(),
            entries: Vec::new(),
        }
    }

    /// Add a hint and the password that answers it.
    pub fn with_hint(mut self, hint: &str, password: &str) -> Self {
        self.hints.push((hint.to_string(), password.to_string()));
        self
    }

    /// Add a text entry to the saved content.
    pub fn with_text_entry(mut self, name: &str, value: &str) -> Self {
        self.entries.push((name.to_string(), value.to_string()));
        self
    }

    /// Create, populate, save and close the vault.
    pub fn build(self) -> Result<TestVault, ChainVaultError> {
        let temp_dir = TempDir::new().map_err(|e| ChainVaultError::io("failed to create temp dir", e))?;
        let path = temp_dir.path().join("test-vault.bin");
        let context = VaultContext::new(fast_kdf(), temp_dir.path().join("default.bin"))?;
        let keeper = context.keeper();

        expect(keeper.create_vault(&path), Transition::SwitchToLockSetup)?;
        {
            let mut hints = keeper.lock_direct();
            for (hint, _) in &self.hints {
                hints.add_hint(hint);
            }
        }
        for (index, (_, password)) in self.hints.iter().enumerate() {
            expect(keeper.set_hint_key(index, &secret(password)), Transition::Success)?;
        }
        {
            let mut store = context.store();
            for (name, value) in &self.entries {
                store.add_text(name, SecretString::from(value.clone()))?;
            }
        }
        expect(keeper.save_vault(true), Transition::CloseVault)?;
        expect(keeper.close_vault(), Transition::SwitchToWelcome)?;
        debug!(path = %path.display(), hints = self.hints.len(), "built test vault");

        Ok(TestVault {
            passwords: self.hints.into_iter().map(|(_, password)| password).collect(),
            path,
            context,
            _temp_dir: temp_dir,
        })
    }
}

/// A vault file on disk plus a session that can reopen it.
pub struct TestVault {
    passwords: Vec<String>,
    path: PathBuf,
    context: VaultContext,
    _temp_dir: TempDir,
}

impl TestVault {
    pub fn builder() -> TestVaultBuilder {
        TestVaultBuilder::new()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The passwords the vault was saved with, in hint order.
    pub fn passwords(&self) -> Vec<&str> {
        self.passwords.iter().map(String::as_str).collect()
    }

    pub fn context(&self) -> &VaultContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut VaultContext {
        &mut self.context
    }

    pub fn keeper(&self) -> &VaultKeeper {
        self.context.keeper()
    }

    /// Open the vault and submit `passwords` in order, collecting every
    /// transition. Stops early if a step does not advance.
    pub fn unlock_with(&self, passwords: &[&str]) -> Vec<Transition> {
        let keeper = self.keeper();
        let mut transitions = vec![resolve(keeper.open_vault(&self.path))];
        for password in passwords {
            if !matches!(
                transitions.last(),
                Some(Transition::SwitchToLogin | Transition::FetchNextHint)
            ) {
                break;
            }
            transitions.push(resolve(keeper.submit_password(&secret(password))));
        }
        transitions
    }

    /// Unlock with the saved passwords and return the final transition.
    pub fn unlock(&self) -> Transition {
        let passwords = self.passwords();
        self.unlock_with(&passwords)
            .last()
            .copied()
            .unwrap_or(Transition::Failed)
    }
}

/// Block on a handle. A discarded command counts as `Failed`.
pub fn resolve(handle: CommandHandle) -> Transition {
    handle.wait().unwrap_or(Transition::Failed)
}

fn expect(handle: CommandHandle, wanted: Transition) -> Result<(), ChainVaultError> {
    let got = resolve(handle);
    if got == wanted {
        Ok(())
    } else {
        Err(ChainVaultError::Validation(format!(
            "expected {wanted}, keeper returned {got}"
        )))
    }
}
