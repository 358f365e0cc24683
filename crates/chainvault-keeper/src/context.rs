// SPDX-FileCopyrightText: 2026 Chainvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use chainvault_config::model::{KdfProfile, VaultConfig};
use chainvault_config::ChainVaultConfig;
use chainvault_core::{ChainVaultError, RaisedError};
use chainvault_crypto::KdfParams;
use chainvault_store::{EntryStore, UnsavedState};
use chainvault_vault::Vault;
use tokio::sync::mpsc;
use tracing::debug;

use crate::keeper::VaultKeeper;
use crate::lock;
use crate::report::error_channel;

/// Everything a front-end needs for one vault session.
///
/// Built once at startup and passed down explicitly.
#[derive(Debug)]
pub struct VaultContext {
    keeper: VaultKeeper,
    store: Arc<Mutex<EntryStore>>,
    unsaved: Arc<UnsavedState>,
    errors: mpsc::UnboundedReceiver<RaisedError>,
}

impl VaultContext {
    pub fn from_config(config: &ChainVaultConfig) -> Result<Self, ChainVaultError> {
        Self::new(
            kdf_params(&config.vault),
            PathBuf::from(&config.vault.default_path),
        )
    }

    pub fn new(params: KdfParams, default_path: PathBuf) -> Result<Self, ChainVaultError> {
        params.check()?;
        debug!(
            memory_cost = params.memory_cost,
            iterations = params.iterations,
            parallelism = params.parallelism,
            "starting vault session"
        );
        let unsaved = Arc::new(UnsavedState::new());
        let store = Arc::new(Mutex::new(EntryStore::new(Arc::clone(&unsaved))));
        let (reporter, errors) = error_channel();
        let keeper = VaultKeeper::spawn(
            Vault::new(params)?,
            default_path,
            Arc::clone(&store),
            Arc::clone(&unsaved),
            reporter,
        )?;

        Ok(Self {
            keeper,
            store,
            unsaved,
            errors,
        })
    }

    pub fn keeper(&self) -> &VaultKeeper {
        &self.keeper
    }

    /// The entry store of the unlocked vault.
    ///
    /// The keeper never holds this lock together with the key chain. A
    /// caller that needs both takes the store first, then
    /// [`VaultKeeper::lock_direct`].
    pub fn store(&self) -> MutexGuard<'_, EntryStore> {
        lock(&self.store)
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved.has_changed()
    }

    /// Errors raised by the keeper since the last call, oldest first.
    pub fn drain_errors(&mut self) -> Vec<RaisedError> {
        let mut raised = Vec::new();
        while let Ok(error) = self.errors.try_recv() {
            raised.push(error);
        }
        raised
    }

    pub fn shutdown(&mut self) {
        self.keeper.shutdown();
    }
}

/// Argon2id costs for the configured profile, with explicit overrides applied.
fn kdf_params(config: &VaultConfig) -> KdfParams {
    let base = match config.kdf_profile {
        KdfProfile::Auto => KdfParams::for_build(),
        KdfProfile::Interactive => KdfParams::INTERACTIVE,
        KdfProfile::Sensitive => KdfParams::SENSITIVE,
    };
    KdfParams {
        memory_cost: config.kdf_memory_cost.unwrap_or(base.memory_cost),
        iterations: config.kdf_iterations.unwrap_or(base.iterations),
        parallelism: config.kdf_parallelism,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_costs_override_the_profile() {
        let config = VaultConfig {
            kdf_profile: KdfProfile::Sensitive,
            kdf_iterations: Some(6),
            kdf_parallelism: 2,
            ..VaultConfig::default()
        };
        let params = kdf_params(&config);
        assert_eq!(params.memory_cost, KdfParams::SENSITIVE.memory_cost);
        assert_eq!(params.iterations, 6);
        assert_eq!(params.parallelism, 2);
    }

    #[test]
    fn auto_profile_follows_the_build() {
        assert_eq!(kdf_params(&VaultConfig::default()), KdfParams::for_build());
    }
}
