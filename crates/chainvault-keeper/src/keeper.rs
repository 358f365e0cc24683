// SPDX-FileCopyrightText: 2026 Chainvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The vault keeper: a single background worker that owns the vault and
//! executes queued commands one at a time.
//!
//! The front-end only enqueues commands and polls their handles, so slow
//! key derivation never blocks it. Between the unlock steps the key chain
//! holds the pre-key followed by each password key; after the final
//! password the pre-key is dropped and the chain holds exactly one key per
//! hint, ready for re-locking on save.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use chainvault_core::{ChainVaultError, Transition};
use chainvault_crypto::SecureBuffer;
use chainvault_store::{EntryStore, UnsavedState};
use chainvault_vault::{MAX_LOCK_STEPS, Vault};
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use crate::chain::{HintsGuard, KeyChain};
use crate::command::{Command, CommandHandle, Task};
use crate::lock;
use crate::queue::TaskQueue;
use crate::report::ErrorReporter;

const WORKER_THREAD_NAME: &str = "vault-keeper";

/// Front-end handle to the keeper worker.
///
/// Every command method returns immediately with a [`CommandHandle`].
/// Commands run strictly in submission order. Dropping the keeper shuts the
/// worker down.
#[derive(Debug)]
pub struct VaultKeeper {
    queue: Arc<TaskQueue>,
    chain: Arc<Mutex<KeyChain>>,
    unsaved: Arc<UnsavedState>,
    reporter: ErrorReporter,
    worker: Option<JoinHandle<()>>,
}

impl VaultKeeper {
    /// Start the worker thread. `default_path` is the file a closed or new
    /// session points at.
    pub fn spawn(
        vault: Vault,
        default_path: PathBuf,
        store: Arc<Mutex<EntryStore>>,
        unsaved: Arc<UnsavedState>,
        reporter: ErrorReporter,
    ) -> Result<Self, ChainVaultError> {
        let queue = Arc::new(TaskQueue::default());
        let chain = Arc::new(Mutex::new(KeyChain::default()));

        let worker = Worker {
            vault,
            path: default_path.clone(),
            default_path,
            chain: Arc::clone(&chain),
            store,
            unsaved: Arc::clone(&unsaved),
            reporter: reporter.clone(),
        };
        let worker_queue = Arc::clone(&queue);
        let handle = std::thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || worker.run(&worker_queue))
            .map_err(|e| ChainVaultError::io("failed to start vault keeper", e))?;

        Ok(Self {
            queue,
            chain,
            unsaved,
            reporter,
            worker: Some(handle),
        })
    }

    /// Read the header of `path` and reveal its first hint.
    pub fn open_vault(&self, path: impl Into<PathBuf>) -> CommandHandle {
        self.send(Command::Open(path.into()))
    }

    /// Start a new, empty vault that will be placed at `path`.
    pub fn create_vault(&self, path: impl Into<PathBuf>) -> CommandHandle {
        self.send(Command::Create(path.into()))
    }

    /// Drop every secret of the session. Idempotent.
    pub fn close_vault(&self) -> CommandHandle {
        self.send(Command::Close)
    }

    /// Answer the last revealed hint. The password is copied, so the caller
    /// can wipe its buffer as soon as this returns.
    pub fn submit_password(&self, password: &SecureBuffer) -> CommandHandle {
        self.send_secret(password, Command::SubmitPassword)
    }

    /// Set the password for hint `index` during lock setup.
    pub fn set_hint_key(&self, index: usize, password: &SecureBuffer) -> CommandHandle {
        self.send_secret(password, |copy| Command::SetHintKey(index, copy))
    }

    /// Re-lock the content under the current chain and write the file.
    pub fn save_vault(&self, close: bool) -> CommandHandle {
        self.send(Command::Save { close })
    }

    /// Draw a fresh salt and pre-key. Every hint key must be set again.
    pub fn reset_salts(&self) -> CommandHandle {
        self.send(Command::ResetSalts)
    }

    /// The most recently revealed hint, if any.
    pub fn last_hint(&self) -> Option<String> {
        lock(&self.chain).last_hint().map(str::to_string)
    }

    /// Lock the hint list for direct editing.
    ///
    /// Queued commands that need the chain wait until the guard is dropped.
    pub fn lock_direct(&self) -> HintsGuard<'_> {
        HintsGuard::new(lock(&self.chain), &self.unsaved)
    }

    /// Stop the worker. The command in flight completes; queued commands
    /// are discarded. Idempotent.
    pub fn shutdown(&mut self) {
        self.queue.stop();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("vault keeper worker panicked");
            }
            let discarded = self.queue.clear();
            if discarded > 0 {
                info!(discarded, "vault keeper stopped with pending commands");
            }
        }
    }

    fn send(&self, command: Command) -> CommandHandle {
        let (reply, receiver) = oneshot::channel();
        self.queue.push(Task { command, reply });
        CommandHandle::pending(receiver)
    }

    fn send_secret(
        &self,
        password: &SecureBuffer,
        command: impl FnOnce(SecureBuffer) -> Command,
    ) -> CommandHandle {
        match password.try_clone() {
            Ok(copy) => self.send(command(copy)),
            Err(e) => CommandHandle::ready(
                self.reporter
                    .raise(format!("failed to copy password: {e}"), true),
            ),
        }
    }
}

impl Drop for VaultKeeper {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// State owned by the worker thread.
struct Worker {
    vault: Vault,
    path: PathBuf,
    default_path: PathBuf,
    chain: Arc<Mutex<KeyChain>>,
    store: Arc<Mutex<EntryStore>>,
    unsaved: Arc<UnsavedState>,
    reporter: ErrorReporter,
}

impl Worker {
    fn run(mut self, queue: &TaskQueue) {
        debug!("vault keeper started");
        while let Some(task) = queue.next() {
            let name: &'static str = (&task.command).into();
            let transition = self.execute(task.command);
            debug!(command = name, %transition, "command finished");
            if task.reply.send(transition).is_err() {
                debug!(command = name, "command handle dropped before completion");
            }
        }
        debug!("vault keeper stopped");
    }

    fn execute(&mut self, command: Command) -> Transition {
        match command {
            Command::Open(path) => self.open(path),
            Command::Create(path) => self.create(path),
            Command::Close => self.close(),
            Command::SubmitPassword(password) => self.submit_password(&password),
            Command::SetHintKey(index, password) => self.set_hint_key(index, &password),
            Command::Save { close } => self.save(close),
            Command::ResetSalts => self.reset_salts(),
        }
    }

    fn open(&mut self, path: PathBuf) -> Transition {
        // Nothing from a previously unlocked vault may leak into this one.
        self.close();

        if let Err(e) = self.vault.open(&path) {
            self.reporter
                .raise(format!("failed to open {}: {e}", path.display()), false);
            return Transition::SwitchToWelcome;
        }
        info!(path = %path.display(), steps = self.vault.lock_step_count(), "opened vault");

        let pre_key = match self.vault.first_key().try_clone() {
            Ok(key) => key,
            Err(e) => return self.reporter.raise(format!("failed to copy pre-key: {e}"), true),
        };
        match self.vault.unlock_step(&pre_key, 0) {
            Ok(hint) => {
                self.path = path;
                lock(&self.chain).push_unlocked(hint, pre_key);
                Transition::SwitchToLogin
            }
            Err(e) => {
                self.reporter
                    .raise(format!("failed to reveal the first hint: {e}"), false);
                self.close()
            }
        }
    }

    fn create(&mut self, path: PathBuf) -> Transition {
        if let Err(e) = self.vault.generate_new() {
            return self
                .reporter
                .raise(format!("failed to generate vault secrets: {e}"), true);
        }
        info!(path = %path.display(), "created vault");
        self.path = path;
        lock(&self.chain).clear();
        self.unsaved.notify_change();
        Transition::SwitchToLockSetup
    }

    fn close(&mut self) -> Transition {
        lock(&self.chain).clear();
        self.vault.reset();
        lock(&self.store).reset();
        self.path.clone_from(&self.default_path);
        self.unsaved.clear_change();
        debug!("closed vault");
        Transition::SwitchToWelcome
    }

    fn submit_password(&mut self, password: &SecureBuffer) -> Transition {
        let password = password.as_c_str();
        if password.is_empty() || self.vault.lock_step_count() == 0 {
            return Transition::Failed;
        }

        let key = match self.vault.create_key(password) {
            Ok(key) => key,
            Err(e) => {
                return self
                    .reporter
                    .raise(format!("failed to derive password key: {e}"), e.is_critical());
            }
        };

        let (revealed, step_count) = {
            let chain = lock(&self.chain);
            (chain.key_count(), self.vault.lock_step_count())
        };
        if revealed < step_count {
            return self.unlock_next_step(key, revealed);
        }
        self.unlock_block(key)
    }

    fn unlock_next_step(&mut self, key: SecureBuffer, index: usize) -> Transition {
        match self.vault.unlock_step(&key, index) {
            Ok(hint) => {
                lock(&self.chain).push_unlocked(hint, key);
                Transition::FetchNextHint
            }
            Err(e) => {
                debug!(index, "lock step rejected the password");
                self.reporter
                    .raise(format!("failed to unlock the next hint: {e}"), e.is_critical())
            }
        }
    }

    fn unlock_block(&mut self, key: SecureBuffer) -> Transition {
        let master = {
            let chain = lock(&self.chain);
            let Some(keys) = chain.assigned_keys() else {
                return self.reporter.raise("key chain is incomplete", true);
            };
            Vault::create_master_key(&keys, Some(&key))
        };
        let master = match master {
            Ok(master) => master,
            Err(e) => return self.reporter.raise(format!("failed to create master key: {e}"), true),
        };

        if let Err(e) = self.vault.unlock_block(&master) {
            return self
                .reporter
                .raise(format!("failed to unlock the vault: {e}"), e.is_critical());
        }
        lock(&self.chain).shift_in(key);

        let loaded = match self.vault.block_plaintext() {
            Some(plain) => std::str::from_utf8(plain)
                .map_err(|_| ChainVaultError::Integrity("vault content is not UTF-8".to_string()))
                .and_then(|text| lock(&self.store).deserialize(text)),
            None => Err(ChainVaultError::Integrity(
                "unlocked block has no content".to_string(),
            )),
        };
        self.vault.reset_cache();
        if let Err(e) = loaded {
            return self
                .reporter
                .raise(format!("failed to load vault content: {e}"), true);
        }

        self.unsaved.clear_change();
        info!(path = %self.path.display(), "unlocked vault");
        Transition::SwitchToMainView
    }

    fn set_hint_key(&mut self, index: usize, password: &SecureBuffer) -> Transition {
        let password = password.as_c_str();
        if password.is_empty() || index >= lock(&self.chain).key_count() {
            return Transition::Failed;
        }

        let key = match self.vault.create_key(password) {
            Ok(key) => key,
            Err(e) => {
                return self
                    .reporter
                    .raise(format!("failed to derive password key: {e}"), e.is_critical());
            }
        };
        if !lock(&self.chain).set_key(index, key) {
            return Transition::Failed;
        }
        self.unsaved.notify_change();
        Transition::Success
    }

    fn save(&mut self, close: bool) -> Transition {
        // Steps are only cached between a load and the final unlock.
        if self.vault.lock_step_count() != 0 {
            return self
                .reporter
                .raise("cannot save a vault that is still being unlocked", false);
        }

        // Never hold the store and the chain at the same time.
        let content = match lock(&self.store).serialize() {
            Ok(content) => content,
            Err(e) => return self.save_failed("failed to serialize entries", &e),
        };

        let chain = lock(&self.chain);
        if chain.hint_count() == 0 {
            return self
                .reporter
                .raise("a vault needs at least one hint", false);
        }
        if chain.hint_count() > MAX_LOCK_STEPS {
            self.reporter.raise(
                format!("a vault holds at most {MAX_LOCK_STEPS} hints"),
                false,
            );
            return Transition::SwitchToLockSetup;
        }
        if chain.hints().any(str::is_empty) {
            self.reporter.raise("hints must not be empty", false);
            return Transition::SwitchToLockSetup;
        }
        let Some(keys) = chain.assigned_keys() else {
            self.reporter
                .raise("every hint needs a password before saving", false);
            return Transition::SwitchToLockSetup;
        };

        let hints: Vec<&str> = chain.hints().collect();
        if let Err(e) = seal(&mut self.vault, &hints, &keys, content.as_bytes()) {
            self.vault.reset_cache();
            return self.save_failed("failed to lock the vault", &e);
        }
        let placed = self.vault.place(&self.path);
        self.vault.reset_cache();
        if let Err(e) = placed {
            return self.save_failed("failed to write the vault", &e);
        }

        info!(path = %self.path.display(), hints = hints.len(), "saved vault");
        self.unsaved.clear_change();
        if close {
            Transition::CloseVault
        } else {
            Transition::SwitchToMainView
        }
    }

    fn save_failed(&self, context: &str, error: &ChainVaultError) -> Transition {
        let transition = self
            .reporter
            .raise(format!("{context}: {error}"), error.is_critical());
        if transition == Transition::CriticalError {
            transition
        } else {
            Transition::SwitchToLockSetup
        }
    }

    fn reset_salts(&mut self) -> Transition {
        if let Err(e) = self.vault.generate_new() {
            return self
                .reporter
                .raise(format!("failed to generate vault secrets: {e}"), true);
        }
        lock(&self.chain).clear_keys();
        self.unsaved.notify_change();
        warn!("salts reset, every hint key must be set again");
        Transition::Success
    }
}

/// Rebuild the lock steps and the final block from `hints` and their keys.
///
/// Step `i` is sealed with the key of the previous hint, the pre-key for
/// step 0. The block is sealed with the hash of the pre-key followed by
/// every hint key.
fn seal(
    vault: &mut Vault,
    hints: &[&str],
    keys: &[&SecureBuffer],
    content: &[u8],
) -> Result<(), ChainVaultError> {
    vault.renew_nonce()?;
    vault.reset_steps();

    let pre_key = vault.first_key().try_clone()?;
    let mut sealing_keys = Vec::with_capacity(keys.len() + 1);
    sealing_keys.push(&pre_key);
    sealing_keys.extend_from_slice(keys);

    for (hint, key) in hints.iter().zip(&sealing_keys) {
        vault.add_step(hint.as_bytes(), key)?;
    }
    let master = Vault::create_master_key(&sealing_keys, None)?;
    vault.lock_block(&master, content)
}
