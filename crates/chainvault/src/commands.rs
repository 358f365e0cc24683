// SPDX-FileCopyrightText: 2026 Chainvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand implementations. Each one runs a full session: unlock, act,
//! save if anything changed, close.

use std::path::Path;

use chainvault_core::{ChainVaultError, Transition};
use chainvault_keeper::VaultContext;
use secrecy::ExposeSecret;
use tracing::info;

use crate::prompt::{PasswordSource, to_buffer};
use crate::session::{close, expect, save_and_close, unlock};

/// Create a vault at `path` with one password per hint and no entries.
pub fn create(
    context: &mut VaultContext,
    path: &Path,
    hints: &[String],
    passwords: &mut PasswordSource,
) -> Result<(), ChainVaultError> {
    if path.exists() {
        return Err(ChainVaultError::Validation(format!(
            "{} already exists",
            path.display()
        )));
    }

    let handle = context.keeper().create_vault(path);
    expect(context, handle, Transition::SwitchToLockSetup)?;
    {
        let mut guard = context.keeper().lock_direct();
        for hint in hints {
            guard.add_hint(hint);
        }
    }
    for (index, hint) in hints.iter().enumerate() {
        let password = to_buffer(&passwords.next_confirmed(hint)?)?;
        let handle = context.keeper().set_hint_key(index, &password);
        drop(password);
        expect(context, handle, Transition::Success)?;
    }

    save_and_close(context)?;
    info!(path = %path.display(), hints = hints.len(), "created vault");
    Ok(())
}

/// Print `name<TAB>kind` for every entry.
pub fn list(
    context: &mut VaultContext,
    path: &Path,
    passwords: &mut PasswordSource,
) -> Result<(), ChainVaultError> {
    unlock(context, path, passwords)?;
    {
        let store = context.store();
        for index in 0..store.len() {
            let kind = if store.is_file(index) { "file" } else { "text" };
            println!("{}\t{kind}", store.name(index)?);
        }
    }
    close(context)
}

/// Print the value of a text entry.
pub fn show(
    context: &mut VaultContext,
    path: &Path,
    name: &str,
    passwords: &mut PasswordSource,
) -> Result<(), ChainVaultError> {
    unlock(context, path, passwords)?;
    let shown = {
        let store = context.store();
        find(&store, name).and_then(|index| {
            let value = store.text(index)?;
            println!("{}", value.expose_secret());
            Ok(())
        })
    };
    close(context)?;
    shown
}

/// Add a text entry, or replace the value of an existing one.
pub fn put(
    context: &mut VaultContext,
    path: &Path,
    name: &str,
    passwords: &mut PasswordSource,
) -> Result<(), ChainVaultError> {
    unlock(context, path, passwords)?;
    let stored = passwords.next(&format!("value for {name}")).and_then(|value| {
        let mut store = context.store();
        match store.find(name) {
            Some(index) if store.is_text(index) => store.change_text(index, value),
            Some(index) => {
                store.remove(index)?;
                store.add_text(name, value)
            }
            None => store.add_text(name, value),
        }
    });
    finish(context, stored)
}

/// Store the content of `file` under `name`.
pub fn attach(
    context: &mut VaultContext,
    path: &Path,
    name: &str,
    file: &Path,
    passwords: &mut PasswordSource,
) -> Result<(), ChainVaultError> {
    unlock(context, path, passwords)?;
    let stored = {
        let mut store = context.store();
        match store.find(name) {
            Some(index) if store.is_file(index) => store.change_file(index, file),
            Some(index) => store.remove(index).and_then(|()| store.add_file(name, file)),
            None => store.add_file(name, file),
        }
    };
    finish(context, stored)
}

/// Write the content of file entry `name` to `out`.
pub fn extract(
    context: &mut VaultContext,
    path: &Path,
    name: &str,
    out: &Path,
    passwords: &mut PasswordSource,
) -> Result<(), ChainVaultError> {
    unlock(context, path, passwords)?;
    let extracted = {
        let store = context.store();
        find(&store, name).and_then(|index| store.extract_file(index, out))
    };
    close(context)?;
    extracted
}

/// Delete entry `name`.
pub fn remove(
    context: &mut VaultContext,
    path: &Path,
    name: &str,
    passwords: &mut PasswordSource,
) -> Result<(), ChainVaultError> {
    unlock(context, path, passwords)?;
    let removed = {
        let mut store = context.store();
        find(&store, name).and_then(|index| store.remove(index))
    };
    finish(context, removed)
}

fn find(store: &chainvault_store::EntryStore, name: &str) -> Result<usize, ChainVaultError> {
    store
        .find(name)
        .ok_or_else(|| ChainVaultError::Validation(format!("no entry named \"{name}\"")))
}

/// Save on success, otherwise close without writing.
fn finish(
    context: &mut VaultContext,
    outcome: Result<(), ChainVaultError>,
) -> Result<(), ChainVaultError> {
    match outcome {
        Ok(()) => save_and_close(context),
        Err(e) => {
            close(context)?;
            Err(e)
        }
    }
}
