// SPDX-FileCopyrightText: 2026 Chainvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Blocking helpers that drive the keeper through a whole unlock or save.

use std::path::Path;

use chainvault_core::{ChainVaultError, Transition};
use chainvault_keeper::{CommandHandle, VaultContext};
use tracing::debug;

use crate::prompt::{PasswordSource, to_buffer};

/// Wait for `handle` and accept only `wanted`. Other results become an
/// error carrying whatever the keeper raised.
pub fn expect(
    context: &mut VaultContext,
    handle: CommandHandle,
    wanted: Transition,
) -> Result<(), ChainVaultError> {
    let got = resolve(handle)?;
    if got == wanted {
        return Ok(());
    }
    Err(failure(context, got))
}

fn resolve(handle: CommandHandle) -> Result<Transition, ChainVaultError> {
    handle.wait().ok_or_else(|| {
        ChainVaultError::Validation("vault keeper stopped before the command ran".to_string())
    })
}

fn failure(context: &mut VaultContext, got: Transition) -> ChainVaultError {
    let raised: Vec<String> = context
        .drain_errors()
        .into_iter()
        .map(|error| error.message)
        .collect();
    if raised.is_empty() {
        ChainVaultError::Validation(format!("unexpected vault state: {got}"))
    } else {
        ChainVaultError::Validation(raised.join("; "))
    }
}

/// Open `path` and answer every hint until the content is available.
pub fn unlock(
    context: &mut VaultContext,
    path: &Path,
    passwords: &mut PasswordSource,
) -> Result<(), ChainVaultError> {
    let handle = context.keeper().open_vault(path);
    expect(context, handle, Transition::SwitchToLogin)?;

    loop {
        let hint = context.keeper().last_hint().unwrap_or_default();
        let password = to_buffer(&passwords.next(&hint)?)?;
        let handle = context.keeper().submit_password(&password);
        drop(password);

        match resolve(handle)? {
            Transition::FetchNextHint => debug!("hint accepted"),
            Transition::SwitchToMainView => return Ok(()),
            Transition::Failed => {
                context.drain_errors();
                return Err(ChainVaultError::Validation(format!(
                    "wrong password for hint \"{hint}\""
                )));
            }
            other => return Err(failure(context, other)),
        }
    }
}

/// Save the open vault and close the session.
pub fn save_and_close(context: &mut VaultContext) -> Result<(), ChainVaultError> {
    let handle = context.keeper().save_vault(true);
    expect(context, handle, Transition::CloseVault)?;
    close(context)
}

pub fn close(context: &mut VaultContext) -> Result<(), ChainVaultError> {
    let handle = context.keeper().close_vault();
    expect(context, handle, Transition::SwitchToWelcome)
}
