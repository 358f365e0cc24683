// SPDX-FileCopyrightText: 2026 Chainvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Password acquisition via TTY prompt or the CHAINVAULT_PASSWORDS
//! environment variable.

use std::collections::VecDeque;
use std::io::IsTerminal;

use chainvault_core::ChainVaultError;
use chainvault_crypto::SecureBuffer;
use secrecy::{ExposeSecret, SecretString};

/// Newline-separated passwords, consumed in order, for headless use.
pub const PASSWORDS_ENV_VAR: &str = "CHAINVAULT_PASSWORDS";

/// Where passwords and secret values come from.
pub enum PasswordSource {
    /// Lines of [`PASSWORDS_ENV_VAR`] not consumed yet.
    Queued(VecDeque<SecretString>),
    Terminal,
}

impl PasswordSource {
    /// Prefer the environment variable, then an interactive terminal.
    pub fn detect() -> Result<Self, ChainVaultError> {
        if let Ok(raw) = std::env::var(PASSWORDS_ENV_VAR) {
            if !raw.is_empty() {
                return Ok(Self::from_lines(&raw));
            }
        }
        if std::io::stdin().is_terminal() {
            return Ok(Self::Terminal);
        }
        Err(ChainVaultError::Validation(format!(
            "no passwords provided. Set {PASSWORDS_ENV_VAR} or run interactively."
        )))
    }

    pub fn from_lines(raw: &str) -> Self {
        let lines = raw
            .lines()
            .map(|line| SecretString::from(line.to_string()))
            .collect();
        Self::Queued(lines)
    }

    /// Read one secret, showing `prompt` when interactive.
    pub fn next(&mut self, prompt: &str) -> Result<SecretString, ChainVaultError> {
        let secret = match self {
            Self::Queued(lines) => lines.pop_front().ok_or_else(|| {
                ChainVaultError::Validation(format!(
                    "{PASSWORDS_ENV_VAR} has no value left for \"{prompt}\""
                ))
            })?,
            Self::Terminal => {
                eprint!("{prompt}: ");
                rpassword::read_password()
                    .map(SecretString::from)
                    .map_err(|e| ChainVaultError::io("failed to read password", e))?
            }
        };
        if secret.expose_secret().is_empty() {
            return Err(ChainVaultError::Validation(
                "empty password not allowed".to_string(),
            ));
        }
        Ok(secret)
    }

    /// Read a new password, asking twice when interactive.
    pub fn next_confirmed(&mut self, prompt: &str) -> Result<SecretString, ChainVaultError> {
        let first = self.next(prompt)?;
        if let Self::Terminal = self {
            let second = self.next(&format!("{prompt} (again)"))?;
            if first.expose_secret() != second.expose_secret() {
                return Err(ChainVaultError::Validation(
                    "passwords do not match".to_string(),
                ));
            }
        }
        Ok(first)
    }
}

/// Copy a secret into a buffer the keeper accepts.
pub fn to_buffer(secret: &SecretString) -> Result<SecureBuffer, ChainVaultError> {
    SecureBuffer::from_slice(secret.expose_secret().as_bytes())
}
