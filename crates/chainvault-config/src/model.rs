// SPDX-FileCopyrightText: 2026 Chainvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `chainvault.toml` schema: a `[vault]` table and a `[logging]` table.
//! A misspelled key is an error, never silently ignored.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChainVaultConfig {
    #[serde(default)]
    pub vault: VaultConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Cost profile for Argon2id password hashing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KdfProfile {
    /// Interactive in debug builds, sensitive in release builds.
    #[default]
    Auto,
    /// 64 MiB, 2 passes.
    Interactive,
    /// 1 GiB, 4 passes.
    Sensitive,
}

/// Vault configuration.
///
/// Key-derivation parameters are not stored in the vault file, so a vault
/// must be reopened with the same profile it was saved with.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// Path used when no vault file is given, and after a vault is closed.
    #[serde(default = "default_vault_path")]
    pub default_path: String,

    /// Named Argon2id cost profile.
    #[serde(default)]
    pub kdf_profile: KdfProfile,

    /// Explicit Argon2id memory cost in KiB, overriding the profile.
    #[serde(default)]
    pub kdf_memory_cost: Option<u32>,

    /// Explicit Argon2id pass count, overriding the profile.
    #[serde(default)]
    pub kdf_iterations: Option<u32>,

    /// Argon2id parallelism lanes.
    #[serde(default = "default_kdf_parallelism")]
    pub kdf_parallelism: u32,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            default_path: default_vault_path(),
            kdf_profile: KdfProfile::default(),
            kdf_memory_cost: None,
            kdf_iterations: None,
            kdf_parallelism: default_kdf_parallelism(),
        }
    }
}

fn default_vault_path() -> String {
    "vault.bin".to_string()
}

fn default_kdf_parallelism() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter for the `chainvault` target; `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
