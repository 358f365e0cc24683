// SPDX-FileCopyrightText: 2026 Chainvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./chainvault.toml` > `~/.config/chainvault/chainvault.toml`
//! > `/etc/chainvault/chainvault.toml` with environment variable overrides via
//! the `CHAINVAULT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ChainVaultConfig;

/// Local configuration file name.
pub const LOCAL_CONFIG_FILE: &str = "chainvault.toml";

/// System-wide configuration file.
pub const SYSTEM_CONFIG_FILE: &str = "/etc/chainvault/chainvault.toml";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/chainvault/chainvault.toml`
/// 3. `~/.config/chainvault/chainvault.toml`
/// 4. `./chainvault.toml`
/// 5. `CHAINVAULT_*` environment variables
pub fn load_config() -> Result<ChainVaultConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
pub fn load_config_from_str(toml_content: &str) -> Result<ChainVaultConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ChainVaultConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ChainVaultConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ChainVaultConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ChainVaultConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_FILE))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("chainvault").join(LOCAL_CONFIG_FILE))
                .unwrap_or_default(),
        ))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Environment provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so that underscore-containing
/// keys survive: `CHAINVAULT_VAULT_KDF_PROFILE` maps to `vault.kdf_profile`.
/// `CHAINVAULT_PASSWORDS` is consumed by the CLI, not the config.
fn env_provider() -> Env {
    Env::prefixed("CHAINVAULT_")
        .filter(|key| key != "passwords")
        .map(|key| section_key(key.as_str()).into())
}

/// `VAULT_KDF_PROFILE` -> `vault.kdf_profile`.
///
/// Figment passes the variable name without its prefix but in its original
/// case, so the name is lowered before the table prefix is split off.
fn section_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for table in ["vault", "logging"] {
        if let Some(rest) = key.strip_prefix(table).and_then(|r| r.strip_prefix('_')) {
            return format!("{table}.{rest}");
        }
    }
    key
}
