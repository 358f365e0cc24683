// SPDX-FileCopyrightText: 2026 Chainvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Chainvault password vault.
//!
//! Settings come from `chainvault.toml` files and `CHAINVAULT_*` variables.
//! Unknown keys are rejected, and every problem is reported as a miette
//! diagnostic rather than stopping at the first one.
//!
//! # Usage
//!
//! ```no_run
//! use chainvault_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("Default vault: {}", config.vault.default_path);
//! ```

use std::path::{Path, PathBuf};

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{ChainVaultConfig, KdfProfile};

/// Load configuration from the XDG hierarchy and validate it.
///
/// On a Figment error the TOML files are re-read so that diagnostics can
/// point at the offending key.
pub fn load_and_validate() -> Result<ChainVaultConfig, Vec<ConfigError>> {
    checked(loader::load_config(), toml_sources)
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<ChainVaultConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

/// Load configuration from one file, plus env overrides, and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<ChainVaultConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_path(path), || {
        read_source(path).into_iter().collect()
    })
}

fn checked(
    loaded: Result<ChainVaultConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<ChainVaultConfig, Vec<ConfigError>> {
    let config = loaded.map_err(|err| diagnostic::figment_to_config_errors(err, &sources()))?;
    validation::validate_config(&config)?;
    Ok(config)
}

fn read_source(path: &Path) -> Option<(String, String)> {
    let content = std::fs::read_to_string(path).ok()?;
    Some((path.display().to_string(), content))
}

/// Every config file in the hierarchy that exists, keyed by the name
/// figment reports for it.
fn toml_sources() -> Vec<(String, String)> {
    let local = std::env::current_dir()
        .map(|dir| dir.join(loader::LOCAL_CONFIG_FILE))
        .unwrap_or_else(|_| PathBuf::from(loader::LOCAL_CONFIG_FILE));
    let user = dirs::config_dir().map(|dir| dir.join("chainvault").join(loader::LOCAL_CONFIG_FILE));

    [Some(local), user, Some(PathBuf::from(loader::SYSTEM_CONFIG_FILE))]
        .into_iter()
        .flatten()
        .filter_map(|path| read_source(&path))
        .collect()
}
