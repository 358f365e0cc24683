// SPDX-FileCopyrightText: 2026 Chainvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde attributes cannot express: non-empty
//! paths, Argon2id lower bounds, and known log levels.

use crate::diagnostic::ConfigError;
use crate::model::ChainVaultConfig;

/// Smallest accepted Argon2id memory cost in KiB.
pub const MIN_KDF_MEMORY_COST: u32 = 8192;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Check the constraints serde cannot express.
///
/// Every violation is collected so the user can fix them in one pass.
pub fn validate_config(config: &ChainVaultConfig) -> Result<(), Vec<ConfigError>> {
    let vault = &config.vault;
    let mut problems: Vec<String> = Vec::new();

    if vault.default_path.trim().is_empty() {
        problems.push("vault.default_path must not be empty".to_string());
    }
    match vault.kdf_memory_cost {
        Some(memory) if memory < MIN_KDF_MEMORY_COST => problems.push(format!(
            "vault.kdf_memory_cost must be at least {MIN_KDF_MEMORY_COST} (8 MiB), got {memory}"
        )),
        _ => {}
    }
    if vault.kdf_iterations == Some(0) {
        problems.push("vault.kdf_iterations must be at least 1, got 0".to_string());
    }
    if vault.kdf_parallelism == 0 {
        problems.push("vault.kdf_parallelism must be at least 1, got 0".to_string());
    }

    let level = &config.logging.log_level;
    if !LOG_LEVELS.iter().any(|known| known.eq_ignore_ascii_case(level)) {
        problems.push(format!(
            "logging.log_level `{level}` is not one of {}",
            LOG_LEVELS.join(", ")
        ));
    }

    if problems.is_empty() {
        return Ok(());
    }
    Err(problems
        .into_iter()
        .map(|message| ConfigError::Validation { message })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::KdfProfile;

    #[test]
    fn default_config_validates() {
        let config = ChainVaultConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_default_path_fails_validation() {
        let mut config = ChainVaultConfig::default();
        config.vault.default_path = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("default_path"))
        ));
    }

    #[test]
    fn small_memory_cost_fails_validation() {
        let mut config = ChainVaultConfig::default();
        config.vault.kdf_memory_cost = Some(1024);
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("kdf_memory_cost"))
        ));
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = ChainVaultConfig::default();
        config.vault.kdf_iterations = Some(0);
        config.vault.kdf_parallelism = 0;
        config.logging.log_level = "loud".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn explicit_profile_deserializes() {
        let toml_str = r#"
[vault]
kdf_profile = "sensitive"
kdf_iterations = 6
"#;
        let config: ChainVaultConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.vault.kdf_profile, KdfProfile::Sensitive);
        assert_eq!(config.vault.kdf_iterations, Some(6));
        assert_eq!(config.vault.kdf_memory_cost, None);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn vault_section_denies_unknown_fields() {
        let toml_str = r#"
[vault]
kdf_salt = "abc"
"#;
        assert!(toml::from_str::<ChainVaultConfig>(toml_str).is_err());
    }

    #[test]
    fn uppercase_log_level_is_accepted() {
        let mut config = ChainVaultConfig::default();
        config.logging.log_level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
