// SPDX-FileCopyrightText: 2026 Chainvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Chainvault configuration system.

use std::io::Write;

use chainvault_config::diagnostic::ConfigError;
use chainvault_config::model::{ChainVaultConfig, KdfProfile};
use chainvault_config::{
    load_and_validate_path, load_and_validate_str, load_config_from_path, load_config_from_str,
};
use serial_test::serial;

#[test]
fn valid_toml_deserializes_into_config() {
    let toml = r#"
[vault]
default_path = "/tmp/secrets.bin"
kdf_profile = "interactive"
kdf_memory_cost = 16384
kdf_iterations = 3
kdf_parallelism = 2

[logging]
log_level = "debug"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.vault.default_path, "/tmp/secrets.bin");
    assert_eq!(config.vault.kdf_profile, KdfProfile::Interactive);
    assert_eq!(config.vault.kdf_memory_cost, Some(16384));
    assert_eq!(config.vault.kdf_iterations, Some(3));
    assert_eq!(config.vault.kdf_parallelism, 2);
    assert_eq!(config.logging.log_level, "debug");
}

#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");
    let defaults = ChainVaultConfig::default();
    assert_eq!(config.vault.default_path, defaults.vault.default_path);
    assert_eq!(config.vault.kdf_profile, KdfProfile::Auto);
    assert_eq!(config.vault.kdf_memory_cost, None);
    assert_eq!(config.logging.log_level, "info");
}

#[test]
fn unknown_field_produces_suggestion() {
    let toml = r#"
[vault]
kdf_profil = "sensitive"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    let unknown = errors
        .iter()
        .find_map(|e| match e {
            ConfigError::UnknownKey {
                key, suggestion, ..
            } => Some((key.clone(), suggestion.clone())),
            _ => None,
        })
        .expect("should produce an UnknownKey diagnostic");
    assert_eq!(unknown.0, "kdf_profil");
    assert_eq!(unknown.1.as_deref(), Some("kdf_profile"));
}

#[test]
fn unknown_profile_is_rejected() {
    let toml = r#"
[vault]
kdf_profile = "paranoid"
"#;

    let errors = load_and_validate_str(toml).expect_err("unknown profile should fail");
    assert!(!errors.is_empty());
}

#[test]
fn out_of_range_values_fail_validation() {
    let toml = r#"
[vault]
kdf_memory_cost = 512
kdf_parallelism = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    assert!(messages.iter().any(|m| m.contains("kdf_memory_cost")));
    assert!(messages.iter().any(|m| m.contains("kdf_parallelism")));
}

#[test]
#[serial]
fn env_var_overrides_file_value() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[vault]\ndefault_path = \"from-file.bin\"").unwrap();

    // SAFETY: test runs serially, no concurrent env access.
    unsafe { std::env::set_var("CHAINVAULT_VAULT_DEFAULT_PATH", "from-env.bin") };
    let result = load_config_from_path(file.path());
    unsafe { std::env::remove_var("CHAINVAULT_VAULT_DEFAULT_PATH") };

    let config = result.expect("config should load");
    assert_eq!(config.vault.default_path, "from-env.bin");
}

#[test]
#[serial]
fn password_env_var_is_not_a_config_key() {
    let file = tempfile::NamedTempFile::new().unwrap();

    unsafe { std::env::set_var("CHAINVAULT_PASSWORDS", "one\ntwo") };
    let result = load_and_validate_path(file.path());
    unsafe { std::env::remove_var("CHAINVAULT_PASSWORDS") };

    assert!(result.is_ok(), "CHAINVAULT_PASSWORDS must not be treated as config");
}

#[test]
#[serial]
fn env_var_sets_log_level() {
    let file = tempfile::NamedTempFile::new().unwrap();

    unsafe { std::env::set_var("CHAINVAULT_LOGGING_LOG_LEVEL", "warn") };
    let result = load_and_validate_path(file.path());
    unsafe { std::env::remove_var("CHAINVAULT_LOGGING_LOG_LEVEL") };

    assert_eq!(result.expect("config should load").logging.log_level, "warn");
}

#[test]
#[serial]
fn env_var_selects_kdf_profile() {
    let file = tempfile::NamedTempFile::new().unwrap();

    unsafe { std::env::set_var("CHAINVAULT_VAULT_KDF_PROFILE", "interactive") };
    let result = load_and_validate_path(file.path());
    unsafe { std::env::remove_var("CHAINVAULT_VAULT_KDF_PROFILE") };

    let config = result.expect("config should load");
    assert_eq!(config.vault.kdf_profile, KdfProfile::Interactive);
}
