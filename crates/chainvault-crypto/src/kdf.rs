// SPDX-FileCopyrightText: 2026 Chainvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argon2id key derivation from a password.
//!
//! Derives a 32-byte key using Argon2id (Algorithm::Argon2id,
//! Version::V0x13). Debug builds default to the interactive cost profile and
//! release builds to the sensitive one.

use chainvault_core::ChainVaultError;

use crate::SecureBuffer;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;
/// Derived key length in bytes.
pub const KEY_LEN: usize = 32;
/// Shortest accepted password.
pub const PASSWORD_MIN_LEN: usize = 1;
/// Longest accepted password.
pub const PASSWORD_MAX_LEN: usize = 4096;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub memory_cost: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl KdfParams {
    /// 64 MiB, 2 passes.
    pub const INTERACTIVE: Self = Self {
        memory_cost: 65_536,
        iterations: 2,
        parallelism: 1,
    };

    /// 1 GiB, 4 passes.
    pub const SENSITIVE: Self = Self {
        memory_cost: 1_048_576,
        iterations: 4,
        parallelism: 1,
    };

    /// The profile matching the current build.
    pub fn for_build() -> Self {
        if cfg!(debug_assertions) {
            Self::INTERACTIVE
        } else {
            Self::SENSITIVE
        }
    }

    /// Reject costs Argon2id would refuse, before any password is typed.
    pub fn check(&self) -> Result<(), ChainVaultError> {
        argon2::Params::new(self.memory_cost, self.iterations, self.parallelism, Some(KEY_LEN))
            .map(|_| ())
            .map_err(|e| ChainVaultError::Config(format!("invalid Argon2id parameters: {e}")))
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::for_build()
    }
}

/// Derive a 32-byte key from `password` and `salt` using Argon2id.
///
/// Rejects passwords outside `1..=4096` bytes and salts that are not exactly
/// 16 bytes long.
pub fn derive_password_key(
    password: &[u8],
    salt: &[u8],
    params: &KdfParams,
) -> Result<SecureBuffer, ChainVaultError> {
    if !(PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&password.len()) {
        return Err(ChainVaultError::Validation(format!(
            "password must be {PASSWORD_MIN_LEN} to {PASSWORD_MAX_LEN} bytes, got {}",
            password.len()
        )));
    }
    if salt.len() != SALT_LEN {
        return Err(ChainVaultError::Validation(format!(
            "salt must be {SALT_LEN} bytes, got {}",
            salt.len()
        )));
    }

    let argon_params = argon2::Params::new(
        params.memory_cost,
        params.iterations,
        params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| ChainVaultError::Validation(format!("invalid Argon2id parameters: {e}")))?;

    let argon2 = argon2::Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon_params,
    );

    let mut output = SecureBuffer::zeroed(KEY_LEN)?;
    argon2
        .hash_password_into(password, salt, &mut output)
        .map_err(|e| ChainVaultError::Validation(format!("Argon2id key derivation failed: {e}")))?;

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Low cost for fast tests.
    const FAST: KdfParams = KdfParams {
        memory_cost: 256,
        iterations: 1,
        parallelism: 1,
    };

    #[test]
    fn derive_key_produces_consistent_output() {
        let salt = [1u8; SALT_LEN];
        let key1 = derive_password_key(b"test password", &salt, &FAST).unwrap();
        let key2 = derive_password_key(b"test password", &salt, &FAST).unwrap();
        assert_eq!(&*key1, &*key2);
        assert_eq!(key1.len(), KEY_LEN);
    }

    #[test]
    fn different_password_produces_different_key() {
        let salt = [2u8; SALT_LEN];
        let key1 = derive_password_key(b"password one", &salt, &FAST).unwrap();
        let key2 = derive_password_key(b"password two", &salt, &FAST).unwrap();
        assert_ne!(&*key1, &*key2);
    }

    #[test]
    fn different_salt_produces_different_key() {
        let key1 = derive_password_key(b"same", &[1u8; SALT_LEN], &FAST).unwrap();
        let key2 = derive_password_key(b"same", &[2u8; SALT_LEN], &FAST).unwrap();
        assert_ne!(&*key1, &*key2);
    }

    #[test]
    fn empty_and_oversized_passwords_are_rejected() {
        let salt = [0u8; SALT_LEN];
        assert!(matches!(
            derive_password_key(b"", &salt, &FAST),
            Err(ChainVaultError::Validation(_))
        ));
        let long = vec![b'a'; PASSWORD_MAX_LEN + 1];
        assert!(matches!(
            derive_password_key(&long, &salt, &FAST),
            Err(ChainVaultError::Validation(_))
        ));
        let max = vec![b'a'; PASSWORD_MAX_LEN];
        assert!(derive_password_key(&max, &salt, &FAST).is_ok());
    }

    #[test]
    fn wrong_salt_length_is_rejected() {
        let result = derive_password_key(b"password", &[0u8; 8], &FAST);
        assert!(matches!(result, Err(ChainVaultError::Validation(_))));
    }

    #[test]
    fn build_profile_follows_debug_assertions() {
        let expected = if cfg!(debug_assertions) {
            KdfParams::INTERACTIVE
        } else {
            KdfParams::SENSITIVE
        };
        assert_eq!(KdfParams::default(), expected);
    }

    #[test]
    fn check_rejects_memory_below_lane_minimum() {
        assert!(FAST.check().is_ok());
        let err = KdfParams {
            memory_cost: 8,
            iterations: 1,
            parallelism: 4,
        }
        .check()
        .unwrap_err();
        assert!(matches!(err, ChainVaultError::Config(_)));
    }
}
