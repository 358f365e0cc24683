// SPDX-FileCopyrightText: 2026 Chainvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SHA-256 digests.

use chainvault_core::ChainVaultError;
use sha2::{Digest, Sha256};

use crate::SecureBuffer;

/// Digest length in bytes.
pub const DIGEST_LEN: usize = 32;

/// Hash secret input into a secure buffer. Used to build the master key.
pub fn hash_bytes(data: &[u8]) -> Result<SecureBuffer, ChainVaultError> {
    if data.is_empty() {
        return Err(ChainVaultError::Validation(
            "cannot hash empty input".to_string(),
        ));
    }

    let mut output = SecureBuffer::zeroed(DIGEST_LEN)?;
    let mut hasher = Sha256::new();
    hasher.update(data);
    output.copy_from_slice(&hasher.finalize());
    Ok(output)
}

/// Digest of public data, such as the container integrity trailer.
pub fn digest(data: &[u8]) -> [u8; DIGEST_LEN] {
    Sha256::digest(data).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_matches_known_vector() {
        let hashed = hash_bytes(b"abc").unwrap();
        assert_eq!(
            hashed[..4],
            [0xba, 0x78, 0x16, 0xbf],
            "SHA-256(\"abc\") starts with ba7816bf"
        );
        assert_eq!(&*hashed, &digest(b"abc"));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            hash_bytes(b""),
            Err(ChainVaultError::Validation(_))
        ));
    }
}
