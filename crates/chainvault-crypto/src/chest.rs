// SPDX-FileCopyrightText: 2026 Chainvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! XChaCha20-Poly1305 chests.
//!
//! A chest is the ciphertext followed by its 16-byte Poly1305 tag. The
//! caller supplies the nonce: a vault shares one nonce across all of its
//! chests, and every chest in a vault is sealed under a distinct key.

use chacha20poly1305::aead::{Aead, AeadInPlace, KeyInit};
use chacha20poly1305::{Tag, XChaCha20Poly1305, XNonce};
use chainvault_core::ChainVaultError;

use crate::SecureBuffer;

/// Key length in bytes.
pub const KEY_LEN: usize = 32;
/// Nonce length in bytes.
pub const NONCE_LEN: usize = 24;
/// Authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

fn cipher(key: &[u8], nonce: &[u8]) -> Result<XChaCha20Poly1305, ChainVaultError> {
    if key.len() != KEY_LEN {
        return Err(ChainVaultError::Validation(format!(
            "chest key must be {KEY_LEN} bytes, got {}",
            key.len()
        )));
    }
    if nonce.len() != NONCE_LEN {
        return Err(ChainVaultError::Validation(format!(
            "chest nonce must be {NONCE_LEN} bytes, got {}",
            nonce.len()
        )));
    }
    XChaCha20Poly1305::new_from_slice(key)
        .map_err(|_| ChainVaultError::Validation("invalid chest key".to_string()))
}

/// Seal `plaintext` into a chest of `plaintext.len() + TAG_LEN` bytes.
pub fn create(plaintext: &[u8], key: &[u8], nonce: &[u8]) -> Result<Vec<u8>, ChainVaultError> {
    if plaintext.is_empty() {
        return Err(ChainVaultError::Validation(
            "cannot seal empty plaintext".to_string(),
        ));
    }

    cipher(key, nonce)?
        .encrypt(XNonce::from_slice(nonce), plaintext)
        .map_err(|_| ChainVaultError::Integrity("XChaCha20-Poly1305 encryption failed".to_string()))
}

/// Open a chest into a new secure buffer.
pub fn open(chest: &[u8], key: &[u8], nonce: &[u8]) -> Result<SecureBuffer, ChainVaultError> {
    check_chest_len(chest)?;
    let cipher = cipher(key, nonce)?;

    let (ciphertext, tag) = chest.split_at(chest.len() - TAG_LEN);
    let mut plaintext = SecureBuffer::from_slice(ciphertext)?;
    cipher
        .decrypt_in_place_detached(
            XNonce::from_slice(nonce),
            b"",
            &mut plaintext,
            Tag::from_slice(tag),
        )
        .map_err(|_| authentication_failed())?;

    Ok(plaintext)
}

/// Open a chest in place and return the plaintext length.
///
/// On success `chest[..len]` holds the plaintext. The tag is verified before
/// anything is decrypted, so on failure the chest is left unchanged.
pub fn open_in_place(chest: &mut [u8], key: &[u8], nonce: &[u8]) -> Result<usize, ChainVaultError> {
    check_chest_len(chest)?;
    let cipher = cipher(key, nonce)?;

    let plaintext_len = chest.len() - TAG_LEN;
    let (ciphertext, tag) = chest.split_at_mut(plaintext_len);
    cipher
        .decrypt_in_place_detached(
            XNonce::from_slice(nonce),
            b"",
            ciphertext,
            Tag::from_slice(tag),
        )
        .map_err(|_| authentication_failed())?;

    Ok(plaintext_len)
}

fn check_chest_len(chest: &[u8]) -> Result<(), ChainVaultError> {
    if chest.len() <= TAG_LEN {
        return Err(ChainVaultError::Validation(format!(
            "chest must be longer than {TAG_LEN} bytes, got {}",
            chest.len()
        )));
    }
    Ok(())
}

fn authentication_failed() -> ChainVaultError {
    ChainVaultError::Integrity(
        "XChaCha20-Poly1305 authentication failed -- wrong key or corrupted data".to_string(),
    )
}
