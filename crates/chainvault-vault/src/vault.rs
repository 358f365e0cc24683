// SPDX-FileCopyrightText: 2026 Chainvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chained-unlock protocol over a vault container.
//!
//! A vault holds an ordered list of lock steps and one final block, all
//! sealed with the same nonce:
//! - step 0 is sealed with the pre-key stored in the header and reveals hint 0;
//! - step `i` is sealed with the key of password `i - 1` and reveals hint `i`;
//! - the final block is sealed with the SHA-256 of every key in order,
//!   pre-key first.
//!
//! Every password key comes from the same salt, so distinct passwords give
//! distinct keys and no (key, nonce) pair is ever used twice within one save.

use std::path::Path;

use chainvault_core::ChainVaultError;
use chainvault_crypto::random::fill_random;
use chainvault_crypto::{KdfParams, SecureBuffer, chest, derive_password_key, hash};
use tracing::debug;

use crate::container::{self, FIRST_KEY_LEN, KEY_SALT_LEN, LOCK_NONCE_LEN, VaultHeader};

/// Largest number of lock steps a header can describe.
pub const MAX_LOCK_STEPS: usize = u8::MAX as usize;

const STEP_LEN_FIELD: usize = 4;
const HINT_LEN_FIELD: usize = 2;

/// Header secrets plus the sealed steps and block of one vault.
///
/// Debug output omits every secret.
pub struct Vault {
    params: KdfParams,
    key_salt: SecureBuffer,
    lock_nonce: SecureBuffer,
    first_key: SecureBuffer,
    lock_steps: Vec<Vec<u8>>,
    block: SecureBuffer,
    /// Plaintext length once the block has been opened in place.
    block_plain_len: Option<usize>,
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("params", &self.params)
            .field("lock_steps", &self.lock_steps.len())
            .field("block_len", &self.block.len())
            .field("unlocked", &self.block_plain_len.is_some())
            .finish_non_exhaustive()
    }
}

impl Vault {
    /// Allocate zeroed header secrets.
    pub fn new(params: KdfParams) -> Result<Self, ChainVaultError> {
        Ok(Self {
            params,
            key_salt: SecureBuffer::zeroed(KEY_SALT_LEN)?,
            lock_nonce: SecureBuffer::zeroed(LOCK_NONCE_LEN)?,
            first_key: SecureBuffer::zeroed(FIRST_KEY_LEN)?,
            lock_steps: Vec::new(),
            block: SecureBuffer::empty(),
            block_plain_len: None,
        })
    }

    /// Key-derivation parameters used by [`Vault::create_key`].
    pub fn params(&self) -> &KdfParams {
        &self.params
    }

    /// Drop all content and zero the header secrets.
    pub fn reset(&mut self) {
        self.reset_cache();
        self.key_salt.fill(0);
        self.lock_nonce.fill(0);
        self.first_key.fill(0);
    }

    /// Drop the sealed steps and block, keeping the header secrets.
    pub fn reset_cache(&mut self) {
        self.lock_steps.clear();
        self.block = SecureBuffer::empty();
        self.block_plain_len = None;
    }

    /// Load a vault file, replacing the current content only on success.
    pub fn open(&mut self, path: &Path) -> Result<(), ChainVaultError> {
        let (header, data) = container::read(path)?;

        if header.lock_steps == 0 {
            return Err(ChainVaultError::Integrity(
                "vault has no lock steps".to_string(),
            ));
        }

        let (lock_steps, block) = partition(&data, usize::from(header.lock_steps))?;

        self.lock_steps = lock_steps;
        self.block = block;
        self.block_plain_len = None;
        self.key_salt.copy_from_slice(&header.key_salt);
        self.lock_nonce.copy_from_slice(&header.lock_nonce);
        self.first_key.copy_from_slice(&header.first_key);

        debug!(path = %path.display(), steps = self.lock_steps.len(), "vault file loaded");
        Ok(())
    }

    /// Write the current steps and sealed block to `path`.
    pub fn place(&self, path: &Path) -> Result<(), ChainVaultError> {
        if self.lock_steps.is_empty() || self.lock_steps.len() > MAX_LOCK_STEPS {
            return Err(ChainVaultError::Validation(format!(
                "a vault needs 1 to {MAX_LOCK_STEPS} lock steps, got {}",
                self.lock_steps.len()
            )));
        }
        if self.block.is_empty() || self.block_plain_len.is_some() {
            return Err(ChainVaultError::Validation(
                "vault block is not sealed".to_string(),
            ));
        }

        let mut header = VaultHeader {
            lock_steps: u8::try_from(self.lock_steps.len()).unwrap_or(u8::MAX),
            key_salt: [0; KEY_SALT_LEN],
            lock_nonce: [0; LOCK_NONCE_LEN],
            first_key: [0; FIRST_KEY_LEN],
        };
        header.key_salt.copy_from_slice(&self.key_salt);
        header.lock_nonce.copy_from_slice(&self.lock_nonce);
        header.first_key.copy_from_slice(&self.first_key);

        let data_len = self
            .lock_steps
            .iter()
            .map(|step| STEP_LEN_FIELD + step.len())
            .sum::<usize>()
            + self.block.len();
        let mut data = SecureBuffer::zeroed(data_len)?;
        let mut cursor = 0;
        for step in &self.lock_steps {
            let step_len = u32::try_from(step.len()).map_err(|_| {
                ChainVaultError::Validation(format!("lock step of {} bytes", step.len()))
            })?;
            data[cursor..cursor + STEP_LEN_FIELD].copy_from_slice(&step_len.to_le_bytes());
            cursor += STEP_LEN_FIELD;
            data[cursor..cursor + step.len()].copy_from_slice(step);
            cursor += step.len();
        }
        data[cursor..].copy_from_slice(&self.block);

        container::write(path, &header, &data)
    }

    /// Number of lock steps currently loaded or built.
    pub fn lock_step_count(&self) -> usize {
        self.lock_steps.len()
    }

    /// The header pre-key, the implicit zeroth factor.
    pub fn first_key(&self) -> &SecureBuffer {
        &self.first_key
    }

    /// The decrypted block, available between [`Vault::unlock_block`] and
    /// the next cache reset.
    pub fn block_plaintext(&self) -> Option<&[u8]> {
        self.block_plain_len.map(|len| &self.block[..len])
    }

    /// Derive a password key with the vault salt.
    pub fn create_key(&self, password: &[u8]) -> Result<SecureBuffer, ChainVaultError> {
        derive_password_key(password, &self.key_salt, &self.params)
    }

    /// Hash the concatenation of `keys` and the optional `last_key`.
    pub fn create_master_key(
        keys: &[&SecureBuffer],
        last_key: Option<&SecureBuffer>,
    ) -> Result<SecureBuffer, ChainVaultError> {
        let parts = || keys.iter().copied().chain(last_key);
        let total: usize = parts().map(|key| key.len()).sum();
        if total == 0 {
            return Err(ChainVaultError::Validation(
                "master key needs at least one key".to_string(),
            ));
        }

        let mut joined = SecureBuffer::zeroed(total)?;
        let mut cursor = 0;
        for key in parts() {
            joined[cursor..cursor + key.len()].copy_from_slice(key);
            cursor += key.len();
        }
        hash::hash_bytes(&joined)
    }

    /// Open lock step `index` with `key` and return the hint it holds.
    pub fn unlock_step(&self, key: &[u8], index: usize) -> Result<String, ChainVaultError> {
        let step = self.lock_steps.get(index).ok_or_else(|| {
            ChainVaultError::Validation(format!(
                "lock step {index} out of range ({} steps)",
                self.lock_steps.len()
            ))
        })?;

        let plain = chest::open(step, key, &self.lock_nonce)?;
        if plain.len() < HINT_LEN_FIELD {
            return Err(ChainVaultError::Integrity(
                "lock step too short".to_string(),
            ));
        }
        let hint_len = usize::from(u16::from_le_bytes([plain[0], plain[1]]));
        if hint_len == 0 || HINT_LEN_FIELD + hint_len > plain.len() {
            return Err(ChainVaultError::Integrity(format!(
                "lock step {index} holds an invalid hint length {hint_len}"
            )));
        }

        String::from_utf8(plain[HINT_LEN_FIELD..HINT_LEN_FIELD + hint_len].to_vec()).map_err(
            |_| ChainVaultError::Integrity(format!("lock step {index} hint is not UTF-8")),
        )
    }

    /// Open the final block in place with the master key.
    ///
    /// A wrong key leaves the block sealed, so the call can be retried.
    pub fn unlock_block(&mut self, master_key: &[u8]) -> Result<(), ChainVaultError> {
        if self.block_plain_len.is_some() {
            return Err(ChainVaultError::Validation(
                "vault block is already open".to_string(),
            ));
        }
        let len = chest::open_in_place(&mut self.block, master_key, &self.lock_nonce)?;
        self.block_plain_len = Some(len);
        Ok(())
    }

    /// Randomize salt, nonce and pre-key and drop all content.
    pub fn generate_new(&mut self) -> Result<(), ChainVaultError> {
        fill_random(&mut self.key_salt)?;
        fill_random(&mut self.lock_nonce)?;
        fill_random(&mut self.first_key)?;
        self.reset_cache();
        Ok(())
    }

    /// Draw a fresh lock nonce, keeping salt and pre-key.
    pub fn renew_nonce(&mut self) -> Result<(), ChainVaultError> {
        fill_random(&mut self.lock_nonce)
    }

    /// Drop every lock step.
    pub fn reset_steps(&mut self) {
        self.lock_steps.clear();
    }

    /// Seal `hint` with `key` and append it as the next lock step.
    pub fn add_step(&mut self, hint: &[u8], key: &[u8]) -> Result<(), ChainVaultError> {
        if hint.is_empty() {
            return Err(ChainVaultError::Validation("hint must not be empty".to_string()));
        }
        if self.lock_steps.len() >= MAX_LOCK_STEPS {
            return Err(ChainVaultError::Validation(format!(
                "a vault holds at most {MAX_LOCK_STEPS} lock steps"
            )));
        }
        let hint_len = u16::try_from(hint.len()).map_err(|_| {
            ChainVaultError::Validation(format!("hint of {} bytes is too long", hint.len()))
        })?;

        let mut plain = SecureBuffer::zeroed(HINT_LEN_FIELD + hint.len())?;
        plain[..HINT_LEN_FIELD].copy_from_slice(&hint_len.to_le_bytes());
        plain[HINT_LEN_FIELD..].copy_from_slice(hint);

        let sealed = chest::create(&plain, key, &self.lock_nonce)?;
        self.lock_steps.push(sealed);
        Ok(())
    }

    /// Seal `content` as the final block.
    pub fn lock_block(&mut self, master_key: &[u8], content: &[u8]) -> Result<(), ChainVaultError> {
        let sealed = chest::create(content, master_key, &self.lock_nonce)?;
        self.block = SecureBuffer::from_slice(&sealed)?;
        self.block_plain_len = None;
        Ok(())
    }
}

/// Split the data region into `count` length-prefixed steps and the block.
fn partition(
    data: &[u8],
    count: usize,
) -> Result<(Vec<Vec<u8>>, SecureBuffer), ChainVaultError> {
    let mut steps = Vec::with_capacity(count);
    let mut cursor = 0;

    for index in 0..count {
        let len_end = cursor + STEP_LEN_FIELD;
        let len_bytes = data.get(cursor..len_end).ok_or_else(|| {
            ChainVaultError::Integrity(format!("lock step {index} length runs past data"))
        })?;
        let step_len = u32::from_le_bytes([len_bytes[0], len_bytes[1], len_bytes[2], len_bytes[3]]);
        let step_len = usize::try_from(step_len)
            .map_err(|_| ChainVaultError::Integrity(format!("lock step {index} too long")))?;
        if step_len == 0 {
            return Err(ChainVaultError::Integrity(format!(
                "lock step {index} is empty"
            )));
        }

        let step = len_end
            .checked_add(step_len)
            .and_then(|end| data.get(len_end..end))
            .ok_or_else(|| {
                ChainVaultError::Integrity(format!("lock step {index} runs past data"))
            })?;
        steps.push(step.to_vec());
        cursor = len_end + step_len;
    }

    let block = &data[cursor..];
    if block.is_empty() {
        return Err(ChainVaultError::Integrity(
            "vault has no final block".to_string(),
        ));
    }

    Ok((steps, SecureBuffer::from_slice(block)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainvault_crypto::random::random_buffer;

    const FAST: KdfParams = KdfParams {
        memory_cost: 256,
        iterations: 1,
        parallelism: 1,
    };

    fn new_vault() -> Vault {
        let mut vault = Vault::new(FAST).unwrap();
        vault.generate_new().unwrap();
        vault
    }

    #[test]
    fn step_reveals_hint_only_to_its_key() {
        let mut vault = new_vault();
        let key = vault.create_key(b"Rex123!").unwrap();
        let other = vault.create_key(b"Berlin99?").unwrap();

        vault.add_step(b"city", &key).unwrap();

        assert_eq!(vault.unlock_step(&key, 0).unwrap(), "city");
        assert!(matches!(
            vault.unlock_step(&other, 0),
            Err(ChainVaultError::Integrity(_))
        ));
        assert!(matches!(
            vault.unlock_step(&key, 1),
            Err(ChainVaultError::Validation(_))
        ));
    }

    #[test]
    fn master_key_depends_on_order_and_last_key() {
        let a = random_buffer(32).unwrap();
        let b = random_buffer(32).unwrap();

        let ab = Vault::create_master_key(&[&a, &b], None).unwrap();
        let ba = Vault::create_master_key(&[&b, &a], None).unwrap();
        let a_then_b = Vault::create_master_key(&[&a], Some(&b)).unwrap();

        assert_ne!(&*ab, &*ba);
        assert_eq!(&*ab, &*a_then_b);
        assert_eq!(ab.len(), 32);
    }

    #[test]
    fn master_key_rejects_empty_chain() {
        assert!(Vault::create_master_key(&[], None).is_err());
        let empty = SecureBuffer::empty();
        assert!(Vault::create_master_key(&[&empty], None).is_err());
    }

    #[test]
    fn wrong_master_key_keeps_block_sealed() {
        let mut vault = new_vault();
        let master = random_buffer(32).unwrap();
        let wrong = random_buffer(32).unwrap();
        vault.lock_block(&master, b"version = 1").unwrap();

        assert!(vault.unlock_block(&wrong).is_err());
        assert!(vault.block_plaintext().is_none());

        vault.unlock_block(&master).unwrap();
        assert_eq!(vault.block_plaintext(), Some(&b"version = 1"[..]));
    }

    #[test]
    fn add_step_rejects_empty_hint() {
        let mut vault = new_vault();
        let key = random_buffer(32).unwrap();
        assert!(vault.add_step(b"", &key).is_err());
        assert_eq!(vault.lock_step_count(), 0);
    }

    #[test]
    fn add_step_stops_at_header_limit() {
        let mut vault = new_vault();
        let key = random_buffer(32).unwrap();
        for _ in 0..MAX_LOCK_STEPS {
            vault.add_step(b"h", &key).unwrap();
        }
        assert!(vault.add_step(b"h", &key).is_err());
        assert_eq!(vault.lock_step_count(), MAX_LOCK_STEPS);
    }

    #[test]
    fn reset_zeroes_header_secrets() {
        let mut vault = new_vault();
        assert!(vault.first_key().iter().any(|&b| b != 0));
        vault.reset();
        assert!(vault.first_key().iter().all(|&b| b == 0));
        assert_eq!(vault.lock_step_count(), 0);
    }

    #[test]
    fn place_requires_steps_and_sealed_block() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.bin");
        let mut vault = new_vault();
        assert!(vault.place(&path).is_err());

        let key = random_buffer(32).unwrap();
        vault.add_step(b"pet", &key).unwrap();
        assert!(vault.place(&path).is_err());

        vault.lock_block(&key, b"x").unwrap();
        vault.place(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn partition_rejects_zero_length_step() {
        let mut data = Vec::new();
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(b"block");
        assert!(partition(&data, 1).is_err());
    }

    #[test]
    fn partition_rejects_step_past_end() {
        let mut data = Vec::new();
        data.extend_from_slice(&100u32.to_le_bytes());
        data.extend_from_slice(b"short");
        assert!(partition(&data, 1).is_err());
    }

    #[test]
    fn partition_requires_final_block() {
        let mut data = Vec::new();
        data.extend_from_slice(&3u32.to_le_bytes());
        data.extend_from_slice(b"abc");
        assert!(partition(&data, 1).is_err());

        data.push(b'z');
        let (steps, block) = partition(&data, 1).unwrap();
        assert_eq!(steps, vec![b"abc".to_vec()]);
        assert_eq!(&*block, b"z");
    }
}
