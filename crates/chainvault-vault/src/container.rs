// SPDX-FileCopyrightText: 2026 Chainvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Length-framed vault container.
//!
//! ```text
//! MAGIC(2) VERSION(2) LockSteps(1) KeySalt(16) LockNonce(24) FirstKey(32)
//! DataLength(4) Data(DataLength) Digest(32)
//! ```
//!
//! All integers are little-endian. `Digest` is SHA-256 over every preceding
//! byte. Writes go to a temporary file in the destination directory that is
//! then renamed over the target.

use std::io::Write;
use std::path::Path;

use chainvault_core::ChainVaultError;
use chainvault_crypto::hash::{DIGEST_LEN, digest};
use chainvault_crypto::{SecureBuffer, chest, kdf};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// File magic, `"EV"` when read as little-endian bytes.
pub const MAGIC: u16 = 0x5645;
/// Current format version.
pub const VERSION: u16 = 1;

/// Header salt field size.
pub const KEY_SALT_LEN: usize = 16;
/// Header nonce field size.
pub const LOCK_NONCE_LEN: usize = 24;
/// Header pre-key field size.
pub const FIRST_KEY_LEN: usize = 32;

const _: () = assert!(KEY_SALT_LEN == kdf::SALT_LEN, "KeySalt size mismatch");
const _: () = assert!(LOCK_NONCE_LEN == chest::NONCE_LEN, "LockNonce size mismatch");
const _: () = assert!(FIRST_KEY_LEN == chest::KEY_LEN, "FirstKey size mismatch");
const _: () = assert!(DIGEST_LEN == chest::KEY_LEN, "master key size mismatch");

/// Encoded header size in bytes.
pub const HEADER_LEN: usize = 2 + 2 + 1 + KEY_SALT_LEN + LOCK_NONCE_LEN + FIRST_KEY_LEN;

const DATA_LEN_FIELD: usize = 4;

/// Fixed-layout vault header.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct VaultHeader {
    pub lock_steps: u8,
    pub key_salt: [u8; KEY_SALT_LEN],
    pub lock_nonce: [u8; LOCK_NONCE_LEN],
    pub first_key: [u8; FIRST_KEY_LEN],
}

impl VaultHeader {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&MAGIC.to_le_bytes());
        out.extend_from_slice(&VERSION.to_le_bytes());
        out.push(self.lock_steps);
        out.extend_from_slice(&self.key_salt);
        out.extend_from_slice(&self.lock_nonce);
        out.extend_from_slice(&self.first_key);
    }

    fn decode(bytes: &[u8]) -> Result<Self, ChainVaultError> {
        if bytes.len() < HEADER_LEN {
            return Err(malformed("truncated header"));
        }

        let magic = u16::from_le_bytes([bytes[0], bytes[1]]);
        if magic != MAGIC {
            return Err(malformed(&format!("bad magic {magic:#06x}")));
        }
        let version = u16::from_le_bytes([bytes[2], bytes[3]]);
        if version != VERSION {
            return Err(malformed(&format!("unsupported version {version}")));
        }

        let mut header = Self {
            lock_steps: bytes[4],
            key_salt: [0; KEY_SALT_LEN],
            lock_nonce: [0; LOCK_NONCE_LEN],
            first_key: [0; FIRST_KEY_LEN],
        };
        let mut cursor = 5;
        for field in [
            &mut header.key_salt[..],
            &mut header.lock_nonce[..],
            &mut header.first_key[..],
        ] {
            let end = cursor + field.len();
            field.copy_from_slice(&bytes[cursor..end]);
            cursor = end;
        }
        Ok(header)
    }
}

fn malformed(detail: &str) -> ChainVaultError {
    ChainVaultError::Integrity(format!("malformed vault container: {detail}"))
}

/// Read and verify a container, returning its header and data region.
pub fn read(path: &Path) -> Result<(VaultHeader, SecureBuffer), ChainVaultError> {
    let bytes = Zeroizing::new(std::fs::read(path).map_err(|e| {
        ChainVaultError::io(format!("failed to read vault {}", path.display()), e)
    })?);
    decode(&bytes)
}

/// Decode container bytes already in memory.
pub fn decode(bytes: &[u8]) -> Result<(VaultHeader, SecureBuffer), ChainVaultError> {
    let min_len = HEADER_LEN + DATA_LEN_FIELD + DIGEST_LEN;
    if bytes.len() < min_len {
        return Err(malformed("file too short"));
    }

    let (framed, trailer) = bytes.split_at(bytes.len() - DIGEST_LEN);
    if digest(framed).as_slice() != trailer {
        return Err(malformed("digest mismatch"));
    }

    let header = VaultHeader::decode(framed)?;

    let len_field = &framed[HEADER_LEN..HEADER_LEN + DATA_LEN_FIELD];
    let data_len = u32::from_le_bytes([len_field[0], len_field[1], len_field[2], len_field[3]]);
    let data_len = usize::try_from(data_len).map_err(|_| malformed("data length overflow"))?;
    if data_len == 0 {
        return Err(malformed("empty data region"));
    }

    let data = &framed[HEADER_LEN + DATA_LEN_FIELD..];
    if data.len() != data_len {
        return Err(malformed(&format!(
            "data length {data_len} does not match {} bytes present",
            data.len()
        )));
    }

    Ok((header, SecureBuffer::from_slice(data)?))
}

/// Encode a container into memory.
pub fn encode(header: &VaultHeader, data: &[u8]) -> Result<Zeroizing<Vec<u8>>, ChainVaultError> {
    if data.is_empty() {
        return Err(ChainVaultError::Validation(
            "container data must not be empty".to_string(),
        ));
    }
    let data_len = u32::try_from(data.len()).map_err(|_| {
        ChainVaultError::Validation(format!("container data of {} bytes is too large", data.len()))
    })?;

    let mut out = Zeroizing::new(Vec::new());
    out.try_reserve_exact(HEADER_LEN + DATA_LEN_FIELD + data.len() + DIGEST_LEN)
        .map_err(|e| ChainVaultError::ResourceExhausted(format!("container buffer: {e}")))?;
    header.encode(&mut out);
    out.extend_from_slice(&data_len.to_le_bytes());
    out.extend_from_slice(data);
    let trailer = digest(&out);
    out.extend_from_slice(&trailer);
    Ok(out)
}

/// Write a container to `path` atomically.
pub fn write(path: &Path, header: &VaultHeader, data: &[u8]) -> Result<(), ChainVaultError> {
    let bytes = encode(header, data)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let context = || format!("failed to place vault {}", path.display());

    let mut file =
        tempfile::NamedTempFile::new_in(dir).map_err(|e| ChainVaultError::io(context(), e))?;
    file.write_all(&bytes)
        .map_err(|e| ChainVaultError::io(context(), e))?;
    file.as_file()
        .sync_all()
        .map_err(|e| ChainVaultError::io(context(), e))?;
    file.persist(path)
        .map_err(|e| ChainVaultError::io(context(), e.error))?;
    Ok(())
}
