// SPDX-FileCopyrightText: 2026 Chainvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Owned, zero-on-drop byte buffer for key material and passwords.
//!
//! A [`SecureBuffer`] has exactly one owner. It cannot be cloned implicitly;
//! [`SecureBuffer::try_clone`] is the only way to duplicate its content. The
//! size is fixed at construction and the bytes are zeroized on drop.

use std::fmt;
use std::ops::{Deref, DerefMut};

use chainvault_core::ChainVaultError;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Fixed-size, move-only secret buffer.
pub struct SecureBuffer {
    bytes: Box<[u8]>,
}

impl SecureBuffer {
    /// Allocate a zero-filled buffer of `len` bytes.
    ///
    /// The allocation is fallible: exhaustion is reported as
    /// [`ChainVaultError::ResourceExhausted`] rather than aborting.
    pub fn zeroed(len: usize) -> Result<Self, ChainVaultError> {
        let mut bytes = Vec::new();
        bytes.try_reserve_exact(len).map_err(|e| {
            ChainVaultError::ResourceExhausted(format!(
                "failed to allocate {len}-byte secure buffer: {e}"
            ))
        })?;
        bytes.resize(len, 0);
        Ok(Self {
            bytes: bytes.into_boxed_slice(),
        })
    }

    /// Allocate a buffer holding a copy of `data`.
    pub fn from_slice(data: &[u8]) -> Result<Self, ChainVaultError> {
        let mut buffer = Self::zeroed(data.len())?;
        buffer.copy_from_slice(data);
        Ok(buffer)
    }

    /// Explicit deep copy.
    pub fn try_clone(&self) -> Result<Self, ChainVaultError> {
        Self::from_slice(&self.bytes)
    }

    /// An empty buffer with no backing allocation.
    pub fn empty() -> Self {
        Self {
            bytes: Box::default(),
        }
    }

    /// The bytes before the first NUL, or the whole buffer if there is none.
    ///
    /// Fixed-size input fields are zero-padded; this yields the entered text.
    pub fn as_c_str(&self) -> &[u8] {
        let end = self
            .bytes
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.bytes.len());
        &self.bytes[..end]
    }
}

impl Default for SecureBuffer {
    fn default() -> Self {
        Self::empty()
    }
}

impl Deref for SecureBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}

impl DerefMut for SecureBuffer {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

impl Drop for SecureBuffer {
    fn drop(&mut self) {
        self.bytes.as_mut().zeroize();
    }
}

impl ZeroizeOnDrop for SecureBuffer {}

impl fmt::Debug for SecureBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecureBuffer([REDACTED; {}])", self.bytes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroed_buffer_has_requested_size() {
        let buffer = SecureBuffer::zeroed(32).unwrap();
        assert_eq!(buffer.len(), 32);
        assert!(buffer.iter().all(|&b| b == 0));
    }

    #[test]
    fn try_clone_is_a_deep_copy() {
        let mut original = SecureBuffer::from_slice(b"hunter2").unwrap();
        let copy = original.try_clone().unwrap();
        original[0] = b'H';
        assert_eq!(&*copy, b"hunter2");
        assert_eq!(&*original, b"Hunter2");
    }

    #[test]
    fn debug_output_is_redacted() {
        let buffer = SecureBuffer::from_slice(b"top-secret").unwrap();
        let debug = format!("{buffer:?}");
        assert!(!debug.contains("top-secret"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn as_c_str_stops_at_first_nul() {
        let mut buffer = SecureBuffer::zeroed(16).unwrap();
        buffer[..3].copy_from_slice(b"pet");
        assert_eq!(buffer.as_c_str(), b"pet");

        let full = SecureBuffer::from_slice(b"abc").unwrap();
        assert_eq!(full.as_c_str(), b"abc");
    }

    #[test]
    fn empty_buffer_is_empty() {
        assert!(SecureBuffer::empty().is_empty());
        assert!(SecureBuffer::default().as_c_str().is_empty());
    }

    #[test]
    fn oversized_allocation_is_resource_exhaustion() {
        let err = SecureBuffer::zeroed(usize::MAX).unwrap_err();
        assert!(err.is_critical());
    }
}
