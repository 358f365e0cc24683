// SPDX-FileCopyrightText: 2026 Chainvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OS-backed randomness for salts, nonces and pre-keys.

use chainvault_core::ChainVaultError;
use ring::rand::{SecureRandom, SystemRandom};

use crate::SecureBuffer;

/// Fill `dest` from the system CSPRNG.
pub fn fill_random(dest: &mut [u8]) -> Result<(), ChainVaultError> {
    SystemRandom::new().fill(dest).map_err(|_| {
        ChainVaultError::ResourceExhausted("system random number generator failed".to_string())
    })
}

/// Allocate a secure buffer of `len` random bytes.
pub fn random_buffer(len: usize) -> Result<SecureBuffer, ChainVaultError> {
    let mut buffer = SecureBuffer::zeroed(len)?;
    fill_random(&mut buffer)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_buffers_differ() {
        let a = random_buffer(32).unwrap();
        let b = random_buffer(32).unwrap();
        assert_eq!(a.len(), 32);
        assert_ne!(&*a, &*b);
    }
}
