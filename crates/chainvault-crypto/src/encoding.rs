// SPDX-FileCopyrightText: 2026 Chainvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! URL-safe base64 for file attachments inside the entry-store document.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use chainvault_core::ChainVaultError;
use zeroize::Zeroizing;

/// Encode bytes with the URL-safe alphabet and padding.
pub fn encode(data: &[u8]) -> Zeroizing<String> {
    Zeroizing::new(URL_SAFE.encode(data))
}

/// Decode URL-safe base64. Empty input and lengths that are not a multiple
/// of four are rejected.
pub fn decode(encoded: &str) -> Result<Zeroizing<Vec<u8>>, ChainVaultError> {
    if encoded.is_empty() || encoded.len() % 4 != 0 {
        return Err(ChainVaultError::Validation(format!(
            "base64 input length {} is not a non-zero multiple of 4",
            encoded.len()
        )));
    }

    URL_SAFE
        .decode(encoded)
        .map(Zeroizing::new)
        .map_err(|e| ChainVaultError::Validation(format!("invalid base64: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_url_safe_alphabet() {
        let encoded = encode(&[0xfb, 0xff]);
        assert_eq!(encoded.as_str(), "-_8=");
        assert_eq!(decode(&encoded).unwrap().as_slice(), &[0xfb, 0xff]);
    }

    #[test]
    fn rejects_bad_lengths() {
        assert!(decode("").is_err());
        assert!(decode("abc").is_err());
    }

    #[test]
    fn rejects_standard_alphabet() {
        assert!(decode("+/8=").is_err());
    }
}
