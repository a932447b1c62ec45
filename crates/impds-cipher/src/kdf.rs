//! Key derivation from the shared passphrase.
//!
//! Uses Argon2id with a fixed application salt. The salt is fixed on
//! purpose: every deployment holding the same passphrase must derive the
//! same key, since encoded identifiers are exchanged between parties.

use crate::error::{CipherError, Result};
use argon2::Argon2;

/// Length of derived keys in bytes (256 bits).
pub const KEY_LENGTH: usize = 32;

/// Fixed application salt for identifier-key derivation.
const IDENTIFIER_SALT: &[u8] = b"impds-dedup-identifier-v1";

/// Derive a 256-bit key from the shared passphrase.
///
/// # Errors
/// Returns `CipherError::KeyDerivation` if Argon2 rejects the inputs.
pub fn derive_key(passphrase: &str) -> Result<[u8; KEY_LENGTH]> {
    let mut key = [0u8; KEY_LENGTH];
    Argon2::default()
        .hash_password_into(passphrase.as_bytes(), IDENTIFIER_SALT, &mut key)
        .map_err(|e| CipherError::KeyDerivation(e.to_string()))?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derivation_is_deterministic() {
        let key1 = derive_key("passphrase").expect("derive key 1");
        let key2 = derive_key("passphrase").expect("derive key 2");
        assert_eq!(key1, key2);
    }

    #[test]
    fn test_different_passphrases_differ() {
        let key1 = derive_key("passphrase-a").expect("derive key a");
        let key2 = derive_key("passphrase-b").expect("derive key b");
        assert_ne!(key1, key2);
    }
}
