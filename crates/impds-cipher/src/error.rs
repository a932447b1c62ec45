//! Codec error types.

use thiserror::Error;

/// Errors produced by the identifier codec.
#[derive(Debug, Error)]
pub enum CipherError {
    /// Key derivation from the shared passphrase failed.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// Encoding (encryption) failed.
    #[error("encoding failed: {0}")]
    Encode(String),

    /// Input is not a validly encoded identifier.
    #[error("not a validly encoded identifier: {0}")]
    Decode(String),
}

/// Result type alias using `CipherError`.
pub type Result<T> = std::result::Result<T, CipherError>;
