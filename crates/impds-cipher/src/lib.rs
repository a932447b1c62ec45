//! IMPDS Cipher - Identifier Codec.
//!
//! Reversible obscuring of the sensitive beneficiary identifier for transit
//! and storage, using ChaCha20-Poly1305 AEAD under a key derived from a
//! shared passphrase.
//!
//! # Security Properties
//!
//! - **Confidentiality**: `ChaCha20` stream cipher
//! - **Authenticity**: `Poly1305` MAC
//! - **Nonce**: 96-bit random nonce per encoding
//! - **Key**: 256-bit, Argon2id from the configured shared passphrase
//!
//! The wire form is `base64(nonce || ciphertext || tag)`, so every encoded
//! value is self-contained and decodable by any party holding the
//! passphrase.
//!
//! # Example
//!
//! ```rust
//! use impds_cipher::IdentifierCodec;
//!
//! # fn main() -> Result<(), impds_cipher::CipherError> {
//! let codec = IdentifierCodec::new("shared-passphrase")?;
//! let encoded = codec.encode("999988887777")?;
//! assert_eq!(codec.decode(&encoded)?, "999988887777");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod codec;
pub mod error;
pub mod kdf;

pub use codec::IdentifierCodec;
pub use error::{CipherError, Result};
