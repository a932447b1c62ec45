//! Search and parse error types.

use impds_cipher::CipherError;
use impds_session::SessionError;
use thiserror::Error;

/// Errors reported by the response parser.
///
/// A typed failure distinct from the success sequence; the parser never
/// returns an empty success where one of these applies.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The payload did not contain the expected two result tables.
    #[error("No valid data found in response")]
    NoValidData,

    /// The result table was present but held no rows.
    #[error("No records found")]
    NoRecords,
}

/// Errors produced by the search orchestrator.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Session acquisition failed; not retried at this layer.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// Identifier encoding failed.
    #[error("cipher error: {0}")]
    Cipher(#[from] CipherError),

    /// Every attempt ran into a session-expiry signal.
    #[error("max retries exceeded for session refresh ({attempts} attempts)")]
    SessionExpiredRetriesExhausted {
        /// Number of attempts made.
        attempts: u32,
    },

    /// Network or timeout failure on the outbound request.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Unexpected non-200, non-expiry response.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// Response status code.
        status: u16,
        /// Response body, kept for diagnosis.
        body: String,
    },

    /// The portal answered 200 but the payload had no parseable records.
    #[error("{0}")]
    Parse(#[from] ParseError),
}

/// Result type alias using `SearchError`.
pub type Result<T> = std::result::Result<T, SearchError>;
