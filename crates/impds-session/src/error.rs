//! Session error types.

use thiserror::Error;

/// Errors produced by session acquisition and management.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Every login attempt and the cached-token fallback failed.
    #[error("authentication exhausted after {attempts} attempt(s): {detail}")]
    AuthExhausted {
        /// Number of login attempts made.
        attempts: u32,
        /// Last diagnostic output observed from the login collaborator.
        detail: String,
    },

    /// A refresh this caller was waiting on completed without producing a
    /// fresh session. The caller never ran its own login attempt.
    #[error("awaited session refresh failed: {0}")]
    RefreshFailed(String),

    /// I/O error spawning or reading the login collaborator.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using `SessionError`.
pub type Result<T> = std::result::Result<T, SessionError>;
