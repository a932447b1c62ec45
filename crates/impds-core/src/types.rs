//! Shared types used across the workspace.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Newtype for ration card numbers.
///
/// Card numbers arrive as free-form text scraped from the portal; they are
/// trimmed but otherwise kept verbatim, since formats vary between states.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RationCardNo(String);

impl RationCardNo {
    /// Create a new `RationCardNo`, trimming surrounding whitespace.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().trim().to_string())
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the card number is empty after trimming.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RationCardNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RationCardNo {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}
