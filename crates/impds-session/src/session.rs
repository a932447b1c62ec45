//! The session value and its freshness rules.

use chrono::{DateTime, Duration, Utc};

/// A portal session: an opaque token plus the instant it was obtained.
///
/// `obtained_at = None` is the explicit "unknown" sentinel: invalidation
/// clears the timestamp (keeping the token) so the next freshness check
/// fails and forces renewal.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Opaque session token, if one was ever obtained.
    token: Option<String>,
    /// When the token was obtained; `None` after invalidation.
    obtained_at: Option<DateTime<Utc>>,
}

impl Session {
    /// A session that was never obtained.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A session obtained just now.
    #[must_use]
    pub fn obtained_now(token: String) -> Self {
        Self {
            token: Some(token),
            obtained_at: Some(Utc::now()),
        }
    }

    /// The session token, regardless of freshness.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Whether the session is fresh at the given instant.
    ///
    /// Fresh iff the token is non-empty and the session is strictly younger
    /// than `window`.
    #[must_use]
    pub fn is_fresh_at(&self, now: DateTime<Utc>, window: Duration) -> bool {
        let has_token = self.token.as_deref().is_some_and(|t| !t.is_empty());
        let young_enough = self
            .obtained_at
            .is_some_and(|obtained| now - obtained < window);
        has_token && young_enough
    }

    /// Whether the session is fresh right now.
    #[must_use]
    pub fn is_fresh(&self, window: Duration) -> bool {
        self.is_fresh_at(Utc::now(), window)
    }

    /// Age of the session, if the obtained instant is known.
    #[must_use]
    pub fn age(&self) -> Option<Duration> {
        self.obtained_at.map(|obtained| Utc::now() - obtained)
    }

    /// Force the session stale by clearing the obtained instant.
    ///
    /// The token is kept; only the freshness evidence is discarded.
    pub fn invalidate(&mut self) {
        self.obtained_at = None;
    }
}
