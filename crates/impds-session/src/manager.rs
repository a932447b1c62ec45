//! Session manager: freshness tracking and single-flight renewal.
//!
//! The manager is the sole writer of the process-wide session. Renewal is
//! serialized through a `tokio::sync::Mutex`; callers that ask for a valid
//! session while a refresh is in flight suspend on the lock (the waiter
//! queue) and are released when the refresh completes, whether it succeeded
//! or failed. Released callers re-check freshness themselves; a refresh
//! generation counter lets them adopt the completed attempt's outcome
//! instead of launching a second login.

use crate::authenticator::{Authenticator, LoginOutcome};
use crate::error::{Result, SessionError};
use crate::session::Session;
use chrono::Duration as ChronoDuration;
use impds_core::{LoginConfig, SessionConfig};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Fallback tokens shorter than this are rejected as junk.
const MIN_FALLBACK_TOKEN_LEN: usize = 10;

/// Mutable session state guarded by the refresh lock.
#[derive(Debug, Default)]
struct ManagerState {
    /// The one process-wide session.
    session: Session,
    /// Message from the most recent failed refresh.
    last_failure: Option<String>,
}

impl ManagerState {
    fn fresh_token(&self, window: ChronoDuration) -> Option<String> {
        if self.session.is_fresh(window) {
            self.session.token().map(str::to_string)
        } else {
            None
        }
    }
}

/// Owns the portal session and serializes its renewal.
pub struct SessionManager {
    authenticator: Arc<dyn Authenticator>,
    state: Mutex<ManagerState>,
    /// Refresh generation, bumped once per completed attempt. Read without
    /// the lock so callers can tell whether the refresh they queued behind
    /// is the one that completed.
    epoch: AtomicU64,
    freshness: ChronoDuration,
    max_retries: u32,
    retry_delay: Duration,
    fallback_token_file: PathBuf,
}

impl SessionManager {
    /// Create a manager over the given authenticator, with retry and
    /// freshness settings from configuration.
    #[must_use]
    pub fn new(
        authenticator: Arc<dyn Authenticator>,
        login: &LoginConfig,
        session: &SessionConfig,
    ) -> Self {
        Self {
            authenticator,
            state: Mutex::new(ManagerState::default()),
            epoch: AtomicU64::new(0),
            freshness: ChronoDuration::minutes(session.freshness_minutes),
            max_retries: login.max_retries,
            retry_delay: Duration::from_millis(login.retry_delay_ms),
            fallback_token_file: login.fallback_token_file.clone(),
        }
    }

    /// Return a fresh session token, renewing the session if necessary.
    ///
    /// At most one login attempt is in flight at any time. Callers that
    /// arrive while a refresh is underway suspend until it completes and
    /// then adopt its outcome: the fresh token on success, or
    /// [`SessionError::RefreshFailed`] on failure. They never launch a
    /// second attempt for the refresh they waited on.
    pub async fn ensure_valid(&self) -> Result<String> {
        let observed_epoch = self.epoch.load(Ordering::Acquire);

        // Queue point: while a refresh holds this lock, concurrent callers
        // suspend here and are released on completion, success or failure.
        let mut state = self.state.lock().await;

        if let Some(token) = state.fresh_token(self.freshness) {
            return Ok(token);
        }

        if self.epoch.load(Ordering::Acquire) != observed_epoch {
            // The refresh we queued behind already ran and did not leave a
            // fresh session; report its outcome rather than piling on.
            let detail = state
                .last_failure
                .clone()
                .unwrap_or_else(|| "refresh did not produce a fresh session".to_string());
            return Err(SessionError::RefreshFailed(detail));
        }

        tracing::info!("Session needs refresh, acquiring a new token");
        let result = self.acquire().await;
        self.epoch.fetch_add(1, Ordering::AcqRel);

        match result {
            Ok(token) => {
                state.session = Session::obtained_now(token.clone());
                state.last_failure = None;
                tracing::info!("Session refreshed successfully");
                Ok(token)
            }
            Err(e) => {
                state.last_failure = Some(e.to_string());
                tracing::error!("Failed to refresh session: {e}");
                Err(e)
            }
        }
    }

    /// Force the session stale so the next `ensure_valid` renews it.
    ///
    /// Used when a downstream request detects server-side expiry mid-flight.
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        state.session.invalidate();
        tracing::debug!("Session invalidated");
    }

    /// Whether a token was ever obtained.
    pub async fn has_session(&self) -> bool {
        self.state.lock().await.session.token().is_some()
    }

    /// Age of the current session in whole minutes, if known.
    pub async fn age_minutes(&self) -> Option<i64> {
        self.state
            .lock()
            .await
            .session
            .age()
            .map(|age| age.num_minutes())
    }

    /// Run the bounded login loop, falling back to the cached token file.
    ///
    /// Invokes the authenticator up to `max_retries` times with a fixed
    /// inter-attempt delay. If no attempt produces a token, a token cached
    /// by a previous successful login is read from the fallback file.
    async fn acquire(&self) -> Result<String> {
        let mut last_diagnostics = String::new();

        for attempt in 1..=self.max_retries {
            tracing::info!("Login attempt {attempt}/{}", self.max_retries);

            match self.authenticator.attempt_login().await {
                Ok(LoginOutcome {
                    token: Some(token), ..
                }) => {
                    tracing::info!("New session token obtained");
                    return Ok(token);
                }
                Ok(LoginOutcome { diagnostics, .. }) => {
                    last_diagnostics = diagnostics;
                }
                Err(e) => {
                    last_diagnostics = e.to_string();
                }
            }

            if attempt < self.max_retries {
                tracing::warn!(
                    "Login failed (attempt {attempt}/{}), retrying in {:?}",
                    self.max_retries,
                    self.retry_delay
                );
                tokio::time::sleep(self.retry_delay).await;
            }
        }

        if let Some(token) = self.read_fallback_token().await {
            tracing::info!("Session token recovered from fallback file");
            return Ok(token);
        }

        Err(SessionError::AuthExhausted {
            attempts: self.max_retries,
            detail: if last_diagnostics.is_empty() {
                "login failed".to_string()
            } else {
                last_diagnostics
            },
        })
    }

    /// Read the cached token the login collaborator writes on success.
    async fn read_fallback_token(&self) -> Option<String> {
        let contents = tokio::fs::read_to_string(&self.fallback_token_file)
            .await
            .ok()?;
        let token = contents.trim();
        (token.len() > MIN_FALLBACK_TOKEN_LEN).then(|| token.to_string())
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("freshness", &self.freshness)
            .field("max_retries", &self.max_retries)
            .field("retry_delay", &self.retry_delay)
            .field("fallback_token_file", &self.fallback_token_file)
            .finish_non_exhaustive()
    }
}
