//! Search orchestrator: session, outbound request, expiry retry, parse.

use crate::error::{Result, SearchError};
use crate::parser::{parse_search_results, RationCardRecord};
use impds_cipher::IdentifierCodec;
use impds_core::{PortalConfig, SearchConfig};
use impds_session::SessionManager;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, COOKIE, ORIGIN, REFERER};
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;

/// Body markers that identify a server-side logged-out response.
const EXPIRY_MARKERS: [&str; 3] = ["Login Page", "UserLogin", "REQ_CSRF_TOKEN"];

/// Session-aware client for the portal's duplicate-beneficiary search.
///
/// Owns the retry state machine around session expiry; login retries are
/// the session manager's concern and are not compounded here.
#[derive(Debug)]
pub struct SearchClient {
    http: reqwest::Client,
    session: Arc<SessionManager>,
    codec: IdentifierCodec,
    search_url: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl SearchClient {
    /// Build a client over the given session manager and identifier codec.
    ///
    /// The underlying HTTP client carries the configured per-request
    /// timeout and a static set of browser-identifying headers.
    pub fn new(
        session: Arc<SessionManager>,
        codec: IdentifierCodec,
        portal: &PortalConfig,
        search: &SearchConfig,
    ) -> Result<Self> {
        let search_url = portal.search_url();

        let http = reqwest::Client::builder()
            .user_agent(portal.user_agent.clone())
            .default_headers(static_headers(portal, &search_url))
            .timeout(Duration::from_secs(search.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            session,
            codec,
            search_url,
            max_retries: search.max_retries,
            retry_delay: Duration::from_millis(search.retry_delay_ms),
        })
    }

    /// Run one search, retrying transparently on session expiry.
    ///
    /// The identifier is resolved to its encoded form once, up front;
    /// already-encoded input passes through unchanged. Each attempt obtains
    /// a valid session (failure there propagates immediately), sends the
    /// form, and classifies the response. Expiry with budget left
    /// invalidates the session and retries after a fixed delay; the next
    /// attempt's session check triggers a fresh login.
    pub async fn search(&self, term: &str, identifier: &str) -> Result<Vec<RationCardRecord>> {
        let encoded = self.codec.ensure_encoded(identifier)?;

        for attempt in 1..=self.max_retries {
            let token = self.session.ensure_valid().await?;

            let response = self
                .http
                .post(&self.search_url)
                .header(
                    COOKIE,
                    format!("JSESSIONID={token}; PDS_SESSION_ID={token}"),
                )
                .form(&[("search", term), ("aadhar", encoded.as_str())])
                .send()
                .await?;

            let status = response.status();
            let body = response.text().await?;

            if is_session_expired(status, &body) {
                tracing::info!(
                    "Session expiry detected (attempt {attempt}/{})",
                    self.max_retries
                );
                if attempt < self.max_retries {
                    self.session.invalidate().await;
                    tokio::time::sleep(self.retry_delay).await;
                    continue;
                }
                break;
            }

            if status != StatusCode::OK {
                return Err(SearchError::HttpStatus {
                    status: status.as_u16(),
                    body,
                });
            }

            let records = parse_search_results(&body)?;
            tracing::info!("Search completed, found {} ration card(s)", records.len());
            return Ok(records);
        }

        Err(SearchError::SessionExpiredRetriesExhausted {
            attempts: self.max_retries,
        })
    }
}

/// Classify a response as a session-expiry signal.
///
/// The portal answers an expired session with either HTTP 500 or a login
/// page; the body markers catch the latter even under a 200 status.
fn is_session_expired(status: StatusCode, body: &str) -> bool {
    status == StatusCode::INTERNAL_SERVER_ERROR
        || EXPIRY_MARKERS.iter().any(|marker| body.contains(marker))
}

/// Static browser-identifying headers sent with every search request.
fn static_headers(portal: &PortalConfig, search_url: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-IN,en-GB;q=0.9,en-US;q=0.8,en;q=0.7,hi;q=0.6"),
    );
    if let Ok(url) = reqwest::Url::parse(&portal.base_url) {
        if let Ok(origin) = HeaderValue::from_str(&url.origin().ascii_serialization()) {
            headers.insert(ORIGIN, origin);
        }
    }
    if let Ok(referer) = HeaderValue::from_str(search_url) {
        headers.insert(REFERER, referer);
    }
    headers.insert(
        "upgrade-insecure-requests",
        HeaderValue::from_static("1"),
    );
    headers
}
