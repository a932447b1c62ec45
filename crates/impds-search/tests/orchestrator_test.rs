//! End-to-end orchestrator tests against a scripted local portal.

use async_trait::async_trait;
use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::routing::post;
use axum::Router;
use impds_cipher::IdentifierCodec;
use impds_core::{LoginConfig, PortalConfig, SearchConfig, SessionConfig};
use impds_search::{FpsCategory, SearchClient, SearchError};
use impds_session::{Authenticator, LoginOutcome, SessionManager};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

const RESULT_TABLE_CLASS: &str = "table table-striped table-bordered table-hover";

fn valid_results_html() -> String {
    format!(
        r#"
        <html><body>
        <table class="{RESULT_TABLE_CLASS}">
          <tbody>
            <tr>
              <td>1</td><td>West Bengal</td><td>Nadia</td><td>WB0412345678</td>
              <td>PHH</td><td>M-1001</td><td>Asha Rani</td><td></td>
            </tr>
            <tr>
              <td>2</td><td>West Bengal</td><td>Nadia</td><td>WB0412345678</td>
              <td>PHH</td><td>M-1002</td><td>Bikash Rani</td><td>Migrated</td>
            </tr>
            <tr>
              <td>3</td><td>Bihar</td><td>Patna</td><td>BR0998877665</td>
              <td>AAY</td><td>M-2001</td><td>Chandan Kumar</td><td></td>
            </tr>
            <tr>
              <td>4</td><td>Bihar</td><td>Patna</td><td>BR0998877665</td>
              <td>AAY</td><td>M-2002</td><td>Devi Kumar</td><td></td>
            </tr>
          </tbody>
        </table>
        <table class="{RESULT_TABLE_CLASS}">
          <tbody>
            <tr><td>Is FPS category online</td><td>Yes</td></tr>
            <tr><td>Is IMPDS transaction allowed</td><td>Yes</td></tr>
            <tr><td>Exists in Central Repository</td><td>No</td></tr>
            <tr><td>Is duplicate Aadaar beneficiary</td><td>Yes</td></tr>
          </tbody>
        </table>
        </body></html>
        "#
    )
}

/// Scripted portal: pops one (status, body) per search request.
#[derive(Clone)]
struct PortalState {
    responses: Arc<Mutex<VecDeque<(u16, String)>>>,
    hits: Arc<AtomicU32>,
    bodies: Arc<Mutex<Vec<String>>>,
}

impl PortalState {
    fn hits(&self) -> u32 {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn search_handler(State(state): State<PortalState>, body: String) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    state.bodies.lock().expect("bodies lock").push(body);

    let (status, html) = state
        .responses
        .lock()
        .expect("responses lock")
        .pop_front()
        .unwrap_or((200, "UserLogin".to_string()));

    (
        axum::http::StatusCode::from_u16(status).expect("valid status"),
        Html(html),
    )
}

async fn spawn_portal(responses: Vec<(u16, String)>) -> (String, PortalState) {
    let state = PortalState {
        responses: Arc::new(Mutex::new(responses.into_iter().collect())),
        hits: Arc::new(AtomicU32::new(0)),
        bodies: Arc::new(Mutex::new(Vec::new())),
    };

    let app = Router::new()
        .route("/search", post(search_handler))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind portal");
    let addr = listener.local_addr().expect("portal addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve portal");
    });

    (format!("http://{addr}"), state)
}

/// Authenticator that always succeeds and counts logins.
struct CountingAuthenticator {
    calls: AtomicU32,
}

impl CountingAuthenticator {
    fn new() -> Self {
        Self {
            calls: AtomicU32::new(0),
        }
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Authenticator for CountingAuthenticator {
    async fn attempt_login(&self) -> impds_session::Result<LoginOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(LoginOutcome {
            token: Some("AABBCCDDEEFF0011".to_string()),
            diagnostics: String::new(),
        })
    }
}

fn test_client(
    base_url: &str,
    auth: Arc<CountingAuthenticator>,
    max_retries: u32,
) -> SearchClient {
    let login = LoginConfig {
        retry_delay_ms: 0,
        fallback_token_file: "/nonexistent/session.txt".into(),
        ..LoginConfig::default()
    };
    let manager = Arc::new(SessionManager::new(auth, &login, &SessionConfig::default()));

    let portal = PortalConfig {
        base_url: base_url.to_string(),
        ..PortalConfig::default()
    };
    let search = SearchConfig {
        max_retries,
        retry_delay_ms: 0,
        timeout_secs: 5,
    };

    SearchClient::new(manager, IdentifierCodec::from_key([7; 32]), &portal, &search)
        .expect("build client")
}

#[tokio::test]
async fn test_successful_search_parses_groups() {
    let (base_url, portal) = spawn_portal(vec![(200, valid_results_html())]).await;
    let auth = Arc::new(CountingAuthenticator::new());
    let client = test_client(&base_url, auth.clone(), 3);

    let records = client.search("A", "999988887777").await.expect("search");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].ration_card_no.as_str(), "WB0412345678");
    assert_eq!(records[0].members.len(), 2);
    assert_eq!(records[0].additional_info.fps_category, FpsCategory::OnlineFps);
    assert!(records[0].additional_info.duplicate_aadhaar_beneficiary);
    assert_eq!(portal.hits(), 1);
    assert_eq!(auth.calls(), 1);
}

#[tokio::test]
async fn test_identifier_is_encoded_before_send() {
    let (base_url, portal) = spawn_portal(vec![(200, valid_results_html())]).await;
    let auth = Arc::new(CountingAuthenticator::new());
    let client = test_client(&base_url, auth, 3);

    client.search("A", "999988887777").await.expect("search");

    let bodies = portal.bodies.lock().expect("bodies lock");
    assert_eq!(bodies.len(), 1);
    assert!(bodies[0].contains("search=A"));
    assert!(bodies[0].contains("aadhar="));
    // The plaintext identifier never crosses the wire
    assert!(!bodies[0].contains("999988887777"));
}

#[tokio::test]
async fn test_expiry_then_success_retries_with_fresh_session() {
    let (base_url, portal) = spawn_portal(vec![
        (200, "<html>UserLogin</html>".to_string()),
        (200, valid_results_html()),
    ])
    .await;
    let auth = Arc::new(CountingAuthenticator::new());
    let client = test_client(&base_url, auth.clone(), 3);

    let records = client.search("A", "999988887777").await.expect("search");

    assert_eq!(records.len(), 2);
    assert_eq!(portal.hits(), 2);
    // Exactly one invalidation between attempts: the second request needed
    // exactly one more login
    assert_eq!(auth.calls(), 2);
}

#[tokio::test]
async fn test_http_500_is_treated_as_expiry() {
    let (base_url, portal) = spawn_portal(vec![
        (500, "internal error".to_string()),
        (200, valid_results_html()),
    ])
    .await;
    let auth = Arc::new(CountingAuthenticator::new());
    let client = test_client(&base_url, auth, 3);

    let records = client.search("A", "999988887777").await.expect("search");

    assert_eq!(records.len(), 2);
    assert_eq!(portal.hits(), 2);
}

#[tokio::test]
async fn test_expiry_retries_exhausted() {
    let (base_url, portal) = spawn_portal(vec![
        (200, "UserLogin".to_string()),
        (200, "UserLogin".to_string()),
        (200, "UserLogin".to_string()),
    ])
    .await;
    let auth = Arc::new(CountingAuthenticator::new());
    let client = test_client(&base_url, auth, 3);

    let result = client.search("A", "999988887777").await;

    match result {
        Err(SearchError::SessionExpiredRetriesExhausted { attempts }) => {
            assert_eq!(attempts, 3);
        }
        other => panic!("expected SessionExpiredRetriesExhausted, got {other:?}"),
    }
    // No 4th attempt
    assert_eq!(portal.hits(), 3);
}

#[tokio::test]
async fn test_unexpected_status_is_hard_failure() {
    let (base_url, portal) = spawn_portal(vec![(404, "nothing here".to_string())]).await;
    let auth = Arc::new(CountingAuthenticator::new());
    let client = test_client(&base_url, auth, 3);

    let result = client.search("A", "999988887777").await;

    match result {
        Err(SearchError::HttpStatus { status, body }) => {
            assert_eq!(status, 404);
            assert_eq!(body, "nothing here");
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
    assert_eq!(portal.hits(), 1);
}

#[tokio::test]
async fn test_parse_error_is_surfaced_not_retried() {
    let (base_url, portal) =
        spawn_portal(vec![(200, "<html><p>no tables here</p></html>".to_string())]).await;
    let auth = Arc::new(CountingAuthenticator::new());
    let client = test_client(&base_url, auth, 3);

    let result = client.search("A", "999988887777").await;

    assert!(matches!(
        result,
        Err(SearchError::Parse(impds_search::ParseError::NoValidData))
    ));
    assert_eq!(portal.hits(), 1);
}

#[tokio::test]
async fn test_already_encoded_identifier_passes_through() {
    let (base_url, portal) = spawn_portal(vec![(200, valid_results_html())]).await;
    let auth = Arc::new(CountingAuthenticator::new());
    let client = test_client(&base_url, auth, 3);

    // Same key as the client
    let codec = IdentifierCodec::from_key([7; 32]);
    let encoded = codec.encode("999988887777").expect("encode");

    client.search("A", &encoded).await.expect("search");

    let bodies = portal.bodies.lock().expect("bodies lock");
    // url-decode would be needed for byte equality; presence of a single
    // aadhar field and absence of plaintext is what matters here
    assert!(bodies[0].contains("aadhar="));
    assert!(!bodies[0].contains("999988887777"));
}
