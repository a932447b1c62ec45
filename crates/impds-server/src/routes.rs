//! Route handlers and error-to-status mapping.

use crate::state::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use impds_search::SearchError;
use serde::Deserialize;
use serde_json::json;

/// Build the API router over the shared state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/search-aadhaar", get(search_aadhaar))
        .route("/crypto", get(crypto))
        .route("/health", get(health))
        .with_state(state)
}

fn json_error(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(json!({ "success": false, "error": error.into() })),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    search: Option<String>,
    aadhaar: Option<String>,
}

async fn search_aadhaar(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    // The portal requires a search term; "A" matches everything
    let search = params.search.unwrap_or_else(|| "A".to_string());

    let Some(aadhaar) = params.aadhaar else {
        return json_error(StatusCode::BAD_REQUEST, "Missing aadhaar parameter");
    };

    let prefix: String = aadhaar.chars().take(10).collect();
    tracing::info!("Search request: search=\"{search}\", aadhaar=\"{prefix}...\"");

    match state.client.search(&search, &aadhaar).await {
        Ok(records) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "count": records.len(),
                "results": records,
            })),
        )
            .into_response(),
        Err(SearchError::Parse(e)) => json_error(StatusCode::NOT_FOUND, e.to_string()),
        Err(e) => {
            tracing::error!("Search failed: {e}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
struct CryptoParams {
    action: Option<String>,
    text: Option<String>,
}

async fn crypto(State(state): State<AppState>, Query(params): Query<CryptoParams>) -> Response {
    let (Some(action), Some(text)) = (params.action, params.text) else {
        return json_error(
            StatusCode::BAD_REQUEST,
            "Missing parameters. Required: action and text",
        );
    };

    match action.to_lowercase().as_str() {
        "encrypt" => match state.codec.encode(&text) {
            Ok(encrypted) => Json(json!({
                "success": true,
                "action": "encrypt",
                "original": text,
                "encrypted": encrypted,
            }))
            .into_response(),
            Err(e) => json_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        },
        "decrypt" => match state.codec.decode(&text) {
            Ok(decrypted) => Json(json!({
                "success": true,
                "action": "decrypt",
                "encrypted": text,
                "decrypted": decrypted,
            }))
            .into_response(),
            Err(e) => json_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        },
        _ => json_error(
            StatusCode::BAD_REQUEST,
            "Invalid action. Use \"encrypt\" or \"decrypt\"",
        ),
    }
}

async fn health(State(state): State<AppState>) -> Response {
    let session_age = match state.session.age_minutes().await {
        Some(minutes) => format!("{minutes} minutes"),
        None => "N/A".to_string(),
    };

    Json(json!({
        "success": true,
        "service": "IMPDS Aadhaar Search API",
        "session_active": state.session.has_session().await,
        "session_age": session_age,
        "endpoints": {
            "aadhaar_search": "/search-aadhaar?search=A&aadhaar=AADHAAR_NUMBER",
            "crypto": "/crypto?action=encrypt|decrypt&text=TEXT",
            "health": "/health",
        },
        "status": "Server is running",
    }))
    .into_response()
}
