//! Service entry point: config, logging, first-session bootstrap, serve.

use anyhow::Context;
use impds_cipher::IdentifierCodec;
use impds_core::{AppConfig, ServerConfig};
use impds_search::SearchClient;
use impds_server::{router, AppState};
use impds_session::{CommandAuthenticator, SessionManager};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::load_with_env().context("load configuration")?;

    let authenticator = Arc::new(CommandAuthenticator::from_config(&config.login));
    let session = Arc::new(SessionManager::new(
        authenticator,
        &config.login,
        &config.session,
    ));

    // Fail fast: never serve without having authenticated once
    initialize_session(&session, &config.server).await;

    let codec = IdentifierCodec::new(&config.crypto.shared_passphrase)
        .context("derive identifier key")?;
    let client = Arc::new(
        SearchClient::new(
            session.clone(),
            codec.clone(),
            &config.portal,
            &config.search,
        )
        .context("build search client")?,
    );

    let app = router(AppState::new(session, client, codec));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.server.port))
        .await
        .with_context(|| format!("bind port {}", config.server.port))?;
    tracing::info!("Server running at http://localhost:{}", config.server.port);

    axum::serve(listener, app).await.context("serve")?;
    Ok(())
}

/// Obtain the first session, retrying a bounded number of times.
///
/// Exhausting the startup budget terminates the process with a non-zero
/// exit status.
async fn initialize_session(session: &SessionManager, server: &ServerConfig) {
    for attempt in 1..=server.init_max_retries {
        tracing::info!(
            "Initializing server (attempt {attempt}/{})",
            server.init_max_retries
        );

        match session.ensure_valid().await {
            Ok(_) => {
                tracing::info!("Server initialized with valid session");
                return;
            }
            Err(e) => {
                tracing::error!("Initialization attempt {attempt} failed: {e}");
                if attempt < server.init_max_retries {
                    tracing::info!("Retrying in {} seconds", server.init_retry_delay_secs);
                    tokio::time::sleep(Duration::from_secs(server.init_retry_delay_secs)).await;
                }
            }
        }
    }

    tracing::error!(
        "Failed to initialize server after {} attempts",
        server.init_max_retries
    );
    std::process::exit(1);
}
