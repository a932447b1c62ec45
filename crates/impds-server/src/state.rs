//! Shared handler state.

use impds_cipher::IdentifierCodec;
use impds_search::SearchClient;
use impds_session::SessionManager;
use std::sync::Arc;

/// State injected into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Owner of the portal session.
    pub session: Arc<SessionManager>,
    /// Retrying search client.
    pub client: Arc<SearchClient>,
    /// Identifier codec for the `/crypto` endpoint.
    pub codec: IdentifierCodec,
}

impl AppState {
    /// Bundle the core collaborators for the router.
    #[must_use]
    pub fn new(
        session: Arc<SessionManager>,
        client: Arc<SearchClient>,
        codec: IdentifierCodec,
    ) -> Self {
        Self {
            session,
            client,
            codec,
        }
    }
}
