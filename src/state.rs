//! Shared application state handed to every handler

use std::sync::Arc;

use crate::auth::{
    IdentityResolver, OAuthConfig, OAuthManager, OrganizerStore, ProviderLinkManager,
    SessionConfig, SessionIssuer, TokenVerifier,
};
use crate::db::Database;

pub struct AppState {
    pub db: Database,
    pub sessions: SessionIssuer,
    pub resolver: IdentityResolver,
    pub links: ProviderLinkManager,
    pub oauth: OAuthManager,
    /// Where browser OAuth flows land after the callback
    pub frontend_url: String,
}

impl AppState {
    pub fn new(
        db: Database,
        session_config: &SessionConfig,
        oauth_config: OAuthConfig,
        verifier: Arc<dyn TokenVerifier>,
        frontend_url: String,
    ) -> Self {
        let store: Arc<dyn OrganizerStore> = Arc::new(db.clone());

        Self {
            sessions: SessionIssuer::new(session_config),
            resolver: IdentityResolver::new(Arc::clone(&store), Arc::clone(&verifier)),
            links: ProviderLinkManager::new(store, verifier),
            oauth: OAuthManager::new(oauth_config, session_config.secret()),
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
            db,
        }
    }
}
