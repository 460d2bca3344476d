//! Authentication REST API routes

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use super::{
    error::AuthError,
    extractor::{ApiJson, ApiPath, AuthContext},
    models::*,
};
use crate::state::AppState;

/// Create auth router
pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        // Email + password
        .route("/signup", post(signup))
        .route("/login", post(login))
        // Provider token from a client-side OAuth flow
        .route("/social/{provider}", post(social_login))
        // Redirect-based OAuth
        .route("/oauth/{provider}", get(oauth_redirect))
        .route("/oauth/{provider}/callback", get(oauth_callback))
        .route("/providers", get(get_providers))
        // Authenticated
        .route("/me", get(get_current_organizer))
        .route("/profile", get(get_full_profile))
        .route("/link/{provider}", post(link_provider))
        .route("/unlink/{provider}", delete(unlink_provider))
}

fn parse_provider(name: &str) -> Result<Provider, AuthError> {
    Provider::from_name(name).ok_or_else(|| AuthError::UnsupportedProvider(name.to_string()))
}

fn access_token(state: &AppState, organizer: &Organizer) -> Result<AccessTokenResponse, AuthError> {
    Ok(AccessTokenResponse {
        access_token: state.sessions.issue(&organizer.id)?,
    })
}

/// POST /api/auth/signup
///
/// bcrypt runs on the blocking pool, as does the login check.
async fn signup(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let resolver = state.resolver.clone();
    let organizer =
        tokio::task::spawn_blocking(move || resolver.signup(&req.email, &req.password)).await??;
    Ok((StatusCode::CREATED, Json(OrganizerResponse::from(&organizer))))
}

/// POST /api/auth/login
async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<AccessTokenResponse>, AuthError> {
    let resolver = state.resolver.clone();
    let organizer =
        tokio::task::spawn_blocking(move || resolver.login(&req.email, &req.password)).await??;
    Ok(Json(access_token(&state, &organizer)?))
}

/// POST /api/auth/social/:provider
async fn social_login(
    State(state): State<Arc<AppState>>,
    ApiPath(provider): ApiPath<String>,
    ApiJson(req): ApiJson<SocialTokenRequest>,
) -> Result<Json<AccessTokenResponse>, AuthError> {
    let provider = parse_provider(&provider)?;
    let organizer = state
        .resolver
        .authenticate_social(provider, &req.token)
        .await?;
    Ok(Json(access_token(&state, &organizer)?))
}

/// GET /api/auth/oauth/:provider - Redirect to OAuth provider
async fn oauth_redirect(
    State(state): State<Arc<AppState>>,
    ApiPath(provider): ApiPath<String>,
) -> Result<Redirect, AuthError> {
    let provider = parse_provider(&provider)?;
    let url = state.oauth.authorize_url(provider)?;
    Ok(Redirect::temporary(&url))
}

/// GET /api/auth/oauth/:provider/callback - OAuth callback
///
/// Always answers with a redirect to the frontend: the session token on
/// success, an error kind otherwise.
async fn oauth_callback(
    State(state): State<Arc<AppState>>,
    ApiPath(provider): ApiPath<String>,
    Query(callback): Query<OAuthCallback>,
) -> Response {
    match complete_oauth(&state, &provider, callback).await {
        Ok(token) => {
            Redirect::temporary(&format!("{}/auth/success?token={}", state.frontend_url, token))
                .into_response()
        }
        Err(e) => {
            log::warn!("OAuth callback for {} failed: {}", provider, e);
            Redirect::temporary(&format!("{}/login?error={}", state.frontend_url, e.code()))
                .into_response()
        }
    }
}

async fn complete_oauth(
    state: &AppState,
    provider: &str,
    callback: OAuthCallback,
) -> Result<String, AuthError> {
    let provider = parse_provider(provider)?;
    if let Some(error) = callback.error {
        return Err(AuthError::TokenExchange(format!("provider returned {}", error)));
    }
    let code = callback.code.ok_or(AuthError::InvalidToken)?;
    let oauth_state = callback.state.ok_or(AuthError::InvalidOAuthState)?;

    let provider_token = state
        .oauth
        .exchange_code(provider, &code, &oauth_state)
        .await?;
    let organizer = state
        .resolver
        .authenticate_social(provider, &provider_token)
        .await?;
    state.sessions.issue(&organizer.id)
}

/// GET /api/auth/providers - Providers available for redirect login
async fn get_providers(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    #[derive(Serialize)]
    struct ProvidersResponse {
        providers: Vec<Provider>,
    }

    Json(ProvidersResponse {
        providers: state.oauth.get_configured_providers(),
    })
}

/// GET /api/auth/me
async fn get_current_organizer(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
) -> Result<Json<OrganizerResponse>, AuthError> {
    // a valid token for an organizer that no longer exists is not a session
    match state.resolver.validate_organizer(&auth.organizer_id) {
        Ok(organizer) => Ok(Json(organizer)),
        Err(AuthError::NotFound) => Err(AuthError::SessionInvalid),
        Err(e) => Err(e),
    }
}

/// GET /api/auth/profile
async fn get_full_profile(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
) -> Result<Json<FullProfile>, AuthError> {
    Ok(Json(state.links.get_full_profile(&auth.organizer_id)?))
}

/// POST /api/auth/link/:provider
async fn link_provider(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    ApiPath(provider): ApiPath<String>,
    ApiJson(req): ApiJson<SocialTokenRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    let provider = parse_provider(&provider)?;
    state
        .links
        .link_provider(&auth.organizer_id, provider, &req.token)
        .await?;

    Ok(Json(MessageResponse {
        message: format!("{} account linked successfully", provider),
    }))
}

/// DELETE /api/auth/unlink/:provider
async fn unlink_provider(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    ApiPath(provider): ApiPath<String>,
) -> Result<Json<MessageResponse>, AuthError> {
    let provider = parse_provider(&provider)?;
    state.links.unlink_provider(&auth.organizer_id, provider)?;

    Ok(Json(MessageResponse {
        message: format!("{} account unlinked successfully", provider),
    }))
}
