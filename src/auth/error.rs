//! Authentication error kinds and their HTTP mapping

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use http::{header, HeaderValue, StatusCode};
use serde::Serialize;

use super::models::Provider;
use crate::db::{StoreError, UniqueField};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("This account uses social login. Please sign in with Google or GitHub.")]
    SocialOnlyAccount,

    #[error("A valid email address is required")]
    InvalidEmail,

    #[error("Email already exists")]
    EmailTaken,

    #[error("Password is required for email signup")]
    PasswordRequired,

    #[error("Invalid provider token")]
    InvalidToken,

    #[error("No verified email found in provider account")]
    NoVerifiedEmail,

    #[error("This provider account is already linked to another account")]
    ProviderIdentityConflict,

    #[error("Provider is already linked to this organizer")]
    AlreadyLinked,

    #[error("This provider account is already linked to another organizer")]
    ProviderTaken,

    #[error("Provider is not linked to this account")]
    NotLinked,

    #[error("Cannot unlink the last authentication method")]
    LastMethodRemaining,

    #[error("Session expired")]
    SessionExpired,

    #[error("Invalid session")]
    SessionInvalid,

    #[error("Organizer not found")]
    NotFound,

    #[error("Conflicting record")]
    Conflict,

    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("{0} login is not configured")]
    ProviderNotConfigured(Provider),

    #[error("Invalid or expired OAuth state")]
    InvalidOAuthState,

    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    #[error("Provider request failed: {0}")]
    Provider(#[from] reqwest::Error),

    #[error("Store error: {0}")]
    Store(StoreError),

    #[error("Password hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error("Token signing error: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("Random source unavailable: {0}")]
    Random(#[from] getrandom::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(UniqueField::Email) => AuthError::EmailTaken,
            StoreError::Conflict(UniqueField::ProviderIdentity) => AuthError::ProviderTaken,
            StoreError::Conflict(UniqueField::ProviderSlot) => AuthError::AlreadyLinked,
            StoreError::Conflict(_) => AuthError::Conflict,
            StoreError::NotFound => AuthError::NotFound,
            other => AuthError::Store(other),
        }
    }
}

impl AuthError {
    /// Stable machine-readable kind
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::SocialOnlyAccount => "social_only_account",
            AuthError::InvalidEmail => "invalid_email",
            AuthError::EmailTaken => "email_taken",
            AuthError::PasswordRequired => "password_required",
            AuthError::InvalidToken => "invalid_token",
            AuthError::NoVerifiedEmail => "no_verified_email",
            AuthError::ProviderIdentityConflict => "provider_identity_conflict",
            AuthError::AlreadyLinked => "already_linked",
            AuthError::ProviderTaken => "provider_taken",
            AuthError::NotLinked => "not_linked",
            AuthError::LastMethodRemaining => "last_method_remaining",
            AuthError::SessionExpired => "session_expired",
            AuthError::SessionInvalid => "session_invalid",
            AuthError::NotFound => "not_found",
            AuthError::Conflict => "conflict",
            AuthError::UnsupportedProvider(_) => "unsupported_provider",
            AuthError::ProviderNotConfigured(_) => "provider_not_configured",
            AuthError::InvalidOAuthState => "invalid_oauth_state",
            AuthError::TokenExchange(_) => "token_exchange_failed",
            AuthError::Provider(_) => "provider_unavailable",
            AuthError::Store(_)
            | AuthError::Hashing(_)
            | AuthError::Signing(_)
            | AuthError::Random(_)
            | AuthError::Task(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials
            | AuthError::SocialOnlyAccount
            | AuthError::InvalidToken
            | AuthError::NoVerifiedEmail
            | AuthError::SessionExpired
            | AuthError::SessionInvalid => StatusCode::UNAUTHORIZED,
            AuthError::EmailTaken
            | AuthError::ProviderIdentityConflict
            | AuthError::AlreadyLinked
            | AuthError::ProviderTaken
            | AuthError::Conflict => StatusCode::CONFLICT,
            AuthError::InvalidEmail
            | AuthError::PasswordRequired
            | AuthError::NotLinked
            | AuthError::LastMethodRemaining
            | AuthError::UnsupportedProvider(_)
            | AuthError::InvalidOAuthState => StatusCode::BAD_REQUEST,
            AuthError::NotFound => StatusCode::NOT_FOUND,
            AuthError::ProviderNotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::TokenExchange(_) | AuthError::Provider(_) => StatusCode::BAD_GATEWAY,
            AuthError::Store(_)
            | AuthError::Hashing(_)
            | AuthError::Signing(_)
            | AuthError::Random(_)
            | AuthError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The caller should drop its session token and re-authenticate
    pub fn is_session_failure(&self) -> bool {
        matches!(self, AuthError::SessionExpired | AuthError::SessionInvalid)
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            log::error!("Auth request failed: {}", self);
            match status {
                StatusCode::INTERNAL_SERVER_ERROR => "Internal error".to_string(),
                _ => self.to_string(),
            }
        } else {
            self.to_string()
        };

        let mut response = (
            status,
            Json(ErrorResponse {
                error: message,
                code: self.code(),
            }),
        )
            .into_response();

        if self.is_session_failure() {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static(r#"Bearer error="invalid_token""#),
            );
        }
        response
    }
}
