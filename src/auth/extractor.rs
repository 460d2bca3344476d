//! Request extraction for axum handlers: bearer sessions, JSON bodies and path segments

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts, Path, Request,
    },
    response::{IntoResponse, Response},
    Json,
};
use http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode};
use std::sync::Arc;

use super::error::{AuthError, ErrorResponse};
use crate::state::AppState;

/// The authenticated organizer of a request, built once from its session token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub organizer_id: String,
}

/// Extract the bearer token from the `Authorization` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl FromRequestParts<Arc<AppState>> for AuthContext {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AuthError::SessionInvalid)?;
        let organizer_id = state.sessions.verify(token)?;
        Ok(AuthContext { organizer_id })
    }
}

/// A body or path that could not be decoded, answered in the API error shape
#[derive(Debug)]
pub struct MalformedRequest {
    status: StatusCode,
    message: String,
}

impl MalformedRequest {
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<JsonRejection> for MalformedRequest {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for MalformedRequest {
    fn from(rejection: PathRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for MalformedRequest {
    fn into_response(self) -> Response {
        log::debug!("Rejected request: {}", self.message);
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
                code: "invalid_request",
            }),
        )
            .into_response()
    }
}

/// `Json` whose rejections use the `{ error, code }` body
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = MalformedRequest;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

/// `Path` whose rejections use the `{ error, code }` body
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    Path<T>: FromRequestParts<S, Rejection = PathRejection>,
    S: Send + Sync,
{
    type Rejection = MalformedRequest;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(ApiPath(value))
    }
}
