use axum::{
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;

use crate::auth::error::ErrorResponse;
use crate::db::{StoreError, UniqueField};

#[derive(Debug, thiserror::Error)]
pub enum WaitlistError {
    #[error("Service not found")]
    ServiceNotFound,

    #[error("Slug is already in use")]
    SlugTaken,

    #[error("Email is already on this waitlist")]
    AlreadyJoined,

    #[error("{0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for WaitlistError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(UniqueField::ServiceSlug) => WaitlistError::SlugTaken,
            StoreError::Conflict(UniqueField::ParticipantEmail) => WaitlistError::AlreadyJoined,
            StoreError::NotFound => WaitlistError::ServiceNotFound,
            other => WaitlistError::Store(other),
        }
    }
}

impl WaitlistError {
    pub fn code(&self) -> &'static str {
        match self {
            WaitlistError::ServiceNotFound => "service_not_found",
            WaitlistError::SlugTaken => "slug_taken",
            WaitlistError::AlreadyJoined => "already_joined",
            WaitlistError::Validation(_) => "validation",
            WaitlistError::Store(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            WaitlistError::ServiceNotFound => StatusCode::NOT_FOUND,
            WaitlistError::SlugTaken | WaitlistError::AlreadyJoined => StatusCode::CONFLICT,
            WaitlistError::Validation(_) => StatusCode::BAD_REQUEST,
            WaitlistError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WaitlistError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            log::error!("Waitlist request failed: {}", self);
            "Internal error".to_string()
        } else {
            self.to_string()
        };

        (
            status,
            Json(ErrorResponse {
                error: message,
                code: self.code(),
            }),
        )
            .into_response()
    }
}
