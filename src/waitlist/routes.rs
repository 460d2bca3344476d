//! Service management and public waitlist routes

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use super::error::WaitlistError;
use super::models::*;
use crate::auth::{ApiJson, ApiPath, AuthContext, MessageResponse};
use crate::state::AppState;

/// Create waitlist router: organizer-owned services plus the anonymous pages
pub fn waitlist_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/services", post(create_service).get(list_services))
        .route(
            "/services/{id}",
            get(get_service).patch(update_service).delete(delete_service),
        )
        .route("/services/{id}/participants", get(list_participants))
        .route("/public/services", get(list_public_services))
        .route("/public/waitlists/{slug}", get(get_waitlist))
        .route("/public/waitlists/{slug}/join", post(join_waitlist))
        .route("/public/waitlists/{slug}/count", get(participant_count))
}

fn service_by_slug(state: &AppState, slug: &str) -> Result<Service, WaitlistError> {
    state
        .db
        .find_service_by_slug(slug)?
        .ok_or(WaitlistError::ServiceNotFound)
}

/// POST /api/services
async fn create_service(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    ApiJson(req): ApiJson<CreateServiceRequest>,
) -> Result<impl IntoResponse, WaitlistError> {
    req.validate()?;
    let service = state.db.create_service(&auth.organizer_id, req)?;
    log::info!("Organizer {} created service {}", auth.organizer_id, service.slug);
    Ok((StatusCode::CREATED, Json(service)))
}

/// GET /api/services
async fn list_services(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
) -> Result<Json<Vec<Service>>, WaitlistError> {
    Ok(Json(state.db.list_services(&auth.organizer_id)?))
}

/// GET /api/services/:id
async fn get_service(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<Service>, WaitlistError> {
    state
        .db
        .get_service(&id, &auth.organizer_id)?
        .map(Json)
        .ok_or(WaitlistError::ServiceNotFound)
}

/// PATCH /api/services/:id
async fn update_service(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    ApiPath(id): ApiPath<String>,
    ApiJson(req): ApiJson<UpdateServiceRequest>,
) -> Result<Json<Service>, WaitlistError> {
    req.validate()?;
    state
        .db
        .update_service(&id, &auth.organizer_id, req)?
        .map(Json)
        .ok_or(WaitlistError::ServiceNotFound)
}

/// DELETE /api/services/:id
async fn delete_service(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<MessageResponse>, WaitlistError> {
    if !state.db.delete_service(&id, &auth.organizer_id)? {
        return Err(WaitlistError::ServiceNotFound);
    }
    Ok(Json(MessageResponse {
        message: "Service deleted successfully".to_string(),
    }))
}

/// GET /api/services/:id/participants
async fn list_participants(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<Vec<Participant>>, WaitlistError> {
    let service = state
        .db
        .get_service(&id, &auth.organizer_id)?
        .ok_or(WaitlistError::ServiceNotFound)?;
    Ok(Json(state.db.list_participants(&service.id)?))
}

/// GET /api/public/services
async fn list_public_services(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PublicService>>, WaitlistError> {
    let services = state
        .db
        .list_public_services()?
        .into_iter()
        .map(PublicService::from)
        .collect();
    Ok(Json(services))
}

/// GET /api/public/waitlists/:slug
async fn get_waitlist(
    State(state): State<Arc<AppState>>,
    ApiPath(slug): ApiPath<String>,
) -> Result<Json<WaitlistDetails>, WaitlistError> {
    let service = service_by_slug(&state, &slug)?;
    Ok(Json(WaitlistDetails::from(&service)))
}

/// POST /api/public/waitlists/:slug/join
async fn join_waitlist(
    State(state): State<Arc<AppState>>,
    ApiPath(slug): ApiPath<String>,
    ApiJson(req): ApiJson<JoinWaitlistRequest>,
) -> Result<impl IntoResponse, WaitlistError> {
    let email = req.email.trim();
    validate_email(email)?;

    let service = service_by_slug(&state, &slug)?;
    let participant = state.db.join_waitlist(&service.id, email)?;

    Ok((
        StatusCode::CREATED,
        Json(JoinWaitlistResponse {
            message: "Successfully joined the waitlist".to_string(),
            waitlist_entry_id: participant.id,
        }),
    ))
}

/// GET /api/public/waitlists/:slug/count
async fn participant_count(
    State(state): State<Arc<AppState>>,
    ApiPath(slug): ApiPath<String>,
) -> Result<Json<ParticipantCountResponse>, WaitlistError> {
    let service = service_by_slug(&state, &slug)?;
    Ok(Json(ParticipantCountResponse {
        current_participants: service.participant_count,
    }))
}
