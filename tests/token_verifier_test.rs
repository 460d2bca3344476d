//! HTTP token verification against a local stand-in for the provider APIs

use assert_matches::assert_matches;
use axum::{
    extract::Query,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::collections::HashMap;
use tokio::net::TcpListener;

use waitlist::auth::{AuthError, HttpTokenVerifier, Provider, ProviderEndpoints, TokenVerifier};

fn bearer(headers: &HeaderMap) -> &str {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default()
}

async fn tokeninfo(Query(query): Query<HashMap<String, String>>) -> Response {
    match query.get("access_token").map(String::as_str) {
        Some("google-ok") => Json(json!({
            "user_id": "1234567890",
            "email": "google.user@example.com",
            "verified_email": true
        }))
        .into_response(),
        Some("google-no-email") => Json(json!({ "user_id": "1234567890" })).into_response(),
        Some("google-broken") => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_token" })),
        )
            .into_response(),
    }
}

async fn github_user(headers: HeaderMap) -> Response {
    if headers.get("user-agent").is_none() {
        return StatusCode::FORBIDDEN.into_response();
    }
    match bearer(&headers) {
        "github-public" => Json(json!({ "id": 42, "email": "octo@example.com" })).into_response(),
        "github-private" | "github-unverified" => {
            Json(json!({ "id": 43, "email": null })).into_response()
        }
        _ => StatusCode::UNAUTHORIZED.into_response(),
    }
}

async fn github_emails(headers: HeaderMap) -> Response {
    match bearer(&headers) {
        "github-private" => Json(json!([
            { "email": "secondary@example.com", "primary": false, "verified": true },
            { "email": "primary@example.com", "primary": true, "verified": true }
        ]))
        .into_response(),
        "github-unverified" => Json(json!([
            { "email": "primary@example.com", "primary": true, "verified": false }
        ]))
        .into_response(),
        _ => StatusCode::UNAUTHORIZED.into_response(),
    }
}

async fn start_stub() -> HttpTokenVerifier {
    let app = Router::new()
        .route("/oauth2/v1/tokeninfo", get(tokeninfo))
        .route("/user", get(github_user))
        .route("/user/emails", get(github_emails));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    HttpTokenVerifier::with_endpoints(ProviderEndpoints::with_base(&format!("http://{}", addr)))
}

#[tokio::test]
async fn test_google_token_resolves_identity() {
    let verifier = start_stub().await;

    let identity = verifier.verify(Provider::Google, "google-ok").await.unwrap();
    assert_eq!(identity.email, "google.user@example.com");
    assert_eq!(identity.provider_id, "1234567890");
}

#[tokio::test]
async fn test_google_rejected_token() {
    let verifier = start_stub().await;

    assert_matches!(
        verifier.verify(Provider::Google, "expired").await,
        Err(AuthError::InvalidToken)
    );
    assert_matches!(
        verifier.verify(Provider::Google, "google-no-email").await,
        Err(AuthError::InvalidToken)
    );
}

#[tokio::test]
async fn test_google_server_error_is_not_an_invalid_token() {
    let verifier = start_stub().await;

    assert_matches!(
        verifier.verify(Provider::Google, "google-broken").await,
        Err(AuthError::Provider(_))
    );
}

#[tokio::test]
async fn test_github_public_email() {
    let verifier = start_stub().await;

    let identity = verifier
        .verify(Provider::Github, "github-public")
        .await
        .unwrap();
    assert_eq!(identity.email, "octo@example.com");
    assert_eq!(identity.provider_id, "42");
}

#[tokio::test]
async fn test_github_falls_back_to_primary_verified_email() {
    let verifier = start_stub().await;

    let identity = verifier
        .verify(Provider::Github, "github-private")
        .await
        .unwrap();
    assert_eq!(identity.email, "primary@example.com");
    assert_eq!(identity.provider_id, "43");
}

#[tokio::test]
async fn test_github_without_verified_primary_email() {
    let verifier = start_stub().await;

    assert_matches!(
        verifier.verify(Provider::Github, "github-unverified").await,
        Err(AuthError::NoVerifiedEmail)
    );
}

#[tokio::test]
async fn test_github_unauthorized_token() {
    let verifier = start_stub().await;

    assert_matches!(
        verifier.verify(Provider::Github, "revoked").await,
        Err(AuthError::InvalidToken)
    );
}
