//! HTTP surface of the API, driven through the router without a socket

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use waitlist::auth::{AuthError, OAuthConfig, Provider, SessionConfig, TokenVerifier, VerifiedIdentity};
use waitlist::db::Database;
use waitlist::servers::build_router;
use waitlist::state::AppState;

/// Accepts `google-<id>` and `github-<id>` tokens for `<id>@example.com`
struct PrefixVerifier;

#[async_trait]
impl TokenVerifier for PrefixVerifier {
    async fn verify(&self, provider: Provider, token: &str) -> Result<VerifiedIdentity, AuthError> {
        let prefix = format!("{}-", provider.as_str());
        let id = token.strip_prefix(&prefix).ok_or(AuthError::InvalidToken)?;
        Ok(VerifiedIdentity {
            email: format!("{}@example.com", id),
            provider_id: id.to_string(),
        })
    }
}

fn app() -> Router {
    let state = AppState::new(
        Database::in_memory().unwrap(),
        &SessionConfig::new("route-secret".to_string(), 24),
        OAuthConfig::default(),
        Arc::new(PrefixVerifier),
        "http://frontend.test/".to_string(),
    );
    build_router(Arc::new(state))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn signup_and_login(app: &Router, email: &str) -> String {
    let (status, _) = send(
        app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({ "email": email, "password": "secret-pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": "secret-pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["accessToken"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_signup_login_and_me() {
    let app = app();
    let token = signup_and_login(&app, "owner@example.com").await;

    let (status, body) = send(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "owner@example.com");
    assert!(body.get("passwordHash").is_none());
}

#[tokio::test]
async fn test_signup_errors() {
    let app = app();
    signup_and_login(&app, "dup@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({ "email": "dup@example.com", "password": "other" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "email_taken");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({ "email": "nopw@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "password_required");

    for email in ["", "not an email"] {
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/signup",
            None,
            Some(json!({ "email": email, "password": "secret-pw" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_email");
    }
}

#[tokio::test]
async fn test_wrong_password() {
    let app = app();
    signup_and_login(&app, "pw@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "pw@example.com", "password": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "invalid_credentials");
}

#[tokio::test]
async fn test_undecodable_bodies_use_error_shape() {
    let app = app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"email":"a@x.com"}"#))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "invalid_request");
    assert!(body["error"].is_string());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/public/waitlists/anything/join")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{broken"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "invalid_request");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/signup")
        .body(Body::from(r#"{"email":"a@x.com","password":"pw"}"#))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "invalid_request");
}

#[tokio::test]
async fn test_missing_or_bad_session() {
    let app = app();

    let request = Request::builder()
        .uri("/api/auth/me")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));

    let (status, body) = send(&app, Method::GET, "/api/services", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "session_invalid");
}

#[tokio::test]
async fn test_social_login_link_and_unlink() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/social/google",
        None,
        Some(json!({ "token": "google-sam" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["accessToken"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/link/github",
        Some(&token),
        Some(json!({ "token": "github-sam" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "github account linked successfully");

    let (_, profile) = send(&app, Method::GET, "/api/auth/profile", Some(&token), None).await;
    assert_eq!(profile["authMethods"], json!(["google", "github"]));
    assert_eq!(profile["socialProviders"][1]["providerId"], "sam");

    let (status, _) = send(&app, Method::DELETE, "/api/auth/unlink/google", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) =
        send(&app, Method::DELETE, "/api/auth/unlink/github", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "last_method_remaining");
}

#[tokio::test]
async fn test_unknown_provider() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/social/myspace",
        None,
        Some(json!({ "token": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "unsupported_provider");
}

#[tokio::test]
async fn test_oauth_without_configured_providers() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/api/auth/providers", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["providers"], json!([]));

    let (status, body) = send(&app, Method::GET, "/api/auth/oauth/google", None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "provider_not_configured");
}

#[tokio::test]
async fn test_oauth_callback_failure_redirects_to_frontend() {
    let app = app();
    let request = Request::builder()
        .uri("/api/auth/oauth/github/callback?error=access_denied")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(response.status().is_redirection());
    let location = response.headers()[header::LOCATION].to_str().unwrap();
    assert_eq!(
        location,
        "http://frontend.test/login?error=token_exchange_failed"
    );
}

#[tokio::test]
async fn test_service_lifecycle_and_public_waitlist() {
    let app = app();
    let token = signup_and_login(&app, "maker@example.com").await;

    let (status, service) = send(
        &app,
        Method::POST,
        "/api/services",
        Some(&token),
        Some(json!({
            "name": "Rocket",
            "slug": "rocket",
            "description": "Fast launches",
            "waitlistTitle": "Join the Rocket beta",
            "screenshots": ["a.png"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = service["id"].as_str().unwrap().to_string();
    assert_eq!(service["participantCount"], 0);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/public/waitlists/rocket/join",
        None,
        Some(json!({ "email": "fan@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["waitlistEntryId"].is_string());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/public/waitlists/rocket/join",
        None,
        Some(json!({ "email": "fan@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "already_joined");

    let (_, count) = send(&app, Method::GET, "/api/public/waitlists/rocket/count", None, None).await;
    assert_eq!(count["currentParticipants"], 1);

    let (_, details) = send(&app, Method::GET, "/api/public/waitlists/rocket", None, None).await;
    assert_eq!(details["title"], "Join the Rocket beta");
    assert_eq!(details["description"], "Fast launches");

    let (_, catalogue) = send(&app, Method::GET, "/api/public/services", None, None).await;
    assert_eq!(catalogue[0]["slug"], "rocket");
    assert_eq!(catalogue[0]["participantCount"], 1);

    let uri = format!("/api/services/{}/participants", id);
    let (status, participants) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(participants[0]["email"], "fan@example.com");

    let uri = format!("/api/services/{}", id);
    let (status, updated) = send(
        &app,
        Method::PATCH,
        &uri,
        Some(&token),
        Some(json!({ "tagline": "To the moon" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["tagline"], "To the moon");
    assert_eq!(updated["name"], "Rocket");

    let (status, _) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/api/public/waitlists/rocket", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "service_not_found");
}

#[tokio::test]
async fn test_services_are_scoped_to_owner() {
    let app = app();
    let alice = signup_and_login(&app, "alice@example.com").await;
    let bob = signup_and_login(&app, "bob@example.com").await;

    let (_, service) = send(
        &app,
        Method::POST,
        "/api/services",
        Some(&alice),
        Some(json!({ "name": "Private", "slug": "private" })),
    )
    .await;
    let uri = format!("/api/services/{}", service["id"].as_str().unwrap());

    let (status, _) = send(&app, Method::GET, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::DELETE, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = send(&app, Method::GET, "/api/services", Some(&bob), None).await;
    assert_eq!(list, json!([]));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/services",
        Some(&bob),
        Some(json!({ "name": "Copy", "slug": "private" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "slug_taken");
}

#[tokio::test]
async fn test_service_validation() {
    let app = app();
    let token = signup_and_login(&app, "valid@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/services",
        Some(&token),
        Some(json!({ "name": "Bad", "slug": "Not A Slug" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/public/waitlists/anything/join",
        None,
        Some(json!({ "email": "not-an-email" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
