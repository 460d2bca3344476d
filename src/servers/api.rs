use axum::{routing::get, Json, Router};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::auth::auth_router;
use crate::state::AppState;
use crate::waitlist::waitlist_router;

#[derive(Serialize, Debug, Clone)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// Configuration for the API server
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub port: u16,
    pub host: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            host: "0.0.0.0".to_string(),
        }
    }
}

/// Full application router: everything lives under `/api`
pub fn build_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .nest("/auth", auth_router())
        .merge(waitlist_router())
        .route("/health", get(health));

    Router::new()
        .nest("/api", api)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub struct ApiServer {
    config: ApiConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    pub fn new(config: ApiConfig, state: AppState) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    pub fn addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.config.host, self.config.port).parse()
    }

    /// Bind and serve until Ctrl-C
    pub async fn start(&self) -> crate::Result<()> {
        let addr = self
            .addr()
            .map_err(|e| crate::WaitlistServerError::Config(format!("invalid listen address: {}", e)))?;
        let listener = TcpListener::bind(addr).await?;

        log::info!("🌐 Waitlist API listening on http://{}", addr);

        axum::serve(listener, build_router(Arc::clone(&self.state)))
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        log::info!("Waitlist API stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

/// GET /api/health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
    })
}
