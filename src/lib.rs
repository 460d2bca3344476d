//! # Waitlist Server Library
//!
//! Backend for a waitlist SaaS: organizers sign up with a password or a
//! Google/GitHub account, publish services, and the public joins a waitlist
//! per service.
//!
//! ## Features
//!
//! - **Identity**: email/password and social login resolved to one organizer
//! - **Provider links**: link and unlink providers, never losing the last method
//! - **Sessions**: HS256 JWT bearer tokens
//! - **Waitlists**: service CRUD, public pages, participant sign-ups
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use waitlist::{
//!     auth::{HttpTokenVerifier, OAuthConfig, SessionConfig},
//!     db::Database,
//!     servers::{ApiConfig, ApiServer},
//!     state::AppState,
//! };
//!
//! # async fn run() -> waitlist::Result<()> {
//! let db = Database::new("data/waitlist.db")?;
//! let sessions = SessionConfig::new("change-me".to_string(), 24);
//! let state = AppState::new(
//!     db,
//!     &sessions,
//!     OAuthConfig::default(),
//!     Arc::new(HttpTokenVerifier::new()),
//!     "http://localhost:3000".to_string(),
//! );
//! ApiServer::new(ApiConfig::default(), state).start().await
//! # }
//! ```

// ============================================================================
// PUBLIC API MODULES
// ============================================================================

/// Organizer identity, sessions and provider links
pub mod auth;

/// SQLite connection and schema
pub mod db;

/// HTTP server composition
pub mod servers;

/// Shared handler state
pub mod state;

/// Services, participants and public waitlists
pub mod waitlist;

/// Logger setup
pub mod logging;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

pub use servers::{ApiConfig, ApiServer};
pub use state::AppState;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Startup and serving failures of the waitlist server
#[derive(Debug, thiserror::Error)]
pub enum WaitlistServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store error: {0}")]
    Store(#[from] db::StoreError),

    #[error("Logger error: {0}")]
    Logger(#[from] flexi_logger::FlexiLoggerError),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, WaitlistServerError>;

// ============================================================================
// LIBRARY VERSION INFO
// ============================================================================

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
