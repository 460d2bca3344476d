//! Organizer identity and authentication
//!
//! - Signup and login with email/password
//! - Social login with Google or GitHub tokens (client-side flow)
//! - Redirect-based OAuth login with signed state
//! - Linking/unlinking providers with an "at least one method" guard
//! - JWT session tokens mapped to an explicit [`AuthContext`]

pub mod database;
pub mod error;
pub mod extractor;
pub mod links;
pub mod models;
pub mod oauth;
pub mod password;
pub mod resolver;
pub mod routes;
pub mod session;
pub mod store;
pub mod verifier;

pub use error::AuthError;
pub use extractor::{ApiJson, ApiPath, AuthContext, MalformedRequest};
pub use links::ProviderLinkManager;
pub use models::*;
pub use oauth::{OAuthConfig, OAuthManager};
pub use resolver::IdentityResolver;
pub use routes::auth_router;
pub use session::{SessionConfig, SessionIssuer};
pub use store::OrganizerStore;
pub use verifier::{HttpTokenVerifier, ProviderEndpoints, TokenVerifier};
