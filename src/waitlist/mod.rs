//! Services and their public waitlists
//!
//! Organizers manage services through bearer-authenticated CRUD routes; the
//! public reads waitlist pages and joins them by slug.

pub mod database;
pub mod error;
pub mod models;
pub mod routes;

pub use error::WaitlistError;
pub use models::*;
pub use routes::waitlist_router;
