//! SQLite connection shared by the organizer and waitlist stores

use rusqlite::{Connection, ErrorCode};
use std::sync::{Arc, Mutex, MutexGuard};

/// Unique constraint that rejected a write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    /// `organizers.email`
    Email,
    /// `(provider, provider_id)` across all organizers
    ProviderIdentity,
    /// one entry per provider on a single organizer
    ProviderSlot,
    /// `services.slug`
    ServiceSlug,
    /// `(service_id, email)` on participants
    ParticipantEmail,
    Other,
}

impl UniqueField {
    /// Classify SQLite's "UNIQUE constraint failed: table.col, ..." message
    fn from_message(message: &str) -> Self {
        if message.contains("organizers.email") {
            UniqueField::Email
        } else if message.contains("social_providers.provider_id") {
            UniqueField::ProviderIdentity
        } else if message.contains("social_providers.organizer_id") {
            UniqueField::ProviderSlot
        } else if message.contains("services.slug") {
            UniqueField::ServiceSlug
        } else if message.contains("participants.") {
            UniqueField::ParticipantEmail
        } else {
            UniqueField::Other
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0:?}")]
    Conflict(UniqueField),

    #[error("record not found")]
    NotFound,

    #[error("database connection lock poisoned")]
    Poisoned,

    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("database error: {0}")]
    Sqlite(rusqlite::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(failure, message)
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                let message = message.as_deref().unwrap_or_default();
                if message.starts_with("UNIQUE constraint failed") {
                    StoreError::Conflict(UniqueField::from_message(message))
                } else {
                    StoreError::Sqlite(err)
                }
            }
            _ => StoreError::Sqlite(err),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// RFC 3339 timestamp with fixed-width fractional seconds, so stored values sort as text
pub fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

/// Database connection wrapper
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database file and initialize tables
    pub fn new(path: &str) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Create in-memory database (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init_tables()?;
        Ok(db)
    }

    pub(crate) fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn init_tables(&self) -> StoreResult<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS organizers (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS social_providers (
                organizer_id TEXT NOT NULL,
                provider TEXT NOT NULL,
                provider_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                FOREIGN KEY (organizer_id) REFERENCES organizers(id) ON DELETE CASCADE,
                UNIQUE(provider, provider_id),
                UNIQUE(organizer_id, provider)
            );

            CREATE TABLE IF NOT EXISTS services (
                id TEXT PRIMARY KEY,
                organizer_id TEXT NOT NULL,
                name TEXT NOT NULL,
                description TEXT,
                slug TEXT UNIQUE NOT NULL,
                waitlist_title TEXT,
                waitlist_description TEXT,
                waitlist_background TEXT,
                image TEXT,
                category TEXT,
                tagline TEXT,
                full_description TEXT,
                developer TEXT,
                language TEXT,
                platform TEXT,
                launch_date TEXT,
                screenshots TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (organizer_id) REFERENCES organizers(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS participants (
                id TEXT PRIMARY KEY,
                service_id TEXT NOT NULL,
                email TEXT NOT NULL,
                join_date TEXT NOT NULL,
                FOREIGN KEY (service_id) REFERENCES services(id) ON DELETE CASCADE,
                UNIQUE(service_id, email)
            );

            CREATE INDEX IF NOT EXISTS idx_providers_organizer ON social_providers(organizer_id);
            CREATE INDEX IF NOT EXISTS idx_services_organizer ON services(organizer_id);
            CREATE INDEX IF NOT EXISTS idx_participants_service ON participants(service_id);
            "#,
        )?;

        Ok(())
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
        }
    }
}
