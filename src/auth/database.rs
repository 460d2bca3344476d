//! SQLite implementation of the organizer credential store

use rusqlite::{params, Connection, OptionalExtension};

use super::models::{NewOrganizer, Organizer, Provider, SocialProvider};
use super::store::OrganizerStore;
use crate::db::{timestamp, Database, StoreError, StoreResult};

const ORGANIZER_COLUMNS: &str = "id, email, password_hash, created_at, updated_at";

fn find_organizer(conn: &Connection, column: &str, value: &str) -> StoreResult<Option<Organizer>> {
    let sql = format!("SELECT {ORGANIZER_COLUMNS} FROM organizers WHERE {column} = ?1");
    let organizer = conn
        .query_row(&sql, params![value], |row| {
            Ok(Organizer {
                id: row.get(0)?,
                email: row.get(1)?,
                password_hash: row.get(2)?,
                social_providers: Vec::new(),
                created_at: row.get(3)?,
                updated_at: row.get(4)?,
            })
        })
        .optional()?;

    match organizer {
        Some(mut organizer) => {
            organizer.social_providers = load_providers(conn, &organizer.id)?;
            Ok(Some(organizer))
        }
        None => Ok(None),
    }
}

fn load_providers(conn: &Connection, organizer_id: &str) -> StoreResult<Vec<SocialProvider>> {
    let mut stmt = conn.prepare(
        "SELECT provider, provider_id FROM social_providers
         WHERE organizer_id = ?1 ORDER BY position",
    )?;
    let rows = stmt.query_map(params![organizer_id], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut providers = Vec::new();
    for row in rows {
        let (name, provider_id) = row?;
        let provider = Provider::from_name(&name)
            .ok_or_else(|| StoreError::Corrupt(format!("unknown provider '{}'", name)))?;
        providers.push(SocialProvider {
            provider,
            provider_id,
        });
    }
    Ok(providers)
}

fn insert_providers(
    conn: &Connection,
    organizer_id: &str,
    providers: &[SocialProvider],
) -> StoreResult<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO social_providers (organizer_id, provider, provider_id, position)
         VALUES (?1, ?2, ?3, ?4)",
    )?;
    for (position, link) in providers.iter().enumerate() {
        stmt.execute(params![
            organizer_id,
            link.provider.as_str(),
            link.provider_id,
            position as i64,
        ])?;
    }
    Ok(())
}

impl OrganizerStore for Database {
    fn find_by_email(&self, email: &str) -> StoreResult<Option<Organizer>> {
        let conn = self.conn()?;
        find_organizer(&conn, "email", email)
    }

    fn find_by_id(&self, id: &str) -> StoreResult<Option<Organizer>> {
        let conn = self.conn()?;
        find_organizer(&conn, "id", id)
    }

    fn find_by_provider_identity(
        &self,
        provider: Provider,
        provider_id: &str,
    ) -> StoreResult<Option<Organizer>> {
        let conn = self.conn()?;
        let owner: Option<String> = conn
            .query_row(
                "SELECT organizer_id FROM social_providers
                 WHERE provider = ?1 AND provider_id = ?2",
                params![provider.as_str(), provider_id],
                |row| row.get(0),
            )
            .optional()?;

        match owner {
            Some(id) => find_organizer(&conn, "id", &id),
            None => Ok(None),
        }
    }

    fn create(&self, organizer: NewOrganizer) -> StoreResult<Organizer> {
        let now = timestamp();
        let created = Organizer {
            id: uuid::Uuid::new_v4().to_string(),
            email: organizer.email,
            password_hash: organizer.password_hash,
            social_providers: organizer.social_providers,
            created_at: now.clone(),
            updated_at: now,
        };

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO organizers (id, email, password_hash, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                created.id,
                created.email,
                created.password_hash,
                created.created_at,
                created.updated_at,
            ],
        )?;
        insert_providers(&tx, &created.id, &created.social_providers)?;
        tx.commit()?;

        Ok(created)
    }

    fn add_provider(&self, organizer_id: &str, link: &SocialProvider) -> StoreResult<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let touched = tx.execute(
            "UPDATE organizers SET updated_at = ?1 WHERE id = ?2",
            params![timestamp(), organizer_id],
        )?;
        if touched == 0 {
            return Err(StoreError::NotFound);
        }

        tx.execute(
            "INSERT INTO social_providers (organizer_id, provider, provider_id, position)
             SELECT ?1, ?2, ?3, COALESCE(MAX(position) + 1, 0)
             FROM social_providers WHERE organizer_id = ?1",
            params![organizer_id, link.provider.as_str(), link.provider_id],
        )?;
        tx.commit()?;

        Ok(())
    }

    fn remove_provider(&self, organizer_id: &str, provider: Provider) -> StoreResult<bool> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        // a password counts as one method, every link as another
        let removed = tx.execute(
            "DELETE FROM social_providers
             WHERE organizer_id = ?1 AND provider = ?2
               AND (SELECT password_hash IS NOT NULL FROM organizers WHERE id = ?1)
                 + (SELECT COUNT(*) FROM social_providers WHERE organizer_id = ?1) > 1",
            params![organizer_id, provider.as_str()],
        )?;
        if removed > 0 {
            tx.execute(
                "UPDATE organizers SET updated_at = ?1 WHERE id = ?2",
                params![timestamp(), organizer_id],
            )?;
        }
        tx.commit()?;

        Ok(removed > 0)
    }
}
