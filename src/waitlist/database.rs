//! SQLite queries for services and their participants

use rusqlite::{params, types::Type, OptionalExtension, Row};

use super::models::{CreateServiceRequest, Participant, Service, UpdateServiceRequest};
use crate::db::{timestamp, Database, StoreError, StoreResult};

const SERVICE_SELECT: &str = "SELECT s.id, s.organizer_id, s.name, s.description, s.slug,
        s.waitlist_title, s.waitlist_description, s.waitlist_background, s.image,
        s.category, s.tagline, s.full_description, s.developer, s.language, s.platform,
        s.launch_date, s.screenshots, s.created_at, s.updated_at,
        (SELECT COUNT(*) FROM participants p WHERE p.service_id = s.id)
    FROM services s";

fn service_from_row(row: &Row<'_>) -> rusqlite::Result<Service> {
    let screenshots: String = row.get(16)?;
    let screenshots = serde_json::from_str(&screenshots)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(16, Type::Text, Box::new(e)))?;
    let participant_count: i64 = row.get(19)?;

    Ok(Service {
        id: row.get(0)?,
        organizer_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        slug: row.get(4)?,
        waitlist_title: row.get(5)?,
        waitlist_description: row.get(6)?,
        waitlist_background: row.get(7)?,
        image: row.get(8)?,
        category: row.get(9)?,
        tagline: row.get(10)?,
        full_description: row.get(11)?,
        developer: row.get(12)?,
        language: row.get(13)?,
        platform: row.get(14)?,
        launch_date: row.get(15)?,
        screenshots,
        created_at: row.get(17)?,
        updated_at: row.get(18)?,
        participant_count: participant_count.max(0) as u64,
    })
}

fn encode_screenshots(screenshots: &[String]) -> StoreResult<String> {
    serde_json::to_string(screenshots).map_err(|e| StoreError::Corrupt(e.to_string()))
}

impl Database {
    pub fn create_service(
        &self,
        organizer_id: &str,
        req: CreateServiceRequest,
    ) -> StoreResult<Service> {
        let now = timestamp();
        let service = Service {
            id: uuid::Uuid::new_v4().to_string(),
            organizer_id: organizer_id.to_string(),
            name: req.name,
            description: req.description,
            slug: req.slug,
            waitlist_title: req.waitlist_title,
            waitlist_description: req.waitlist_description,
            waitlist_background: req.waitlist_background,
            image: req.image,
            category: req.category,
            tagline: req.tagline,
            full_description: req.full_description,
            developer: req.developer,
            language: req.language,
            platform: req.platform,
            launch_date: req.launch_date,
            screenshots: req.screenshots,
            participant_count: 0,
            created_at: now.clone(),
            updated_at: now,
        };
        let screenshots = encode_screenshots(&service.screenshots)?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO services (id, organizer_id, name, description, slug,
                waitlist_title, waitlist_description, waitlist_background, image,
                category, tagline, full_description, developer, language, platform,
                launch_date, screenshots, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
            params![
                service.id,
                service.organizer_id,
                service.name,
                service.description,
                service.slug,
                service.waitlist_title,
                service.waitlist_description,
                service.waitlist_background,
                service.image,
                service.category,
                service.tagline,
                service.full_description,
                service.developer,
                service.language,
                service.platform,
                service.launch_date,
                screenshots,
                service.created_at,
                service.updated_at,
            ],
        )?;

        Ok(service)
    }

    /// Services owned by an organizer, newest first
    pub fn list_services(&self, organizer_id: &str) -> StoreResult<Vec<Service>> {
        let conn = self.conn()?;
        let sql = format!(
            "{SERVICE_SELECT} WHERE s.organizer_id = ?1 ORDER BY s.created_at DESC, s.rowid DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let services = stmt
            .query_map(params![organizer_id], service_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(services)
    }

    /// Every service, newest first
    pub fn list_public_services(&self) -> StoreResult<Vec<Service>> {
        let conn = self.conn()?;
        let sql = format!("{SERVICE_SELECT} ORDER BY s.created_at DESC, s.rowid DESC");
        let mut stmt = conn.prepare(&sql)?;
        let services = stmt
            .query_map([], service_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(services)
    }

    /// A service, only if it belongs to `organizer_id`
    pub fn get_service(&self, id: &str, organizer_id: &str) -> StoreResult<Option<Service>> {
        let conn = self.conn()?;
        let sql = format!("{SERVICE_SELECT} WHERE s.id = ?1 AND s.organizer_id = ?2");
        let service = conn
            .query_row(&sql, params![id, organizer_id], service_from_row)
            .optional()?;
        Ok(service)
    }

    pub fn find_service_by_slug(&self, slug: &str) -> StoreResult<Option<Service>> {
        let conn = self.conn()?;
        let sql = format!("{SERVICE_SELECT} WHERE s.slug = ?1");
        let service = conn
            .query_row(&sql, params![slug], service_from_row)
            .optional()?;
        Ok(service)
    }

    /// Apply a partial update; `None` when the organizer owns no such service
    pub fn update_service(
        &self,
        id: &str,
        organizer_id: &str,
        req: UpdateServiceRequest,
    ) -> StoreResult<Option<Service>> {
        let Some(mut service) = self.get_service(id, organizer_id)? else {
            return Ok(None);
        };
        req.apply(&mut service);
        service.updated_at = timestamp();
        let screenshots = encode_screenshots(&service.screenshots)?;

        let conn = self.conn()?;
        conn.execute(
            "UPDATE services SET name = ?1, description = ?2, slug = ?3,
                waitlist_title = ?4, waitlist_description = ?5, waitlist_background = ?6,
                image = ?7, category = ?8, tagline = ?9, full_description = ?10,
                developer = ?11, language = ?12, platform = ?13, launch_date = ?14,
                screenshots = ?15, updated_at = ?16
             WHERE id = ?17 AND organizer_id = ?18",
            params![
                service.name,
                service.description,
                service.slug,
                service.waitlist_title,
                service.waitlist_description,
                service.waitlist_background,
                service.image,
                service.category,
                service.tagline,
                service.full_description,
                service.developer,
                service.language,
                service.platform,
                service.launch_date,
                screenshots,
                service.updated_at,
                service.id,
                service.organizer_id,
            ],
        )?;

        Ok(Some(service))
    }

    /// Delete a service and its participants; `false` when nothing matched
    pub fn delete_service(&self, id: &str, organizer_id: &str) -> StoreResult<bool> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let deleted = tx.execute(
            "DELETE FROM services WHERE id = ?1 AND organizer_id = ?2",
            params![id, organizer_id],
        )?;
        if deleted > 0 {
            tx.execute("DELETE FROM participants WHERE service_id = ?1", params![id])?;
        }
        tx.commit()?;
        Ok(deleted > 0)
    }

    pub fn join_waitlist(&self, service_id: &str, email: &str) -> StoreResult<Participant> {
        let participant = Participant {
            id: uuid::Uuid::new_v4().to_string(),
            service_id: service_id.to_string(),
            email: email.to_string(),
            join_date: timestamp(),
        };

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO participants (id, service_id, email, join_date) VALUES (?1, ?2, ?3, ?4)",
            params![
                participant.id,
                participant.service_id,
                participant.email,
                participant.join_date,
            ],
        )?;
        Ok(participant)
    }

    /// Participants in join order
    pub fn list_participants(&self, service_id: &str) -> StoreResult<Vec<Participant>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, service_id, email, join_date FROM participants
             WHERE service_id = ?1 ORDER BY join_date ASC, rowid ASC",
        )?;
        let participants = stmt
            .query_map(params![service_id], |row| {
                Ok(Participant {
                    id: row.get(0)?,
                    service_id: row.get(1)?,
                    email: row.get(2)?,
                    join_date: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(participants)
    }
}
