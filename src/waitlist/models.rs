//! Service and participant models with request validation

use serde::{Deserialize, Serialize};

use super::error::WaitlistError;
use crate::auth::is_valid_email;

pub const NAME_MAX: usize = 100;
pub const DESCRIPTION_MAX: usize = 500;
pub const SLUG_MAX: usize = 50;
pub const WAITLIST_TITLE_MAX: usize = 100;
pub const WAITLIST_DESCRIPTION_MAX: usize = 500;
pub const WAITLIST_BACKGROUND_MAX: usize = 200;
pub const IMAGE_MAX: usize = 200;
pub const CATEGORY_MAX: usize = 50;
pub const TAGLINE_MAX: usize = 200;
pub const FULL_DESCRIPTION_MAX: usize = 5000;
pub const DEVELOPER_MAX: usize = 100;
pub const LANGUAGE_MAX: usize = 50;
pub const PLATFORM_MAX: usize = 100;

/// A service owned by an organizer, as the owner sees it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub organizer_id: String,
    pub name: String,
    pub description: Option<String>,
    pub slug: String,
    pub waitlist_title: Option<String>,
    pub waitlist_description: Option<String>,
    pub waitlist_background: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub tagline: Option<String>,
    pub full_description: Option<String>,
    pub developer: Option<String>,
    pub language: Option<String>,
    pub platform: Option<String>,
    pub launch_date: Option<String>,
    pub screenshots: Vec<String>,
    pub participant_count: u64,
    pub created_at: String,
    pub updated_at: String,
}

/// Catalogue entry shown to anonymous visitors
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicService {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub slug: String,
    pub image: Option<String>,
    pub category: Option<String>,
    pub participant_count: u64,
}

impl From<Service> for PublicService {
    fn from(service: Service) -> Self {
        Self {
            id: service.id,
            name: service.name,
            description: service.description,
            slug: service.slug,
            image: service.image,
            category: service.category,
            participant_count: service.participant_count,
        }
    }
}

/// Landing page content of a public waitlist
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistDetails {
    pub title: String,
    pub description: Option<String>,
    pub background: Option<String>,
    pub current_participants: u64,
}

impl From<&Service> for WaitlistDetails {
    fn from(service: &Service) -> Self {
        Self {
            title: service
                .waitlist_title
                .clone()
                .unwrap_or_else(|| service.name.clone()),
            description: service
                .waitlist_description
                .clone()
                .or_else(|| service.description.clone()),
            background: service.waitlist_background.clone(),
            current_participants: service.participant_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: String,
    pub service_id: String,
    pub email: String,
    pub join_date: String,
}

/// Fields of a new service
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceRequest {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub waitlist_title: Option<String>,
    pub waitlist_description: Option<String>,
    pub waitlist_background: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub tagline: Option<String>,
    pub full_description: Option<String>,
    pub developer: Option<String>,
    pub language: Option<String>,
    pub platform: Option<String>,
    pub launch_date: Option<String>,
    #[serde(default)]
    pub screenshots: Vec<String>,
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub waitlist_title: Option<String>,
    pub waitlist_description: Option<String>,
    pub waitlist_background: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub tagline: Option<String>,
    pub full_description: Option<String>,
    pub developer: Option<String>,
    pub language: Option<String>,
    pub platform: Option<String>,
    pub launch_date: Option<String>,
    pub screenshots: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JoinWaitlistRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinWaitlistResponse {
    pub message: String,
    pub waitlist_entry_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantCountResponse {
    pub current_participants: u64,
}

fn check_len(field: &str, value: &str, max: usize) -> Result<(), WaitlistError> {
    if value.chars().count() > max {
        return Err(WaitlistError::Validation(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}

fn check_optional(field: &str, value: &Option<String>, max: usize) -> Result<(), WaitlistError> {
    match value {
        Some(value) => check_len(field, value, max),
        None => Ok(()),
    }
}

fn validate_name(name: &str) -> Result<(), WaitlistError> {
    if name.trim().is_empty() {
        return Err(WaitlistError::Validation("name is required".to_string()));
    }
    check_len("name", name, NAME_MAX)
}

/// Slugs are lowercase ASCII letters, digits and hyphens
pub fn validate_slug(slug: &str) -> Result<(), WaitlistError> {
    if slug.is_empty() {
        return Err(WaitlistError::Validation("slug is required".to_string()));
    }
    check_len("slug", slug, SLUG_MAX)?;
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(WaitlistError::Validation(
            "slug may only contain lowercase letters, numbers and hyphens".to_string(),
        ));
    }
    Ok(())
}

/// Accepts a full RFC 3339 timestamp or a plain `YYYY-MM-DD` date
fn validate_launch_date(value: &Option<String>) -> Result<(), WaitlistError> {
    let Some(value) = value else {
        return Ok(());
    };
    let parsed = chrono::DateTime::parse_from_rfc3339(value).is_ok()
        || chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok();
    if !parsed {
        return Err(WaitlistError::Validation(
            "launchDate must be a valid date".to_string(),
        ));
    }
    Ok(())
}

fn validate_screenshots(screenshots: &[String]) -> Result<(), WaitlistError> {
    for url in screenshots {
        check_len("screenshots", url, IMAGE_MAX)?;
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), WaitlistError> {
    if !is_valid_email(email) {
        return Err(WaitlistError::Validation(
            "a valid email address is required".to_string(),
        ));
    }
    Ok(())
}

impl CreateServiceRequest {
    pub fn validate(&self) -> Result<(), WaitlistError> {
        validate_name(&self.name)?;
        validate_slug(&self.slug)?;
        check_optional("description", &self.description, DESCRIPTION_MAX)?;
        check_optional("waitlistTitle", &self.waitlist_title, WAITLIST_TITLE_MAX)?;
        check_optional(
            "waitlistDescription",
            &self.waitlist_description,
            WAITLIST_DESCRIPTION_MAX,
        )?;
        check_optional(
            "waitlistBackground",
            &self.waitlist_background,
            WAITLIST_BACKGROUND_MAX,
        )?;
        check_optional("image", &self.image, IMAGE_MAX)?;
        check_optional("category", &self.category, CATEGORY_MAX)?;
        check_optional("tagline", &self.tagline, TAGLINE_MAX)?;
        check_optional("fullDescription", &self.full_description, FULL_DESCRIPTION_MAX)?;
        check_optional("developer", &self.developer, DEVELOPER_MAX)?;
        check_optional("language", &self.language, LANGUAGE_MAX)?;
        check_optional("platform", &self.platform, PLATFORM_MAX)?;
        validate_launch_date(&self.launch_date)?;
        validate_screenshots(&self.screenshots)
    }
}

impl UpdateServiceRequest {
    pub fn validate(&self) -> Result<(), WaitlistError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(slug) = &self.slug {
            validate_slug(slug)?;
        }
        check_optional("description", &self.description, DESCRIPTION_MAX)?;
        check_optional("waitlistTitle", &self.waitlist_title, WAITLIST_TITLE_MAX)?;
        check_optional(
            "waitlistDescription",
            &self.waitlist_description,
            WAITLIST_DESCRIPTION_MAX,
        )?;
        check_optional(
            "waitlistBackground",
            &self.waitlist_background,
            WAITLIST_BACKGROUND_MAX,
        )?;
        check_optional("image", &self.image, IMAGE_MAX)?;
        check_optional("category", &self.category, CATEGORY_MAX)?;
        check_optional("tagline", &self.tagline, TAGLINE_MAX)?;
        check_optional("fullDescription", &self.full_description, FULL_DESCRIPTION_MAX)?;
        check_optional("developer", &self.developer, DEVELOPER_MAX)?;
        check_optional("language", &self.language, LANGUAGE_MAX)?;
        check_optional("platform", &self.platform, PLATFORM_MAX)?;
        validate_launch_date(&self.launch_date)?;
        match &self.screenshots {
            Some(screenshots) => validate_screenshots(screenshots),
            None => Ok(()),
        }
    }

    /// Overlay the provided fields onto a stored service
    pub fn apply(self, service: &mut Service) {
        fn set(target: &mut Option<String>, value: Option<String>) {
            if value.is_some() {
                *target = value;
            }
        }

        if let Some(name) = self.name {
            service.name = name;
        }
        if let Some(slug) = self.slug {
            service.slug = slug;
        }
        set(&mut service.description, self.description);
        set(&mut service.waitlist_title, self.waitlist_title);
        set(&mut service.waitlist_description, self.waitlist_description);
        set(&mut service.waitlist_background, self.waitlist_background);
        set(&mut service.image, self.image);
        set(&mut service.category, self.category);
        set(&mut service.tagline, self.tagline);
        set(&mut service.full_description, self.full_description);
        set(&mut service.developer, self.developer);
        set(&mut service.language, self.language);
        set(&mut service.platform, self.platform);
        set(&mut service.launch_date, self.launch_date);
        if let Some(screenshots) = self.screenshots {
            service.screenshots = screenshots;
        }
    }
}
