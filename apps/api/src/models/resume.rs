use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The untranslated part of a work experience.
///
/// `position`, `company`, `location` and `contribution` are legacy values read
/// only when the experience has no translation at all.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkExperienceRow {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub is_public: bool,
    pub date_start: NaiveDate,
    pub date_end: Option<NaiveDate>,
    pub position: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub contribution: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkExperienceTranslationRow {
    pub id: Uuid,
    pub work_experience_id: Uuid,
    pub language: String,
    pub position: String,
    pub company: String,
    pub location: String,
    pub contribution: String,
    pub keywords: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProjectRow {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub title: String,
    pub download_link: String,
    pub live_link: String,
    pub github: String,
    pub description: String,
    /// Stored as uploaded size, without a thumbnail.
    pub cover_image_key: Option<String>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}
