//! Row builders shared by the resume unit tests.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::models::resume::{WorkExperienceRow, WorkExperienceTranslationRow};

pub fn experience() -> WorkExperienceRow {
    WorkExperienceRow {
        id: Uuid::new_v4(),
        profile_id: Uuid::new_v4(),
        is_public: true,
        date_start: NaiveDate::from_ymd_opt(2018, 3, 1).unwrap(),
        date_end: None,
        position: None,
        company: None,
        location: None,
        contribution: None,
        created_at: Utc::now(),
    }
}

pub fn translation(parent_id: Uuid, language: &str, position: &str) -> WorkExperienceTranslationRow {
    let now = Utc::now();
    WorkExperienceTranslationRow {
        id: Uuid::new_v4(),
        work_experience_id: parent_id,
        language: language.to_string(),
        position: position.to_string(),
        company: String::new(),
        location: String::new(),
        contribution: String::new(),
        keywords: String::new(),
        created_at: now,
        updated_at: now,
    }
}
