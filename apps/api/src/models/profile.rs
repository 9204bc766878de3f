use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub gender: String,
    pub birthday: Option<NaiveDate>,
    pub avatar_key: Option<String>,
    pub avatar_thumbnail_key: Option<String>,
    pub avatar_upload_name: Option<String>,
    pub cover_image_key: Option<String>,
    pub cover_image_thumbnail_key: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub linkedin: String,
    pub wechat: String,
    pub facebook: String,
    pub github: String,
    pub personal_site: String,
    pub description: String,
    pub is_public: bool,
    pub updated_at: DateTime<Utc>,
}
