use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub mobile: String,
    /// Public handle used in shareable URLs.
    pub namespace: Option<String>,
    pub full_name: String,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}
