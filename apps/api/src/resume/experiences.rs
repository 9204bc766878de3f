//! Owner-scoped writes on work experiences. Every operation is filtered by
//! the caller's profile, so ids belonging to someone else behave as missing.

use async_trait::async_trait;
use serde::Serialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct BatchDeleteResponse {
    pub deleted: Vec<Uuid>,
    /// Requested ids that do not exist or belong to another profile.
    pub rejected: Vec<Uuid>,
}

#[async_trait]
pub trait ExperienceStore: Send + Sync {
    /// Flips `is_public`; `None` when the experience is not owned by `profile_id`.
    async fn toggle_public(&self, profile_id: Uuid, id: Uuid) -> Result<Option<bool>, sqlx::Error>;

    async fn delete(&self, profile_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error>;

    /// Deletes the owned subset of `ids` and returns what was removed.
    async fn delete_many(&self, profile_id: Uuid, ids: &[Uuid]) -> Result<Vec<Uuid>, sqlx::Error>;
}

#[derive(Clone)]
pub struct PgExperienceStore {
    pool: PgPool,
}

impl PgExperienceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExperienceStore for PgExperienceStore {
    async fn toggle_public(&self, profile_id: Uuid, id: Uuid) -> Result<Option<bool>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            UPDATE work_experiences SET is_public = NOT is_public
            WHERE id = $1 AND profile_id = $2
            RETURNING is_public
            "#,
        )
        .bind(id)
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete(&self, profile_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM work_experiences WHERE id = $1 AND profile_id = $2")
            .bind(id)
            .bind(profile_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_many(&self, profile_id: Uuid, ids: &[Uuid]) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar(
            "DELETE FROM work_experiences WHERE profile_id = $1 AND id = ANY($2) RETURNING id",
        )
        .bind(profile_id)
        .bind(ids)
        .fetch_all(&self.pool)
        .await
    }
}

/// Requested ids that were not deleted, in request order, without repeats.
pub fn rejected_ids(requested: &[Uuid], deleted: &[Uuid]) -> Vec<Uuid> {
    let mut rejected: Vec<Uuid> = Vec::new();
    for id in requested {
        if !deleted.contains(id) && !rejected.contains(id) {
            rejected.push(*id);
        }
    }
    rejected
}

pub async fn batch_delete<S>(
    store: &S,
    profile_id: Uuid,
    ids: &[Uuid],
) -> Result<BatchDeleteResponse, AppError>
where
    S: ExperienceStore + ?Sized,
{
    if ids.is_empty() {
        return Err(AppError::Validation("ids cannot be empty".to_string()));
    }
    let deleted = store.delete_many(profile_id, ids).await?;
    let rejected = rejected_ids(ids, &deleted);

    info!(
        "Batch deleted {} work experiences, rejected {}",
        deleted.len(),
        rejected.len()
    );
    Ok(BatchDeleteResponse { deleted, rejected })
}
