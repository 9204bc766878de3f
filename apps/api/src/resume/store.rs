use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::db::is_unique_violation;
use crate::errors::{AppError, FieldErrors};
use crate::models::resume::WorkExperienceTranslationRow;
use crate::resume::validation::{TranslationDraft, DUPLICATE_LANGUAGE};

#[derive(Debug, Error)]
pub enum StoreError {
    /// The (work experience, language) unique constraint rejected a write.
    #[error("a translation in language '{language}' already exists")]
    DuplicateLanguage { language: String },

    #[error("translation {0} not found")]
    NotFound(Uuid),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateLanguage { .. } => {
                AppError::Conflict(FieldErrors::single("language", DUPLICATE_LANGUAGE))
            }
            StoreError::NotFound(id) => AppError::NotFound(format!("Translation {id} not found")),
            StoreError::Database(e) => AppError::Database(e),
        }
    }
}

/// Persistence for work-experience translations.
///
/// Lists are returned in storage default order: language ascending.
/// Writing a draft also writes the parent's dates, atomically.
#[async_trait]
pub trait TranslationStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<WorkExperienceTranslationRow>, StoreError>;

    async fn find_by_language(
        &self,
        parent_id: Uuid,
        language: &str,
    ) -> Result<Option<WorkExperienceTranslationRow>, StoreError>;

    async fn first(&self, parent_id: Uuid)
        -> Result<Option<WorkExperienceTranslationRow>, StoreError>;

    async fn list(&self, parent_id: Uuid) -> Result<Vec<WorkExperienceTranslationRow>, StoreError>;

    async fn languages(&self, parent_id: Uuid) -> Result<Vec<String>, StoreError>;

    async fn insert(
        &self,
        parent_id: Uuid,
        draft: &TranslationDraft,
    ) -> Result<WorkExperienceTranslationRow, StoreError>;

    async fn update(
        &self,
        id: Uuid,
        draft: &TranslationDraft,
    ) -> Result<WorkExperienceTranslationRow, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[derive(Clone)]
pub struct PgTranslationStore {
    pool: PgPool,
}

impl PgTranslationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_write_error(err: sqlx::Error, language: &str) -> StoreError {
    if is_unique_violation(&err) {
        StoreError::DuplicateLanguage {
            language: language.to_string(),
        }
    } else {
        StoreError::Database(err)
    }
}

#[async_trait]
impl TranslationStore for PgTranslationStore {
    async fn get(&self, id: Uuid) -> Result<Option<WorkExperienceTranslationRow>, StoreError> {
        Ok(sqlx::query_as::<_, WorkExperienceTranslationRow>(
            "SELECT * FROM work_experience_translations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn find_by_language(
        &self,
        parent_id: Uuid,
        language: &str,
    ) -> Result<Option<WorkExperienceTranslationRow>, StoreError> {
        Ok(sqlx::query_as::<_, WorkExperienceTranslationRow>(
            r#"
            SELECT * FROM work_experience_translations
            WHERE work_experience_id = $1 AND lower(language) = lower($2)
            "#,
        )
        .bind(parent_id)
        .bind(language)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn first(
        &self,
        parent_id: Uuid,
    ) -> Result<Option<WorkExperienceTranslationRow>, StoreError> {
        Ok(sqlx::query_as::<_, WorkExperienceTranslationRow>(
            r#"
            SELECT * FROM work_experience_translations
            WHERE work_experience_id = $1
            ORDER BY language COLLATE "C" ASC
            LIMIT 1
            "#,
        )
        .bind(parent_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list(&self, parent_id: Uuid) -> Result<Vec<WorkExperienceTranslationRow>, StoreError> {
        Ok(sqlx::query_as::<_, WorkExperienceTranslationRow>(
            r#"
            SELECT * FROM work_experience_translations
            WHERE work_experience_id = $1
            ORDER BY language COLLATE "C" ASC
            "#,
        )
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn languages(&self, parent_id: Uuid) -> Result<Vec<String>, StoreError> {
        Ok(sqlx::query_scalar(
            r#"
            SELECT language FROM work_experience_translations
            WHERE work_experience_id = $1
            ORDER BY language COLLATE "C" ASC
            "#,
        )
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert(
        &self,
        parent_id: Uuid,
        draft: &TranslationDraft,
    ) -> Result<WorkExperienceTranslationRow, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, WorkExperienceTranslationRow>(
            r#"
            INSERT INTO work_experience_translations
                (work_experience_id, language, position, company, location, contribution, keywords)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(parent_id)
        .bind(&draft.language)
        .bind(&draft.position)
        .bind(&draft.company)
        .bind(&draft.location)
        .bind(&draft.contribution)
        .bind(&draft.keywords)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, &draft.language))?;

        set_parent_dates(&mut tx, parent_id, draft).await?;
        tx.commit().await?;

        debug!("Inserted translation {} ({})", row.id, row.language);
        Ok(row)
    }

    async fn update(
        &self,
        id: Uuid,
        draft: &TranslationDraft,
    ) -> Result<WorkExperienceTranslationRow, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, WorkExperienceTranslationRow>(
            r#"
            UPDATE work_experience_translations
            SET position = $2, company = $3, location = $4,
                contribution = $5, keywords = $6, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&draft.position)
        .bind(&draft.company)
        .bind(&draft.location)
        .bind(&draft.contribution)
        .bind(&draft.keywords)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound(id))?;

        set_parent_dates(&mut tx, row.work_experience_id, draft).await?;
        tx.commit().await?;

        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM work_experience_translations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

async fn set_parent_dates(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    parent_id: Uuid,
    draft: &TranslationDraft,
) -> Result<(), StoreError> {
    sqlx::query("UPDATE work_experiences SET date_start = $2, date_end = $3 WHERE id = $1")
        .bind(parent_id)
        .bind(draft.date_start)
        .bind(draft.date_end)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

#[cfg(test)]
pub mod memory {
    //! In-process store with the same ordering and uniqueness rules as PostgreSQL.

    use std::collections::HashMap;
    use std::sync::Mutex;

    use chrono::{NaiveDate, Utc};

    use super::*;

    #[derive(Default)]
    pub struct MemoryTranslationStore {
        rows: Mutex<Vec<WorkExperienceTranslationRow>>,
        parent_dates: Mutex<HashMap<Uuid, (NaiveDate, Option<NaiveDate>)>>,
    }

    impl MemoryTranslationStore {
        pub fn with_rows(rows: Vec<WorkExperienceTranslationRow>) -> Self {
            Self {
                rows: Mutex::new(rows),
                parent_dates: Mutex::default(),
            }
        }

        pub fn count(&self, parent_id: Uuid, language: &str) -> usize {
            self.rows
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.work_experience_id == parent_id && r.language == language)
                .count()
        }

        pub fn parent_dates(&self, parent_id: Uuid) -> Option<(NaiveDate, Option<NaiveDate>)> {
            self.parent_dates.lock().unwrap().get(&parent_id).copied()
        }

        fn sorted_for(&self, parent_id: Uuid) -> Vec<WorkExperienceTranslationRow> {
            let mut rows: Vec<_> = self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.work_experience_id == parent_id)
                .cloned()
                .collect();
            rows.sort_by(|a, b| a.language.cmp(&b.language));
            rows
        }
    }

    #[async_trait]
    impl TranslationStore for MemoryTranslationStore {
        async fn get(&self, id: Uuid) -> Result<Option<WorkExperienceTranslationRow>, StoreError> {
            Ok(self.rows.lock().unwrap().iter().find(|r| r.id == id).cloned())
        }

        async fn find_by_language(
            &self,
            parent_id: Uuid,
            language: &str,
        ) -> Result<Option<WorkExperienceTranslationRow>, StoreError> {
            Ok(self
                .sorted_for(parent_id)
                .into_iter()
                .find(|r| r.language.eq_ignore_ascii_case(language)))
        }

        async fn first(
            &self,
            parent_id: Uuid,
        ) -> Result<Option<WorkExperienceTranslationRow>, StoreError> {
            Ok(self.sorted_for(parent_id).into_iter().next())
        }

        async fn list(
            &self,
            parent_id: Uuid,
        ) -> Result<Vec<WorkExperienceTranslationRow>, StoreError> {
            Ok(self.sorted_for(parent_id))
        }

        async fn languages(&self, parent_id: Uuid) -> Result<Vec<String>, StoreError> {
            Ok(self
                .sorted_for(parent_id)
                .into_iter()
                .map(|r| r.language)
                .collect())
        }

        async fn insert(
            &self,
            parent_id: Uuid,
            draft: &TranslationDraft,
        ) -> Result<WorkExperienceTranslationRow, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            if rows
                .iter()
                .any(|r| r.work_experience_id == parent_id && r.language == draft.language)
            {
                return Err(StoreError::DuplicateLanguage {
                    language: draft.language.clone(),
                });
            }
            let now = Utc::now();
            let row = WorkExperienceTranslationRow {
                id: Uuid::new_v4(),
                work_experience_id: parent_id,
                language: draft.language.clone(),
                position: draft.position.clone(),
                company: draft.company.clone(),
                location: draft.location.clone(),
                contribution: draft.contribution.clone(),
                keywords: draft.keywords.clone(),
                created_at: now,
                updated_at: now,
            };
            rows.push(row.clone());
            self.parent_dates
                .lock()
                .unwrap()
                .insert(parent_id, (draft.date_start, draft.date_end));
            Ok(row)
        }

        async fn update(
            &self,
            id: Uuid,
            draft: &TranslationDraft,
        ) -> Result<WorkExperienceTranslationRow, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or(StoreError::NotFound(id))?;
            row.position = draft.position.clone();
            row.company = draft.company.clone();
            row.location = draft.location.clone();
            row.contribution = draft.contribution.clone();
            row.keywords = draft.keywords.clone();
            row.updated_at = Utc::now();
            self.parent_dates
                .lock()
                .unwrap()
                .insert(row.work_experience_id, (draft.date_start, draft.date_end));
            Ok(row.clone())
        }

        async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|r| r.id != id);
            Ok(rows.len() < before)
        }
    }
}
