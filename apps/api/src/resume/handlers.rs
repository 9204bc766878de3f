//! Axum route handlers for work experiences and their translations.

use std::collections::{BTreeMap, HashMap};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::i18n::{ActiveLanguage, LanguageChoice, SupportedLanguages};
use crate::models::resume::{WorkExperienceRow, WorkExperienceTranslationRow};
use crate::resume::coverage::{coverage_for, update_language_choices, CoverageSummary, LanguageCoverage};
use crate::resume::experiences::{
    batch_delete, BatchDeleteResponse, ExperienceStore, PgExperienceStore,
};
use crate::resume::multilingual::{resolve_all, resolve_with_store};
use crate::resume::service::{create_translation, update_translation};
use crate::resume::store::{PgTranslationStore, TranslationStore};
use crate::resume::validation::{validate_create, TranslationForm};
use crate::state::AppState;

const PAGE_SIZE: i64 = 10;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub user_id: Uuid,
    pub page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateWorkExperienceRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub is_public: bool,
    #[serde(flatten)]
    pub translation: TranslationForm,
}

#[derive(Debug, Deserialize)]
pub struct TranslationRequest {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub form: TranslationForm,
}

#[derive(Debug, Deserialize)]
pub struct BatchDeleteRequest {
    pub user_id: Uuid,
    pub ids: Vec<Uuid>,
}

/// A work experience with its multilingual fields resolved for the active language.
#[derive(Debug, Serialize)]
pub struct WorkExperienceView {
    pub id: Uuid,
    pub is_public: bool,
    pub date_start: NaiveDate,
    pub date_end: Option<NaiveDate>,
    #[serde(flatten)]
    pub fields: BTreeMap<&'static str, String>,
    pub languages: Vec<String>,
    pub are_all_languages_created: bool,
}

#[derive(Debug, Serialize)]
pub struct WorkExperienceListResponse {
    pub work_experiences: Vec<WorkExperienceView>,
    pub page: u32,
    pub language: String,
}

#[derive(Debug, Serialize)]
pub struct TranslationListResponse {
    pub work_experience: WorkExperienceView,
    pub translations: Vec<WorkExperienceTranslationRow>,
    pub coverage: CoverageSummary,
}

#[derive(Debug, Serialize)]
pub struct TranslationFormResponse {
    pub language_choices: Vec<LanguageChoice>,
    pub initial: TranslationForm,
}

#[derive(Debug, Serialize)]
pub struct ResolvedFieldResponse {
    pub field: String,
    pub language: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct TogglePublicResponse {
    pub id: Uuid,
    pub is_public: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/work-experiences
///
/// The owner's experiences, newest start date first, ten per page.
pub async fn handle_list_work_experiences(
    State(state): State<AppState>,
    active: ActiveLanguage,
    Query(params): Query<ListQuery>,
) -> Result<Json<WorkExperienceListResponse>, AppError> {
    let profile_id = profile_id_for_user(&state.db, params.user_id).await?;
    let page = params.page.unwrap_or(1).max(1);

    let experiences = sqlx::query_as::<_, WorkExperienceRow>(
        r#"
        SELECT * FROM work_experiences
        WHERE profile_id = $1
        ORDER BY date_start DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(profile_id)
    .bind(PAGE_SIZE)
    .bind(page_offset(page))
    .fetch_all(&state.db)
    .await?;

    let views = build_views(&state.db, &state.config.languages, &experiences, active.code()).await?;
    Ok(Json(WorkExperienceListResponse {
        work_experiences: views,
        page,
        language: active.0,
    }))
}

/// GET /api/v1/public/:namespace/work-experiences
///
/// Public experiences of the account owning `namespace`. No user id needed.
pub async fn handle_public_work_experiences(
    State(state): State<AppState>,
    active: ActiveLanguage,
    Path(namespace): Path<String>,
    Query(params): Query<PageQuery>,
) -> Result<Json<WorkExperienceListResponse>, AppError> {
    let profile_id: Uuid = sqlx::query_scalar(
        r#"
        SELECT p.id FROM profiles p
        JOIN users u ON u.id = p.user_id
        WHERE u.namespace = $1 AND u.is_active
        "#,
    )
    .bind(&namespace)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Namespace '{namespace}' not found")))?;

    let page = params.page.unwrap_or(1).max(1);
    let experiences = sqlx::query_as::<_, WorkExperienceRow>(
        r#"
        SELECT * FROM work_experiences
        WHERE profile_id = $1 AND is_public
        ORDER BY date_start DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(profile_id)
    .bind(PAGE_SIZE)
    .bind(page_offset(page))
    .fetch_all(&state.db)
    .await?;

    let views = build_views(&state.db, &state.config.languages, &experiences, active.code()).await?;
    Ok(Json(WorkExperienceListResponse {
        work_experiences: views,
        page,
        language: active.0,
    }))
}

/// POST /api/v1/work-experiences
///
/// Creates a work experience together with its first translation.
pub async fn handle_create_work_experience(
    State(state): State<AppState>,
    active: ActiveLanguage,
    Json(request): Json<CreateWorkExperienceRequest>,
) -> Result<(StatusCode, Json<WorkExperienceView>), AppError> {
    let languages = &state.config.languages;
    let profile_id = profile_id_for_user(&state.db, request.user_id).await?;

    let coverage = LanguageCoverage::new(languages, Vec::<String>::new());
    let draft = validate_create(&request.translation, languages, &coverage)?;

    let mut tx = state.db.begin().await?;
    let experience = sqlx::query_as::<_, WorkExperienceRow>(
        r#"
        INSERT INTO work_experiences (profile_id, is_public, date_start, date_end)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(profile_id)
    .bind(request.is_public)
    .bind(draft.date_start)
    .bind(draft.date_end)
    .fetch_one(&mut *tx)
    .await?;

    let translation = sqlx::query_as::<_, WorkExperienceTranslationRow>(
        r#"
        INSERT INTO work_experience_translations
            (work_experience_id, language, position, company, location, contribution, keywords)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(experience.id)
    .bind(&draft.language)
    .bind(&draft.position)
    .bind(&draft.company)
    .bind(&draft.location)
    .bind(&draft.contribution)
    .bind(&draft.keywords)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;

    info!(
        "Created work experience {} with {} translation",
        experience.id, translation.language
    );

    let view = experience_view(&experience, &[translation], languages, active.code());
    Ok((StatusCode::CREATED, Json(view)))
}

/// POST /api/v1/work-experiences/:id/toggle-public
pub async fn handle_toggle_public(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<TogglePublicResponse>, AppError> {
    let profile_id = profile_id_for_user(&state.db, params.user_id).await?;

    let is_public = PgExperienceStore::new(state.db.clone())
        .toggle_public(profile_id, id)
        .await?
        .ok_or_else(|| not_found_experience(id))?;

    Ok(Json(TogglePublicResponse { id, is_public }))
}

/// DELETE /api/v1/work-experiences/:id
///
/// Translations are removed by the cascading foreign key.
pub async fn handle_delete_work_experience(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    let profile_id = profile_id_for_user(&state.db, params.user_id).await?;

    if !PgExperienceStore::new(state.db.clone())
        .delete(profile_id, id)
        .await?
    {
        return Err(not_found_experience(id));
    }

    info!("Deleted work experience {id}");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/work-experiences/batch-delete
///
/// Deletes only the requested experiences owned by the caller.
pub async fn handle_batch_delete(
    State(state): State<AppState>,
    Json(request): Json<BatchDeleteRequest>,
) -> Result<Json<BatchDeleteResponse>, AppError> {
    let profile_id = profile_id_for_user(&state.db, request.user_id).await?;
    let store = PgExperienceStore::new(state.db.clone());
    Ok(Json(batch_delete(&store, profile_id, &request.ids).await?))
}

/// GET /api/v1/work-experiences/:id/translations
pub async fn handle_list_translations(
    State(state): State<AppState>,
    active: ActiveLanguage,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<TranslationListResponse>, AppError> {
    let languages = &state.config.languages;
    let profile_id = profile_id_for_user(&state.db, params.user_id).await?;
    let experience = owned_experience(&state.db, profile_id, id).await?;

    let store = PgTranslationStore::new(state.db.clone());
    let translations = store.list(id).await?;
    let coverage = LanguageCoverage::new(languages, translations.iter().map(|t| t.language.as_str()));

    Ok(Json(TranslationListResponse {
        work_experience: experience_view(&experience, &translations, languages, active.code()),
        coverage: coverage.summary(),
        translations,
    }))
}

/// GET /api/v1/work-experiences/:id/translations/form
///
/// Choices and initial values for the "new translation" form: only languages
/// without a translation yet, and the parent's current dates.
pub async fn handle_new_translation_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<TranslationFormResponse>, AppError> {
    let profile_id = profile_id_for_user(&state.db, params.user_id).await?;
    let experience = owned_experience(&state.db, profile_id, id).await?;

    let store = PgTranslationStore::new(state.db.clone());
    let coverage = coverage_for(&store, &state.config.languages, id).await?;

    Ok(Json(TranslationFormResponse {
        language_choices: coverage.unfilled_language_choices(),
        initial: TranslationForm {
            date_start: Some(experience.date_start),
            date_end: experience.date_end,
            ..Default::default()
        },
    }))
}

/// POST /api/v1/work-experiences/:id/translations
pub async fn handle_create_translation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<TranslationRequest>,
) -> Result<(StatusCode, Json<WorkExperienceTranslationRow>), AppError> {
    let profile_id = profile_id_for_user(&state.db, request.user_id).await?;
    owned_experience(&state.db, profile_id, id).await?;

    let store = PgTranslationStore::new(state.db.clone());
    let row = create_translation(&store, &state.config.languages, id, &request.form).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/v1/translations/:id/form
///
/// The update form may only keep the translation's own language.
pub async fn handle_update_translation_form(
    State(state): State<AppState>,
    Path(translation_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<TranslationFormResponse>, AppError> {
    let store = PgTranslationStore::new(state.db.clone());
    let (current, experience) = owned_translation(&state.db, &store, params.user_id, translation_id).await?;

    Ok(Json(TranslationFormResponse {
        language_choices: update_language_choices(&state.config.languages, &current.language),
        initial: TranslationForm {
            language: current.language,
            position: current.position,
            company: current.company,
            location: current.location,
            contribution: current.contribution,
            keywords: current.keywords,
            date_start: Some(experience.date_start),
            date_end: experience.date_end,
        },
    }))
}

/// PUT /api/v1/translations/:id
pub async fn handle_update_translation(
    State(state): State<AppState>,
    Path(translation_id): Path<Uuid>,
    Json(request): Json<TranslationRequest>,
) -> Result<Json<WorkExperienceTranslationRow>, AppError> {
    let store = PgTranslationStore::new(state.db.clone());
    let (current, _) = owned_translation(&state.db, &store, request.user_id, translation_id).await?;

    let row = update_translation(&store, &current, &request.form).await?;
    Ok(Json(row))
}

/// DELETE /api/v1/translations/:id
pub async fn handle_delete_translation(
    State(state): State<AppState>,
    Path(translation_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    let store = PgTranslationStore::new(state.db.clone());
    owned_translation(&state.db, &store, params.user_id, translation_id).await?;

    if !store.delete(translation_id).await? {
        return Err(AppError::NotFound(format!("Translation {translation_id} not found")));
    }
    info!("Deleted translation {translation_id}");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/work-experiences/:id/fields/:field
///
/// Reads a single multilingual field as the active language sees it.
pub async fn handle_resolve_field(
    State(state): State<AppState>,
    active: ActiveLanguage,
    Path((id, field)): Path<(Uuid, String)>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ResolvedFieldResponse>, AppError> {
    let profile_id = profile_id_for_user(&state.db, params.user_id).await?;
    let experience = owned_experience(&state.db, profile_id, id).await?;

    let store = PgTranslationStore::new(state.db.clone());
    let value = resolve_with_store(&store, &experience, &field, active.code()).await?;

    Ok(Json(ResolvedFieldResponse {
        field,
        language: active.0,
        value,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

pub async fn profile_id_for_user(pool: &PgPool, user_id: Uuid) -> Result<Uuid, AppError> {
    sqlx::query_scalar("SELECT id FROM profiles WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile for user {user_id} not found")))
}

async fn owned_experience(
    pool: &PgPool,
    profile_id: Uuid,
    id: Uuid,
) -> Result<WorkExperienceRow, AppError> {
    sqlx::query_as::<_, WorkExperienceRow>(
        "SELECT * FROM work_experiences WHERE id = $1 AND profile_id = $2",
    )
    .bind(id)
    .bind(profile_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| not_found_experience(id))
}

async fn owned_translation(
    pool: &PgPool,
    store: &PgTranslationStore,
    user_id: Uuid,
    translation_id: Uuid,
) -> Result<(WorkExperienceTranslationRow, WorkExperienceRow), AppError> {
    let profile_id = profile_id_for_user(pool, user_id).await?;
    let translation = store
        .get(translation_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Translation {translation_id} not found")))?;
    let experience = owned_experience(pool, profile_id, translation.work_experience_id)
        .await
        // Someone else's translation looks the same as a missing one.
        .map_err(|_| AppError::NotFound(format!("Translation {translation_id} not found")))?;
    Ok((translation, experience))
}

/// Loads the translations of many experiences in one query.
async fn build_views(
    pool: &PgPool,
    languages: &SupportedLanguages,
    experiences: &[WorkExperienceRow],
    active_language: &str,
) -> Result<Vec<WorkExperienceView>, AppError> {
    let ids: Vec<Uuid> = experiences.iter().map(|e| e.id).collect();
    let rows = sqlx::query_as::<_, WorkExperienceTranslationRow>(
        r#"
        SELECT * FROM work_experience_translations
        WHERE work_experience_id = ANY($1)
        ORDER BY language COLLATE "C" ASC
        "#,
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let grouped = group_by_parent(rows);
    Ok(experiences
        .iter()
        .map(|e| {
            let translations = grouped.get(&e.id).map(Vec::as_slice).unwrap_or_default();
            experience_view(e, translations, languages, active_language)
        })
        .collect())
}

fn group_by_parent(
    rows: Vec<WorkExperienceTranslationRow>,
) -> HashMap<Uuid, Vec<WorkExperienceTranslationRow>> {
    let mut grouped: HashMap<Uuid, Vec<WorkExperienceTranslationRow>> = HashMap::new();
    for row in rows {
        grouped.entry(row.work_experience_id).or_default().push(row);
    }
    grouped
}

fn experience_view(
    experience: &WorkExperienceRow,
    translations: &[WorkExperienceTranslationRow],
    languages: &SupportedLanguages,
    active_language: &str,
) -> WorkExperienceView {
    let coverage = LanguageCoverage::new(languages, translations.iter().map(|t| t.language.as_str()));
    WorkExperienceView {
        id: experience.id,
        is_public: experience.is_public,
        date_start: experience.date_start,
        date_end: experience.date_end,
        fields: resolve_all(experience, translations, active_language),
        languages: coverage.filled_languages().iter().cloned().collect(),
        are_all_languages_created: coverage.all_filled(),
    }
}

fn page_offset(page: u32) -> i64 {
    (i64::from(page.max(1)) - 1) * PAGE_SIZE
}

fn not_found_experience(id: Uuid) -> AppError {
    AppError::NotFound(format!("Work experience {id} not found"))
}
