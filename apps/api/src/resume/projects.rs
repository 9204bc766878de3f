//! Portfolio projects: plain, untranslated CRUD.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::{AppError, FieldErrors};
use crate::models::resume::ProjectRow;
use crate::profile::handlers::COVER_IMAGE_FIELD;
use crate::profile::storage::ImageKind;
use crate::profile::upload::{read_upload, store_upload};
use crate::resume::handlers::{profile_id_for_user, UserIdQuery};
use crate::resume::validation::REQUIRED;
use crate::state::AppState;

const MAX_FIELD_LEN: usize = 255;

#[derive(Debug, Default, Deserialize)]
pub struct CreateProjectRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub download_link: String,
    #[serde(default)]
    pub live_link: String,
    #[serde(default)]
    pub github: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_public: bool,
}

pub fn validate_project(request: &CreateProjectRequest) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    if request.title.trim().is_empty() {
        errors.add("title", REQUIRED);
    }
    for (field, value) in [
        ("title", &request.title),
        ("download_link", &request.download_link),
        ("live_link", &request.live_link),
        ("github", &request.github),
    ] {
        if value.chars().count() > MAX_FIELD_LEN {
            errors.add(
                field,
                format!("Ensure this value has at most {MAX_FIELD_LEN} characters."),
            );
        }
    }
    errors.into_result()
}

/// GET /api/v1/projects
pub async fn handle_list_projects(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<ProjectRow>>, AppError> {
    let profile_id = profile_id_for_user(&state.db, params.user_id).await?;
    let projects = sqlx::query_as::<_, ProjectRow>(
        "SELECT * FROM projects WHERE profile_id = $1 ORDER BY created_at DESC",
    )
    .bind(profile_id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(projects))
}

/// POST /api/v1/projects
pub async fn handle_create_project(
    State(state): State<AppState>,
    Json(request): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectRow>), AppError> {
    validate_project(&request)?;
    let profile_id = profile_id_for_user(&state.db, request.user_id).await?;

    let project = sqlx::query_as::<_, ProjectRow>(
        r#"
        INSERT INTO projects
            (profile_id, title, download_link, live_link, github, description, is_public)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(profile_id)
    .bind(request.title.trim())
    .bind(request.download_link.trim())
    .bind(request.live_link.trim())
    .bind(request.github.trim())
    .bind(&request.description)
    .bind(request.is_public)
    .fetch_one(&state.db)
    .await?;

    info!("Created project {}", project.id);
    Ok((StatusCode::CREATED, Json(project)))
}

/// POST /api/v1/projects/:id/cover-image
///
/// Multipart upload with a `cover_image` part. Only the owner's projects accept it.
pub async fn handle_upload_project_cover(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
    mut multipart: Multipart,
) -> Result<Json<ProjectRow>, AppError> {
    let profile_id = profile_id_for_user(&state.db, params.user_id).await?;
    let owned: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM projects WHERE id = $1 AND profile_id = $2")
            .bind(id)
            .bind(profile_id)
            .fetch_optional(&state.db)
            .await?;
    if owned.is_none() {
        return Err(AppError::NotFound(format!("Project {id} not found")));
    }

    let upload = read_upload(&mut multipart, COVER_IMAGE_FIELD).await?;
    let keys = store_upload(&state, ImageKind::ProjectCover, upload).await?;

    let project = sqlx::query_as::<_, ProjectRow>(
        "UPDATE projects SET cover_image_key = $3 WHERE id = $1 AND profile_id = $2 RETURNING *",
    )
    .bind(id)
    .bind(profile_id)
    .bind(&keys.original)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Project {id} not found")))?;

    info!("Stored cover image {} for project {id}", keys.original);
    Ok(Json(project))
}
