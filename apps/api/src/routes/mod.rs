pub mod health;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::accounts::handlers as accounts;
use crate::i18n::handlers as i18n;
use crate::profile::handlers as profile;
use crate::resume::{handlers as resume, projects};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/languages", get(i18n::handle_list_languages))
        // Accounts and profiles
        .route("/api/v1/accounts", post(accounts::handle_create_account))
        .route(
            "/api/v1/profiles/:user_id",
            get(profile::handle_get_profile).put(profile::handle_update_profile),
        )
        .route(
            "/api/v1/profiles/:user_id/avatar",
            post(profile::handle_upload_avatar),
        )
        .route(
            "/api/v1/profiles/:user_id/cover-image",
            post(profile::handle_upload_cover_image),
        )
        // Work experiences
        .route(
            "/api/v1/work-experiences",
            get(resume::handle_list_work_experiences).post(resume::handle_create_work_experience),
        )
        .route(
            "/api/v1/work-experiences/batch-delete",
            post(resume::handle_batch_delete),
        )
        .route(
            "/api/v1/work-experiences/:id",
            delete(resume::handle_delete_work_experience),
        )
        .route(
            "/api/v1/work-experiences/:id/toggle-public",
            post(resume::handle_toggle_public),
        )
        .route(
            "/api/v1/work-experiences/:id/fields/:field",
            get(resume::handle_resolve_field),
        )
        .route(
            "/api/v1/public/:namespace/work-experiences",
            get(resume::handle_public_work_experiences),
        )
        // Translations
        .route(
            "/api/v1/work-experiences/:id/translations",
            get(resume::handle_list_translations).post(resume::handle_create_translation),
        )
        .route(
            "/api/v1/work-experiences/:id/translations/form",
            get(resume::handle_new_translation_form),
        )
        .route(
            "/api/v1/translations/:id",
            put(resume::handle_update_translation).delete(resume::handle_delete_translation),
        )
        .route(
            "/api/v1/translations/:id/form",
            get(resume::handle_update_translation_form),
        )
        // Projects
        .route(
            "/api/v1/projects",
            get(projects::handle_list_projects).post(projects::handle_create_project),
        )
        .route(
            "/api/v1/projects/:id/cover-image",
            post(projects::handle_upload_project_cover),
        )
        .with_state(state)
}
