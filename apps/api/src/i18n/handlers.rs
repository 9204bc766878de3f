use axum::{extract::State, Json};
use serde::Serialize;

use crate::i18n::{ActiveLanguage, LanguageChoice};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct LanguagesResponse {
    pub languages: Vec<LanguageChoice>,
    pub default: String,
    pub active: String,
    pub active_label: String,
}

/// GET /api/v1/languages
pub async fn handle_list_languages(
    State(state): State<AppState>,
    active: ActiveLanguage,
) -> Json<LanguagesResponse> {
    let languages = &state.config.languages;
    Json(LanguagesResponse {
        languages: languages.choices().to_vec(),
        default: languages.default_code().to_string(),
        active_label: languages.label(active.code()).unwrap_or(active.code()).to_string(),
        active: active.0,
    })
}
