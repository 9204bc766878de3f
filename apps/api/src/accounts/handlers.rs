use axum::{extract::State, http::StatusCode, Json};

use crate::accounts::service::{create_account, AccountResponse, CreateAccountRequest};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/v1/accounts
/// Creates the account and its empty profile.
pub async fn handle_create_account(
    State(state): State<AppState>,
    Json(req): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), AppError> {
    let account = create_account(&state.db, &state.config.reserved_namespaces, &req).await?;
    Ok((StatusCode::CREATED, Json(account)))
}
