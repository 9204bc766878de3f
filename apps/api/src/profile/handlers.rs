use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::{AppError, FieldErrors};
use crate::models::profile::ProfileRow;
use crate::models::user::UserRow;
use crate::profile::storage::ImageKind;
use crate::profile::upload::{read_upload, store_upload};
use crate::state::AppState;

const GENDERS: [&str; 3] = ["M", "F", "U"];
const MAX_LINK_LEN: usize = 255;
const MAX_CITY_LEN: usize = 80;
const AVATAR_FIELD: &str = "avatar";
pub const COVER_IMAGE_FIELD: &str = "cover_image";

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: UserRow,
    pub profile: ProfileRow,
}

/// Partial update. Absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub mobile: Option<String>,
    pub gender: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub linkedin: Option<String>,
    pub wechat: Option<String>,
    pub facebook: Option<String>,
    pub github: Option<String>,
    pub personal_site: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
}

pub fn validate_profile_update(request: &UpdateProfileRequest) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if let Some(gender) = request.gender.as_deref() {
        if !GENDERS.contains(&gender) {
            errors.add(
                "gender",
                format!("Select a valid choice. {gender} is not one of the available choices."),
            );
        }
    }
    if let Some(country) = request.country.as_deref() {
        if country.len() != 2 || !country.chars().all(|c| c.is_ascii_uppercase()) {
            errors.add("country", "Enter a two-letter country code.");
        }
    }
    if let Some(city) = request.city.as_deref() {
        check_len(&mut errors, "city", city, MAX_CITY_LEN);
    }
    for (field, value) in [
        ("linkedin", &request.linkedin),
        ("wechat", &request.wechat),
        ("facebook", &request.facebook),
        ("github", &request.github),
        ("personal_site", &request.personal_site),
    ] {
        if let Some(value) = value {
            check_len(&mut errors, field, value, MAX_LINK_LEN);
        }
    }

    errors.into_result()
}

fn check_len(errors: &mut FieldErrors, field: &str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.add(field, format!("Ensure this value has at most {max} characters."));
    }
}

/// GET /api/v1/profiles/:user_id
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ProfileResponse>, AppError> {
    Ok(Json(load_profile(&state.db, user_id).await?))
}

/// PUT /api/v1/profiles/:user_id
///
/// Name and mobile live on the account, the rest on the profile; both are
/// written in one transaction.
pub async fn handle_update_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    validate_profile_update(&req)?;

    let mut tx = state.db.begin().await?;

    let updated = sqlx::query(
        r#"
        UPDATE users SET
            full_name = COALESCE($2, full_name),
            mobile = COALESCE($3, mobile)
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .bind(req.full_name.as_deref().map(str::trim))
    .bind(req.mobile.as_deref().map(str::trim))
    .execute(&mut *tx)
    .await?;
    if updated.rows_affected() == 0 {
        return Err(not_found_profile(user_id));
    }

    sqlx::query(
        r#"
        UPDATE profiles SET
            gender = COALESCE($2, gender),
            birthday = COALESCE($3, birthday),
            country = COALESCE($4, country),
            city = COALESCE($5, city),
            linkedin = COALESCE($6, linkedin),
            wechat = COALESCE($7, wechat),
            facebook = COALESCE($8, facebook),
            github = COALESCE($9, github),
            personal_site = COALESCE($10, personal_site),
            description = COALESCE($11, description),
            is_public = COALESCE($12, is_public),
            updated_at = NOW()
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .bind(&req.gender)
    .bind(req.birthday)
    .bind(&req.country)
    .bind(&req.city)
    .bind(&req.linkedin)
    .bind(&req.wechat)
    .bind(&req.facebook)
    .bind(&req.github)
    .bind(&req.personal_site)
    .bind(&req.description)
    .bind(req.is_public)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    info!("Updated profile of user {user_id}");

    Ok(Json(load_profile(&state.db, user_id).await?))
}

/// POST /api/v1/profiles/:user_id/avatar
///
/// Multipart upload with an `avatar` file part. The image is re-encoded as
/// PNG and thumbnailed before anything is stored.
pub async fn handle_upload_avatar(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ProfileResponse>, AppError> {
    // Fail before reading the body for unknown users.
    load_profile(&state.db, user_id).await?;

    let upload = read_upload(&mut multipart, AVATAR_FIELD).await?;
    let file_name = upload.file_name.clone();
    let keys = store_upload(&state, ImageKind::Avatar, upload).await?;

    sqlx::query(
        r#"
        UPDATE profiles SET
            avatar_key = $2,
            avatar_thumbnail_key = $3,
            avatar_upload_name = $4,
            updated_at = NOW()
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .bind(&keys.original)
    .bind(&keys.thumbnail)
    .bind(&file_name)
    .execute(&state.db)
    .await?;

    info!("Stored avatar {} for user {user_id}", keys.original);
    Ok(Json(load_profile(&state.db, user_id).await?))
}

/// POST /api/v1/profiles/:user_id/cover-image
///
/// Multipart upload with a `cover_image` part, shown on the public page.
pub async fn handle_upload_cover_image(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ProfileResponse>, AppError> {
    load_profile(&state.db, user_id).await?;

    let upload = read_upload(&mut multipart, COVER_IMAGE_FIELD).await?;
    let keys = store_upload(&state, ImageKind::ProfileCover, upload).await?;

    sqlx::query(
        r#"
        UPDATE profiles SET
            cover_image_key = $2,
            cover_image_thumbnail_key = $3,
            updated_at = NOW()
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .bind(&keys.original)
    .bind(&keys.thumbnail)
    .execute(&state.db)
    .await?;

    info!("Stored cover image {} for user {user_id}", keys.original);
    Ok(Json(load_profile(&state.db, user_id).await?))
}

async fn load_profile(pool: &PgPool, user_id: Uuid) -> Result<ProfileResponse, AppError> {
    let user = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| not_found_profile(user_id))?;
    let profile = sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| not_found_profile(user_id))?;
    Ok(ProfileResponse { user, profile })
}

fn not_found_profile(user_id: Uuid) -> AppError {
    AppError::NotFound(format!("Profile for user {user_id} not found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_update_is_valid() {
        assert!(validate_profile_update(&UpdateProfileRequest::default()).is_ok());
    }

    #[test]
    fn test_gender_must_be_a_known_choice() {
        let req = UpdateProfileRequest {
            gender: Some("X".to_string()),
            ..Default::default()
        };
        let errors = validate_profile_update(&req).unwrap_err();
        assert_eq!(
            errors.get("gender").unwrap(),
            ["Select a valid choice. X is not one of the available choices.".to_string()]
        );

        let req = UpdateProfileRequest {
            gender: Some("F".to_string()),
            ..Default::default()
        };
        assert!(validate_profile_update(&req).is_ok());
    }

    #[test]
    fn test_country_is_two_uppercase_letters() {
        for bad in ["usa", "u", "cn", "C1"] {
            let req = UpdateProfileRequest {
                country: Some(bad.to_string()),
                ..Default::default()
            };
            assert!(validate_profile_update(&req).is_err(), "{bad}");
        }
        let req = UpdateProfileRequest {
            country: Some("CN".to_string()),
            ..Default::default()
        };
        assert!(validate_profile_update(&req).is_ok());
    }

    #[test]
    fn test_overlong_fields_are_reported_together() {
        let req = UpdateProfileRequest {
            city: Some("c".repeat(81)),
            github: Some("g".repeat(256)),
            ..Default::default()
        };
        let errors = validate_profile_update(&req).unwrap_err();
        assert!(errors.get("city").is_some());
        assert!(errors.get("github").is_some());
        assert!(errors.get("linkedin").is_none());
    }
}
