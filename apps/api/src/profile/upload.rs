//! Multipart image uploads shared by avatars, profile covers and project covers.

use axum::extract::Multipart;
use bytes::Bytes;
use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use crate::errors::{AppError, FieldErrors};
use crate::profile::images::process_image;
use crate::profile::storage::{image_keys, upload_image, ImageKeys, ImageKind};
use crate::state::AppState;

const MAX_UPLOAD_NAME_LEN: usize = 256;

#[derive(Debug)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Reads the first part named `field`; other parts are skipped.
pub async fn read_upload(multipart: &mut Multipart, field: &str) -> Result<Upload, AppError> {
    while let Some(part) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if part.name() != Some(field) {
            continue;
        }
        let file_name = part.file_name().unwrap_or_default().to_string();
        let bytes = part
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
        check_upload(field, &file_name, &bytes)?;
        return Ok(Upload { file_name, bytes });
    }
    Err(FieldErrors::single(field, "No file was submitted.").into())
}

pub fn check_upload(field: &str, file_name: &str, bytes: &[u8]) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    if bytes.is_empty() {
        errors.add(field, "The submitted file is empty.");
    }
    if file_name.chars().count() > MAX_UPLOAD_NAME_LEN {
        errors.add(
            field,
            format!("Ensure this filename has at most {MAX_UPLOAD_NAME_LEN} characters."),
        );
    }
    errors.into_result()
}

/// Converts the upload off the async runtime, then writes it to object storage.
pub async fn store_upload(
    state: &AppState,
    kind: ImageKind,
    upload: Upload,
) -> Result<ImageKeys, AppError> {
    let bytes = upload.bytes;
    let processed = tokio::task::spawn_blocking(move || process_image(&bytes, kind.has_thumbnail()))
        .await
        .map_err(|e| anyhow::anyhow!("image processing task failed: {e}"))?
        .map_err(|e| {
            warn!("Rejected {kind:?} upload '{}': {e}", upload.file_name);
            AppError::from(e)
        })?;

    let keys = image_keys(kind, Utc::now(), Uuid::new_v4());
    upload_image(&state.s3, &state.config.s3_bucket, &keys, processed).await?;
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_rejected_on_its_field() {
        let errors = check_upload("cover_image", "cover.png", b"").unwrap_err();
        assert_eq!(
            errors.get("cover_image").unwrap(),
            ["The submitted file is empty.".to_string()]
        );
    }

    #[test]
    fn test_long_file_name_is_rejected() {
        let name = format!("{}.png", "a".repeat(300));
        let errors = check_upload("avatar", &name, b"data").unwrap_err();
        assert!(errors.get("avatar").unwrap()[0].contains("256"));
    }

    #[test]
    fn test_regular_upload_passes() {
        assert!(check_upload("avatar", "me.jpg", b"data").is_ok());
    }
}
