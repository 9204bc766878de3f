use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::profile::images::ProcessedImage;

/// What an uploaded image is for. Decides its key prefix and whether a
/// thumbnail is stored next to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Avatar,
    ProfileCover,
    ProjectCover,
}

impl ImageKind {
    fn prefix(self) -> &'static str {
        match self {
            ImageKind::Avatar => "profile_photo",
            ImageKind::ProfileCover => "cover_image",
            ImageKind::ProjectCover => "projects",
        }
    }

    pub fn has_thumbnail(self) -> bool {
        !matches!(self, ImageKind::ProjectCover)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageKeys {
    pub original: String,
    pub thumbnail: Option<String>,
}

/// Object keys are bucketed by upload month.
pub fn image_keys(kind: ImageKind, now: DateTime<Utc>, id: Uuid) -> ImageKeys {
    let month = now.format("%Y/%m");
    let prefix = kind.prefix();
    ImageKeys {
        original: format!("{prefix}/{month}/{id}.png"),
        thumbnail: kind
            .has_thumbnail()
            .then(|| format!("thumbnails/{prefix}/{month}/thumbnail_{id}.png")),
    }
}

pub async fn upload_image(
    s3: &S3Client,
    bucket: &str,
    keys: &ImageKeys,
    image: ProcessedImage,
) -> Result<(), AppError> {
    put_png(s3, bucket, &keys.original, image.png).await?;
    if let (Some(key), Some(body)) = (&keys.thumbnail, image.thumbnail) {
        put_png(s3, bucket, key, body).await?;
    }
    Ok(())
}

async fn put_png(s3: &S3Client, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), AppError> {
    s3.put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(body))
        .content_type("image/png")
        .send()
        .await
        .map_err(|e| AppError::S3(format!("upload of {key} failed: {e}")))?;

    info!("Uploaded s3://{bucket}/{key}");
    Ok(())
}
