use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Avatar and thumbnail objects.
    pub s3: S3Client,
    /// Also carries the configured languages used for translation coverage
    /// and per-request language negotiation.
    pub config: Config,
}
