use anyhow::{Context, Result};

use crate::i18n::SupportedLanguages;

const DEFAULT_LANGUAGES: &str = "en:English,zh-hans:Chinese";
const DEFAULT_RESERVED_NAMESPACES: &str = "memodir-test-namespace";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Languages a translation may be written in, in display order.
    pub languages: SupportedLanguages,
    pub reserved_namespaces: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let language_list =
            std::env::var("LANGUAGES").unwrap_or_else(|_| DEFAULT_LANGUAGES.to_string());
        let language_code = std::env::var("LANGUAGE_CODE").unwrap_or_else(|_| "en".to_string());
        let languages = SupportedLanguages::parse(&language_list, &language_code)
            .context("LANGUAGES / LANGUAGE_CODE are invalid")?;

        let reserved_namespaces = parse_list(
            &std::env::var("RESERVED_NAMESPACES")
                .unwrap_or_else(|_| DEFAULT_RESERVED_NAMESPACES.to_string()),
        );

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            languages,
            reserved_namespaces,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
