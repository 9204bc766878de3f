use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;

use crate::accounts::namespace::validate_namespace;
use crate::errors::{AppError, FieldErrors};
use crate::models::profile::ProfileRow;
use crate::models::user::UserRow;

pub const INVALID_EMAIL: &str = "Enter a valid email address.";
pub const EMAIL_TAKEN: &str = "A user with that email already exists.";
pub const NAMESPACE_TAKEN: &str = "This namespace is already taken.";

const MAX_MOBILE_LEN: usize = 32;
const MAX_FULL_NAME_LEN: usize = 300;

#[derive(Debug, Default, Deserialize)]
pub struct CreateAccountRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub mobile: String,
    pub namespace: Option<String>,
    #[serde(default)]
    pub full_name: String,
}

/// A sign-up that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub email: String,
    pub mobile: String,
    pub namespace: Option<String>,
    pub full_name: String,
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub user: UserRow,
    pub profile: ProfileRow,
}

fn email_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid"))
}

/// Lower-cases the domain part; the local part is kept as typed.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}

pub fn validate_account(
    request: &CreateAccountRequest,
    reserved_namespaces: &[String],
) -> Result<NewAccount, FieldErrors> {
    let mut errors = FieldErrors::new();

    let email = normalize_email(&request.email);
    if email.is_empty() {
        errors.add("email", "This field is required.");
    } else if !email_regex().is_match(&email) {
        errors.add("email", INVALID_EMAIL);
    }

    let namespace = request
        .namespace
        .as_deref()
        .map(str::trim)
        .filter(|ns| !ns.is_empty());
    if let Some(ns) = namespace {
        if let Err(message) = validate_namespace(ns, reserved_namespaces) {
            errors.add("namespace", message);
        }
    }

    let mobile = request.mobile.trim();
    if mobile.chars().count() > MAX_MOBILE_LEN {
        errors.add(
            "mobile",
            format!("Ensure this value has at most {MAX_MOBILE_LEN} characters."),
        );
    }
    let full_name = request.full_name.trim();
    if full_name.chars().count() > MAX_FULL_NAME_LEN {
        errors.add(
            "full_name",
            format!("Ensure this value has at most {MAX_FULL_NAME_LEN} characters."),
        );
    }

    errors.into_result()?;
    Ok(NewAccount {
        email,
        mobile: mobile.to_string(),
        namespace: namespace.map(String::from),
        full_name: full_name.to_string(),
    })
}

/// Creates an account and its profile in one transaction.
/// Every account therefore has exactly one profile.
pub async fn create_account(
    pool: &PgPool,
    reserved_namespaces: &[String],
    request: &CreateAccountRequest,
) -> Result<AccountResponse, AppError> {
    let account = validate_account(request, reserved_namespaces)?;

    let mut tx = pool.begin().await?;

    let user = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (email, mobile, namespace, full_name)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(&account.email)
    .bind(&account.mobile)
    .bind(&account.namespace)
    .bind(&account.full_name)
    .fetch_one(&mut *tx)
    .await
    .map_err(map_user_conflict)?;

    let profile = sqlx::query_as::<_, ProfileRow>(
        "INSERT INTO profiles (user_id) VALUES ($1) RETURNING *",
    )
    .bind(user.id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    info!("Created account {} with profile {}", user.id, profile.id);
    Ok(AccountResponse { user, profile })
}

fn map_user_conflict(err: sqlx::Error) -> AppError {
    let constraint = match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => db.constraint().map(String::from),
        _ => None,
    };
    match constraint.as_deref() {
        Some("users_email_key") => AppError::Conflict(FieldErrors::single("email", EMAIL_TAKEN)),
        Some("users_namespace_key") => {
            AppError::Conflict(FieldErrors::single("namespace", NAMESPACE_TAKEN))
        }
        _ => AppError::Database(err),
    }
}
