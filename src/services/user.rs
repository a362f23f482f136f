//! User service: account records and password hashing.
//!
//! DESIGN
//! ======
//! Passwords are stored as `sha256$<salt-hex>$<digest-hex>` where the digest
//! covers `salt || password`. Verification recomputes the digest and compares
//! in constant time. Public profile lookups only see active users.

use std::fmt::Write;

use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use super::{ErrorKind, ServiceError, check_len, require};
use crate::db;
use crate::models::User;
use crate::models::user::{USER_COLUMNS, is_plausible_email, is_valid_username};

const HASH_SCHEME: &str = "sha256";
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("user not found: {0}")]
    NotFound(String),
    #[error("username or email already taken")]
    Conflict,
    #[error("invalid user: {0}")]
    Invalid(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ServiceError for UserError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict => ErrorKind::Conflict,
            Self::Invalid(_) => ErrorKind::Invalid,
            Self::Database(_) => ErrorKind::Database,
        }
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub is_superuser: bool,
}

// =============================================================================
// PASSWORDS
// =============================================================================

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

fn digest_hex(salt_hex: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt_hex.as_bytes());
    hasher.update(password.as_bytes());
    bytes_to_hex(&hasher.finalize())
}

/// Hash a password with a fresh random salt.
#[must_use]
pub fn hash_password(password: &str) -> String {
    let salt: [u8; 16] = rand::rng().random();
    let salt_hex = bytes_to_hex(&salt);
    let digest = digest_hex(&salt_hex, password);
    format!("{HASH_SCHEME}${salt_hex}${digest}")
}

/// Check a password against a stored hash. Unknown schemes never verify.
#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    let (Some(HASH_SCHEME), Some(salt_hex), Some(expected)) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    constant_time_eq(digest_hex(salt_hex, password).as_bytes(), expected.as_bytes())
}

/// Length-revealing but content-constant comparison.
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

// =============================================================================
// VALIDATION
// =============================================================================

pub(crate) fn validate_new_user(input: &NewUser) -> Result<(), UserError> {
    if !is_valid_username(&input.username) {
        return Err(UserError::Invalid(
            "username must be 3-50 characters of letters, digits, '_', '-' or '.'".into(),
        ));
    }
    if !is_plausible_email(&input.email) {
        return Err(UserError::Invalid("email is not a valid address".into()));
    }
    if input.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(UserError::Invalid(format!("password must be at least {MIN_PASSWORD_LEN} characters")));
    }
    if let Some(full_name) = &input.full_name {
        require("full_name", full_name).map_err(UserError::Invalid)?;
        check_len("full_name", full_name, 255).map_err(UserError::Invalid)?;
    }
    if let Some(website) = &input.website {
        check_len("website", website, 255).map_err(UserError::Invalid)?;
    }
    if let Some(avatar_url) = &input.avatar_url {
        check_len("avatar_url", avatar_url, 500).map_err(UserError::Invalid)?;
    }
    Ok(())
}

// =============================================================================
// QUERIES
// =============================================================================

/// Create a user account.
///
/// # Errors
///
/// Returns `Invalid` for bad input and `Conflict` if the username or email
/// is taken.
pub async fn create_user(pool: &PgPool, input: &NewUser) -> Result<User, UserError> {
    validate_new_user(input)?;

    let sql = format!(
        "INSERT INTO users (id, username, email, full_name, hashed_password, is_superuser, bio, website, avatar_url)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING {USER_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(Uuid::new_v4())
        .bind(&input.username)
        .bind(input.email.to_ascii_lowercase())
        .bind(&input.full_name)
        .bind(hash_password(&input.password))
        .bind(input.is_superuser)
        .bind(&input.bio)
        .bind(&input.website)
        .bind(&input.avatar_url)
        .fetch_one(pool)
        .await
        .map_err(|e| if db::is_unique_violation(&e) { UserError::Conflict } else { UserError::Database(e) })?;

    let user = User::from_row(&row)?;
    tracing::info!(user_id = %user.id, username = %user.username, "user created");
    Ok(user)
}

/// Fetch an active user by username.
///
/// # Errors
///
/// Returns `NotFound` if no active user has that username.
pub async fn get_active_by_username(pool: &PgPool, username: &str) -> Result<User, UserError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1 AND is_active");
    let row = sqlx::query(&sql)
        .bind(username)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| UserError::NotFound(username.to_owned()))?;
    Ok(User::from_row(&row)?)
}

/// Resolve an owner id, requiring the user to exist and be active.
///
/// # Errors
///
/// Returns `NotFound` if the user is missing or inactive.
pub async fn ensure_active(pool: &PgPool, user_id: Uuid) -> Result<(), UserError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1 AND is_active)")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    if exists { Ok(()) } else { Err(UserError::NotFound(user_id.to_string())) }
}

#[cfg(test)]
#[path = "user_test.rs"]
mod tests;
