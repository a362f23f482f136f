//! User: photo and album owner.

use serde::Serialize;
use sqlx::Row;
use sqlx::postgres::PgRow;
use time::OffsetDateTime;
use uuid::Uuid;

pub const USERNAME_MAX: usize = 50;
pub const EMAIL_MAX: usize = 255;

pub const USER_COLUMNS: &str = "id, username, email, full_name, hashed_password, is_active, is_superuser, \
     bio, website, avatar_url, created_at, updated_at";

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// What anonymous visitors may see about a user.
#[derive(Debug, Clone, Serialize)]
pub struct PublicProfile {
    pub username: String,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub member_since: OffsetDateTime,
}

impl From<User> for PublicProfile {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            full_name: user.full_name,
            bio: user.bio,
            website: user.website,
            avatar_url: user.avatar_url,
            member_since: user.created_at,
        }
    }
}

impl User {
    pub(crate) fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            full_name: row.try_get("full_name")?,
            hashed_password: row.try_get("hashed_password")?,
            is_active: row.try_get("is_active")?,
            is_superuser: row.try_get("is_superuser")?,
            bio: row.try_get("bio")?,
            website: row.try_get("website")?,
            avatar_url: row.try_get("avatar_url")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Usernames: 3..=50 chars of ASCII alphanumerics, `_`, `-`, `.`.
#[must_use]
pub fn is_valid_username(raw: &str) -> bool {
    (3..=USERNAME_MAX).contains(&raw.len())
        && raw.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Minimal shape check: one `@`, non-empty local part, dotted domain.
#[must_use]
pub fn is_plausible_email(raw: &str) -> bool {
    if raw.len() > EMAIL_MAX || raw.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = raw.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "ansel".into(),
            email: "ansel@example.com".into(),
            full_name: Some("Ansel A.".into()),
            hashed_password: "sha256$00$11".into(),
            is_active: true,
            is_superuser: false,
            bio: None,
            website: None,
            avatar_url: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn hash_is_never_serialized() {
        let json = serde_json::to_value(user()).unwrap();
        assert!(json.get("hashed_password").is_none());
        assert_eq!(json["username"], "ansel");
    }

    #[test]
    fn public_profile_drops_email() {
        let json = serde_json::to_value(PublicProfile::from(user())).unwrap();
        assert!(json.get("email").is_none());
        assert_eq!(json["member_since"], "1970-01-01T00:00:00Z");
    }

    #[test]
    fn username_rules() {
        assert!(is_valid_username("ansel.adams_1"));
        assert!(!is_valid_username("ab"));
        assert!(!is_valid_username("has space"));
        assert!(!is_valid_username(&"x".repeat(51)));
    }

    #[test]
    fn email_shape() {
        assert!(is_plausible_email("a@b.co"));
        assert!(!is_plausible_email("a@b"));
        assert!(!is_plausible_email("@b.co"));
        assert!(!is_plausible_email("a@@b.co"));
        assert!(!is_plausible_email("a b@c.co"));
        assert!(!is_plausible_email("a@b.co."));
    }
}
