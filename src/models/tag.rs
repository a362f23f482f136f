//! Tag: free-form photo label with a cached usage count.

use serde::Serialize;
use sqlx::Row;
use sqlx::postgres::PgRow;
use time::OffsetDateTime;
use uuid::Uuid;

pub const TAG_NAME_MAX: usize = 50;

pub const TAG_COLUMNS: &str = "t.id, t.name, t.slug, t.description, t.color, t.is_active, t.usage_count, \
     t.created_at, t.updated_at";

#[derive(Debug, Clone, Serialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub is_active: bool,
    /// Number of photos carrying this tag. Recomputed on every tag change.
    pub usage_count: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Tag {
    pub(crate) fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            slug: row.try_get("slug")?,
            description: row.try_get("description")?,
            color: row.try_get("color")?,
            is_active: row.try_get("is_active")?,
            usage_count: row.try_get("usage_count")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
