//! Tag service: list, create, delete, and usage-count upkeep.
//!
//! DESIGN
//! ======
//! `usage_count` is a cache of `photo_tags` rows per tag. It is never
//! incremented blindly; `recount` recomputes it from the join table for the
//! affected tags inside the caller's transaction.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::{ErrorKind, ServiceError, check_len, require};
use crate::db;
use crate::models::tag::{TAG_COLUMNS, TAG_NAME_MAX};
use crate::models::{TAG_SLUG_MAX, Tag, is_hex_color, slugify};

#[derive(Debug, thiserror::Error)]
pub enum TagError {
    #[error("tag not found: {0}")]
    NotFound(String),
    #[error("tag already exists: {0}")]
    Conflict(String),
    #[error("invalid tag: {0}")]
    Invalid(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ServiceError for TagError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Invalid(_) => ErrorKind::Invalid,
            Self::Database(_) => ErrorKind::Database,
        }
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct NewTag {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

pub(crate) fn validate_new_tag(input: &NewTag) -> Result<String, TagError> {
    require("name", &input.name).map_err(TagError::Invalid)?;
    check_len("name", &input.name, TAG_NAME_MAX).map_err(TagError::Invalid)?;
    if let Some(color) = &input.color {
        if !is_hex_color(color) {
            return Err(TagError::Invalid("color must be #RRGGBB".into()));
        }
    }
    Ok(slugify(&input.name, TAG_SLUG_MAX))
}

/// List active tags, most used first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_active(pool: &PgPool) -> Result<Vec<Tag>, TagError> {
    let sql = format!("SELECT {TAG_COLUMNS} FROM tags t WHERE t.is_active ORDER BY t.usage_count DESC, t.name ASC");
    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    rows.iter().map(|r| Tag::from_row(r).map_err(TagError::from)).collect()
}

/// Create a tag; its slug derives from the name.
///
/// # Errors
///
/// Returns `Invalid` for bad input and `Conflict` on a duplicate name or slug.
pub async fn create(pool: &PgPool, input: &NewTag) -> Result<Tag, TagError> {
    let slug = validate_new_tag(input)?;

    let sql = format!(
        "INSERT INTO tags AS t (id, name, slug, description, color)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {TAG_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(Uuid::new_v4())
        .bind(input.name.trim())
        .bind(&slug)
        .bind(&input.description)
        .bind(&input.color)
        .fetch_one(pool)
        .await
        .map_err(|e| if db::is_unique_violation(&e) { TagError::Conflict(slug.clone()) } else { TagError::Database(e) })?;

    let tag = Tag::from_row(&row)?;
    tracing::info!(tag_id = %tag.id, slug = %tag.slug, "tag created");
    Ok(tag)
}

/// Delete a tag; its photo links go with it.
///
/// # Errors
///
/// Returns `NotFound` if the slug is unknown.
pub async fn delete(pool: &PgPool, slug: &str) -> Result<(), TagError> {
    let result = sqlx::query("DELETE FROM tags WHERE slug = $1")
        .bind(slug)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(TagError::NotFound(slug.to_owned()));
    }
    tracing::info!(%slug, "tag deleted");
    Ok(())
}

/// Resolve tag slugs to ids. Every slug must exist.
///
/// # Errors
///
/// Returns `Invalid` naming the first unknown slug.
pub async fn ids_for_slugs(conn: &mut PgConnection, slugs: &[String]) -> Result<Vec<Uuid>, TagError> {
    if slugs.is_empty() {
        return Ok(Vec::new());
    }
    let rows: Vec<(Uuid, String)> = sqlx::query_as("SELECT id, slug FROM tags WHERE slug = ANY($1)")
        .bind(slugs)
        .fetch_all(&mut *conn)
        .await?;

    let mut ids = Vec::with_capacity(slugs.len());
    for slug in slugs {
        let Some((id, _)) = rows.iter().find(|(_, s)| s == slug) else {
            return Err(TagError::Invalid(format!("unknown tag: {slug}")));
        };
        if !ids.contains(id) {
            ids.push(*id);
        }
    }
    Ok(ids)
}

/// Tags attached to a photo, by name.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn for_photo(pool: &PgPool, photo_id: Uuid) -> Result<Vec<Tag>, TagError> {
    let sql = format!(
        "SELECT {TAG_COLUMNS}
         FROM tags t
         JOIN photo_tags pt ON pt.tag_id = t.id
         WHERE pt.photo_id = $1
         ORDER BY t.name ASC"
    );
    let rows = sqlx::query(&sql).bind(photo_id).fetch_all(pool).await?;
    rows.iter().map(|r| Tag::from_row(r).map_err(TagError::from)).collect()
}

/// Recompute `usage_count` for the given tags from `photo_tags`.
///
/// # Errors
///
/// Returns a database error if the update fails.
pub async fn recount(conn: &mut PgConnection, tag_ids: &[Uuid]) -> Result<(), sqlx::Error> {
    if tag_ids.is_empty() {
        return Ok(());
    }
    sqlx::query(
        "UPDATE tags t
         SET usage_count = (SELECT COUNT(*) FROM photo_tags pt WHERE pt.tag_id = t.id),
             updated_at = now()
         WHERE t.id = ANY($1)",
    )
    .bind(tag_ids)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
