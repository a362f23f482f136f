//! Photo service: registration, public browsing, counters, curation.
//!
//! DESIGN
//! ======
//! Image bytes live in object storage; this service records metadata for a
//! file that is already stored. Registration validates the file against the
//! upload policy in `Settings`, derives a unique slug, computes the aspect
//! ratio, and attaches tags in one transaction.
//!
//! Public reads only ever see photos that are published and public. Counter
//! bumps (`view_count`, `like_count`, `download_count`) are single
//! `UPDATE ... RETURNING` statements so concurrent hits never lose counts.

use std::collections::BTreeMap;

use sqlx::{PgConnection, PgPool, QueryBuilder};
use uuid::Uuid;

use super::tag::{self as tag_svc, TagError};
use super::{ErrorKind, Page, ServiceError, album, category, check_len, require, user};
use crate::config::Settings;
use crate::db::{self, SlugTable};
use crate::images::is_storage_key;
use crate::models::photo::{PHOTO_COLUMNS, aspect_ratio};
use crate::models::{PHOTO_SLUG_MAX, Photo, PhotoStatus, Tag, slugify};

const PUBLIC_FILTER: &str = "p.status = 'published' AND p.is_public";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PhotoError {
    #[error("photo not found: {0}")]
    NotFound(String),
    #[error("photo slug already taken: {0}")]
    Conflict(String),
    #[error("invalid photo: {0}")]
    Invalid(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ServiceError for PhotoError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Invalid(_) => ErrorKind::Invalid,
            Self::Database(_) => ErrorKind::Database,
        }
    }
}

impl From<TagError> for PhotoError {
    fn from(err: TagError) -> Self {
        match err {
            TagError::Database(e) => Self::Database(e),
            TagError::NotFound(s) | TagError::Invalid(s) | TagError::Conflict(s) => Self::Invalid(s),
        }
    }
}

/// Metadata for a stored image file.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct NewPhoto {
    pub title: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub alt_text: Option<String>,
    pub original_filename: String,
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: String,
    pub width: i32,
    pub height: i32,
    pub status: Option<PhotoStatus>,
    pub is_featured: bool,
    pub is_public: Option<bool>,
    pub thumbnails: BTreeMap<String, String>,
    pub exif_data: Option<serde_json::Value>,
    pub camera_make: Option<String>,
    pub camera_model: Option<String>,
    pub lens: Option<String>,
    pub focal_length: Option<String>,
    pub aperture: Option<String>,
    pub shutter_speed: Option<String>,
    pub iso: Option<i32>,
    pub taken_at: Option<String>,
    pub location_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub keywords: Option<String>,
    pub sort_order: i32,
    pub owner_id: Uuid,
    /// Category slug.
    pub category: Option<String>,
    /// Tag slugs.
    pub tags: Vec<String>,
}

/// Curation fields an admin may change after registration.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct PhotoUpdate {
    pub status: Option<PhotoStatus>,
    pub is_featured: Option<bool>,
    pub is_public: Option<bool>,
    pub sort_order: Option<i32>,
}

impl PhotoUpdate {
    fn is_empty(&self) -> bool {
        self.status.is_none() && self.is_featured.is_none() && self.is_public.is_none() && self.sort_order.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PhotoFilter {
    pub category: Option<String>,
    pub tag: Option<String>,
    pub featured: Option<bool>,
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Validate registration input against the upload policy.
pub(crate) fn validate_new_photo(input: &NewPhoto, settings: &Settings) -> Result<(), PhotoError> {
    let invalid = PhotoError::Invalid;

    require("title", &input.title).map_err(invalid)?;
    check_len("title", &input.title, 255).map_err(invalid)?;
    require("original_filename", &input.original_filename).map_err(invalid)?;
    check_len("original_filename", &input.original_filename, 255).map_err(invalid)?;
    require("file_path", &input.file_path).map_err(invalid)?;
    check_len("file_path", &input.file_path, 500).map_err(invalid)?;
    if !is_storage_key(&input.file_path) {
        return Err(invalid("file_path must be printable ASCII without spaces, `\\`, `?` or `#`".into()));
    }
    if let Some(alt_text) = &input.alt_text {
        check_len("alt_text", alt_text, 255).map_err(invalid)?;
    }
    if let Some(keywords) = &input.keywords {
        check_len("keywords", keywords, 500).map_err(invalid)?;
    }

    if !settings.accepts_upload_type(&input.mime_type) {
        return Err(invalid(format!(
            "mime_type {:?} is not one of {}",
            input.mime_type,
            settings.allowed_image_types.join(", ")
        )));
    }
    let max_size = i64::try_from(settings.max_image_size).unwrap_or(i64::MAX);
    if input.file_size <= 0 || input.file_size > max_size {
        return Err(invalid(format!("file_size must be between 1 and {max_size} bytes")));
    }
    if input.width <= 0 || input.height <= 0 {
        return Err(invalid("width and height must be positive".into()));
    }
    if input.latitude.is_some_and(|lat| !(-90.0..=90.0).contains(&lat)) {
        return Err(invalid("latitude must be within -90..=90".into()));
    }
    if input.longitude.is_some_and(|lon| !(-180.0..=180.0).contains(&lon)) {
        return Err(invalid("longitude must be within -180..=180".into()));
    }
    if input.iso.is_some_and(|iso| iso <= 0) {
        return Err(invalid("iso must be positive".into()));
    }

    for (key, url) in &input.thumbnails {
        if !is_valid_thumbnail_key(key) {
            return Err(invalid(format!("thumbnail key {key:?} must be <size> or <size>.<ext>")));
        }
        if !settings.images.is_allowed_remote(url) {
            return Err(invalid(format!("thumbnail {key} is hosted on a domain that is not allowed")));
        }
    }
    Ok(())
}

/// `800` or `800.webp`.
fn is_valid_thumbnail_key(key: &str) -> bool {
    let (size, ext) = key.split_once('.').map_or((key, None), |(s, e)| (s, Some(e)));
    let size_ok = size.parse::<u32>().is_ok_and(|n| n > 0);
    let ext_ok = ext.is_none_or(|e| matches!(e, "webp" | "avif" | "jpg" | "png"));
    size_ok && ext_ok
}

// =============================================================================
// REGISTRATION
// =============================================================================

/// Register a stored image file as a photo.
///
/// # Errors
///
/// Returns `Invalid` for input that violates the upload policy or references
/// an unknown owner, category, or tag; `Conflict` if an explicit slug is taken.
pub async fn register_photo(pool: &PgPool, settings: &Settings, input: &NewPhoto) -> Result<Photo, PhotoError> {
    validate_new_photo(input, settings)?;

    user::ensure_active(pool, input.owner_id)
        .await
        .map_err(|e| match e {
            user::UserError::Database(e) => PhotoError::Database(e),
            _ => PhotoError::Invalid(format!("unknown owner: {}", input.owner_id)),
        })?;

    let category_id = match input.category.as_deref() {
        Some(slug) => Some(category::id_for_slug(pool, slug).await.map_err(|e| match e {
            category::CategoryError::Database(e) => PhotoError::Database(e),
            _ => PhotoError::Invalid(format!("unknown category: {slug}")),
        })?),
        None => None,
    };

    let mut tx = pool.begin().await?;

    let slug = match input.slug.as_deref() {
        Some(explicit) => {
            let slug = slugify(explicit, PHOTO_SLUG_MAX);
            if db::slug_taken(&mut tx, SlugTable::Photos, &slug).await? {
                return Err(PhotoError::Conflict(slug));
            }
            slug
        }
        None => {
            let base = slugify(&input.title, PHOTO_SLUG_MAX);
            db::free_slug(&mut tx, SlugTable::Photos, &base, PHOTO_SLUG_MAX)
                .await?
                .ok_or(PhotoError::Conflict(base))?
        }
    };

    let thumbnails = (!input.thumbnails.is_empty())
        .then(|| serde_json::to_value(&input.thumbnails))
        .transpose()
        .map_err(|e| PhotoError::Invalid(e.to_string()))?;

    let sql = format!(
        "INSERT INTO photos AS p (
             id, title, slug, description, alt_text,
             original_filename, file_path, file_size, mime_type,
             width, height, aspect_ratio, status, is_featured, is_public,
             thumbnails, exif_data, camera_make, camera_model, lens, focal_length,
             aperture, shutter_speed, iso, taken_at,
             location_name, latitude, longitude,
             meta_title, meta_description, keywords, sort_order,
             owner_id, category_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                 $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29, $30, $31, $32, $33, $34)
         RETURNING {PHOTO_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(Uuid::new_v4())
        .bind(input.title.trim())
        .bind(&slug)
        .bind(&input.description)
        .bind(&input.alt_text)
        .bind(&input.original_filename)
        .bind(&input.file_path)
        .bind(input.file_size)
        .bind(input.mime_type.to_ascii_lowercase())
        .bind(input.width)
        .bind(input.height)
        .bind(aspect_ratio(input.width, input.height))
        .bind(input.status.unwrap_or_default().as_str())
        .bind(input.is_featured)
        .bind(input.is_public.unwrap_or(true))
        .bind(thumbnails)
        .bind(&input.exif_data)
        .bind(&input.camera_make)
        .bind(&input.camera_model)
        .bind(&input.lens)
        .bind(&input.focal_length)
        .bind(&input.aperture)
        .bind(&input.shutter_speed)
        .bind(input.iso)
        .bind(&input.taken_at)
        .bind(&input.location_name)
        .bind(input.latitude)
        .bind(input.longitude)
        .bind(&input.meta_title)
        .bind(&input.meta_description)
        .bind(&input.keywords)
        .bind(input.sort_order)
        .bind(input.owner_id)
        .bind(category_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| if db::is_unique_violation(&e) { PhotoError::Conflict(slug.clone()) } else { PhotoError::Database(e) })?;
    let photo = Photo::from_row(&row)?;

    let tag_ids = tag_svc::ids_for_slugs(&mut tx, &input.tags).await?;
    link_tags(&mut tx, photo.id, &tag_ids).await?;
    tag_svc::recount(&mut tx, &tag_ids).await?;

    tx.commit().await?;
    tracing::info!(photo_id = %photo.id, slug = %photo.slug, status = photo.status.as_str(), "photo registered");
    Ok(photo)
}

async fn link_tags(conn: &mut PgConnection, photo_id: Uuid, tag_ids: &[Uuid]) -> Result<(), sqlx::Error> {
    if tag_ids.is_empty() {
        return Ok(());
    }
    sqlx::query(
        "INSERT INTO photo_tags (photo_id, tag_id)
         SELECT $1, UNNEST($2::uuid[])
         ON CONFLICT DO NOTHING",
    )
    .bind(photo_id)
    .bind(tag_ids)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

// =============================================================================
// PUBLIC READS
// =============================================================================

/// List publicly visible photos, optionally filtered.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_public(pool: &PgPool, filter: &PhotoFilter, page: Page) -> Result<Vec<Photo>, PhotoError> {
    let mut builder = QueryBuilder::new(format!("SELECT {PHOTO_COLUMNS} FROM photos p"));
    if filter.category.is_some() {
        builder.push(" JOIN categories c ON c.id = p.category_id");
    }
    builder.push(" WHERE ");
    builder.push(PUBLIC_FILTER);
    if let Some(category) = &filter.category {
        builder.push(" AND c.slug = ").push_bind(category.clone());
        builder.push(" AND c.is_active");
    }
    if let Some(tag) = &filter.tag {
        builder.push(
            " AND EXISTS (SELECT 1 FROM photo_tags pt JOIN tags t ON t.id = pt.tag_id
                          WHERE pt.photo_id = p.id AND t.slug = ",
        );
        builder.push_bind(tag.clone()).push(")");
    }
    if let Some(featured) = filter.featured {
        builder.push(" AND p.is_featured = ").push_bind(featured);
    }
    builder.push(" ORDER BY p.sort_order ASC, p.created_at DESC, p.id ASC");
    builder.push(" LIMIT ").push_bind(page.limit);
    builder.push(" OFFSET ").push_bind(page.offset);

    let rows = builder.build().fetch_all(pool).await?;
    rows.iter().map(|r| Photo::from_row(r).map_err(PhotoError::from)).collect()
}

/// Fetch a public photo without touching counters.
///
/// # Errors
///
/// Returns `NotFound` if the photo is missing or not public.
pub async fn find_public(pool: &PgPool, slug: &str) -> Result<Photo, PhotoError> {
    let sql = format!("SELECT {PHOTO_COLUMNS} FROM photos p WHERE p.slug = $1 AND {PUBLIC_FILTER}");
    let row = sqlx::query(&sql)
        .bind(slug)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| PhotoError::NotFound(slug.to_owned()))?;
    Ok(Photo::from_row(&row)?)
}

#[derive(Debug, Clone, Copy)]
pub enum Counter {
    View,
    Like,
    Download,
}

impl Counter {
    fn column(self) -> &'static str {
        match self {
            Self::View => "view_count",
            Self::Like => "like_count",
            Self::Download => "download_count",
        }
    }
}

/// Bump one counter on a public photo and return the updated row.
///
/// # Errors
///
/// Returns `NotFound` if the photo is missing or not public.
pub async fn bump_counter(pool: &PgPool, slug: &str, counter: Counter) -> Result<Photo, PhotoError> {
    let column = counter.column();
    let sql = format!(
        "UPDATE photos p SET {column} = {column} + 1
         WHERE p.slug = $1 AND {PUBLIC_FILTER}
         RETURNING {PHOTO_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(slug)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| PhotoError::NotFound(slug.to_owned()))?;
    Ok(Photo::from_row(&row)?)
}

/// Tags on a photo.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn tags_of(pool: &PgPool, photo_id: Uuid) -> Result<Vec<Tag>, PhotoError> {
    Ok(tag_svc::for_photo(pool, photo_id).await?)
}

// =============================================================================
// CURATION
// =============================================================================

/// Apply curation changes to any photo, public or not.
///
/// # Errors
///
/// Returns `Invalid` for an empty update and `NotFound` for an unknown slug.
pub async fn update_photo(pool: &PgPool, slug: &str, update: &PhotoUpdate) -> Result<Photo, PhotoError> {
    if update.is_empty() {
        return Err(PhotoError::Invalid("no fields to update".into()));
    }
    let sql = format!(
        "UPDATE photos p SET
             status = COALESCE($2, p.status),
             is_featured = COALESCE($3, p.is_featured),
             is_public = COALESCE($4, p.is_public),
             sort_order = COALESCE($5, p.sort_order),
             updated_at = now()
         WHERE p.slug = $1
         RETURNING {PHOTO_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(slug)
        .bind(update.status.map(PhotoStatus::as_str))
        .bind(update.is_featured)
        .bind(update.is_public)
        .bind(update.sort_order)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| PhotoError::NotFound(slug.to_owned()))?;
    let photo = Photo::from_row(&row)?;
    tracing::info!(photo_id = %photo.id, status = photo.status.as_str(), "photo updated");
    Ok(photo)
}

/// Replace a photo's tag set and refresh usage counts of every tag touched.
///
/// # Errors
///
/// Returns `NotFound` for an unknown photo and `Invalid` for an unknown tag.
pub async fn replace_tags(pool: &PgPool, slug: &str, tag_slugs: &[String]) -> Result<Vec<Tag>, PhotoError> {
    let mut tx = pool.begin().await?;

    let photo_id = id_for_slug(&mut tx, slug).await?;
    let new_ids = tag_svc::ids_for_slugs(&mut tx, tag_slugs).await?;

    let old_ids: Vec<Uuid> = sqlx::query_scalar("DELETE FROM photo_tags WHERE photo_id = $1 RETURNING tag_id")
        .bind(photo_id)
        .fetch_all(&mut *tx)
        .await?;
    link_tags(&mut tx, photo_id, &new_ids).await?;

    let mut touched = old_ids;
    for id in &new_ids {
        if !touched.contains(id) {
            touched.push(*id);
        }
    }
    tag_svc::recount(&mut tx, &touched).await?;
    tx.commit().await?;

    tracing::info!(%photo_id, count = new_ids.len(), "photo tags replaced");
    tags_of(pool, photo_id).await
}

/// Delete a photo and refresh the caches that counted it.
///
/// # Errors
///
/// Returns `NotFound` for an unknown slug.
pub async fn delete_photo(pool: &PgPool, slug: &str) -> Result<(), PhotoError> {
    let mut tx = pool.begin().await?;

    let photo_id = id_for_slug(&mut tx, slug).await?;
    let tag_ids: Vec<Uuid> = sqlx::query_scalar("SELECT tag_id FROM photo_tags WHERE photo_id = $1")
        .bind(photo_id)
        .fetch_all(&mut *tx)
        .await?;
    let album_ids: Vec<Uuid> = sqlx::query_scalar("SELECT album_id FROM album_photos WHERE photo_id = $1")
        .bind(photo_id)
        .fetch_all(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM photos WHERE id = $1")
        .bind(photo_id)
        .execute(&mut *tx)
        .await?;

    tag_svc::recount(&mut tx, &tag_ids).await?;
    album::recount_photos(&mut tx, &album_ids).await?;
    tx.commit().await?;

    tracing::info!(%photo_id, %slug, "photo deleted");
    Ok(())
}

/// Resolve any photo slug (public or not) to its id.
pub(crate) async fn id_for_slug(conn: &mut PgConnection, slug: &str) -> Result<Uuid, PhotoError> {
    sqlx::query_scalar("SELECT id FROM photos WHERE slug = $1")
        .bind(slug)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| PhotoError::NotFound(slug.to_owned()))
}

#[cfg(test)]
#[path = "photo_test.rs"]
mod tests;
