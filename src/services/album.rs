//! Album service: creation, public browsing, membership, cover photo.
//!
//! DESIGN
//! ======
//! Membership lives in `album_photos` with a per-album `sort_order`.
//! `albums.photo_count` caches the membership size; every add/remove
//! recomputes it in the same transaction via `recount_photos`.
//!
//! Visitors only see publicly visible photos inside an album, and the cover
//! falls back to the first such photo when no explicit cover is visible.

use sqlx::{PgConnection, PgPool, Row};
use uuid::Uuid;

use super::photo::{self as photo_svc, PhotoError};
use super::{ErrorKind, Page, ServiceError, check_len, require, user};
use crate::db::{self, SlugTable};
use crate::models::album::ALBUM_COLUMNS;
use crate::models::photo::PHOTO_COLUMNS;
use crate::models::{ALBUM_SLUG_MAX, Album, AlbumVisibility, Photo, slugify};

#[derive(Debug, thiserror::Error)]
pub enum AlbumError {
    #[error("album not found: {0}")]
    NotFound(String),
    #[error("album slug already taken: {0}")]
    Conflict(String),
    #[error("invalid album: {0}")]
    Invalid(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ServiceError for AlbumError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Invalid(_) => ErrorKind::Invalid,
            Self::Database(_) => ErrorKind::Database,
        }
    }
}

impl From<PhotoError> for AlbumError {
    fn from(err: PhotoError) -> Self {
        match err {
            PhotoError::NotFound(slug) => Self::NotFound(format!("photo {slug}")),
            PhotoError::Conflict(s) => Self::Conflict(s),
            PhotoError::Invalid(s) => Self::Invalid(s),
            PhotoError::Database(e) => Self::Database(e),
        }
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct NewAlbum {
    pub title: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub visibility: AlbumVisibility,
    pub is_featured: bool,
    pub sort_order: i32,
    /// Photo slug.
    pub cover_photo: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub owner_id: Uuid,
}

/// An album as shown in listings.
#[derive(Debug, Clone)]
pub struct AlbumCard {
    pub album: Album,
    /// Storage key of the cover, or of the first visible photo.
    pub cover_file_path: Option<String>,
}

/// An album opened by slug, with its visible photos in album order.
#[derive(Debug, Clone)]
pub struct AlbumDetail {
    pub album: Album,
    pub cover: Option<Photo>,
    pub photos: Vec<Photo>,
}

pub(crate) fn validate_new_album(input: &NewAlbum) -> Result<String, AlbumError> {
    require("title", &input.title).map_err(AlbumError::Invalid)?;
    check_len("title", &input.title, 255).map_err(AlbumError::Invalid)?;
    if let Some(meta_title) = &input.meta_title {
        check_len("meta_title", meta_title, 255).map_err(AlbumError::Invalid)?;
    }
    Ok(slugify(input.slug.as_deref().unwrap_or(&input.title), ALBUM_SLUG_MAX))
}

// =============================================================================
// CREATE
// =============================================================================

/// Create an album.
///
/// # Errors
///
/// Returns `Invalid` for bad input or an unknown owner/cover photo, and
/// `Conflict` if an explicit slug is taken. A slug derived from the title
/// gets a `-2`, `-3`, ... suffix instead.
pub async fn create_album(pool: &PgPool, input: &NewAlbum) -> Result<Album, AlbumError> {
    let slug = validate_new_album(input)?;

    user::ensure_active(pool, input.owner_id)
        .await
        .map_err(|e| match e {
            user::UserError::Database(e) => AlbumError::Database(e),
            _ => AlbumError::Invalid(format!("unknown owner: {}", input.owner_id)),
        })?;

    let mut tx = pool.begin().await?;
    let slug = if input.slug.is_some() {
        if db::slug_taken(&mut tx, SlugTable::Albums, &slug).await? {
            return Err(AlbumError::Conflict(slug));
        }
        slug
    } else {
        db::free_slug(&mut tx, SlugTable::Albums, &slug, ALBUM_SLUG_MAX)
            .await?
            .ok_or(AlbumError::Conflict(slug))?
    };
    let cover_photo_id = match input.cover_photo.as_deref() {
        Some(photo_slug) => Some(photo_svc::id_for_slug(&mut tx, photo_slug).await.map_err(|e| match e {
            PhotoError::NotFound(s) => AlbumError::Invalid(format!("unknown cover photo: {s}")),
            other => AlbumError::from(other),
        })?),
        None => None,
    };

    let sql = format!(
        "INSERT INTO albums AS a (id, title, slug, description, visibility, is_featured, sort_order,
                                 cover_photo_id, meta_title, meta_description, owner_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
         RETURNING {ALBUM_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(Uuid::new_v4())
        .bind(input.title.trim())
        .bind(&slug)
        .bind(&input.description)
        .bind(input.visibility.as_str())
        .bind(input.is_featured)
        .bind(input.sort_order)
        .bind(cover_photo_id)
        .bind(&input.meta_title)
        .bind(&input.meta_description)
        .bind(input.owner_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| if db::is_unique_violation(&e) { AlbumError::Conflict(slug.clone()) } else { AlbumError::Database(e) })?;
    tx.commit().await?;

    let album = Album::from_row(&row)?;
    tracing::info!(album_id = %album.id, slug = %album.slug, visibility = album.visibility.as_str(), "album created");
    Ok(album)
}

// =============================================================================
// PUBLIC READS
// =============================================================================

/// List public albums with their cover storage key.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_public(pool: &PgPool, page: Page) -> Result<Vec<AlbumCard>, AlbumError> {
    let sql = format!(
        "SELECT {ALBUM_COLUMNS},
                COALESCE(
                    (SELECT cp.file_path FROM photos cp
                     WHERE cp.id = a.cover_photo_id AND cp.status = 'published' AND cp.is_public),
                    (SELECT fp.file_path FROM album_photos ap
                     JOIN photos fp ON fp.id = ap.photo_id
                     WHERE ap.album_id = a.id AND fp.status = 'published' AND fp.is_public
                     ORDER BY ap.sort_order ASC, ap.created_at ASC
                     LIMIT 1)
                ) AS cover_file_path
         FROM albums a
         WHERE a.visibility = 'public'
         ORDER BY a.is_featured DESC, a.sort_order ASC, a.created_at DESC
         LIMIT $1 OFFSET $2"
    );
    let rows = sqlx::query(&sql)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(pool)
        .await?;

    rows.iter()
        .map(|row| -> Result<AlbumCard, AlbumError> {
            Ok(AlbumCard { album: Album::from_row(row)?, cover_file_path: row.try_get("cover_file_path")? })
        })
        .collect()
}

/// Open a public or unlisted album, counting the view.
///
/// # Errors
///
/// Returns `NotFound` if the album is missing or private.
pub async fn get_visible_by_slug(pool: &PgPool, slug: &str) -> Result<AlbumDetail, AlbumError> {
    let sql = format!(
        "UPDATE albums a SET view_count = view_count + 1
         WHERE a.slug = $1 AND a.visibility IN ('public', 'unlisted')
         RETURNING {ALBUM_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(slug)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AlbumError::NotFound(slug.to_owned()))?;
    let album = Album::from_row(&row)?;

    let photos = visible_photos(pool, album.id).await?;
    let cover = match album.cover_photo_id {
        Some(cover_id) => visible_photo_by_id(pool, cover_id).await?,
        None => None,
    };

    Ok(AlbumDetail { album, cover, photos })
}

async fn visible_photos(pool: &PgPool, album_id: Uuid) -> Result<Vec<Photo>, AlbumError> {
    let sql = format!(
        "SELECT {PHOTO_COLUMNS}
         FROM album_photos ap
         JOIN photos p ON p.id = ap.photo_id
         WHERE ap.album_id = $1 AND p.status = 'published' AND p.is_public
         ORDER BY ap.sort_order ASC, ap.created_at ASC"
    );
    let rows = sqlx::query(&sql).bind(album_id).fetch_all(pool).await?;
    rows.iter().map(|r| Photo::from_row(r).map_err(AlbumError::from)).collect()
}

async fn visible_photo_by_id(pool: &PgPool, photo_id: Uuid) -> Result<Option<Photo>, AlbumError> {
    let sql = format!("SELECT {PHOTO_COLUMNS} FROM photos p WHERE p.id = $1 AND p.status = 'published' AND p.is_public");
    let row = sqlx::query(&sql).bind(photo_id).fetch_optional(pool).await?;
    row.as_ref()
        .map(Photo::from_row)
        .transpose()
        .map_err(AlbumError::from)
}

// =============================================================================
// MEMBERSHIP
// =============================================================================

/// Add a photo to an album, or move it if already present. Without an
/// explicit `sort_order` the photo is appended.
///
/// # Errors
///
/// Returns `NotFound` if the album or photo is unknown.
pub async fn add_photo(
    pool: &PgPool,
    album_slug: &str,
    photo_slug: &str,
    sort_order: Option<i32>,
) -> Result<Album, AlbumError> {
    let mut tx = pool.begin().await?;
    let album_id = id_for_slug(&mut tx, album_slug).await?;
    let photo_id = photo_svc::id_for_slug(&mut tx, photo_slug).await?;

    let sort_order = match sort_order {
        Some(order) => order,
        None => {
            sqlx::query_scalar::<_, i32>(
                "SELECT COALESCE(MAX(sort_order) + 1, 0) FROM album_photos WHERE album_id = $1",
            )
            .bind(album_id)
            .fetch_one(&mut *tx)
            .await?
        }
    };

    sqlx::query(
        "INSERT INTO album_photos (album_id, photo_id, sort_order)
         VALUES ($1, $2, $3)
         ON CONFLICT (album_id, photo_id) DO UPDATE SET sort_order = EXCLUDED.sort_order",
    )
    .bind(album_id)
    .bind(photo_id)
    .bind(sort_order)
    .execute(&mut *tx)
    .await?;

    recount_photos(&mut tx, &[album_id]).await?;
    let album = fetch_by_id(&mut tx, album_id).await?;
    tx.commit().await?;

    tracing::info!(%album_id, %photo_id, sort_order, "photo added to album");
    Ok(album)
}

/// Remove a photo from an album.
///
/// # Errors
///
/// Returns `NotFound` if the album, the photo, or the membership is unknown.
pub async fn remove_photo(pool: &PgPool, album_slug: &str, photo_slug: &str) -> Result<Album, AlbumError> {
    let mut tx = pool.begin().await?;
    let album_id = id_for_slug(&mut tx, album_slug).await?;
    let photo_id = photo_svc::id_for_slug(&mut tx, photo_slug).await?;

    let result = sqlx::query("DELETE FROM album_photos WHERE album_id = $1 AND photo_id = $2")
        .bind(album_id)
        .bind(photo_id)
        .execute(&mut *tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AlbumError::NotFound(format!("photo {photo_slug} in album {album_slug}")));
    }

    recount_photos(&mut tx, &[album_id]).await?;
    let album = fetch_by_id(&mut tx, album_id).await?;
    tx.commit().await?;

    tracing::info!(%album_id, %photo_id, "photo removed from album");
    Ok(album)
}

/// Set or clear the album's explicit cover photo.
///
/// # Errors
///
/// Returns `NotFound` if the album or photo is unknown.
pub async fn set_cover(pool: &PgPool, album_slug: &str, photo_slug: Option<&str>) -> Result<Album, AlbumError> {
    let mut tx = pool.begin().await?;
    let album_id = id_for_slug(&mut tx, album_slug).await?;
    let cover_id = match photo_slug {
        Some(slug) => Some(photo_svc::id_for_slug(&mut tx, slug).await?),
        None => None,
    };

    sqlx::query("UPDATE albums SET cover_photo_id = $2, updated_at = now() WHERE id = $1")
        .bind(album_id)
        .bind(cover_id)
        .execute(&mut *tx)
        .await?;
    let album = fetch_by_id(&mut tx, album_id).await?;
    tx.commit().await?;

    tracing::info!(%album_id, cover = ?cover_id, "album cover set");
    Ok(album)
}

/// Recompute `photo_count` for the given albums from `album_photos`.
///
/// # Errors
///
/// Returns a database error if the update fails.
pub async fn recount_photos(conn: &mut PgConnection, album_ids: &[Uuid]) -> Result<(), sqlx::Error> {
    if album_ids.is_empty() {
        return Ok(());
    }
    sqlx::query(
        "UPDATE albums a
         SET photo_count = (SELECT COUNT(*) FROM album_photos ap WHERE ap.album_id = a.id),
             updated_at = now()
         WHERE a.id = ANY($1)",
    )
    .bind(album_ids)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn id_for_slug(conn: &mut PgConnection, slug: &str) -> Result<Uuid, AlbumError> {
    sqlx::query_scalar("SELECT id FROM albums WHERE slug = $1")
        .bind(slug)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AlbumError::NotFound(slug.to_owned()))
}

async fn fetch_by_id(conn: &mut PgConnection, album_id: Uuid) -> Result<Album, AlbumError> {
    let sql = format!("SELECT {ALBUM_COLUMNS} FROM albums a WHERE a.id = $1");
    let row = sqlx::query(&sql).bind(album_id).fetch_one(&mut *conn).await?;
    Ok(Album::from_row(&row)?)
}

#[cfg(test)]
#[path = "album_test.rs"]
mod tests;
