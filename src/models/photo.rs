//! Photo: the main gallery entity.

use serde::{Deserialize, Serialize};
use sqlx::Row;
use sqlx::postgres::PgRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::images::{ImageFormat, Storage};

/// Columns selected by every photo query, in `from_row` order.
pub const PHOTO_COLUMNS: &str = "p.id, p.title, p.slug, p.description, p.alt_text, \
     p.original_filename, p.file_path, p.file_size, p.mime_type, \
     p.width, p.height, p.aspect_ratio, p.status, p.is_featured, p.is_public, \
     p.thumbnails, p.exif_data, p.camera_make, p.camera_model, p.lens, p.focal_length, \
     p.aperture, p.shutter_speed, p.iso, p.taken_at, \
     p.location_name, p.latitude, p.longitude, \
     p.meta_title, p.meta_description, p.keywords, \
     p.view_count, p.download_count, p.like_count, p.sort_order, \
     p.owner_id, p.category_id, p.created_at, p.updated_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoStatus {
    Uploading,
    #[default]
    Processing,
    Published,
    Draft,
    Archived,
}

impl PhotoStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uploading => "uploading",
            Self::Processing => "processing",
            Self::Published => "published",
            Self::Draft => "draft",
            Self::Archived => "archived",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "uploading" => Some(Self::Uploading),
            "processing" => Some(Self::Processing),
            "published" => Some(Self::Published),
            "draft" => Some(Self::Draft),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Photo {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub alt_text: Option<String>,

    pub original_filename: String,
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: String,

    pub width: i32,
    pub height: i32,
    pub aspect_ratio: Option<f64>,

    pub status: PhotoStatus,
    pub is_featured: bool,
    pub is_public: bool,

    /// Size key (`"800"` or `"800.webp"`) to URL.
    pub thumbnails: Option<serde_json::Value>,

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

    pub view_count: i32,
    pub download_count: i32,
    pub like_count: i32,
    pub sort_order: i32,

    pub owner_id: Uuid,
    pub category_id: Option<Uuid>,

    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Photo {
    /// Public URL of the original file.
    #[must_use]
    pub fn url(&self, storage: &Storage) -> String {
        storage.object_url(&self.file_path)
    }

    /// Thumbnail URL for `size`, preferring a variant in `format`. Falls back
    /// to the plain size entry, then to the original.
    #[must_use]
    pub fn thumbnail(&self, storage: &Storage, size: u32, format: Option<ImageFormat>) -> String {
        let lookup = |key: &str| {
            self.thumbnails
                .as_ref()
                .and_then(|t| t.get(key))
                .and_then(serde_json::Value::as_str)
                .map(str::to_owned)
        };
        format
            .and_then(|f| lookup(&format!("{size}.{}", f.extension())))
            .or_else(|| lookup(&size.to_string()))
            .unwrap_or_else(|| self.url(storage))
    }

    #[must_use]
    pub fn is_publicly_visible(&self) -> bool {
        self.status == PhotoStatus::Published && self.is_public
    }

    pub(crate) fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        let status = PhotoStatus::parse(&status)
            .ok_or_else(|| sqlx::Error::Decode(format!("unknown photo status: {status}").into()))?;

        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            slug: row.try_get("slug")?,
            description: row.try_get("description")?,
            alt_text: row.try_get("alt_text")?,
            original_filename: row.try_get("original_filename")?,
            file_path: row.try_get("file_path")?,
            file_size: row.try_get("file_size")?,
            mime_type: row.try_get("mime_type")?,
            width: row.try_get("width")?,
            height: row.try_get("height")?,
            aspect_ratio: row.try_get("aspect_ratio")?,
            status,
            is_featured: row.try_get("is_featured")?,
            is_public: row.try_get("is_public")?,
            thumbnails: row.try_get("thumbnails")?,
            exif_data: row.try_get("exif_data")?,
            camera_make: row.try_get("camera_make")?,
            camera_model: row.try_get("camera_model")?,
            lens: row.try_get("lens")?,
            focal_length: row.try_get("focal_length")?,
            aperture: row.try_get("aperture")?,
            shutter_speed: row.try_get("shutter_speed")?,
            iso: row.try_get("iso")?,
            taken_at: row.try_get("taken_at")?,
            location_name: row.try_get("location_name")?,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            meta_title: row.try_get("meta_title")?,
            meta_description: row.try_get("meta_description")?,
            keywords: row.try_get("keywords")?,
            view_count: row.try_get("view_count")?,
            download_count: row.try_get("download_count")?,
            like_count: row.try_get("like_count")?,
            sort_order: row.try_get("sort_order")?,
            owner_id: row.try_get("owner_id")?,
            category_id: row.try_get("category_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Width over height, rounded to four decimals. `None` for degenerate sizes.
#[must_use]
pub fn aspect_ratio(width: i32, height: i32) -> Option<f64> {
    if width <= 0 || height <= 0 {
        return None;
    }
    let ratio = f64::from(width) / f64::from(height);
    Some((ratio * 10_000.0).round() / 10_000.0)
}


#[cfg(test)]
#[path = "photo_test.rs"]
mod tests;
