//! Album: an ordered collection of photos.

use serde::{Deserialize, Serialize};
use sqlx::Row;
use sqlx::postgres::PgRow;
use time::OffsetDateTime;
use uuid::Uuid;

use super::Photo;
use crate::images::Storage;

pub const ALBUM_COLUMNS: &str = "a.id, a.title, a.slug, a.description, a.visibility, a.is_featured, \
     a.sort_order, a.cover_photo_id, a.meta_title, a.meta_description, \
     a.view_count, a.photo_count, a.owner_id, a.created_at, a.updated_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlbumVisibility {
    #[default]
    Public,
    Private,
    /// Reachable by direct link only.
    Unlisted,
}

impl AlbumVisibility {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Unlisted => "unlisted",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "public" => Some(Self::Public),
            "private" => Some(Self::Private),
            "unlisted" => Some(Self::Unlisted),
            _ => None,
        }
    }

    /// Shows up in public listings.
    #[must_use]
    pub fn is_listed(self) -> bool {
        self == Self::Public
    }

    /// Can be opened by slug without admin rights.
    #[must_use]
    pub fn is_reachable(self) -> bool {
        matches!(self, Self::Public | Self::Unlisted)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Album {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub visibility: AlbumVisibility,
    pub is_featured: bool,
    pub sort_order: i32,
    pub cover_photo_id: Option<Uuid>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub view_count: i32,
    pub photo_count: i32,
    pub owner_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The cover photo's URL, else the first photo's, else nothing.
/// `photos` must already be in album order.
#[must_use]
pub fn cover_image_url(cover: Option<&Photo>, photos: &[Photo], storage: &Storage) -> Option<String> {
    cover.or_else(|| photos.first()).map(|p| p.url(storage))
}

impl Album {

    pub(crate) fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let visibility: String = row.try_get("visibility")?;
        let visibility = AlbumVisibility::parse(&visibility)
            .ok_or_else(|| sqlx::Error::Decode(format!("unknown album visibility: {visibility}").into()))?;

        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            slug: row.try_get("slug")?,
            description: row.try_get("description")?,
            visibility,
            is_featured: row.try_get("is_featured")?,
            sort_order: row.try_get("sort_order")?,
            cover_photo_id: row.try_get("cover_photo_id")?,
            meta_title: row.try_get("meta_title")?,
            meta_description: row.try_get("meta_description")?,
            view_count: row.try_get("view_count")?,
            photo_count: row.try_get("photo_count")?,
            owner_id: row.try_get("owner_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::photo::test_helpers::dummy_photo;

    fn album() -> Album {
        Album {
            id: Uuid::new_v4(),
            title: "Coastlines".into(),
            slug: "coastlines".into(),
            description: None,
            visibility: AlbumVisibility::default(),
            is_featured: false,
            sort_order: 0,
            cover_photo_id: None,
            meta_title: None,
            meta_description: None,
            view_count: 0,
            photo_count: 0,
            owner_id: Uuid::new_v4(),
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn storage() -> Storage {
        Storage::new(Some("https://cdn.example"), None, "us-east-1")
    }

    #[test]
    fn visibility_defaults_to_public() {
        assert_eq!(AlbumVisibility::default(), AlbumVisibility::Public);
    }

    #[test]
    fn visibility_rules() {
        assert!(AlbumVisibility::Public.is_listed());
        assert!(AlbumVisibility::Public.is_reachable());
        assert!(!AlbumVisibility::Unlisted.is_listed());
        assert!(AlbumVisibility::Unlisted.is_reachable());
        assert!(!AlbumVisibility::Private.is_listed());
        assert!(!AlbumVisibility::Private.is_reachable());
    }

    #[test]
    fn visibility_parse_round_trip() {
        for v in [AlbumVisibility::Public, AlbumVisibility::Private, AlbumVisibility::Unlisted] {
            assert_eq!(AlbumVisibility::parse(v.as_str()), Some(v));
        }
        assert_eq!(AlbumVisibility::parse("hidden"), None);
    }

    #[test]
    fn cover_prefers_explicit_cover_photo() {
        let mut cover = dummy_photo();
        cover.file_path = "cover.jpg".into();
        let first = dummy_photo();
        let url = cover_image_url(Some(&cover), &[first], &storage());
        assert_eq!(url.as_deref(), Some("https://cdn.example/cover.jpg"));
    }

    #[test]
    fn cover_falls_back_to_first_photo() {
        let mut first = dummy_photo();
        first.file_path = "first.jpg".into();
        let second = dummy_photo();
        let url = cover_image_url(None, &[first, second], &storage());
        assert_eq!(url.as_deref(), Some("https://cdn.example/first.jpg"));
    }

    #[test]
    fn album_serializes_visibility_and_timestamps() {
        let value = serde_json::to_value(album()).unwrap();
        assert_eq!(value["visibility"], "public");
        assert_eq!(value["slug"], "coastlines");
        assert_eq!(value["created_at"], "1970-01-01T00:00:00Z");
    }

    #[test]
    fn cover_is_none_for_empty_album() {
        assert!(cover_image_url(None, &[], &storage()).is_none());
    }
}
