//! Album routes: public listing and detail, admin membership and cover.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use super::admin::AdminToken;
use super::photos::PhotoResponse;
use super::{ApiError, PageQuery};
use crate::models::Album;
use crate::models::album::cover_image_url;
use crate::services::album::{self as album_svc, AlbumCard, AlbumDetail, NewAlbum};
use crate::state::AppState;

#[derive(Serialize)]
pub struct AlbumCardResponse {
    #[serde(flatten)]
    pub album: Album,
    pub cover_image_url: Option<String>,
}

#[derive(Serialize)]
pub struct AlbumListResponse {
    pub items: Vec<AlbumCardResponse>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Serialize)]
pub struct AlbumDetailResponse {
    #[serde(flatten)]
    pub album: Album,
    pub cover_image_url: Option<String>,
    pub photos: Vec<PhotoResponse>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AddPhotoQuery {
    pub sort_order: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct SetCoverBody {
    /// Photo slug; `null` clears the cover.
    pub photo: Option<String>,
}

/// `GET /api/v1/albums`: public albums with cover URLs.
pub async fn list_albums(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<AlbumListResponse>, ApiError> {
    let page = query.page();
    let cards = album_svc::list_public(&state.pool, page)
        .await
        .map_err(ApiError::from_service)?;
    let items = cards
        .into_iter()
        .map(|AlbumCard { album, cover_file_path }| AlbumCardResponse {
            album,
            cover_image_url: cover_file_path.map(|path| state.storage.object_url(&path)),
        })
        .collect();
    Ok(Json(AlbumListResponse { items, limit: page.limit, offset: page.offset }))
}

/// `GET /api/v1/albums/:slug`: public or unlisted album; counts a view.
pub async fn get_album(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<AlbumDetailResponse>, ApiError> {
    let AlbumDetail { album, cover, photos } = album_svc::get_visible_by_slug(&state.pool, &slug)
        .await
        .map_err(ApiError::from_service)?;
    let cover_image_url = cover_image_url(cover.as_ref(), &photos, &state.storage);
    Ok(Json(AlbumDetailResponse {
        album,
        cover_image_url,
        photos: photos
            .into_iter()
            .map(|p| PhotoResponse::new(p, &state.storage))
            .collect(),
    }))
}

/// `POST /api/v1/albums` (admin)
pub async fn create_album(
    State(state): State<AppState>,
    _admin: AdminToken,
    Json(body): Json<NewAlbum>,
) -> Result<(StatusCode, Json<Album>), ApiError> {
    let album = album_svc::create_album(&state.pool, &body)
        .await
        .map_err(ApiError::from_service)?;
    Ok((StatusCode::CREATED, Json(album)))
}

/// `PUT /api/v1/albums/:slug/photos/:photo_slug?sort_order=` (admin):
/// add the photo, or move it when already a member.
pub async fn add_photo(
    State(state): State<AppState>,
    _admin: AdminToken,
    Path((slug, photo_slug)): Path<(String, String)>,
    Query(query): Query<AddPhotoQuery>,
) -> Result<Json<Album>, ApiError> {
    let album = album_svc::add_photo(&state.pool, &slug, &photo_slug, query.sort_order)
        .await
        .map_err(ApiError::from_service)?;
    Ok(Json(album))
}

/// `DELETE /api/v1/albums/:slug/photos/:photo_slug` (admin)
pub async fn remove_photo(
    State(state): State<AppState>,
    _admin: AdminToken,
    Path((slug, photo_slug)): Path<(String, String)>,
) -> Result<Json<Album>, ApiError> {
    let album = album_svc::remove_photo(&state.pool, &slug, &photo_slug)
        .await
        .map_err(ApiError::from_service)?;
    Ok(Json(album))
}

/// `PUT /api/v1/albums/:slug/cover` (admin)
pub async fn set_cover(
    State(state): State<AppState>,
    _admin: AdminToken,
    Path(slug): Path<String>,
    Json(body): Json<SetCoverBody>,
) -> Result<Json<Album>, ApiError> {
    let album = album_svc::set_cover(&state.pool, &slug, body.photo.as_deref())
        .await
        .map_err(ApiError::from_service)?;
    Ok(Json(album))
}
