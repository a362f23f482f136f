//! Photo routes: public browsing, counters, redirects, and admin curation.

use axum::extract::{Path, Query, State};
use axum::http::header::{ACCEPT, VARY};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Redirect, Response};
use serde::{Deserialize, Serialize};

use super::ApiError;
use super::admin::AdminToken;
use crate::images::Storage;
use crate::models::{Photo, Tag};
use crate::services::Page;
use crate::services::photo::{self as photo_svc, Counter, NewPhoto, PhotoFilter, PhotoUpdate};
use crate::state::AppState;

#[derive(Serialize)]
pub struct PhotoResponse {
    #[serde(flatten)]
    pub photo: Photo,
    pub url: String,
}

impl PhotoResponse {
    pub(crate) fn new(photo: Photo, storage: &Storage) -> Self {
        let url = photo.url(storage);
        Self { photo, url }
    }
}

#[derive(Serialize)]
pub struct PhotoDetailResponse {
    #[serde(flatten)]
    pub photo: PhotoResponse,
    pub tags: Vec<Tag>,
}

#[derive(Serialize)]
pub struct PhotoListResponse {
    pub items: Vec<PhotoResponse>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct PhotoListQuery {
    pub category: Option<String>,
    pub tag: Option<String>,
    pub featured: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PhotoListQuery {
    fn filter(&self) -> PhotoFilter {
        PhotoFilter { category: self.category.clone(), tag: self.tag.clone(), featured: self.featured }
    }
}

#[derive(Deserialize)]
pub struct ReplaceTagsBody {
    pub tags: Vec<String>,
}

// =============================================================================
// PUBLIC
// =============================================================================

/// `GET /api/v1/photos`: published public photos.
pub async fn list_photos(
    State(state): State<AppState>,
    Query(query): Query<PhotoListQuery>,
) -> Result<Json<PhotoListResponse>, ApiError> {
    let page = Page::new(query.limit, query.offset);
    let photos = photo_svc::list_public(&state.pool, &query.filter(), page)
        .await
        .map_err(ApiError::from_service)?;
    Ok(Json(PhotoListResponse {
        items: photos
            .into_iter()
            .map(|p| PhotoResponse::new(p, &state.storage))
            .collect(),
        limit: page.limit,
        offset: page.offset,
    }))
}

/// `GET /api/v1/photos/:slug`: photo detail with tags; counts a view.
pub async fn get_photo(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PhotoDetailResponse>, ApiError> {
    let photo = photo_svc::bump_counter(&state.pool, &slug, Counter::View)
        .await
        .map_err(ApiError::from_service)?;
    let tags = photo_svc::tags_of(&state.pool, photo.id)
        .await
        .map_err(ApiError::from_service)?;
    Ok(Json(PhotoDetailResponse { photo: PhotoResponse::new(photo, &state.storage), tags }))
}

/// `GET /api/v1/photos/:slug/thumbnail/:size`: redirect to the thumbnail in
/// the best format the client accepts.
pub async fn thumbnail(
    State(state): State<AppState>,
    Path((slug, size)): Path<(String, u32)>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if !state.settings.thumbnail_sizes.contains(&size) {
        return Err(ApiError::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "E_INVALID",
            format!("thumbnail size {size} is not configured"),
        ));
    }
    let photo = photo_svc::find_public(&state.pool, &slug)
        .await
        .map_err(ApiError::from_service)?;

    let accept = headers.get(ACCEPT).and_then(|v| v.to_str().ok()).unwrap_or_default();
    let format = state.settings.images.negotiate(accept);
    let target = photo.thumbnail(&state.storage, size, format);
    tracing::debug!(%slug, size, format = ?format, "thumbnail redirect");
    Ok(([(VARY, "Accept")], Redirect::temporary(&target)).into_response())
}

/// `GET /api/v1/photos/:slug/download`: redirect to the original; counts a download.
pub async fn download(State(state): State<AppState>, Path(slug): Path<String>) -> Result<Redirect, ApiError> {
    let photo = photo_svc::bump_counter(&state.pool, &slug, Counter::Download)
        .await
        .map_err(ApiError::from_service)?;
    Ok(Redirect::temporary(&photo.url(&state.storage)))
}

/// `POST /api/v1/photos/:slug/like`
pub async fn like(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let photo = photo_svc::bump_counter(&state.pool, &slug, Counter::Like)
        .await
        .map_err(ApiError::from_service)?;
    Ok(Json(serde_json::json!({ "slug": photo.slug, "like_count": photo.like_count })))
}

// =============================================================================
// ADMIN
// =============================================================================

/// `POST /api/v1/photos`: register a stored image file (admin).
pub async fn register_photo(
    State(state): State<AppState>,
    _admin: AdminToken,
    Json(body): Json<NewPhoto>,
) -> Result<(StatusCode, Json<PhotoResponse>), ApiError> {
    let photo = photo_svc::register_photo(&state.pool, &state.settings, &body)
        .await
        .map_err(ApiError::from_service)?;
    Ok((StatusCode::CREATED, Json(PhotoResponse::new(photo, &state.storage))))
}

/// `PATCH /api/v1/photos/:slug` (admin)
pub async fn update_photo(
    State(state): State<AppState>,
    _admin: AdminToken,
    Path(slug): Path<String>,
    Json(body): Json<PhotoUpdate>,
) -> Result<Json<PhotoResponse>, ApiError> {
    let photo = photo_svc::update_photo(&state.pool, &slug, &body)
        .await
        .map_err(ApiError::from_service)?;
    Ok(Json(PhotoResponse::new(photo, &state.storage)))
}

/// `PUT /api/v1/photos/:slug/tags` (admin)
pub async fn replace_tags(
    State(state): State<AppState>,
    _admin: AdminToken,
    Path(slug): Path<String>,
    Json(body): Json<ReplaceTagsBody>,
) -> Result<Json<Vec<Tag>>, ApiError> {
    let tags = photo_svc::replace_tags(&state.pool, &slug, &body.tags)
        .await
        .map_err(ApiError::from_service)?;
    Ok(Json(tags))
}

/// `DELETE /api/v1/photos/:slug` (admin)
pub async fn delete_photo(
    State(state): State<AppState>,
    _admin: AdminToken,
    Path(slug): Path<String>,
) -> Result<StatusCode, ApiError> {
    photo_svc::delete_photo(&state.pool, &slug)
        .await
        .map_err(ApiError::from_service)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "photos_test.rs"]
mod tests;
