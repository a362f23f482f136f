//! Tag routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;

use super::ApiError;
use super::admin::AdminToken;
use crate::models::Tag;
use crate::services::tag::{self as tag_svc, NewTag};
use crate::state::AppState;

/// `GET /api/v1/tags`: active tags, most used first.
pub async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<Tag>>, ApiError> {
    let tags = tag_svc::list_active(&state.pool)
        .await
        .map_err(ApiError::from_service)?;
    Ok(Json(tags))
}

/// `POST /api/v1/tags` (admin)
pub async fn create_tag(
    State(state): State<AppState>,
    _admin: AdminToken,
    Json(body): Json<NewTag>,
) -> Result<(StatusCode, Json<Tag>), ApiError> {
    let tag = tag_svc::create(&state.pool, &body)
        .await
        .map_err(ApiError::from_service)?;
    Ok((StatusCode::CREATED, Json(tag)))
}

/// `DELETE /api/v1/tags/:slug` (admin)
pub async fn delete_tag(
    State(state): State<AppState>,
    _admin: AdminToken,
    Path(slug): Path<String>,
) -> Result<StatusCode, ApiError> {
    tag_svc::delete(&state.pool, &slug)
        .await
        .map_err(ApiError::from_service)?;
    Ok(StatusCode::NO_CONTENT)
}
