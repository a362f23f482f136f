//! Category routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;

use super::ApiError;
use super::admin::AdminToken;
use crate::models::Category;
use crate::services::category::{self as category_svc, NewCategory};
use crate::state::AppState;

/// `GET /api/v1/categories`: active categories in display order.
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = category_svc::list_active(&state.pool)
        .await
        .map_err(ApiError::from_service)?;
    Ok(Json(categories))
}

/// `GET /api/v1/categories/:slug`
pub async fn get_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Category>, ApiError> {
    let category = category_svc::get_by_slug(&state.pool, &slug)
        .await
        .map_err(ApiError::from_service)?;
    Ok(Json(category))
}

/// `POST /api/v1/categories` (admin)
pub async fn create_category(
    State(state): State<AppState>,
    _admin: AdminToken,
    Json(body): Json<NewCategory>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let category = category_svc::create(&state.pool, &body)
        .await
        .map_err(ApiError::from_service)?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// `DELETE /api/v1/categories/:slug` (admin)
pub async fn delete_category(
    State(state): State<AppState>,
    _admin: AdminToken,
    Path(slug): Path<String>,
) -> Result<StatusCode, ApiError> {
    category_svc::delete(&state.pool, &slug)
        .await
        .map_err(ApiError::from_service)?;
    Ok(StatusCode::NO_CONTENT)
}
