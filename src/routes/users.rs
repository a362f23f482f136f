//! User routes: admin account creation and public profiles.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;

use super::ApiError;
use super::admin::AdminToken;
use crate::models::{PublicProfile, User};
use crate::services::user::{self as user_svc, NewUser};
use crate::state::AppState;

/// `POST /api/v1/users`: create a user (admin).
pub async fn create_user(
    State(state): State<AppState>,
    _admin: AdminToken,
    Json(body): Json<NewUser>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = user_svc::create_user(&state.pool, &body)
        .await
        .map_err(ApiError::from_service)?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /api/v1/users/:username`: public profile of an active user.
pub async fn get_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<PublicProfile>, ApiError> {
    let user = user_svc::get_active_by_username(&state.pool, &username)
        .await
        .map_err(ApiError::from_service)?;
    Ok(Json(PublicProfile::from(user)))
}
