//! Admin bearer-token guard for curation endpoints.

use axum::extract::FromRef;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;

use super::ApiError;
use crate::services::user::constant_time_eq;
use crate::state::AppState;

/// Proof that the request carried `Authorization: Bearer <SECRET_KEY>`.
/// Use as a handler parameter, ahead of any body extractor.
pub struct AdminToken;

impl<S> axum::extract::FromRequestParts<S> for AdminToken
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        if !app_state.settings.admin_enabled() {
            return Err(ApiError::admin_disabled());
        }

        let token = bearer_token(&parts.headers).ok_or_else(ApiError::unauthorized)?;
        if !constant_time_eq(token.as_bytes(), app_state.settings.secret_key.as_bytes()) {
            tracing::warn!(path = %parts.uri.path(), "rejected admin token");
            return Err(ApiError::unauthorized());
        }
        Ok(Self)
    }
}

pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let raw = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = raw.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() { None } else { Some(token) }
}
