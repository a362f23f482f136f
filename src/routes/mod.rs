//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the landing page, liveness probes, and the `/api/v1`
//! gallery endpoints under a single Axum router. Public reads need no
//! credentials; curation endpoints take the `AdminToken` extractor.
//! Every request passes the trusted-host filter and the CORS layer.

pub mod admin;
pub mod albums;
pub mod categories;
pub mod middleware;
pub mod photos;
pub mod site;
pub mod tags;
pub mod users;

use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post, put};
use serde::Deserialize;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::services::{ErrorKind, Page, ServiceError};
use crate::state::AppState;

/// Full application router with every layer applied.
pub fn app(state: AppState) -> Router {
    let cors = middleware::cors_layer(&state.settings);

    Router::new()
        .route("/", get(site::root))
        .route("/health", get(site::health))
        .route("/healthz", get(healthz))
        .route("/api/docs", get(site::api_docs))
        .route("/api/v1/image-config", get(site::image_config))
        .route("/api/v1/users", post(users::create_user))
        .route("/api/v1/users/{username}", get(users::get_profile))
        .route("/api/v1/categories", get(categories::list_categories).post(categories::create_category))
        .route(
            "/api/v1/categories/{slug}",
            get(categories::get_category).delete(categories::delete_category),
        )
        .route("/api/v1/tags", get(tags::list_tags).post(tags::create_tag))
        .route("/api/v1/tags/{slug}", axum::routing::delete(tags::delete_tag))
        .route("/api/v1/photos", get(photos::list_photos).post(photos::register_photo))
        .route(
            "/api/v1/photos/{slug}",
            get(photos::get_photo)
                .patch(photos::update_photo)
                .delete(photos::delete_photo),
        )
        .route("/api/v1/photos/{slug}/thumbnail/{size}", get(photos::thumbnail))
        .route("/api/v1/photos/{slug}/download", get(photos::download))
        .route("/api/v1/photos/{slug}/like", post(photos::like))
        .route("/api/v1/photos/{slug}/tags", put(photos::replace_tags))
        .route("/api/v1/albums", get(albums::list_albums).post(albums::create_album))
        .route("/api/v1/albums/{slug}", get(albums::get_album))
        .route(
            "/api/v1/albums/{slug}/photos/{photo_slug}",
            put(albums::add_photo).delete(albums::remove_photo),
        )
        .route("/api/v1/albums/{slug}/cover", put(albums::set_cover))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(axum::middleware::from_fn_with_state(state.clone(), middleware::trusted_host))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

// =============================================================================
// ERRORS
// =============================================================================

/// JSON error body: `{"error": "<code>", "message": "<text>"}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self { status, code, message: message.into() }
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "E_UNAUTHORIZED", "missing or invalid admin token")
    }

    pub fn admin_disabled() -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "E_ADMIN_DISABLED", "admin API disabled: set SECRET_KEY")
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "E_BAD_REQUEST", message)
    }

    /// Map a service error onto a status and code. Database details are
    /// logged and never sent to the client.
    pub fn from_service<E: ServiceError>(err: E) -> Self {
        match err.kind() {
            ErrorKind::NotFound => Self::new(StatusCode::NOT_FOUND, "E_NOT_FOUND", err.to_string()),
            ErrorKind::Conflict => Self::new(StatusCode::CONFLICT, "E_CONFLICT", err.to_string()),
            ErrorKind::Invalid => Self::new(StatusCode::UNPROCESSABLE_ENTITY, "E_INVALID", err.to_string()),
            ErrorKind::Database => {
                tracing::error!(error = %err, "database error");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "E_DATABASE", "internal database error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.code, "message": self.message });
        (self.status, Json(body)).into_response()
    }
}

// =============================================================================
// PAGINATION
// =============================================================================

/// `?limit=&offset=` query parameters shared by list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageQuery {
    #[must_use]
    pub fn page(&self) -> Page {
        Page::new(self.limit, self.offset)
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
