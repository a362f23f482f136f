//! Landing page, service banner, liveness, route index, image config.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::header::{ACCEPT, CACHE_CONTROL, PRAGMA};
use axum::response::{Html, IntoResponse, Json, Response};
use serde::Serialize;
use serde_json::{Value, json};

use crate::images::parse_accept;
use crate::state::AppState;

pub const REPOSITORY_URL: &str = "https://github.com/Shuanggao58/photography-gallery";
pub const DOCS_PATH: &str = "/api/docs";

const LANDING_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Photography Gallery</title>
<meta name="description" content="A modern photography gallery showcasing professional photography work">
<meta name="keywords" content="photography, gallery, portfolio, professional photos">
<meta property="og:title" content="Photography Gallery">
<meta property="og:description" content="A modern photography gallery showcasing professional photography work">
<meta property="og:type" content="website">
</head>
<body>
<main class="container">
  <section class="intro">
    <h1>Photography Gallery</h1>
    <p>Welcome to a modern photography gallery built on Axum, SQLx, and PostgreSQL</p>
  </section>
  <section class="stack">
    <div class="card">
      <h3>Frontend</h3>
      <p>Server-rendered landing page with a JSON API for gallery clients</p>
    </div>
    <div class="card">
      <h3>Backend</h3>
      <p>Axum with SQLx, PostgreSQL, and S3-compatible image storage</p>
    </div>
    <div class="card">
      <h3>Infrastructure</h3>
      <p>Object storage for images, PostgreSQL for metadata, CI for builds</p>
    </div>
  </section>
  <section class="status">
    <p>This gallery is currently under construction</p>
    <nav>
      <a href="/api/docs">View API Docs</a>
      <a href="https://github.com/Shuanggao58/photography-gallery" target="_blank" rel="noopener noreferrer">View on GitHub</a>
    </nav>
  </section>
</main>
</body>
</html>
"#;

/// The static landing page markup.
#[must_use]
pub fn landing_page() -> &'static str {
    LANDING_PAGE
}

/// `GET /`: landing page for browsers, service banner for API clients.
pub async fn root(headers: HeaderMap) -> Response {
    let accept = headers.get(ACCEPT).and_then(|v| v.to_str().ok()).unwrap_or_default();
    if prefers_html(accept) {
        Html(LANDING_PAGE).into_response()
    } else {
        Json(json!({ "message": "Photography Gallery API", "status": "running" })).into_response()
    }
}

/// HTML wins only when the client names `text/html` and weights it at least
/// as high as `application/json`.
pub(crate) fn prefers_html(accept: &str) -> bool {
    let mut html_q = None;
    let mut json_q = None;
    for (media_type, q) in parse_accept(accept) {
        match media_type.as_str() {
            "text/html" => html_q = Some(q),
            "application/json" => json_q = Some(q),
            _ => {}
        }
    }
    match html_q {
        Some(h) if h > 0.0 => h >= json_q.unwrap_or(0.0),
        _ => false,
    }
}

/// `GET /health`: never cached by proxies.
pub async fn health() -> impl IntoResponse {
    (
        [(CACHE_CONTROL, "no-store, no-cache, must-revalidate"), (PRAGMA, "no-cache")],
        Json(json!({ "status": "healthy", "service": "photography-gallery-api" })),
    )
}

// =============================================================================
// ROUTE INDEX
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RouteDoc {
    pub method: &'static str,
    pub path: &'static str,
    pub auth: &'static str,
    pub summary: &'static str,
}

const fn public(method: &'static str, path: &'static str, summary: &'static str) -> RouteDoc {
    RouteDoc { method, path, auth: "public", summary }
}

const fn admin(method: &'static str, path: &'static str, summary: &'static str) -> RouteDoc {
    RouteDoc { method, path, auth: "admin", summary }
}

pub const ROUTES: &[RouteDoc] = &[
    public("GET", "/", "Landing page (HTML) or service banner (JSON)"),
    public("GET", "/health", "Service health"),
    public("GET", "/healthz", "Liveness probe"),
    public("GET", DOCS_PATH, "This route index"),
    public("GET", "/api/v1/image-config", "Allowed image domains, formats, thumbnail sizes"),
    public("GET", "/api/v1/photos", "List published photos (?category=&tag=&featured=&limit=&offset=)"),
    public("GET", "/api/v1/photos/{slug}", "Photo detail; counts a view"),
    public("GET", "/api/v1/photos/{slug}/thumbnail/{size}", "Redirect to the best thumbnail for Accept"),
    public("GET", "/api/v1/photos/{slug}/download", "Redirect to the original; counts a download"),
    public("POST", "/api/v1/photos/{slug}/like", "Count a like"),
    public("GET", "/api/v1/albums", "List public albums"),
    public("GET", "/api/v1/albums/{slug}", "Public or unlisted album with its photos; counts a view"),
    public("GET", "/api/v1/categories", "List active categories"),
    public("GET", "/api/v1/categories/{slug}", "Category detail"),
    public("GET", "/api/v1/tags", "List active tags by usage"),
    public("GET", "/api/v1/users/{username}", "Public profile"),
    admin("POST", "/api/v1/users", "Create a user"),
    admin("POST", "/api/v1/categories", "Create a category"),
    admin("DELETE", "/api/v1/categories/{slug}", "Delete a category"),
    admin("POST", "/api/v1/tags", "Create a tag"),
    admin("DELETE", "/api/v1/tags/{slug}", "Delete a tag"),
    admin("POST", "/api/v1/photos", "Register a stored image as a photo"),
    admin("PATCH", "/api/v1/photos/{slug}", "Change status, featured, public, sort order"),
    admin("PUT", "/api/v1/photos/{slug}/tags", "Replace a photo's tags"),
    admin("DELETE", "/api/v1/photos/{slug}", "Delete a photo"),
    admin("POST", "/api/v1/albums", "Create an album"),
    admin("PUT", "/api/v1/albums/{slug}/photos/{photo_slug}", "Add or move a photo in an album"),
    admin("DELETE", "/api/v1/albums/{slug}/photos/{photo_slug}", "Remove a photo from an album"),
    admin("PUT", "/api/v1/albums/{slug}/cover", "Set or clear the album cover"),
];

/// `GET /api/docs`
pub async fn api_docs(State(state): State<AppState>) -> Json<Value> {
    let settings = &state.settings;
    Json(json!({
        "title": settings.project_name,
        "version": settings.version,
        "description": "Backend API for a modern photography gallery website",
        "auth": {
            "scheme": "bearer",
            "header": "Authorization",
            "format": "Bearer <SECRET_KEY>",
        },
        "routes": ROUTES,
    }))
}

/// `GET /api/v1/image-config`
pub async fn image_config(State(state): State<AppState>) -> Json<Value> {
    let settings = &state.settings;
    let formats: Vec<&str> = settings.images.formats().iter().map(|f| f.mime()).collect();
    Json(json!({
        "domains": settings.images.domains(),
        "formats": formats,
        "thumbnail_sizes": settings.thumbnail_sizes,
    }))
}

#[cfg(test)]
#[path = "site_test.rs"]
mod tests;
