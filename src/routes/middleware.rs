//! Cross-cutting request layers: CORS and trusted-host filtering.

use axum::extract::{Request, State};
use axum::http::header::HOST;
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::config::Settings;
use crate::state::AppState;

/// CORS for the configured origins with credentials allowed. Methods and
/// headers mirror the preflight request; a `*` origin mirrors the caller.
pub fn cors_layer(settings: &Settings) -> CorsLayer {
    let origin = if settings.allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = settings
            .allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(%origin, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

/// Reject requests whose `Host` is not one of `ALLOWED_HOSTS`.
pub async fn trusted_host(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let allowed = &state.settings.allowed_hosts;
    if allowed.iter().any(|h| h == "*") {
        return next.run(request).await;
    }

    let host = request
        .headers()
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| request.uri().host())
        .unwrap_or_default()
        .to_owned();

    if allowed.iter().any(|pattern| host_matches(pattern, &host)) {
        next.run(request).await
    } else {
        tracing::warn!(%host, "rejected untrusted host");
        (StatusCode::BAD_REQUEST, "Invalid host header").into_response()
    }
}

/// `example.com` matches exactly; `*.example.com` matches any subdomain.
/// Ports are ignored and comparison is case-insensitive.
pub(crate) fn host_matches(pattern: &str, host: &str) -> bool {
    let host = strip_port(host).to_ascii_lowercase();
    let pattern = pattern.to_ascii_lowercase();
    if host.is_empty() {
        return false;
    }
    match pattern.strip_prefix('*') {
        Some(suffix) if suffix.starts_with('.') => host.ends_with(suffix),
        _ => host == pattern,
    }
}

fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        // IPv6 literal: keep the brackets, drop `:port`.
        return host.find(']').map_or(host, |end| &host[..=end]);
    }
    host.split(':').next().unwrap_or(host)
}

#[cfg(test)]
#[path = "middleware_test.rs"]
mod tests;
