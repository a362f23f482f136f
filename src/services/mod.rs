//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own SQL and business rules so route handlers can stay
//! focused on request parsing and response shaping. Every service error
//! reports an `ErrorKind`, which the route layer turns into a status code.

pub mod album;
pub mod category;
pub mod photo;
pub mod tag;
pub mod user;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Invalid,
    Database,
}

pub trait ServiceError: std::error::Error {
    fn kind(&self) -> ErrorKind;
}

/// Pagination window shared by list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    pub const DEFAULT_LIMIT: i64 = 24;
    pub const MAX_LIMIT: i64 = 100;

    /// Clamp raw query values into a valid window.
    #[must_use]
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self {
            limit: limit.unwrap_or(Self::DEFAULT_LIMIT).clamp(1, Self::MAX_LIMIT),
            offset: offset.unwrap_or(0).max(0),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Reject values longer than a column allows.
pub(crate) fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), String> {
    if value.chars().count() > max {
        return Err(format!("{field} must be at most {max} characters"));
    }
    Ok(())
}

/// Reject blank required text.
pub(crate) fn require(field: &'static str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} is required"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults() {
        assert_eq!(Page::default(), Page { limit: 24, offset: 0 });
    }

    #[test]
    fn page_clamps_limits_and_offsets() {
        assert_eq!(Page::new(Some(0), Some(-5)), Page { limit: 1, offset: 0 });
        assert_eq!(Page::new(Some(1_000), Some(40)), Page { limit: 100, offset: 40 });
    }

    #[test]
    fn check_len_counts_chars_not_bytes() {
        assert!(check_len("name", "ééé", 3).is_ok());
        assert!(check_len("name", "éééé", 3).is_err());
    }

    #[test]
    fn require_rejects_whitespace() {
        assert_eq!(require("title", "  ").unwrap_err(), "title is required");
        assert!(require("title", "x").is_ok());
    }
}
