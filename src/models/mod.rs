//! Gallery domain types and the small pure helpers shared between them.
//!
//! Each entity mirrors one table from `db/migrations`. Rows are decoded with
//! `from_row` so enum columns stored as text fail loudly on bad data.

pub mod album;
pub mod category;
pub mod photo;
pub mod tag;
pub mod user;

pub use album::{Album, AlbumVisibility};
pub use category::Category;
pub use photo::{Photo, PhotoStatus};
pub use tag::Tag;
pub use user::{PublicProfile, User};

pub const PHOTO_SLUG_MAX: usize = 255;
pub const ALBUM_SLUG_MAX: usize = 255;
pub const CATEGORY_SLUG_MAX: usize = 100;
pub const TAG_SLUG_MAX: usize = 50;

const EMPTY_SLUG: &str = "untitled";

/// Lowercase ASCII slug. Runs of anything non-alphanumeric collapse to `-`.
#[must_use]
pub fn slugify(input: &str, max_len: usize) -> String {
    let mut slug = String::with_capacity(input.len().min(max_len));
    let mut pending_dash = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        slug.push_str(EMPTY_SLUG);
    }
    truncate_slug(&slug, max_len)
}

/// Candidate for the `attempt`-th try at a unique slug: `base`, `base-2`, ...
#[must_use]
pub fn slug_candidate(base: &str, attempt: u32, max_len: usize) -> String {
    if attempt <= 1 {
        return truncate_slug(base, max_len);
    }
    let suffix = format!("-{attempt}");
    let room = max_len.saturating_sub(suffix.len());
    format!("{}{suffix}", truncate_slug(base, room))
}

fn truncate_slug(slug: &str, max_len: usize) -> String {
    // Slugs are ASCII, so byte slicing is safe.
    let cut = &slug[..slug.len().min(max_len)];
    cut.trim_end_matches('-').to_owned()
}

/// `#RRGGBB`, case-insensitive.
#[must_use]
pub fn is_hex_color(raw: &str) -> bool {
    raw.len() == 7 && raw.starts_with('#') && raw[1..].chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
