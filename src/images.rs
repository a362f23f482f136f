//! Image formats, remote-domain policy, and storage URL resolution.
//!
//! DESIGN
//! ======
//! `ImageConfig` is the server-side mirror of the frontend image loader
//! policy: which remote hosts may serve gallery images and which modern
//! formats the site is willing to deliver. Photo registration uses it to
//! reject thumbnails hosted elsewhere, and thumbnail redirects use it to
//! negotiate a format from the client's `Accept` header.

pub const DEFAULT_IMAGE_DOMAIN: &str = "your-bucket-name.s3.amazonaws.com";
pub const LOCAL_MEDIA_BASE: &str = "/media";

// =============================================================================
// FORMATS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Webp,
    Avif,
    Jpeg,
    Png,
}

impl ImageFormat {
    #[must_use]
    pub fn from_mime(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "image/webp" => Some(Self::Webp),
            "image/avif" => Some(Self::Avif),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            _ => None,
        }
    }

    #[must_use]
    pub fn mime(self) -> &'static str {
        match self {
            Self::Webp => "image/webp",
            Self::Avif => "image/avif",
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Webp => "webp",
            Self::Avif => "avif",
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }

    /// Lower is better. Breaks ties between equally-weighted `Accept` entries.
    fn preference(self) -> u8 {
        match self {
            Self::Avif => 0,
            Self::Webp => 1,
            Self::Jpeg => 2,
            Self::Png => 3,
        }
    }
}

// =============================================================================
// IMAGE CONFIG
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageConfig {
    remote_domains: Vec<String>,
    formats: Vec<ImageFormat>,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            remote_domains: vec![DEFAULT_IMAGE_DOMAIN.to_owned()],
            formats: vec![ImageFormat::Webp, ImageFormat::Avif],
        }
    }
}

impl ImageConfig {
    /// Duplicate domains and formats are dropped, first occurrence wins.
    #[must_use]
    pub fn new(domains: Vec<String>, formats: Vec<ImageFormat>) -> Self {
        let mut remote_domains: Vec<String> = Vec::with_capacity(domains.len());
        for domain in domains {
            let domain = domain.trim().to_ascii_lowercase();
            if !domain.is_empty() && !remote_domains.contains(&domain) {
                remote_domains.push(domain);
            }
        }
        let mut unique_formats = Vec::with_capacity(formats.len());
        for format in formats {
            if !unique_formats.contains(&format) {
                unique_formats.push(format);
            }
        }
        Self { remote_domains, formats: unique_formats }
    }

    #[must_use]
    pub fn domains(&self) -> &[String] {
        &self.remote_domains
    }

    #[must_use]
    pub fn formats(&self) -> &[ImageFormat] {
        &self.formats
    }

    #[must_use]
    pub fn accepts_format(&self, mime: &str) -> bool {
        ImageFormat::from_mime(mime).is_some_and(|f| self.formats.contains(&f))
    }

    /// Relative paths are allowed; absolute URLs must be http(s) on a
    /// configured domain. Either way the URL must be usable as a `Location`
    /// header verbatim.
    #[must_use]
    pub fn is_allowed_remote(&self, url: &str) -> bool {
        // Browsers read `\` as `/`, so `/\host` would turn protocol-relative.
        if url.contains('\\') || !url.bytes().all(|b| b.is_ascii_graphic()) {
            return false;
        }
        if url.starts_with('/') && !url.starts_with("//") {
            return true;
        }
        let Some(host) = url_host(url) else {
            return false;
        };
        self.remote_domains.iter().any(|d| d.eq_ignore_ascii_case(host))
    }

    /// Pick the configured format the client accepts with the highest weight.
    /// Wildcards never select a modern format.
    #[must_use]
    pub fn negotiate(&self, accept: &str) -> Option<ImageFormat> {
        let mut best: Option<(f32, ImageFormat)> = None;
        for (media_type, q) in parse_accept(accept) {
            let Some(format) = ImageFormat::from_mime(&media_type) else {
                continue;
            };
            if q <= 0.0 || !self.formats.contains(&format) {
                continue;
            }
            let better = match best {
                None => true,
                Some((best_q, best_format)) => {
                    q > best_q || ((q - best_q).abs() < f32::EPSILON && format.preference() < best_format.preference())
                }
            };
            if better {
                best = Some((q, format));
            }
        }
        best.map(|(_, format)| format)
    }
}

fn url_host(url: &str) -> Option<&str> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;
    let authority = rest.split(['/', '?', '#']).next()?;
    if authority.contains('@') {
        return None;
    }
    let host = authority.split(':').next()?;
    if host.is_empty() { None } else { Some(host) }
}

/// Storage keys end up verbatim in redirect URLs, so they are limited to
/// printable ASCII without `\` or the URL delimiters `?` and `#`.
#[must_use]
pub fn is_storage_key(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_graphic() && !matches!(b, b'\\' | b'?' | b'#'))
}

pub(crate) fn parse_accept(accept: &str) -> Vec<(String, f32)> {
    accept
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(';');
            let media_type = parts.next()?.trim().to_ascii_lowercase();
            if media_type.is_empty() {
                return None;
            }
            let mut q = 1.0;
            for param in parts {
                let Some((name, value)) = param.split_once('=') else {
                    continue;
                };
                if name.trim().eq_ignore_ascii_case("q") {
                    // Out-of-range or unparsable weights drop the whole entry.
                    q = value.trim().parse::<f32>().ok().filter(|q| (0.0..=1.0).contains(q))?;
                }
            }
            Some((media_type, q))
        })
        .collect()
}

// =============================================================================
// STORAGE
// =============================================================================

/// Resolves stored object keys to public URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Storage {
    base_url: String,
}

impl Storage {
    /// `bucket_url` wins over `bucket_name`; with neither, objects are served
    /// from the local `/media` prefix.
    #[must_use]
    pub fn new(bucket_url: Option<&str>, bucket_name: Option<&str>, region: &str) -> Self {
        let base_url = match (bucket_url, bucket_name) {
            (Some(url), _) => url.trim_end_matches('/').to_owned(),
            (None, Some(name)) if region.is_empty() || region == "us-east-1" => {
                format!("https://{name}.s3.amazonaws.com")
            }
            (None, Some(name)) => format!("https://{name}.s3.{region}.amazonaws.com"),
            (None, None) => LOCAL_MEDIA_BASE.to_owned(),
        };
        Self { base_url }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn object_url(&self, file_path: &str) -> String {
        format!("{}/{}", self.base_url, file_path.trim_start_matches('/'))
    }
}

#[cfg(test)]
#[path = "images_test.rs"]
mod tests;
