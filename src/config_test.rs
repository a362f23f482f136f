use std::collections::HashMap;

use super::*;

fn settings_from(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    Settings::from_lookup(|key| map.get(key).cloned())
}

#[test]
fn defaults_match_backend_settings() {
    let s = settings_from(&[]).unwrap();
    assert_eq!(s.project_name, "Photography Gallery API");
    assert_eq!(s.database_url, DEFAULT_DATABASE_URL);
    assert_eq!(s.port, 8000);
    assert_eq!(s.host, "0.0.0.0");
    assert_eq!(s.db_max_connections, 5);
    assert_eq!(s.max_image_size, 10 * 1024 * 1024);
    assert_eq!(s.allowed_image_types, vec!["image/jpeg", "image/png", "image/webp"]);
    assert_eq!(s.thumbnail_sizes, vec![150, 300, 800, 1200]);
    assert_eq!(s.allowed_origins, vec!["http://localhost:3000", "http://127.0.0.1:3000"]);
    assert_eq!(s.allowed_hosts, vec!["*"]);
    assert_eq!(s.storage.region, "us-east-1");
    assert!(s.storage.bucket_name.is_none());
    assert!(!s.debug);
    assert!(s.uses_default_secret());
    assert!(!s.admin_enabled());
}

#[test]
fn default_image_config_has_one_domain_and_two_formats() {
    let s = settings_from(&[]).unwrap();
    assert_eq!(s.images.domains(), ["your-bucket-name.s3.amazonaws.com".to_owned()]);
    assert_eq!(s.images.formats(), [ImageFormat::Webp, ImageFormat::Avif]);
}

#[test]
fn overrides_are_parsed() {
    let s = settings_from(&[
        ("PORT", "9100"),
        ("DEBUG", "yes"),
        ("SECRET_KEY", "s3cret"),
        ("THUMBNAIL_SIZES", "64, 128"),
        ("ALLOWED_ORIGINS", "https://gallery.example"),
        ("ALLOWED_HOSTS", "gallery.example, *.gallery.example"),
        ("IMAGE_DOMAINS", "cdn.example"),
        ("IMAGE_FORMATS", "image/avif"),
        ("S3_BUCKET_NAME", "photos"),
        ("AWS_REGION", "eu-west-1"),
    ])
    .unwrap();
    assert_eq!(s.port, 9100);
    assert!(s.debug);
    assert!(!s.uses_default_secret());
    assert!(s.admin_enabled());
    assert_eq!(s.thumbnail_sizes, vec![64, 128]);
    assert_eq!(s.allowed_origins, vec!["https://gallery.example"]);
    assert_eq!(s.allowed_hosts, vec!["gallery.example", "*.gallery.example"]);
    assert_eq!(s.images.domains(), ["cdn.example".to_owned()]);
    assert_eq!(s.images.formats(), [ImageFormat::Avif]);
    assert_eq!(s.bind_addr(), "0.0.0.0:9100");
    assert_eq!(s.storage.storage().base_url(), "https://photos.s3.eu-west-1.amazonaws.com");
}

#[test]
fn blank_values_fall_back_to_defaults() {
    let s = settings_from(&[("PORT", "  "), ("PROJECT_NAME", "")]).unwrap();
    assert_eq!(s.port, DEFAULT_PORT);
    assert_eq!(s.project_name, DEFAULT_PROJECT_NAME);
}

#[test]
fn invalid_port_is_rejected() {
    let err = settings_from(&[("PORT", "eighty")]).unwrap_err();
    assert_eq!(err, ConfigError::Invalid { key: "PORT", value: "eighty".into() });
}

#[test]
fn invalid_bool_is_rejected() {
    let err = settings_from(&[("DEBUG", "maybe")]).unwrap_err();
    assert_eq!(err, ConfigError::Invalid { key: "DEBUG", value: "maybe".into() });
}

#[test]
fn zero_thumbnail_size_is_rejected() {
    let err = settings_from(&[("THUMBNAIL_SIZES", "150,0")]).unwrap_err();
    assert_eq!(err, ConfigError::Invalid { key: "THUMBNAIL_SIZES", value: "0".into() });
}

#[test]
fn unknown_image_format_is_rejected() {
    let err = settings_from(&[("IMAGE_FORMATS", "image/webp,image/gif")]).unwrap_err();
    assert_eq!(err, ConfigError::Invalid { key: "IMAGE_FORMATS", value: "image/gif".into() });
}

#[test]
fn list_of_only_separators_is_empty() {
    let err = settings_from(&[("ALLOWED_IMAGE_TYPES", ", ,")]).unwrap_err();
    assert_eq!(err, ConfigError::Empty { key: "ALLOWED_IMAGE_TYPES" });
}

#[test]
fn upload_type_check_ignores_case() {
    let s = settings_from(&[]).unwrap();
    assert!(s.accepts_upload_type("IMAGE/JPEG"));
    assert!(!s.accepts_upload_type("image/gif"));
}

#[test]
fn default_secret_is_allowed_in_debug_mode() {
    let s = settings_from(&[("DEBUG", "1")]).unwrap();
    assert!(s.uses_default_secret());
    assert!(s.admin_enabled());
}
