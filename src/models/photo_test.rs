use super::test_helpers::dummy_photo;
use super::*;

fn s3() -> Storage {
    Storage::new(None, Some("gallery"), "us-east-1")
}

#[test]
fn status_defaults_to_processing() {
    assert_eq!(PhotoStatus::default(), PhotoStatus::Processing);
}

#[test]
fn status_parse_matches_as_str() {
    for status in [
        PhotoStatus::Uploading,
        PhotoStatus::Processing,
        PhotoStatus::Published,
        PhotoStatus::Draft,
        PhotoStatus::Archived,
    ] {
        assert_eq!(PhotoStatus::parse(status.as_str()), Some(status));
    }
    assert_eq!(PhotoStatus::parse("Published"), None);
}

#[test]
fn status_serializes_lowercase() {
    assert_eq!(serde_json::to_value(PhotoStatus::Archived).unwrap(), serde_json::json!("archived"));
}

#[test]
fn url_joins_storage_base_and_key() {
    let photo = dummy_photo();
    assert_eq!(photo.url(&s3()), "https://gallery.s3.amazonaws.com/photos/harbor-at-dusk.jpg");
}

#[test]
fn thumbnail_falls_back_to_original_without_variants() {
    let photo = dummy_photo();
    assert_eq!(photo.thumbnail(&s3(), 300, None), photo.url(&s3()));
}

#[test]
fn thumbnail_uses_size_entry() {
    let mut photo = dummy_photo();
    photo.thumbnails = Some(serde_json::json!({"300": "/media/t/300.jpg"}));
    assert_eq!(photo.thumbnail(&s3(), 300, None), "/media/t/300.jpg");
    assert_eq!(photo.thumbnail(&s3(), 800, None), photo.url(&s3()));
}

#[test]
fn thumbnail_prefers_format_variant() {
    let mut photo = dummy_photo();
    photo.thumbnails = Some(serde_json::json!({
        "300": "/media/t/300.jpg",
        "300.avif": "/media/t/300.avif",
    }));
    assert_eq!(photo.thumbnail(&s3(), 300, Some(ImageFormat::Avif)), "/media/t/300.avif");
    assert_eq!(photo.thumbnail(&s3(), 300, Some(ImageFormat::Webp)), "/media/t/300.jpg");
}

#[test]
fn visibility_requires_published_and_public() {
    let mut photo = dummy_photo();
    assert!(photo.is_publicly_visible());
    photo.is_public = false;
    assert!(!photo.is_publicly_visible());
    photo.is_public = true;
    photo.status = PhotoStatus::Draft;
    assert!(!photo.is_publicly_visible());
}

#[test]
fn aspect_ratio_rounds_to_four_places() {
    assert_eq!(aspect_ratio(6000, 4000), Some(1.5));
    assert_eq!(aspect_ratio(1920, 1080), Some(1.7778));
    assert_eq!(aspect_ratio(4000, 6000), Some(0.6667));
    assert_eq!(aspect_ratio(0, 100), None);
    assert_eq!(aspect_ratio(100, -1), None);
}

#[test]
fn photo_serializes_rfc3339_timestamps() {
    let json = serde_json::to_value(dummy_photo()).unwrap();
    assert_eq!(json["created_at"], "1970-01-01T00:00:00Z");
    assert_eq!(json["status"], "published");
}
