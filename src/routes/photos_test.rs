use super::*;
use crate::models::photo::test_helpers::dummy_photo;

#[test]
fn list_query_builds_filter() {
    let query: PhotoListQuery = serde_json::from_value(serde_json::json!({
        "category": "landscape",
        "featured": true,
        "limit": 10,
    }))
    .unwrap();
    let filter = query.filter();
    assert_eq!(filter.category.as_deref(), Some("landscape"));
    assert!(filter.tag.is_none());
    assert_eq!(filter.featured, Some(true));
}

#[test]
fn photo_response_adds_url_beside_fields() {
    let storage = Storage::new(None, Some("gallery"), "us-east-1");
    let photo = dummy_photo();
    let path = photo.file_path.clone();
    let value = serde_json::to_value(PhotoResponse::new(photo, &storage)).unwrap();
    assert_eq!(value["url"], format!("https://gallery.s3.amazonaws.com/{path}"));
    assert_eq!(value["file_path"], path);
    assert!(value["created_at"].is_string());
}

#[test]
fn replace_tags_body_requires_list() {
    assert!(serde_json::from_str::<ReplaceTagsBody>(r#"{"tags":["film","fog"]}"#).is_ok());
    assert!(serde_json::from_str::<ReplaceTagsBody>("{}").is_err());
}
