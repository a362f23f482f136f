use super::*;
use crate::state::test_helpers::test_settings;

fn valid_photo() -> NewPhoto {
    NewPhoto {
        title: "Harbor at Dusk".into(),
        original_filename: "IMG_0042.jpg".into(),
        file_path: "photos/harbor-at-dusk.jpg".into(),
        file_size: 2_048_000,
        mime_type: "image/jpeg".into(),
        width: 6000,
        height: 4000,
        owner_id: Uuid::new_v4(),
        ..NewPhoto::default()
    }
}

fn assert_invalid(input: &NewPhoto) {
    let err = validate_new_photo(input, &test_settings()).unwrap_err();
    assert!(matches!(err, PhotoError::Invalid(_)), "expected Invalid, got {err:?}");
}

#[test]
fn accepts_well_formed_photo() {
    validate_new_photo(&valid_photo(), &test_settings()).unwrap();
}

#[test]
fn rejects_blank_title() {
    let mut p = valid_photo();
    p.title = "  ".into();
    assert_invalid(&p);
}

#[test]
fn rejects_file_paths_unusable_in_redirects() {
    for bad in ["photos/harbor at dusk.jpg", "photos/a\r\nSet-Cookie: x.jpg", "photos\\a.jpg", "photos/a.jpg?v=2"] {
        let mut p = valid_photo();
        p.file_path = bad.into();
        assert_invalid(&p);
    }
}

#[test]
fn rejects_disallowed_mime_type() {
    let mut p = valid_photo();
    p.mime_type = "image/gif".into();
    assert_invalid(&p);
}

#[test]
fn mime_type_check_is_case_insensitive() {
    let mut p = valid_photo();
    p.mime_type = "IMAGE/PNG".into();
    validate_new_photo(&p, &test_settings()).unwrap();
}

#[test]
fn rejects_oversized_and_empty_files() {
    let settings = test_settings();
    let mut p = valid_photo();
    p.file_size = i64::try_from(settings.max_image_size).unwrap() + 1;
    assert_invalid(&p);
    p.file_size = 0;
    assert_invalid(&p);
}

#[test]
fn accepts_file_at_exact_size_limit() {
    let settings = test_settings();
    let mut p = valid_photo();
    p.file_size = i64::try_from(settings.max_image_size).unwrap();
    validate_new_photo(&p, &settings).unwrap();
}

#[test]
fn rejects_degenerate_dimensions() {
    let mut p = valid_photo();
    p.height = 0;
    assert_invalid(&p);
}

#[test]
fn rejects_out_of_range_coordinates() {
    let mut p = valid_photo();
    p.latitude = Some(90.5);
    assert_invalid(&p);

    let mut p = valid_photo();
    p.longitude = Some(-180.01);
    assert_invalid(&p);

    let mut p = valid_photo();
    p.latitude = Some(-90.0);
    p.longitude = Some(180.0);
    validate_new_photo(&p, &test_settings()).unwrap();
}

#[test]
fn thumbnails_must_live_on_allowed_hosts() {
    let mut p = valid_photo();
    p.thumbnails.insert("300".into(), "https://your-bucket-name.s3.amazonaws.com/t/300.jpg".into());
    p.thumbnails.insert("300.webp".into(), "/media/t/300.webp".into());
    validate_new_photo(&p, &test_settings()).unwrap();

    p.thumbnails.insert("800".into(), "https://elsewhere.example/t/800.jpg".into());
    assert_invalid(&p);
}

#[test]
fn thumbnail_keys_must_be_sizes() {
    assert!(is_valid_thumbnail_key("150"));
    assert!(is_valid_thumbnail_key("1200.avif"));
    assert!(!is_valid_thumbnail_key("0"));
    assert!(!is_valid_thumbnail_key("large"));
    assert!(!is_valid_thumbnail_key("300.gif"));
    assert!(!is_valid_thumbnail_key("300."));
}

#[test]
fn photo_update_emptiness() {
    assert!(PhotoUpdate::default().is_empty());
    let update = PhotoUpdate { status: Some(PhotoStatus::Published), ..PhotoUpdate::default() };
    assert!(!update.is_empty());
}

#[test]
fn photo_update_parses_lowercase_status() {
    let update: PhotoUpdate = serde_json::from_str(r#"{"status":"archived","is_featured":true}"#).unwrap();
    assert_eq!(update.status, Some(PhotoStatus::Archived));
    assert_eq!(update.is_featured, Some(true));
    assert!(update.is_public.is_none());
}

#[test]
fn new_photo_deserializes_with_defaults() {
    let owner = Uuid::new_v4();
    let body = serde_json::json!({
        "title": "Fog",
        "original_filename": "fog.png",
        "file_path": "photos/fog.png",
        "file_size": 1024,
        "mime_type": "image/png",
        "width": 800,
        "height": 600,
        "owner_id": owner,
        "tags": ["mist"],
    });
    let input: NewPhoto = serde_json::from_value(body).unwrap();
    assert_eq!(input.owner_id, owner);
    assert!(input.status.is_none());
    assert!(input.is_public.is_none());
    assert!(input.thumbnails.is_empty());
    assert_eq!(input.tags, vec!["mist".to_owned()]);
}

#[test]
fn tag_errors_become_invalid_photo_input() {
    let err: PhotoError = TagError::Invalid("unknown tag: x".into()).into();
    assert!(matches!(err, PhotoError::Invalid(_)));
}

#[test]
fn counters_target_distinct_columns() {
    assert_eq!(Counter::View.column(), "view_count");
    assert_eq!(Counter::Like.column(), "like_count");
    assert_eq!(Counter::Download.column(), "download_count");
}

#[cfg(feature = "live-db-tests")]
mod live {
    use super::*;
    use crate::services::tag::NewTag;
    use crate::services::user::{NewUser, create_user};

    async fn pool() -> PgPool {
        let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL required for live-db-tests");
        db::init_pool(&url, 2).await.expect("test database init failed")
    }

    fn unique(prefix: &str) -> String {
        format!("{prefix}{}", &Uuid::new_v4().simple().to_string()[..10])
    }

    #[tokio::test]
    async fn register_publish_tag_and_delete() {
        let pool = pool().await;
        let settings = test_settings();

        let name = unique("owner");
        let owner = create_user(
            &pool,
            &NewUser {
                username: name.clone(),
                email: format!("{name}@example.com"),
                password: "long-enough".into(),
                full_name: None,
                bio: None,
                website: None,
                avatar_url: None,
                is_superuser: false,
            },
        )
        .await
        .unwrap();
        let tag = tag_svc::create(&pool, &NewTag { name: unique("tag"), description: None, color: None })
            .await
            .unwrap();

        let mut input = valid_photo();
        input.title = unique("Photo ");
        input.owner_id = owner.id;
        input.tags = vec![tag.slug.clone()];
        let photo = register_photo(&pool, &settings, &input).await.unwrap();
        assert_eq!(photo.status, PhotoStatus::Processing);
        assert_eq!(photo.aspect_ratio, Some(1.5));

        // Not public until published.
        assert!(matches!(find_public(&pool, &photo.slug).await, Err(PhotoError::NotFound(_))));

        let update = PhotoUpdate { status: Some(PhotoStatus::Published), ..PhotoUpdate::default() };
        update_photo(&pool, &photo.slug, &update).await.unwrap();
        let viewed = bump_counter(&pool, &photo.slug, Counter::View).await.unwrap();
        assert_eq!(viewed.view_count, 1);

        let tags = tags_of(&pool, photo.id).await.unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].usage_count, 1);

        let second = register_photo(&pool, &settings, &input).await.unwrap();
        assert_eq!(second.slug, format!("{}-2", photo.slug));

        delete_photo(&pool, &photo.slug).await.unwrap();
        delete_photo(&pool, &second.slug).await.unwrap();
        let tags = tag_svc::list_active(&pool).await.unwrap();
        let refreshed = tags.iter().find(|t| t.id == tag.id).unwrap();
        assert_eq!(refreshed.usage_count, 0);
    }
}
