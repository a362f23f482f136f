use super::test_helpers::{TEST_SECRET, test_settings_with};
use super::*;

#[tokio::test]
async fn storage_follows_bucket_settings() {
    let settings = test_settings_with(&[("S3_BUCKET_NAME", "gallery-prod")]);
    let state = test_helpers::test_app_state_with(settings);
    assert_eq!(state.storage.base_url(), "https://gallery-prod.s3.amazonaws.com");
}

#[tokio::test]
async fn storage_defaults_to_local_media() {
    let state = test_helpers::test_app_state();
    assert_eq!(state.storage.base_url(), "/media");
    assert_eq!(state.settings.secret_key, TEST_SECRET);
    assert!(state.settings.admin_enabled());
}

#[tokio::test]
async fn clones_share_settings() {
    let state = test_helpers::test_app_state();
    let clone = state.clone();
    assert!(Arc::ptr_eq(&state.settings, &clone.settings));
}
