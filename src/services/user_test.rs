use super::*;

fn new_user() -> NewUser {
    NewUser {
        username: "ansel".into(),
        email: "Ansel@Example.com".into(),
        password: "zone-system".into(),
        full_name: None,
        bio: None,
        website: None,
        avatar_url: None,
        is_superuser: false,
    }
}

#[test]
fn bytes_to_hex_formats_lowercase_pairs() {
    assert_eq!(bytes_to_hex(&[0x00, 0x0f, 0xab]), "000fab");
}

#[test]
fn hash_has_scheme_salt_and_digest() {
    let hashed = hash_password("zone-system");
    let parts: Vec<&str> = hashed.split('$').collect();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0], "sha256");
    assert_eq!(parts[1].len(), 32);
    assert_eq!(parts[2].len(), 64);
}

#[test]
fn hash_is_salted() {
    assert_ne!(hash_password("same"), hash_password("same"));
}

#[test]
fn verify_accepts_correct_password_only() {
    let hashed = hash_password("zone-system");
    assert!(verify_password("zone-system", &hashed));
    assert!(!verify_password("zone-systen", &hashed));
}

#[test]
fn verify_rejects_unknown_scheme_and_garbage() {
    assert!(!verify_password("pw", "bcrypt$abc$def"));
    assert!(!verify_password("pw", "not-a-hash"));
    assert!(!verify_password("pw", ""));
}

#[test]
fn constant_time_eq_compares_content_and_length() {
    assert!(constant_time_eq(b"abc", b"abc"));
    assert!(!constant_time_eq(b"abc", b"abd"));
    assert!(!constant_time_eq(b"abc", b"abcd"));
}

#[test]
fn validate_accepts_reasonable_user() {
    assert!(validate_new_user(&new_user()).is_ok());
}

#[test]
fn validate_rejects_short_password() {
    let mut input = new_user();
    input.password = "short".into();
    assert!(matches!(validate_new_user(&input), Err(UserError::Invalid(_))));
}

#[test]
fn validate_rejects_bad_username_and_email() {
    let mut input = new_user();
    input.username = "a b".into();
    assert!(matches!(validate_new_user(&input), Err(UserError::Invalid(_))));

    let mut input = new_user();
    input.email = "nobody".into();
    assert!(matches!(validate_new_user(&input), Err(UserError::Invalid(_))));
}

#[test]
fn validate_rejects_blank_full_name() {
    let mut input = new_user();
    input.full_name = Some("   ".into());
    assert!(matches!(validate_new_user(&input), Err(UserError::Invalid(_))));
}

#[test]
fn error_kinds_map_variants() {
    assert_eq!(UserError::NotFound("x".into()).kind(), ErrorKind::NotFound);
    assert_eq!(UserError::Conflict.kind(), ErrorKind::Conflict);
    assert_eq!(UserError::Invalid("x".into()).kind(), ErrorKind::Invalid);
}

#[cfg(feature = "live-db-tests")]
mod live {
    use super::*;
    use crate::db::init_pool;

    async fn pool() -> PgPool {
        let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL required for live-db-tests");
        init_pool(&url, 2).await.expect("test database init failed")
    }

    #[tokio::test]
    async fn create_then_fetch_and_conflict() {
        let pool = pool().await;
        let mut input = new_user();
        let suffix = &Uuid::new_v4().simple().to_string()[..8];
        input.username = format!("user_{suffix}");
        input.email = format!("{suffix}@example.com");

        let user = create_user(&pool, &input).await.unwrap();
        assert!(verify_password("zone-system", &user.hashed_password));

        let fetched = get_active_by_username(&pool, &input.username).await.unwrap();
        assert_eq!(fetched.id, user.id);
        ensure_active(&pool, user.id).await.unwrap();

        let err = create_user(&pool, &input).await.unwrap_err();
        assert!(matches!(err, UserError::Conflict));
    }
}
