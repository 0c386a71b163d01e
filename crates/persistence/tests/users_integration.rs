//! Integration tests for the user repository.

mod common;

use chrono::Utc;
use domain::models::UserRole;
use persistence::repositories::UserRepository;
use persistence::RepositoryError;
use shared::password::is_password_hash;

#[tokio::test]
async fn test_save_hashes_password_and_normalizes_email() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let repo = UserRepository::new(pool);

    let mut user = common::test_user();
    user.email = format!("  {}  ", user.email.to_uppercase());
    let saved = repo.save(user).await.unwrap();

    assert!(is_password_hash(&saved.password));
    assert_eq!(saved.email, saved.email.trim().to_lowercase());
    assert!(saved.compare_password(common::TEST_PASSWORD).unwrap());

    let found = repo.find_by_email(&saved.email).await.unwrap().unwrap();
    assert_eq!(found.id, saved.id);
}

#[tokio::test]
async fn test_unmodified_hash_is_kept() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let repo = UserRepository::new(pool);

    let saved = repo.save(common::test_user()).await.unwrap();
    let hash = saved.password.clone();

    let mut edited = saved;
    edited.bio = Some("Cardiology nurse".into());
    let resaved = repo.save(edited).await.unwrap();

    assert_eq!(resaved.password, hash);
    assert_eq!(resaved.bio.as_deref(), Some("Cardiology nurse"));
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let repo = UserRepository::new(pool);

    let first = repo.save(common::test_user()).await.unwrap();
    let mut second = common::test_user();
    second.email = first.email.clone();

    let err = repo.save(second).await.unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn test_short_password_rejected() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let repo = UserRepository::new(pool);

    let mut user = common::test_user();
    user.password = "short".into();
    let err = repo.save(user).await.unwrap_err();

    let violations = err.domain().and_then(|e| e.violations()).unwrap();
    assert!(violations.has_field("password"));
}

#[tokio::test]
async fn test_verify_credentials_and_lockout() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let repo = UserRepository::new(pool);
    let saved = repo.save(common::test_user()).await.unwrap();

    let ok = repo
        .verify_credentials(&saved.username, common::TEST_PASSWORD)
        .await
        .unwrap();
    assert_eq!(ok.map(|u| u.id), Some(saved.id));

    for _ in 0..domain::models::user::MAX_LOGIN_ATTEMPTS {
        let denied = repo.verify_credentials(&saved.email, "wrong-password").await.unwrap();
        assert!(denied.is_none());
    }

    let locked = repo.find_by_id(saved.id).await.unwrap().unwrap();
    assert!(locked.is_locked(Utc::now()));
    let denied = repo
        .verify_credentials(&saved.email, common::TEST_PASSWORD)
        .await
        .unwrap();
    assert!(denied.is_none());

    repo.record_login(saved.id, Utc::now()).await.unwrap();
    let unlocked = repo.find_by_id(saved.id).await.unwrap().unwrap();
    assert_eq!(unlocked.login_attempts, 0);
    assert!(unlocked.last_login.is_some());
}

#[tokio::test]
async fn test_reset_token_lookup_uses_digest() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let repo = UserRepository::new(pool);

    let mut user = repo.save(common::test_user()).await.unwrap();
    let now = Utc::now();
    let token = user.generate_password_reset_token(now);
    let user = repo.save(user).await.unwrap();

    assert_ne!(user.password_reset_token.as_deref(), Some(token.as_str()));
    let found = repo.find_by_reset_token(&token, now).await.unwrap();
    assert_eq!(found.map(|u| u.id), Some(user.id));

    let expired = repo
        .find_by_reset_token(&token, now + chrono::Duration::hours(1))
        .await
        .unwrap();
    assert!(expired.is_none());
}

#[tokio::test]
async fn test_list_active_by_role() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let repo = UserRepository::new(pool);

    let editor = repo
        .save(common::test_user().with_role(UserRole::Editor))
        .await
        .unwrap();
    let editors = repo.list_active(Some(UserRole::Editor)).await.unwrap();
    assert!(editors.iter().any(|u| u.id == editor.id));
    assert!(editors.iter().all(|u| u.role == UserRole::Editor));
}

#[tokio::test]
async fn test_record_login_unknown_user() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let repo = UserRepository::new(pool);
    let err = repo
        .record_login(uuid::Uuid::new_v4(), Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound(_)));
}
