//! Integration tests for the tag, SEO and settings repositories.

mod common;

use domain::models::{Seo, Settings, Tag};
use domain::DomainError;
use persistence::repositories::{SeoRepository, SettingsRepository, TagRepository};
use uuid::Uuid;

#[tokio::test]
async fn test_tag_lifecycle() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let repo = TagRepository::new(pool);

    let name = format!("Pediatrics {}", common::unique_suffix());
    let saved = repo.save(Tag::new(name.clone())).await.unwrap();
    assert_eq!(saved.slug, name.to_lowercase().replace(' ', "-"));

    let found = repo.find_by_slug(&saved.slug).await.unwrap().unwrap();
    assert_eq!(found.id, saved.id);

    let duplicate = repo.save(Tag::new(name)).await.unwrap_err();
    assert!(duplicate.is_conflict());

    assert!(repo.deactivate(saved.id).await.unwrap());
    let active = repo.list_active().await.unwrap();
    assert!(active.iter().all(|t| t.id != saved.id));
    assert!(!repo.find_by_id(saved.id).await.unwrap().unwrap().is_active);
}

#[tokio::test]
async fn test_seo_derives_social_fields() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let repo = SeoRepository::new(pool);

    let slug = format!("cardiology-{}", common::unique_suffix());
    let saved = repo
        .save(Seo::new(
            slug.clone(),
            "Cardiology | Riverside",
            "Heart care close to home.",
        ))
        .await
        .unwrap();

    assert_eq!(saved.open_graph.title.as_deref(), Some("Cardiology | Riverside"));
    assert_eq!(saved.twitter.description.as_deref(), Some("Heart care close to home."));
    assert_eq!(saved.full_canonical_url(), format!("/{}", slug));

    let found = repo.find_by_page_slug(&slug).await.unwrap().unwrap();
    assert_eq!(found.id, saved.id);
    assert!(repo.list_active().await.unwrap().iter().any(|s| s.id == saved.id));

    assert!(repo.delete_by_page_slug(&slug).await.unwrap());
    assert!(repo.find_by_page_slug(&slug).await.unwrap().is_none());
}

#[tokio::test]
async fn test_settings_singleton() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let repo = SettingsRepository::new(pool);

    let mut seed = Settings::default();
    seed.contact.email = Some("front-desk@riverside.example".into());
    let stored = repo.ensure_exists(seed).await.unwrap();
    let created_at = stored.created_at;

    let mut edited = repo.load().await.unwrap();
    edited.id = Uuid::new_v4();
    edited.performance.image_quality = 70;
    edited.contact.phone = Some("+1 555 010 2000".into());
    let admin = Uuid::new_v4();
    let saved = repo.save(edited, Some(admin)).await.unwrap();

    assert_eq!(saved.id, domain::models::SETTINGS_ID);
    assert_eq!(saved.performance.image_quality, 70);
    assert_eq!(saved.updated_by, Some(admin));
    assert_eq!(saved.created_at, created_at);

    let mut invalid = saved.clone();
    invalid.contact.email = None;
    invalid.contact.phone = None;
    let err = repo.save(invalid, None).await.unwrap_err();
    assert!(matches!(err.domain(), Some(DomainError::Rule(_))));

    let reloaded = repo.load().await.unwrap();
    assert_eq!(reloaded.performance.image_quality, 70);
}
