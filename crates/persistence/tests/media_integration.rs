//! Integration tests for the media repository.

mod common;

use chrono::Utc;
use domain::models::media::{MediaCategory, ModerationStatus};
use persistence::repositories::MediaRepository;
use persistence::RepositoryError;
use shared::pagination::PageRequest;
use uuid::Uuid;

#[tokio::test]
async fn test_save_normalizes_tags() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let repo = MediaRepository::new(pool);

    let mut media = common::test_image();
    media.tags = vec!["Lobby".into(), "lobby".into(), "Clinic".into()];
    let saved = repo.save(media).await.unwrap();

    assert_eq!(saved.tags, vec!["lobby", "clinic"]);
    assert_eq!(saved.category, MediaCategory::Image);
    assert_eq!(saved.status, ModerationStatus::Pending);
    assert_eq!(saved.dimensions.map(|d| d.width), Some(1200));
}

#[tokio::test]
async fn test_image_without_dimensions_rejected() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let repo = MediaRepository::new(pool);

    let mut media = common::test_image();
    media.dimensions = None;
    let err = repo.save(media).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Domain(_)));
}

#[tokio::test]
async fn test_soft_delete_hides_from_active_queries() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let repo = MediaRepository::new(pool);

    let uploader = Uuid::new_v4();
    let mut media = common::test_image();
    media.uploaded_by = Some(uploader);
    let saved = repo.save(media).await.unwrap();

    assert!(repo.soft_delete(saved.id, uploader, Utc::now()).await.unwrap());
    assert!(!repo.soft_delete(saved.id, uploader, Utc::now()).await.unwrap());

    assert!(repo.find_active(saved.id).await.unwrap().is_none());
    assert!(repo.list_by_uploader(uploader).await.unwrap().is_empty());

    let deleted = repo
        .find_by_id_including_deleted(saved.id)
        .await
        .unwrap()
        .unwrap();
    assert!(deleted.is_deleted());
    assert_eq!(deleted.deleted_by, Some(uploader));
    assert!(deleted.deleted_at.is_some());

    assert!(repo.restore(saved.id).await.unwrap());
    let restored = repo.find_active(saved.id).await.unwrap().unwrap();
    assert!(restored.deleted_at.is_none());
    assert!(restored.deleted_by.is_none());
}

#[tokio::test]
async fn test_counters_increment_and_survive_saves() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let repo = MediaRepository::new(pool);
    let saved = repo.save(common::test_image()).await.unwrap();

    repo.increment_views(saved.id).await.unwrap();
    repo.increment_views(saved.id).await.unwrap();
    repo.increment_downloads(saved.id).await.unwrap();
    let counters = repo.increment_shares(saved.id).await.unwrap();
    assert_eq!((counters.views, counters.downloads, counters.shares), (2, 1, 1));

    let mut stale = saved;
    stale.alt_text = Some("Reception desk".into());
    let resaved = repo.save(stale).await.unwrap();
    assert_eq!(resaved.counters(), counters);
}

#[tokio::test]
async fn test_increment_on_deleted_media_is_not_found() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let repo = MediaRepository::new(pool);
    let saved = repo.save(common::test_image()).await.unwrap();
    repo.soft_delete(saved.id, Uuid::new_v4(), Utc::now())
        .await
        .unwrap();

    let err = repo.increment_views(saved.id).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound(_)));
}

#[tokio::test]
async fn test_list_by_tag_and_paging() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let repo = MediaRepository::new(pool);

    let tag = format!("ward-{}", common::unique_suffix());
    for _ in 0..3 {
        let mut media = common::test_image();
        media.tags = vec![tag.clone()];
        repo.save(media).await.unwrap();
    }
    assert_eq!(repo.list_by_tag(&tag).await.unwrap().len(), 3);

    let first = repo.list_active(&PageRequest::first(2)).await.unwrap();
    assert_eq!(first.items.len(), 2);
    assert!(first.next_cursor.is_some());

    let bad = repo
        .list_active(&PageRequest::after("not a cursor", 2))
        .await
        .unwrap_err();
    assert!(matches!(bad, RepositoryError::InvalidCursor(_)));
}
