//! Media repository for database operations.
//!
//! Soft-deleted media is invisible to every query except
//! [`MediaRepository::find_by_id_including_deleted`].

use chrono::{DateTime, Utc};
use domain::models::media::MediaCounters;
use domain::models::Media;
use domain::prepare_for_save;
use shared::pagination::{Cursor, PageRequest, Paginated};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::entities::media::MediaCountersEntity;
use crate::entities::{MediaEntity, ModerationStatusDb};
use crate::error::RepositoryError;
use crate::metrics::QueryTimer;

macro_rules! media_columns {
    () => {
        r#"id, filename, original_name, mime_type, size, url, storage, width, height, thumbnails,
           alt_text, caption, title, description, tags, category, status, moderated_by,
           moderated_at, moderation_notes, uploaded_by, is_active, deleted_at, deleted_by,
           views, downloads, shares, last_accessed_at, metadata, created_at, updated_at"#
    };
}

/// Repository for media-related database operations.
#[derive(Clone)]
pub struct MediaRepository {
    pool: PgPool,
}

impl MediaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Validates and upserts a media record.
    ///
    /// Counters are owned by the increment operations and are never
    /// overwritten by a save.
    pub async fn save(&self, mut media: Media) -> Result<Media, RepositoryError> {
        let timer = QueryTimer::new("media", "save");
        let mut tx = self.pool.begin().await?;

        let previous: Option<Media> = sqlx::query_as::<_, MediaEntity>(concat!(
            "SELECT ",
            media_columns!(),
            " FROM media WHERE id = $1 FOR UPDATE"
        ))
        .bind(media.id)
        .fetch_optional(&mut *tx)
        .await?
        .map(Into::into);

        prepare_for_save(&mut media, previous.as_ref(), Utc::now())?;

        let (width, height) = match media.dimensions {
            Some(d) => (Some(d.width), Some(d.height)),
            None => (None, None),
        };

        let result = sqlx::query_as::<_, MediaEntity>(concat!(
            r#"
            INSERT INTO media (
                id, filename, original_name, mime_type, size, url, storage, width, height,
                thumbnails, alt_text, caption, title, description, tags, category, status,
                moderated_by, moderated_at, moderation_notes, uploaded_by, is_active, deleted_at,
                deleted_by, views, downloads, shares, last_accessed_at, metadata, created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                    $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29, $30, $31)
            ON CONFLICT (id) DO UPDATE SET
                filename = EXCLUDED.filename,
                original_name = EXCLUDED.original_name,
                mime_type = EXCLUDED.mime_type,
                size = EXCLUDED.size,
                url = EXCLUDED.url,
                storage = EXCLUDED.storage,
                width = EXCLUDED.width,
                height = EXCLUDED.height,
                thumbnails = EXCLUDED.thumbnails,
                alt_text = EXCLUDED.alt_text,
                caption = EXCLUDED.caption,
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                tags = EXCLUDED.tags,
                category = EXCLUDED.category,
                status = EXCLUDED.status,
                moderated_by = EXCLUDED.moderated_by,
                moderated_at = EXCLUDED.moderated_at,
                moderation_notes = EXCLUDED.moderation_notes,
                uploaded_by = EXCLUDED.uploaded_by,
                is_active = EXCLUDED.is_active,
                deleted_at = EXCLUDED.deleted_at,
                deleted_by = EXCLUDED.deleted_by,
                metadata = EXCLUDED.metadata,
                updated_at = EXCLUDED.updated_at
            RETURNING "#,
            media_columns!()
        ))
        .bind(media.id)
        .bind(&media.filename)
        .bind(&media.original_name)
        .bind(&media.mime_type)
        .bind(media.size)
        .bind(&media.url)
        .bind(Json(&media.storage))
        .bind(width)
        .bind(height)
        .bind(Json(&media.thumbnails))
        .bind(&media.alt_text)
        .bind(&media.caption)
        .bind(&media.title)
        .bind(&media.description)
        .bind(&media.tags)
        .bind(media.category.as_str())
        .bind(ModerationStatusDb::from(media.status))
        .bind(media.moderated_by)
        .bind(media.moderated_at)
        .bind(&media.moderation_notes)
        .bind(media.uploaded_by)
        .bind(media.is_active)
        .bind(media.deleted_at)
        .bind(media.deleted_by)
        .bind(media.views)
        .bind(media.downloads)
        .bind(media.shares)
        .bind(media.last_accessed_at)
        .bind(&media.metadata)
        .bind(media.created_at)
        .bind(media.updated_at)
        .fetch_one(&mut *tx)
        .await;
        timer.observe(&result);
        let saved = result?;

        tx.commit().await?;
        info!(media_id = %saved.id, mime_type = %saved.mime_type, "Media saved");
        Ok(saved.into())
    }

    /// Finds active (not soft-deleted) media by ID.
    pub async fn find_active(&self, id: Uuid) -> Result<Option<Media>, RepositoryError> {
        let timer = QueryTimer::new("media", "find_active");
        let result = sqlx::query_as::<_, MediaEntity>(concat!(
            "SELECT ",
            media_columns!(),
            " FROM media WHERE id = $1 AND is_active = true"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.observe(&result);
        Ok(result?.map(Into::into))
    }

    pub async fn find_by_id_including_deleted(
        &self,
        id: Uuid,
    ) -> Result<Option<Media>, RepositoryError> {
        let timer = QueryTimer::new("media", "find_by_id_including_deleted");
        let result = sqlx::query_as::<_, MediaEntity>(concat!(
            "SELECT ",
            media_columns!(),
            " FROM media WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.observe(&result);
        Ok(result?.map(Into::into))
    }

    /// Active media, newest first.
    pub async fn list_active(&self, page: &PageRequest) -> Result<Paginated<Media>, RepositoryError> {
        let limit = page.limit();
        let cursor = page.decoded_cursor()?;

        let timer = QueryTimer::new("media", "list_active");
        let result = sqlx::query_as::<_, MediaEntity>(concat!(
            "SELECT ",
            media_columns!(),
            r#" FROM media
            WHERE is_active = true
              AND ($1::timestamptz IS NULL OR (created_at, id) < ($1, $2))
            ORDER BY created_at DESC, id DESC
            LIMIT $3"#
        ))
        .bind(cursor.map(|c| c.created_at))
        .bind(cursor.map(|c| c.id))
        .bind(limit + 1)
        .fetch_all(&self.pool)
        .await;
        timer.observe(&result);

        let rows: Vec<Media> = result?.into_iter().map(Into::into).collect();
        Ok(Paginated::from_rows(rows, limit, |m| Cursor::new(m.created_at, m.id)))
    }

    pub async fn list_by_uploader(&self, uploader: Uuid) -> Result<Vec<Media>, RepositoryError> {
        let timer = QueryTimer::new("media", "list_by_uploader");
        let result = sqlx::query_as::<_, MediaEntity>(concat!(
            "SELECT ",
            media_columns!(),
            r#" FROM media
            WHERE uploaded_by = $1 AND is_active = true
            ORDER BY created_at DESC, id DESC"#
        ))
        .bind(uploader)
        .fetch_all(&self.pool)
        .await;
        timer.observe(&result);
        Ok(result?.into_iter().map(Into::into).collect())
    }

    pub async fn list_by_tag(&self, tag: &str) -> Result<Vec<Media>, RepositoryError> {
        let timer = QueryTimer::new("media", "list_by_tag");
        let result = sqlx::query_as::<_, MediaEntity>(concat!(
            "SELECT ",
            media_columns!(),
            r#" FROM media
            WHERE $1 = ANY(tags) AND is_active = true
            ORDER BY created_at DESC, id DESC"#
        ))
        .bind(tag.trim().to_lowercase())
        .fetch_all(&self.pool)
        .await;
        timer.observe(&result);
        Ok(result?.into_iter().map(Into::into).collect())
    }

    /// Hides media from every active query. Returns false when the media does
    /// not exist or is already deleted.
    pub async fn soft_delete(
        &self,
        id: Uuid,
        actor: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let timer = QueryTimer::new("media", "soft_delete");
        let result = sqlx::query(
            r#"
            UPDATE media
            SET is_active = false, deleted_at = $2, deleted_by = $3, updated_at = $2
            WHERE id = $1 AND is_active = true
            "#,
        )
        .bind(id)
        .bind(now)
        .bind(actor)
        .execute(&self.pool)
        .await;
        timer.observe(&result);
        let deleted = result?.rows_affected() > 0;
        if deleted {
            info!(media_id = %id, deleted_by = %actor, "Media soft-deleted");
        }
        Ok(deleted)
    }

    pub async fn restore(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let timer = QueryTimer::new("media", "restore");
        let result = sqlx::query(
            r#"
            UPDATE media
            SET is_active = true, deleted_at = NULL, deleted_by = NULL, updated_at = NOW()
            WHERE id = $1 AND is_active = false
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await;
        timer.observe(&result);
        let restored = result?.rows_affected() > 0;
        if restored {
            info!(media_id = %id, "Media restored");
        }
        Ok(restored)
    }

    pub async fn increment_views(&self, id: Uuid) -> Result<MediaCounters, RepositoryError> {
        let timer = QueryTimer::new("media", "increment_views");
        let result = sqlx::query_as::<_, MediaCountersEntity>(
            r#"
            UPDATE media
            SET views = views + 1, last_accessed_at = NOW()
            WHERE id = $1 AND is_active = true
            RETURNING views, downloads, shares
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.observe(&result);
        result?
            .map(Into::into)
            .ok_or_else(|| RepositoryError::not_found("Media"))
    }

    pub async fn increment_downloads(&self, id: Uuid) -> Result<MediaCounters, RepositoryError> {
        let timer = QueryTimer::new("media", "increment_downloads");
        let result = sqlx::query_as::<_, MediaCountersEntity>(
            r#"
            UPDATE media
            SET downloads = downloads + 1, last_accessed_at = NOW()
            WHERE id = $1 AND is_active = true
            RETURNING views, downloads, shares
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.observe(&result);
        result?
            .map(Into::into)
            .ok_or_else(|| RepositoryError::not_found("Media"))
    }

    pub async fn increment_shares(&self, id: Uuid) -> Result<MediaCounters, RepositoryError> {
        let timer = QueryTimer::new("media", "increment_shares");
        let result = sqlx::query_as::<_, MediaCountersEntity>(
            r#"
            UPDATE media
            SET shares = shares + 1
            WHERE id = $1 AND is_active = true
            RETURNING views, downloads, shares
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.observe(&result);
        result?
            .map(Into::into)
            .ok_or_else(|| RepositoryError::not_found("Media"))
    }
}
