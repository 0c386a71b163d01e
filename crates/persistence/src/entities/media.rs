//! Media entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::media::{
    Dimensions, MediaCategory, ModerationStatus, StorageLocation, Thumbnail,
};
use sqlx::types::Json;
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

/// Database enum for moderation_status that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "moderation_status", rename_all = "lowercase")]
pub enum ModerationStatusDb {
    Pending,
    Approved,
    Rejected,
}

impl From<ModerationStatusDb> for ModerationStatus {
    fn from(db: ModerationStatusDb) -> Self {
        match db {
            ModerationStatusDb::Pending => ModerationStatus::Pending,
            ModerationStatusDb::Approved => ModerationStatus::Approved,
            ModerationStatusDb::Rejected => ModerationStatus::Rejected,
        }
    }
}

impl From<ModerationStatus> for ModerationStatusDb {
    fn from(status: ModerationStatus) -> Self {
        match status {
            ModerationStatus::Pending => ModerationStatusDb::Pending,
            ModerationStatus::Approved => ModerationStatusDb::Approved,
            ModerationStatus::Rejected => ModerationStatusDb::Rejected,
        }
    }
}

/// Database row mapping for the media table.
#[derive(Debug, Clone, FromRow)]
pub struct MediaEntity {
    pub id: Uuid,
    pub filename: String,
    pub original_name: String,
    pub mime_type: String,
    pub size: i64,
    pub url: String,
    pub storage: Json<StorageLocation>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub thumbnails: Json<Vec<Thumbnail>>,
    pub alt_text: Option<String>,
    pub caption: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub category: String,
    pub status: ModerationStatusDb,
    pub moderated_by: Option<Uuid>,
    pub moderated_at: Option<DateTime<Utc>>,
    pub moderation_notes: Option<String>,
    pub uploaded_by: Option<Uuid>,
    pub is_active: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<Uuid>,
    pub views: i64,
    pub downloads: i64,
    pub shares: i64,
    pub last_accessed_at: Option<DateTime<Utc>>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MediaEntity> for domain::models::Media {
    fn from(entity: MediaEntity) -> Self {
        let dimensions = match (entity.width, entity.height) {
            (Some(width), Some(height)) => Some(Dimensions { width, height }),
            _ => None,
        };
        Self {
            id: entity.id,
            filename: entity.filename,
            original_name: entity.original_name,
            category: MediaCategory::from_str(&entity.category)
                .unwrap_or_else(|_| MediaCategory::from_mime(&entity.mime_type)),
            mime_type: entity.mime_type,
            size: entity.size,
            url: entity.url,
            storage: entity.storage.0,
            dimensions,
            thumbnails: entity.thumbnails.0,
            alt_text: entity.alt_text,
            caption: entity.caption,
            title: entity.title,
            description: entity.description,
            tags: entity.tags,
            status: entity.status.into(),
            moderated_by: entity.moderated_by,
            moderated_at: entity.moderated_at,
            moderation_notes: entity.moderation_notes,
            uploaded_by: entity.uploaded_by,
            is_active: entity.is_active,
            deleted_at: entity.deleted_at,
            deleted_by: entity.deleted_by,
            views: entity.views,
            downloads: entity.downloads,
            shares: entity.shares,
            last_accessed_at: entity.last_accessed_at,
            metadata: entity.metadata,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Row returned by the counter increments.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct MediaCountersEntity {
    pub views: i64,
    pub downloads: i64,
    pub shares: i64,
}

impl From<MediaCountersEntity> for domain::models::media::MediaCounters {
    fn from(entity: MediaCountersEntity) -> Self {
        Self {
            views: entity.views,
            downloads: entity.downloads,
            shares: entity.shares,
        }
    }
}
