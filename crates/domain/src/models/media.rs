//! Media library domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::text::normalize_tags;
use shared::validation::{validate_link, validate_mime_type};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use crate::document::Document;
use crate::error::{DomainError, Violations};

/// Default maximum upload size (50 MiB).
pub const MAX_UPLOAD_SIZE: i64 = 50 * 1024 * 1024;

/// Where the binary lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    #[default]
    Local,
    S3,
    Cloudinary,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageLocation {
    #[serde(default)]
    pub provider: StorageProvider,
    pub path: String,
    pub bucket: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Thumbnail {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(custom(function = "validate_link"))]
    pub url: String,
    #[validate(range(min = 1))]
    pub width: i32,
    #[validate(range(min = 1))]
    pub height: i32,
}

/// Broad media class, derived from the MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
    Image,
    Document,
    Video,
    Audio,
    #[default]
    Other,
}

impl MediaCategory {
    pub fn from_mime(mime: &str) -> Self {
        match mime.split('/').next() {
            Some("image") => MediaCategory::Image,
            Some("video") => MediaCategory::Video,
            Some("audio") => MediaCategory::Audio,
            Some("application") | Some("text") => MediaCategory::Document,
            _ => MediaCategory::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaCategory::Image => "image",
            MediaCategory::Document => "document",
            MediaCategory::Video => "video",
            MediaCategory::Audio => "audio",
            MediaCategory::Other => "other",
        }
    }
}

impl FromStr for MediaCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(MediaCategory::Image),
            "document" => Ok(MediaCategory::Document),
            "video" => Ok(MediaCategory::Video),
            "audio" => Ok(MediaCategory::Audio),
            "other" => Ok(MediaCategory::Other),
            _ => Err(format!("Invalid media category: {}", s)),
        }
    }
}

/// Moderation state of an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ModerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationStatus::Pending => "pending",
            ModerationStatus::Approved => "approved",
            ModerationStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for ModerationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ModerationStatus::Pending),
            "approved" => Ok(ModerationStatus::Approved),
            "rejected" => Ok(ModerationStatus::Rejected),
            _ => Err(format!("Invalid moderation status: {}", s)),
        }
    }
}

impl fmt::Display for ModerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Counter snapshot returned by the atomic increment operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MediaCounters {
    pub views: i64,
    pub downloads: i64,
    pub shares: i64,
}

/// Metadata record for an uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: Uuid,

    #[validate(length(min = 1, max = 255, message = "Filename must be 1-255 characters"))]
    pub filename: String,

    #[validate(length(min = 1, max = 255, message = "Original name must be 1-255 characters"))]
    pub original_name: String,

    #[validate(custom(function = "validate_mime_type"))]
    pub mime_type: String,

    #[validate(range(min = 1, max = 52428800, message = "File size must be between 1 byte and 50 MiB"))]
    pub size: i64,

    #[validate(custom(function = "validate_link"))]
    pub url: String,

    pub storage: StorageLocation,
    pub dimensions: Option<Dimensions>,

    #[validate(nested)]
    pub thumbnails: Vec<Thumbnail>,

    #[validate(length(max = 200, message = "Alt text cannot exceed 200 characters"))]
    pub alt_text: Option<String>,

    #[validate(length(max = 500, message = "Caption cannot exceed 500 characters"))]
    pub caption: Option<String>,

    #[validate(length(max = 200))]
    pub title: Option<String>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    pub tags: Vec<String>,
    pub category: MediaCategory,

    pub status: ModerationStatus,
    pub moderated_by: Option<Uuid>,
    pub moderated_at: Option<DateTime<Utc>>,
    #[validate(length(max = 500))]
    pub moderation_notes: Option<String>,

    pub uploaded_by: Option<Uuid>,
    pub is_active: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<Uuid>,

    pub views: i64,
    pub downloads: i64,
    pub shares: i64,
    pub last_accessed_at: Option<DateTime<Utc>>,

    /// Free-form extra data (EXIF, encoder info, ...).
    pub metadata: serde_json::Value,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Media {
    pub fn new(
        filename: impl Into<String>,
        original_name: impl Into<String>,
        mime_type: impl Into<String>,
        size: i64,
        url: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        let filename = filename.into();
        let mime_type = mime_type.into();
        Self {
            id: Uuid::new_v4(),
            storage: StorageLocation {
                provider: StorageProvider::Local,
                path: filename.clone(),
                bucket: None,
            },
            filename,
            original_name: original_name.into(),
            category: MediaCategory::from_mime(&mime_type),
            mime_type,
            size,
            url: url.into(),
            dimensions: None,
            thumbnails: Vec::new(),
            alt_text: None,
            caption: None,
            title: None,
            description: None,
            tags: Vec::new(),
            status: ModerationStatus::Pending,
            moderated_by: None,
            moderated_at: None,
            moderation_notes: None,
            uploaded_by: None,
            is_active: true,
            deleted_at: None,
            deleted_by: None,
            views: 0,
            downloads: 0,
            shares: 0,
            last_accessed_at: None,
            metadata: serde_json::Value::Null,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_dimensions(mut self, width: i32, height: i32) -> Self {
        self.dimensions = Some(Dimensions { width, height });
        self
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    pub fn is_deleted(&self) -> bool {
        !self.is_active
    }

    pub fn soft_delete(&mut self, actor: Uuid, now: DateTime<Utc>) {
        self.is_active = false;
        self.deleted_at = Some(now);
        self.deleted_by = Some(actor);
    }

    pub fn restore(&mut self) {
        self.is_active = true;
        self.deleted_at = None;
        self.deleted_by = None;
    }

    pub fn approve(&mut self, moderator: Uuid, now: DateTime<Utc>) {
        self.status = ModerationStatus::Approved;
        self.moderated_by = Some(moderator);
        self.moderated_at = Some(now);
    }

    pub fn reject(&mut self, moderator: Uuid, notes: impl Into<String>, now: DateTime<Utc>) {
        self.status = ModerationStatus::Rejected;
        self.moderated_by = Some(moderator);
        self.moderated_at = Some(now);
        self.moderation_notes = Some(notes.into());
    }

    pub fn counters(&self) -> MediaCounters {
        MediaCounters {
            views: self.views,
            downloads: self.downloads,
            shares: self.shares,
        }
    }
}

impl Document for Media {
    const COLLECTION: &'static str = "media";

    fn id(&self) -> Uuid {
        self.id
    }

    fn normalize(&mut self, _previous: Option<&Self>, _now: DateTime<Utc>) {
        self.tags = normalize_tags(&self.tags);
        self.mime_type = self.mime_type.trim().to_lowercase();
        self.category = MediaCategory::from_mime(&self.mime_type);
    }

    fn check(&self, _previous: Option<&Self>) -> Violations {
        self.validate().into()
    }

    fn enforce_rules(&self) -> Result<(), DomainError> {
        if self.is_image() {
            match self.dimensions {
                Some(d) if d.width > 0 && d.height > 0 => {}
                _ => {
                    return Err(DomainError::rule(
                        "Image files require positive width and height",
                    ))
                }
            }
        }
        Ok(())
    }

    fn finalize(&mut self, previous: Option<&Self>, now: DateTime<Utc>) -> Result<(), DomainError> {
        if let Some(prev) = previous {
            self.created_at = prev.created_at;
        }
        self.updated_at = now;
        Ok(())
    }
}
