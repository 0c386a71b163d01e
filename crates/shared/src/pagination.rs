//! Cursor-based pagination utilities.
//!
//! Listings are ordered by `(created_at DESC, id DESC)`; a cursor names the
//! last row of the previous page.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Default number of rows per page.
pub const DEFAULT_LIMIT: i64 = 20;

/// Hard upper bound on rows per page.
pub const MAX_LIMIT: i64 = 100;

/// Error type for cursor operations.
#[derive(Debug, Error)]
pub enum CursorError {
    #[error("Invalid cursor format")]
    InvalidFormat,
    #[error("Invalid cursor encoding")]
    InvalidEncoding,
    #[error("Invalid timestamp in cursor")]
    InvalidTimestamp,
    #[error("Invalid ID in cursor")]
    InvalidId,
}

/// Position after which the next page starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub created_at: DateTime<Utc>,
    pub id: Uuid,
}

impl Cursor {
    pub fn new(created_at: DateTime<Utc>, id: Uuid) -> Self {
        Self { created_at, id }
    }

    /// Encodes as base64(RFC3339_timestamp|uuid).
    pub fn encode(&self) -> String {
        let raw = format!(
            "{}|{}",
            self.created_at
                .to_rfc3339_opts(chrono::SecondsFormat::Micros, true),
            self.id
        );
        URL_SAFE_NO_PAD.encode(raw.as_bytes())
    }

    pub fn decode(cursor: &str) -> Result<Self, CursorError> {
        let decoded = URL_SAFE_NO_PAD
            .decode(cursor)
            .map_err(|_| CursorError::InvalidEncoding)?;
        let s = String::from_utf8(decoded).map_err(|_| CursorError::InvalidFormat)?;

        let (ts, id) = s.split_once('|').ok_or(CursorError::InvalidFormat)?;
        let id = Uuid::parse_str(id).map_err(|_| CursorError::InvalidId)?;
        let created_at = DateTime::parse_from_rfc3339(ts)
            .map_err(|_| CursorError::InvalidTimestamp)?
            .with_timezone(&Utc);

        Ok(Self { created_at, id })
    }
}

/// A page request as accepted by the listing repositories.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl PageRequest {
    pub fn first(limit: i64) -> Self {
        Self {
            cursor: None,
            limit: Some(limit),
        }
    }

    pub fn after(cursor: impl Into<String>, limit: i64) -> Self {
        Self {
            cursor: Some(cursor.into()),
            limit: Some(limit),
        }
    }

    /// Effective limit, clamped to `1..=MAX_LIMIT`.
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    pub fn decoded_cursor(&self) -> Result<Option<Cursor>, CursorError> {
        self.cursor.as_deref().map(Cursor::decode).transpose()
    }
}

/// One page of results plus the cursor for the next one.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

impl<T> Paginated<T> {
    /// Builds a page from `limit + 1` fetched rows; the extra row only signals
    /// that another page exists.
    pub fn from_rows(
        mut rows: Vec<T>,
        limit: i64,
        key: impl Fn(&T) -> Cursor,
    ) -> Self {
        let limit = usize::try_from(limit).unwrap_or(0);
        let has_more = rows.len() > limit;
        rows.truncate(limit);
        let next_cursor = if has_more {
            rows.last().map(|row| key(row).encode())
        } else {
            None
        };
        Self {
            items: rows,
            next_cursor,
        }
    }
}
