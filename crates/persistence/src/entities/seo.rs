//! SEO entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::seo::{ChangeFrequency, OpenGraph, RobotsMeta, TwitterMeta};
use sqlx::types::Json;
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

/// Database row mapping for the seo table.
#[derive(Debug, Clone, FromRow)]
pub struct SeoEntity {
    pub id: Uuid,
    pub page_slug: String,
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub canonical_url: Option<String>,
    pub open_graph: Json<OpenGraph>,
    pub twitter: Json<TwitterMeta>,
    pub structured_data: Option<serde_json::Value>,
    pub robots_meta: String,
    pub sitemap_priority: f64,
    pub sitemap_change_freq: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SeoEntity> for domain::models::Seo {
    fn from(entity: SeoEntity) -> Self {
        Self {
            id: entity.id,
            page_slug: entity.page_slug,
            title: entity.title,
            description: entity.description,
            keywords: entity.keywords,
            canonical_url: entity.canonical_url,
            open_graph: entity.open_graph.0,
            twitter: entity.twitter.0,
            structured_data: entity.structured_data,
            robots_meta: RobotsMeta::from_str(&entity.robots_meta).unwrap_or_default(),
            sitemap_priority: entity.sitemap_priority,
            sitemap_change_freq: ChangeFrequency::from_str(&entity.sitemap_change_freq)
                .unwrap_or_default(),
            is_active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
