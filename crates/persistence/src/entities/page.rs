//! Page entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::page::{
    PageSection, PageSeo, PageStatus, PageTemplate, Versioning, Visibility, Workflow,
};
use sqlx::types::Json;
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

/// Database enum for page_status that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "page_status", rename_all = "lowercase")]
pub enum PageStatusDb {
    Draft,
    Published,
    Scheduled,
    Archived,
}

impl From<PageStatusDb> for PageStatus {
    fn from(db: PageStatusDb) -> Self {
        match db {
            PageStatusDb::Draft => PageStatus::Draft,
            PageStatusDb::Published => PageStatus::Published,
            PageStatusDb::Scheduled => PageStatus::Scheduled,
            PageStatusDb::Archived => PageStatus::Archived,
        }
    }
}

impl From<PageStatus> for PageStatusDb {
    fn from(status: PageStatus) -> Self {
        match status {
            PageStatus::Draft => PageStatusDb::Draft,
            PageStatus::Published => PageStatusDb::Published,
            PageStatus::Scheduled => PageStatusDb::Scheduled,
            PageStatus::Archived => PageStatusDb::Archived,
        }
    }
}

/// Database row mapping for the pages table.
#[derive(Debug, Clone, FromRow)]
pub struct PageEntity {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub template: String,
    pub status: PageStatusDb,
    pub published_at: Option<DateTime<Utc>>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub author: Uuid,
    pub last_modified_by: Option<Uuid>,
    pub featured_image: Option<Uuid>,
    pub attachments: Vec<Uuid>,
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub sections: Json<Vec<PageSection>>,
    pub seo: Json<PageSeo>,
    pub visibility: Json<Visibility>,
    pub views: i64,
    pub last_viewed_at: Option<DateTime<Utc>>,
    pub versioning: Json<Versioning>,
    pub workflow: Json<Workflow>,
    pub parent_page: Option<Uuid>,
    pub child_pages: Vec<Uuid>,
    pub related_pages: Vec<Uuid>,
    pub menu_order: i32,
    pub show_in_menu: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PageEntity> for domain::models::Page {
    fn from(entity: PageEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title,
            slug: entity.slug,
            content: entity.content,
            excerpt: entity.excerpt,
            template: PageTemplate::from_str(&entity.template).unwrap_or_default(),
            status: entity.status.into(),
            published_at: entity.published_at,
            scheduled_at: entity.scheduled_at,
            author: entity.author,
            last_modified_by: entity.last_modified_by,
            featured_image: entity.featured_image,
            attachments: entity.attachments,
            tags: entity.tags,
            category: entity.category,
            sections: entity.sections.0,
            seo: entity.seo.0,
            visibility: entity.visibility.0,
            views: entity.views,
            last_viewed_at: entity.last_viewed_at,
            versioning: entity.versioning.0,
            workflow: entity.workflow.0,
            parent_page: entity.parent_page,
            child_pages: entity.child_pages,
            related_pages: entity.related_pages,
            menu_order: entity.menu_order,
            show_in_menu: entity.show_in_menu,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            change_note: None,
        }
    }
}
