//! Page repository for database operations.
//!
//! Version history lives in the page row, so a content change and its
//! snapshot are written by the same statement.

use chrono::Utc;
use domain::models::Page;
use domain::prepare_for_save;
use shared::pagination::{Cursor, PageRequest, Paginated};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::entities::{PageEntity, PageStatusDb};
use crate::error::RepositoryError;
use crate::metrics::QueryTimer;

macro_rules! page_columns {
    () => {
        r#"id, title, slug, content, excerpt, template, status, published_at, scheduled_at,
           author, last_modified_by, featured_image, attachments, tags, category, sections, seo,
           visibility, views, last_viewed_at, versioning, workflow, parent_page, child_pages,
           related_pages, menu_order, show_in_menu, created_at, updated_at"#
    };
}

/// Repository for page-related database operations.
#[derive(Clone)]
pub struct PageRepository {
    pool: PgPool,
}

impl PageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs the save-time transform against the locked persisted row and
    /// upserts the whole page, history included, in one transaction.
    ///
    /// `views` and `last_viewed_at` belong to [`Self::increment_views`] and
    /// are never overwritten by a save.
    pub async fn save(&self, mut page: Page) -> Result<Page, RepositoryError> {
        let timer = QueryTimer::new("pages", "save");
        let mut tx = self.pool.begin().await?;

        let previous: Option<Page> = sqlx::query_as::<_, PageEntity>(concat!(
            "SELECT ",
            page_columns!(),
            " FROM pages WHERE id = $1 FOR UPDATE"
        ))
        .bind(page.id)
        .fetch_optional(&mut *tx)
        .await?
        .map(Into::into);

        prepare_for_save(&mut page, previous.as_ref(), Utc::now())?;

        let result = sqlx::query_as::<_, PageEntity>(concat!(
            r#"
            INSERT INTO pages (
                id, title, slug, content, excerpt, template, status, published_at, scheduled_at,
                author, last_modified_by, featured_image, attachments, tags, category, sections,
                seo, visibility, views, last_viewed_at, versioning, workflow, parent_page,
                child_pages, related_pages, menu_order, show_in_menu, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                    $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29)
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                slug = EXCLUDED.slug,
                content = EXCLUDED.content,
                excerpt = EXCLUDED.excerpt,
                template = EXCLUDED.template,
                status = EXCLUDED.status,
                published_at = EXCLUDED.published_at,
                scheduled_at = EXCLUDED.scheduled_at,
                author = EXCLUDED.author,
                last_modified_by = EXCLUDED.last_modified_by,
                featured_image = EXCLUDED.featured_image,
                attachments = EXCLUDED.attachments,
                tags = EXCLUDED.tags,
                category = EXCLUDED.category,
                sections = EXCLUDED.sections,
                seo = EXCLUDED.seo,
                visibility = EXCLUDED.visibility,
                versioning = EXCLUDED.versioning,
                workflow = EXCLUDED.workflow,
                parent_page = EXCLUDED.parent_page,
                child_pages = EXCLUDED.child_pages,
                related_pages = EXCLUDED.related_pages,
                menu_order = EXCLUDED.menu_order,
                show_in_menu = EXCLUDED.show_in_menu,
                updated_at = EXCLUDED.updated_at
            RETURNING "#,
            page_columns!()
        ))
        .bind(page.id)
        .bind(&page.title)
        .bind(&page.slug)
        .bind(&page.content)
        .bind(&page.excerpt)
        .bind(page.template.as_str())
        .bind(PageStatusDb::from(page.status))
        .bind(page.published_at)
        .bind(page.scheduled_at)
        .bind(page.author)
        .bind(page.last_modified_by)
        .bind(page.featured_image)
        .bind(&page.attachments)
        .bind(&page.tags)
        .bind(&page.category)
        .bind(Json(&page.sections))
        .bind(Json(&page.seo))
        .bind(Json(&page.visibility))
        .bind(page.views)
        .bind(page.last_viewed_at)
        .bind(Json(&page.versioning))
        .bind(Json(&page.workflow))
        .bind(page.parent_page)
        .bind(&page.child_pages)
        .bind(&page.related_pages)
        .bind(page.menu_order)
        .bind(page.show_in_menu)
        .bind(page.created_at)
        .bind(page.updated_at)
        .fetch_one(&mut *tx)
        .await;
        timer.observe(&result);
        let saved = result?;

        tx.commit().await?;

        let saved: Page = saved.into();
        info!(
            page_id = %saved.id,
            slug = %saved.slug,
            status = %saved.status,
            current_version = saved.versioning.current_version,
            history_len = saved.versioning.history.len(),
            "Page saved"
        );
        Ok(saved)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Page>, RepositoryError> {
        let timer = QueryTimer::new("pages", "find_by_id");
        let result = sqlx::query_as::<_, PageEntity>(concat!(
            "SELECT ",
            page_columns!(),
            " FROM pages WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.observe(&result);
        Ok(result?.map(Into::into))
    }

    /// Finds a page by slug regardless of status.
    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Page>, RepositoryError> {
        let timer = QueryTimer::new("pages", "find_by_slug");
        let result = sqlx::query_as::<_, PageEntity>(concat!(
            "SELECT ",
            page_columns!(),
            " FROM pages WHERE slug = $1"
        ))
        .bind(slug.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await;
        timer.observe(&result);
        Ok(result?.map(Into::into))
    }

    pub async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Page>, RepositoryError> {
        let timer = QueryTimer::new("pages", "find_published_by_slug");
        let result = sqlx::query_as::<_, PageEntity>(concat!(
            "SELECT ",
            page_columns!(),
            " FROM pages WHERE slug = $1 AND status = 'published'"
        ))
        .bind(slug.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await;
        timer.observe(&result);
        Ok(result?.map(Into::into))
    }

    /// Published pages, newest first.
    pub async fn list_published(
        &self,
        page: &PageRequest,
    ) -> Result<Paginated<Page>, RepositoryError> {
        let limit = page.limit();
        let cursor = page.decoded_cursor()?;

        let timer = QueryTimer::new("pages", "list_published");
        let result = sqlx::query_as::<_, PageEntity>(concat!(
            "SELECT ",
            page_columns!(),
            r#" FROM pages
            WHERE status = 'published'
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

        let rows: Vec<Page> = result?.into_iter().map(Into::into).collect();
        Ok(Paginated::from_rows(rows, limit, |p| Cursor::new(p.created_at, p.id)))
    }

    /// Direct children of `parent`, in menu order.
    pub async fn list_children(&self, parent: Uuid) -> Result<Vec<Page>, RepositoryError> {
        let timer = QueryTimer::new("pages", "list_children");
        let result = sqlx::query_as::<_, PageEntity>(concat!(
            "SELECT ",
            page_columns!(),
            r#" FROM pages
            WHERE parent_page = $1
            ORDER BY menu_order ASC, title ASC"#
        ))
        .bind(parent)
        .fetch_all(&self.pool)
        .await;
        timer.observe(&result);
        Ok(result?.into_iter().map(Into::into).collect())
    }

    /// Published pages carrying `tag`, newest first.
    pub async fn list_by_tag(&self, tag: &str) -> Result<Vec<Page>, RepositoryError> {
        let timer = QueryTimer::new("pages", "list_by_tag");
        let result = sqlx::query_as::<_, PageEntity>(concat!(
            "SELECT ",
            page_columns!(),
            r#" FROM pages
            WHERE $1 = ANY(tags) AND status = 'published'
            ORDER BY created_at DESC, id DESC"#
        ))
        .bind(tag.trim().to_lowercase())
        .fetch_all(&self.pool)
        .await;
        timer.observe(&result);
        Ok(result?.into_iter().map(Into::into).collect())
    }

    /// Atomically bumps the view counter and returns the new count.
    pub async fn increment_views(&self, id: Uuid) -> Result<i64, RepositoryError> {
        let timer = QueryTimer::new("pages", "increment_views");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE pages
            SET views = views + 1, last_viewed_at = NOW()
            WHERE id = $1
            RETURNING views
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.observe(&result);
        result?.ok_or_else(|| RepositoryError::not_found("Page"))
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let timer = QueryTimer::new("pages", "delete");
        let result = sqlx::query("DELETE FROM pages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.observe(&result);
        let deleted = result?.rows_affected() > 0;
        if deleted {
            info!(page_id = %id, "Page deleted");
        }
        Ok(deleted)
    }
}
