//! SEO repository for database operations.

use chrono::Utc;
use domain::models::Seo;
use domain::prepare_for_save;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;

use crate::entities::SeoEntity;
use crate::error::RepositoryError;
use crate::metrics::QueryTimer;

macro_rules! seo_columns {
    () => {
        r#"id, page_slug, title, description, keywords, canonical_url, open_graph, twitter,
           structured_data, robots_meta, sitemap_priority, sitemap_change_freq, is_active,
           created_at, updated_at"#
    };
}

/// Repository for per-page SEO metadata.
#[derive(Clone)]
pub struct SeoRepository {
    pool: PgPool,
}

impl SeoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Validates, derives social fields and upserts the record.
    pub async fn save(&self, mut seo: Seo) -> Result<Seo, RepositoryError> {
        let timer = QueryTimer::new("seo", "save");
        let mut tx = self.pool.begin().await?;

        let previous: Option<Seo> = sqlx::query_as::<_, SeoEntity>(concat!(
            "SELECT ",
            seo_columns!(),
            " FROM seo WHERE id = $1 FOR UPDATE"
        ))
        .bind(seo.id)
        .fetch_optional(&mut *tx)
        .await?
        .map(Into::into);

        prepare_for_save(&mut seo, previous.as_ref(), Utc::now())?;

        let result = sqlx::query_as::<_, SeoEntity>(concat!(
            r#"
            INSERT INTO seo (
                id, page_slug, title, description, keywords, canonical_url, open_graph, twitter,
                structured_data, robots_meta, sitemap_priority, sitemap_change_freq, is_active,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ON CONFLICT (id) DO UPDATE SET
                page_slug = EXCLUDED.page_slug,
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                keywords = EXCLUDED.keywords,
                canonical_url = EXCLUDED.canonical_url,
                open_graph = EXCLUDED.open_graph,
                twitter = EXCLUDED.twitter,
                structured_data = EXCLUDED.structured_data,
                robots_meta = EXCLUDED.robots_meta,
                sitemap_priority = EXCLUDED.sitemap_priority,
                sitemap_change_freq = EXCLUDED.sitemap_change_freq,
                is_active = EXCLUDED.is_active,
                updated_at = EXCLUDED.updated_at
            RETURNING "#,
            seo_columns!()
        ))
        .bind(seo.id)
        .bind(&seo.page_slug)
        .bind(&seo.title)
        .bind(&seo.description)
        .bind(&seo.keywords)
        .bind(&seo.canonical_url)
        .bind(Json(&seo.open_graph))
        .bind(Json(&seo.twitter))
        .bind(&seo.structured_data)
        .bind(seo.robots_meta.as_str())
        .bind(seo.sitemap_priority)
        .bind(seo.sitemap_change_freq.as_str())
        .bind(seo.is_active)
        .bind(seo.created_at)
        .bind(seo.updated_at)
        .fetch_one(&mut *tx)
        .await;
        timer.observe(&result);
        let saved = result?;

        tx.commit().await?;
        info!(seo_id = %saved.id, page_slug = %saved.page_slug, "SEO metadata saved");
        Ok(saved.into())
    }

    pub async fn find_by_page_slug(&self, page_slug: &str) -> Result<Option<Seo>, RepositoryError> {
        let timer = QueryTimer::new("seo", "find_by_page_slug");
        let result = sqlx::query_as::<_, SeoEntity>(concat!(
            "SELECT ",
            seo_columns!(),
            " FROM seo WHERE page_slug = $1"
        ))
        .bind(page_slug.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await;
        timer.observe(&result);
        Ok(result?.map(Into::into))
    }

    /// Active records, highest sitemap priority first.
    pub async fn list_active(&self) -> Result<Vec<Seo>, RepositoryError> {
        let timer = QueryTimer::new("seo", "list_active");
        let result = sqlx::query_as::<_, SeoEntity>(concat!(
            "SELECT ",
            seo_columns!(),
            " FROM seo WHERE is_active = true ORDER BY sitemap_priority DESC, page_slug ASC"
        ))
        .fetch_all(&self.pool)
        .await;
        timer.observe(&result);
        Ok(result?.into_iter().map(Into::into).collect())
    }

    pub async fn delete_by_page_slug(&self, page_slug: &str) -> Result<bool, RepositoryError> {
        let timer = QueryTimer::new("seo", "delete_by_page_slug");
        let result = sqlx::query("DELETE FROM seo WHERE page_slug = $1")
            .bind(page_slug.trim().to_lowercase())
            .execute(&self.pool)
            .await;
        timer.observe(&result);
        let deleted = result?.rows_affected() > 0;
        if deleted {
            info!(page_slug = %page_slug, "SEO metadata deleted");
        }
        Ok(deleted)
    }
}
