//! Tag repository for database operations.

use chrono::Utc;
use domain::models::Tag;
use domain::prepare_for_save;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::entities::TagEntity;
use crate::error::RepositoryError;
use crate::metrics::QueryTimer;

macro_rules! tag_columns {
    () => {
        "id, name, slug, description, color, is_active, created_at, updated_at"
    };
}

/// Repository for tag-related database operations.
#[derive(Clone)]
pub struct TagRepository {
    pool: PgPool,
}

impl TagRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Validates and upserts a tag.
    pub async fn save(&self, mut tag: Tag) -> Result<Tag, RepositoryError> {
        let timer = QueryTimer::new("tags", "save");
        let mut tx = self.pool.begin().await?;

        let previous: Option<Tag> = sqlx::query_as::<_, TagEntity>(concat!(
            "SELECT ",
            tag_columns!(),
            " FROM tags WHERE id = $1 FOR UPDATE"
        ))
        .bind(tag.id)
        .fetch_optional(&mut *tx)
        .await?
        .map(Into::into);

        prepare_for_save(&mut tag, previous.as_ref(), Utc::now())?;

        let result = sqlx::query_as::<_, TagEntity>(concat!(
            r#"
            INSERT INTO tags (id, name, slug, description, color, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                slug = EXCLUDED.slug,
                description = EXCLUDED.description,
                color = EXCLUDED.color,
                is_active = EXCLUDED.is_active,
                updated_at = EXCLUDED.updated_at
            RETURNING "#,
            tag_columns!()
        ))
        .bind(tag.id)
        .bind(&tag.name)
        .bind(&tag.slug)
        .bind(&tag.description)
        .bind(&tag.color)
        .bind(tag.is_active)
        .bind(tag.created_at)
        .bind(tag.updated_at)
        .fetch_one(&mut *tx)
        .await;
        timer.observe(&result);
        let saved = result?;

        tx.commit().await?;
        info!(tag_id = %saved.id, slug = %saved.slug, "Tag saved");
        Ok(saved.into())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Tag>, RepositoryError> {
        let timer = QueryTimer::new("tags", "find_by_id");
        let result = sqlx::query_as::<_, TagEntity>(concat!(
            "SELECT ",
            tag_columns!(),
            " FROM tags WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.observe(&result);
        Ok(result?.map(Into::into))
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepositoryError> {
        let timer = QueryTimer::new("tags", "find_by_slug");
        let result = sqlx::query_as::<_, TagEntity>(concat!(
            "SELECT ",
            tag_columns!(),
            " FROM tags WHERE slug = $1"
        ))
        .bind(slug.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await;
        timer.observe(&result);
        Ok(result?.map(Into::into))
    }

    /// Active tags ordered by name.
    pub async fn list_active(&self) -> Result<Vec<Tag>, RepositoryError> {
        let timer = QueryTimer::new("tags", "list_active");
        let result = sqlx::query_as::<_, TagEntity>(concat!(
            "SELECT ",
            tag_columns!(),
            " FROM tags WHERE is_active = true ORDER BY name ASC"
        ))
        .fetch_all(&self.pool)
        .await;
        timer.observe(&result);
        Ok(result?.into_iter().map(Into::into).collect())
    }

    /// Marks a tag inactive. Returns false when no such tag exists.
    pub async fn deactivate(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let timer = QueryTimer::new("tags", "deactivate");
        let result = sqlx::query(
            r#"
            UPDATE tags
            SET is_active = false, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await;
        timer.observe(&result);
        let affected = result?.rows_affected();
        if affected > 0 {
            info!(tag_id = %id, "Tag deactivated");
        }
        Ok(affected > 0)
    }
}
