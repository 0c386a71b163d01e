//! Site settings repository.
//!
//! The table holds at most one row, keyed by [`SETTINGS_ID`].

use chrono::Utc;
use domain::models::{Settings, SETTINGS_ID};
use domain::prepare_for_save;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::entities::SettingsEntity;
use crate::error::RepositoryError;
use crate::metrics::QueryTimer;

macro_rules! settings_columns {
    () => {
        r#"id, site, contact, social, seo, design, security, performance, healthcare, legal,
           notifications, maintenance, updated_by, created_at, updated_at"#
    };
}

#[derive(Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The stored settings, or `None` before the first save.
    pub async fn find(&self) -> Result<Option<Settings>, RepositoryError> {
        let timer = QueryTimer::new("site_settings", "find");
        let result = sqlx::query_as::<_, SettingsEntity>(concat!(
            "SELECT ",
            settings_columns!(),
            " FROM site_settings WHERE id = $1"
        ))
        .bind(SETTINGS_ID)
        .fetch_optional(&self.pool)
        .await;
        timer.observe(&result);
        Ok(result?.map(Into::into))
    }

    /// The stored settings, falling back to defaults when none were saved.
    /// Nothing is written.
    pub async fn load(&self) -> Result<Settings, RepositoryError> {
        match self.find().await? {
            Some(settings) => Ok(settings),
            None => {
                debug!("No stored settings, using defaults");
                Ok(Settings::default())
            }
        }
    }

    /// Returns the stored settings, saving `seed` first when none exist yet.
    pub async fn ensure_exists(&self, seed: Settings) -> Result<Settings, RepositoryError> {
        if let Some(settings) = self.find().await? {
            return Ok(settings);
        }
        info!("Creating initial site settings");
        self.save(seed, None).await
    }

    /// Validates and stores the singleton.
    pub async fn save(
        &self,
        mut settings: Settings,
        updated_by: Option<Uuid>,
    ) -> Result<Settings, RepositoryError> {
        let timer = QueryTimer::new("site_settings", "save");
        let mut tx = self.pool.begin().await?;

        let previous: Option<Settings> = sqlx::query_as::<_, SettingsEntity>(concat!(
            "SELECT ",
            settings_columns!(),
            " FROM site_settings WHERE id = $1 FOR UPDATE"
        ))
        .bind(SETTINGS_ID)
        .fetch_optional(&mut *tx)
        .await?
        .map(Into::into);

        settings.updated_by = updated_by;
        prepare_for_save(&mut settings, previous.as_ref(), Utc::now())?;

        let result = sqlx::query_as::<_, SettingsEntity>(concat!(
            r#"
            INSERT INTO site_settings (
                id, site, contact, social, seo, design, security, performance, healthcare, legal,
                notifications, maintenance, updated_by, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ON CONFLICT (id) DO UPDATE SET
                site = EXCLUDED.site,
                contact = EXCLUDED.contact,
                social = EXCLUDED.social,
                seo = EXCLUDED.seo,
                design = EXCLUDED.design,
                security = EXCLUDED.security,
                performance = EXCLUDED.performance,
                healthcare = EXCLUDED.healthcare,
                legal = EXCLUDED.legal,
                notifications = EXCLUDED.notifications,
                maintenance = EXCLUDED.maintenance,
                updated_by = EXCLUDED.updated_by,
                updated_at = EXCLUDED.updated_at
            RETURNING "#,
            settings_columns!()
        ))
        .bind(settings.id)
        .bind(Json(&settings.site))
        .bind(Json(&settings.contact))
        .bind(Json(&settings.social))
        .bind(Json(&settings.seo))
        .bind(Json(&settings.design))
        .bind(Json(&settings.security))
        .bind(Json(&settings.performance))
        .bind(Json(&settings.healthcare))
        .bind(Json(&settings.legal))
        .bind(Json(&settings.notifications))
        .bind(Json(&settings.maintenance))
        .bind(settings.updated_by)
        .bind(settings.created_at)
        .bind(settings.updated_at)
        .fetch_one(&mut *tx)
        .await;
        timer.observe(&result);
        let saved = result?;

        tx.commit().await?;
        info!(updated_by = ?saved.updated_by, "Site settings saved");
        Ok(saved.into())
    }
}
