//! Site settings entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::settings::{
    ContactInfo, DesignTokens, HealthcareSettings, LegalSettings, MaintenanceSettings,
    NotificationSettings, PerformanceSettings, SecurityPolicy, SeoDefaults, SiteInfo,
    SocialLinks,
};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the site_settings table. Every section is a
/// JSONB column.
#[derive(Debug, Clone, FromRow)]
pub struct SettingsEntity {
    pub id: Uuid,
    pub site: Json<SiteInfo>,
    pub contact: Json<ContactInfo>,
    pub social: Json<SocialLinks>,
    pub seo: Json<SeoDefaults>,
    pub design: Json<DesignTokens>,
    pub security: Json<SecurityPolicy>,
    pub performance: Json<PerformanceSettings>,
    pub healthcare: Json<HealthcareSettings>,
    pub legal: Json<LegalSettings>,
    pub notifications: Json<NotificationSettings>,
    pub maintenance: Json<MaintenanceSettings>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SettingsEntity> for domain::models::Settings {
    fn from(entity: SettingsEntity) -> Self {
        Self {
            id: entity.id,
            site: entity.site.0,
            contact: entity.contact.0,
            social: entity.social.0,
            seo: entity.seo.0,
            design: entity.design.0,
            security: entity.security.0,
            performance: entity.performance.0,
            healthcare: entity.healthcare.0,
            legal: entity.legal.0,
            notifications: entity.notifications.0,
            maintenance: entity.maintenance.0,
            updated_by: entity.updated_by,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
