//! Start-up tasks that run once the database is reachable.

use domain::models::Settings;
use persistence::repositories::SettingsRepository;
use persistence::{ConnectionManager, RepositoryError};
use tracing::info;

use crate::config::BootstrapConfig;

/// Settings used when no row exists yet.
pub fn seed_settings(bootstrap: &BootstrapConfig) -> Settings {
    let mut settings = Settings::default();
    if let Some(name) = bootstrap.site_name.as_deref().map(str::trim) {
        if !name.is_empty() {
            settings.site.name = name.to_string();
        }
    }
    settings.contact.email = bootstrap.contact_email.clone();
    settings.contact.phone = bootstrap.contact_phone.clone();
    settings
}

/// Makes sure the settings singleton exists, creating it from `bootstrap`.
///
/// Fails with a rule violation when no row exists and `bootstrap` carries
/// neither a contact email nor a phone number.
pub async fn ensure_settings(
    manager: &ConnectionManager,
    bootstrap: &BootstrapConfig,
) -> Result<Settings, RepositoryError> {
    let repo = SettingsRepository::new(manager.pool().clone());
    let settings = repo.ensure_exists(seed_settings(bootstrap)).await?;
    info!(
        site_name = %settings.site.name,
        maintenance = settings.maintenance.enabled,
        "Site settings ready"
    );
    Ok(settings)
}
