//! Site-wide settings singleton.
//!
//! Exactly one settings document exists; it always carries [`SETTINGS_ID`].

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use shared::text::non_blank;
use shared::validation::{validate_hex_color, validate_link, validate_percentage, validate_phone};
use uuid::Uuid;
use validator::Validate;

use crate::document::Document;
use crate::error::{DomainError, Violations};
use crate::models::media::MAX_UPLOAD_SIZE;

/// Well-known identifier of the settings singleton.
pub const SETTINGS_ID: Uuid = Uuid::from_u128(1);

pub const PASSWORD_MIN_LENGTH_FLOOR: i32 = 6;
pub const PASSWORD_MIN_LENGTH_CEILING: i32 = 128;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteInfo {
    #[validate(length(min = 1, max = 100, message = "Site name must be 1-100 characters"))]
    pub name: String,
    #[validate(length(max = 200))]
    pub tagline: Option<String>,
    #[validate(custom(function = "validate_link"))]
    pub logo: Option<String>,
    #[validate(custom(function = "validate_link"))]
    pub favicon: Option<String>,
    pub language: String,
    pub timezone: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            name: "CareCMS".to_string(),
            tagline: None,
            logo: None,
            favicon: None,
            language: "en".to_string(),
            timezone: "UTC".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficeHours {
    pub day: String,
    pub open: Option<NaiveTime>,
    pub close: Option<NaiveTime>,
    #[serde(default)]
    pub closed: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactInfo {
    #[validate(email(message = "Contact email is invalid"))]
    pub email: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub emergency_phone: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub fax: Option<String>,
    pub address: Address,
    pub office_hours: Vec<OfficeHours>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct SocialLinks {
    #[validate(custom(function = "validate_link"))]
    pub facebook: Option<String>,
    #[validate(custom(function = "validate_link"))]
    pub twitter: Option<String>,
    #[validate(custom(function = "validate_link"))]
    pub instagram: Option<String>,
    #[validate(custom(function = "validate_link"))]
    pub linkedin: Option<String>,
    #[validate(custom(function = "validate_link"))]
    pub youtube: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct SeoDefaults {
    #[validate(length(max = 60))]
    pub default_title: Option<String>,
    #[validate(length(max = 160))]
    pub default_description: Option<String>,
    pub default_keywords: Vec<String>,
    pub google_analytics_id: Option<String>,
    pub google_site_verification: Option<String>,
    pub sitemap_enabled: bool,
    pub robots_txt: Option<String>,
}

impl Default for SeoDefaults {
    fn default() -> Self {
        Self {
            default_title: None,
            default_description: None,
            default_keywords: Vec::new(),
            google_analytics_id: None,
            google_site_verification: None,
            sitemap_enabled: true,
            robots_txt: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct DesignTokens {
    #[validate(custom(function = "validate_hex_color"))]
    pub primary_color: String,
    #[validate(custom(function = "validate_hex_color"))]
    pub secondary_color: String,
    #[validate(custom(function = "validate_hex_color"))]
    pub accent_color: String,
    pub font_family: String,
    pub heading_font: String,
    #[validate(length(max = 50000))]
    pub custom_css: Option<String>,
}

impl Default for DesignTokens {
    fn default() -> Self {
        Self {
            primary_color: "#0EA5E9".to_string(),
            secondary_color: "#14B8A6".to_string(),
            accent_color: "#F59E0B".to_string(),
            font_family: "Inter, sans-serif".to_string(),
            heading_font: "Inter, sans-serif".to_string(),
            custom_css: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct SecurityPolicy {
    #[validate(range(
        min = 6,
        max = 128,
        message = "Minimum password length must be between 6 and 128"
    ))]
    pub password_min_length: i32,
    pub require_special_chars: bool,
    #[validate(range(min = 60, message = "Session timeout must be at least 60 seconds"))]
    pub session_timeout_secs: i64,
    #[validate(range(min = 1, max = 100))]
    pub max_login_attempts: i32,
    #[validate(range(min = 1))]
    pub lockout_duration_mins: i32,
    pub two_factor_required: bool,
}

impl Default for SecurityPolicy {
    fn default() -> Self {
        Self {
            password_min_length: 8,
            require_special_chars: false,
            session_timeout_secs: 3600,
            max_login_attempts: 5,
            lockout_duration_mins: 30,
            two_factor_required: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct PerformanceSettings {
    pub cache_enabled: bool,
    #[validate(range(min = 0))]
    pub cache_ttl_secs: i64,
    #[validate(custom(function = "validate_percentage"))]
    pub image_quality: i32,
    pub lazy_loading: bool,
    #[validate(range(min = 1, max = 52428800, message = "Max upload size must be at most 50 MiB"))]
    pub max_upload_size: i64,
    #[validate(custom(function = "validate_link"))]
    pub cdn_url: Option<String>,
}

impl Default for PerformanceSettings {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            cache_ttl_secs: 3600,
            image_quality: 85,
            lazy_loading: true,
            max_upload_size: MAX_UPLOAD_SIZE,
            cdn_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct HealthcareSettings {
    pub appointment_booking_enabled: bool,
    #[validate(custom(function = "validate_link"))]
    pub appointment_url: Option<String>,
    pub patient_portal_enabled: bool,
    #[validate(custom(function = "validate_link"))]
    pub patient_portal_url: Option<String>,
    pub telehealth_enabled: bool,
    pub emergency_banner_enabled: bool,
    #[validate(length(max = 500))]
    pub emergency_message: Option<String>,
    pub accepted_insurance: Vec<String>,
    pub hipaa_notice_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct LegalSettings {
    #[validate(custom(function = "validate_link"))]
    pub privacy_policy_url: Option<String>,
    #[validate(custom(function = "validate_link"))]
    pub terms_url: Option<String>,
    #[validate(custom(function = "validate_link"))]
    pub accessibility_statement_url: Option<String>,
    pub cookie_consent_enabled: bool,
    pub gdpr_compliant: bool,
    pub hipaa_compliant: bool,
    #[validate(length(max = 500))]
    pub disclaimer: Option<String>,
}

impl Default for LegalSettings {
    fn default() -> Self {
        Self {
            privacy_policy_url: None,
            terms_url: None,
            accessibility_statement_url: None,
            cookie_consent_enabled: true,
            gdpr_compliant: false,
            hipaa_compliant: false,
            disclaimer: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationSettings {
    pub email_notifications: bool,
    #[validate(email)]
    pub admin_email: Option<String>,
    pub notify_on_new_user: bool,
    pub notify_on_content_publish: bool,
    pub notify_on_media_upload: bool,
    pub notify_on_contact_form: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email_notifications: true,
            admin_email: None,
            notify_on_new_user: true,
            notify_on_content_publish: false,
            notify_on_media_upload: false,
            notify_on_contact_form: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct MaintenanceSettings {
    pub enabled: bool,
    #[validate(length(max = 500))]
    pub message: Option<String>,
    pub allowed_ips: Vec<String>,
    pub scheduled_start: Option<DateTime<Utc>>,
    pub scheduled_end: Option<DateTime<Utc>>,
}

/// The settings singleton.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub id: Uuid,
    #[validate(nested)]
    pub site: SiteInfo,
    #[validate(nested)]
    pub contact: ContactInfo,
    #[validate(nested)]
    pub social: SocialLinks,
    #[validate(nested)]
    pub seo: SeoDefaults,
    #[validate(nested)]
    pub design: DesignTokens,
    #[validate(nested)]
    pub security: SecurityPolicy,
    #[validate(nested)]
    pub performance: PerformanceSettings,
    #[validate(nested)]
    pub healthcare: HealthcareSettings,
    #[validate(nested)]
    pub legal: LegalSettings,
    #[validate(nested)]
    pub notifications: NotificationSettings,
    #[validate(nested)]
    pub maintenance: MaintenanceSettings,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Settings {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: SETTINGS_ID,
            site: SiteInfo::default(),
            contact: ContactInfo::default(),
            social: SocialLinks::default(),
            seo: SeoDefaults::default(),
            design: DesignTokens::default(),
            security: SecurityPolicy::default(),
            performance: PerformanceSettings::default(),
            healthcare: HealthcareSettings::default(),
            legal: LegalSettings::default(),
            notifications: NotificationSettings::default(),
            maintenance: MaintenanceSettings::default(),
            updated_by: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Settings {
    /// Whether visitors from `ip` should see the maintenance page at `now`.
    pub fn is_in_maintenance(&self, now: DateTime<Utc>, ip: Option<&str>) -> bool {
        let m = &self.maintenance;
        let scheduled = match (m.scheduled_start, m.scheduled_end) {
            (Some(start), Some(end)) => start <= now && now < end,
            (Some(start), None) => start <= now,
            (None, Some(end)) => now < end,
            (None, None) => false,
        };
        if !(m.enabled || scheduled) {
            return false;
        }
        !ip.is_some_and(|ip| m.allowed_ips.iter().any(|allowed| allowed == ip))
    }
}

impl Document for Settings {
    const COLLECTION: &'static str = "site_settings";

    fn id(&self) -> Uuid {
        self.id
    }

    fn normalize(&mut self, _previous: Option<&Self>, _now: DateTime<Utc>) {
        self.id = SETTINGS_ID;
        if let Some(email) = self.contact.email.as_mut() {
            *email = email.trim().to_lowercase();
        }
        if non_blank(self.contact.email.as_deref()).is_none() {
            self.contact.email = None;
        }
        if non_blank(self.contact.phone.as_deref()).is_none() {
            self.contact.phone = None;
        }
    }

    fn check(&self, _previous: Option<&Self>) -> Violations {
        self.validate().into()
    }

    fn enforce_rules(&self) -> Result<(), DomainError> {
        if self.contact.email.is_none() && self.contact.phone.is_none() {
            return Err(DomainError::rule(
                "At least one contact method (email or phone) is required",
            ));
        }
        if let (Some(start), Some(end)) = (
            self.maintenance.scheduled_start,
            self.maintenance.scheduled_end,
        ) {
            if end <= start {
                return Err(DomainError::rule(
                    "Maintenance window must end after it starts",
                ));
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::prepare_for_save;
    use chrono::Duration;

    fn with_email() -> Settings {
        let mut s = Settings::default();
        s.contact.email = Some("Info@Riverside.Example".into());
        s
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.id, SETTINGS_ID);
        assert_eq!(s.security.session_timeout_secs, 3600);
        assert_eq!(s.security.password_min_length, 8);
        assert_eq!(s.performance.max_upload_size, 50 * 1024 * 1024);
        assert_eq!(s.performance.image_quality, 85);
    }

    #[test]
    fn test_contact_required() {
        let mut s = Settings::default();
        s.contact.email = Some("   ".into());
        let err = prepare_for_save(&mut s, None, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Rule(_)));
        assert!(err.to_string().contains("contact method"));
    }

    #[test]
    fn test_email_alone_suffices() {
        let mut s = with_email();
        prepare_for_save(&mut s, None, Utc::now()).unwrap();
        assert_eq!(s.contact.email.as_deref(), Some("info@riverside.example"));
    }

    #[test]
    fn test_phone_alone_suffices() {
        let mut s = Settings::default();
        s.contact.phone = Some("+1 555 010 2000".into());
        assert!(prepare_for_save(&mut s, None, Utc::now()).is_ok());
    }

    #[test]
    fn test_password_floor_enforced() {
        let mut s = with_email();
        s.security.password_min_length = PASSWORD_MIN_LENGTH_FLOOR - 1;
        let err = prepare_for_save(&mut s, None, Utc::now()).unwrap_err();
        assert!(err
            .violations()
            .unwrap()
            .has_field("security.password_min_length"));

        let mut s = with_email();
        s.security.password_min_length = PASSWORD_MIN_LENGTH_CEILING;
        assert!(prepare_for_save(&mut s, None, Utc::now()).is_ok());
    }

    #[test]
    fn test_image_quality_bounds() {
        for (quality, ok) in [(0, true), (100, true), (101, false), (-5, false)] {
            let mut s = with_email();
            s.performance.image_quality = quality;
            assert_eq!(prepare_for_save(&mut s, None, Utc::now()).is_ok(), ok);
        }
    }

    #[test]
    fn test_id_forced_to_singleton() {
        let mut s = with_email();
        s.id = Uuid::new_v4();
        prepare_for_save(&mut s, None, Utc::now()).unwrap();
        assert_eq!(s.id, SETTINGS_ID);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r##"{
            "id": "00000000-0000-0000-0000-000000000001",
            "site": {"name": "Riverside Clinic"},
            "contact": {"phone": "+1 555 010 2000"},
            "social": {}, "seo": {}, "design": {"primaryColor": "#112233"},
            "security": {}, "performance": {}, "healthcare": {"telehealthEnabled": true},
            "legal": {}, "notifications": {}, "maintenance": {},
            "updatedBy": null,
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        }"##;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.site.name, "Riverside Clinic");
        assert_eq!(s.site.language, "en");
        assert_eq!(s.design.primary_color, "#112233");
        assert_eq!(s.design.accent_color, "#F59E0B");
        assert!(s.healthcare.telehealth_enabled);
        assert_eq!(s.security.session_timeout_secs, 3600);
    }

    #[test]
    fn test_maintenance_window() {
        let now = Utc::now();
        let mut s = with_email();
        assert!(!s.is_in_maintenance(now, None));

        s.maintenance.enabled = true;
        s.maintenance.allowed_ips = vec!["10.0.0.5".into()];
        assert!(s.is_in_maintenance(now, Some("192.168.1.9")));
        assert!(!s.is_in_maintenance(now, Some("10.0.0.5")));

        s.maintenance.enabled = false;
        s.maintenance.scheduled_start = Some(now - Duration::hours(1));
        s.maintenance.scheduled_end = Some(now + Duration::hours(1));
        assert!(s.is_in_maintenance(now, None));
        assert!(!s.is_in_maintenance(now + Duration::hours(2), None));
    }

    #[test]
    fn test_maintenance_window_order_enforced() {
        let now = Utc::now();
        let mut s = with_email();
        s.maintenance.scheduled_start = Some(now);
        s.maintenance.scheduled_end = Some(now - Duration::minutes(5));
        assert!(matches!(
            prepare_for_save(&mut s, None, now),
            Err(DomainError::Rule(_))
        ));
    }
}
