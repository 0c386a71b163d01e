//! User account domain model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use shared::crypto::{generate_secure_token, sha256_hex};
use shared::password::{hash_password, is_password_hash, verify_password};
use shared::validation::{validate_link, validate_phone, validate_username};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use crate::document::Document;
use crate::error::{DomainError, Violations};

/// Lifetime of a password reset token.
pub const PASSWORD_RESET_TTL_MINUTES: i64 = 30;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Failed logins allowed before the account is locked.
pub const MAX_LOGIN_ATTEMPTS: i32 = 5;
pub const LOCK_DURATION_HOURS: i64 = 2;

/// Role of a CMS user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Editor,
    Author,
    #[default]
    Viewer,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Editor => "editor",
            UserRole::Author => "author",
            UserRole::Viewer => "viewer",
        }
    }

    /// Whether this role may publish content without review.
    pub fn can_publish(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Editor)
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "editor" => Ok(UserRole::Editor),
            "author" => Ok(UserRole::Author),
            "viewer" => Ok(UserRole::Viewer),
            _ => Err(format!("Invalid user role: {}", s)),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A CMS user account.
///
/// `password` holds the plaintext until the first save and the Argon2id hash
/// afterwards. Secrets are never serialized.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,

    #[validate(length(
        min = 3,
        max = 30,
        message = "Username must be between 3 and 30 characters"
    ))]
    #[validate(custom(function = "validate_username"))]
    pub username: String,

    #[validate(email(message = "Email address is invalid"))]
    pub email: String,

    #[serde(skip_serializing, default)]
    pub password: String,

    /// Marks `password` as an existing hash to store verbatim on the next
    /// save. Only [`User::with_password_hash`] sets it.
    #[serde(skip)]
    pub password_is_hash: bool,

    #[validate(length(max = 50, message = "First name cannot exceed 50 characters"))]
    pub first_name: Option<String>,

    #[validate(length(max = 50, message = "Last name cannot exceed 50 characters"))]
    pub last_name: Option<String>,

    #[serde(default)]
    pub role: UserRole,

    #[validate(custom(function = "validate_link"))]
    pub avatar: Option<String>,

    #[validate(length(max = 500, message = "Bio cannot exceed 500 characters"))]
    pub bio: Option<String>,

    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,

    #[validate(length(max = 100))]
    pub department: Option<String>,

    pub is_active: bool,
    pub is_verified: bool,

    #[serde(skip_serializing, default)]
    pub verification_token: Option<String>,
    #[serde(skip_serializing, default)]
    pub password_reset_token: Option<String>,
    #[serde(skip_serializing, default)]
    pub password_reset_expires: Option<DateTime<Utc>>,

    pub last_login: Option<DateTime<Utc>>,
    pub login_attempts: i32,
    pub lock_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-facing projection of a user with all secrets removed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: String,
    pub role: UserRole,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates an unsaved user with a plaintext password.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            email: email.into(),
            password: password.into(),
            password_is_hash: false,
            first_name: None,
            last_name: None,
            role: UserRole::default(),
            avatar: None,
            bio: None,
            phone: None,
            department: None,
            is_active: true,
            is_verified: false,
            verification_token: None,
            password_reset_token: None,
            password_reset_expires: None,
            last_login: None,
            login_attempts: 0,
            lock_until: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the password with an already computed Argon2 hash, e.g. when
    /// importing accounts. The hash is stored as given instead of being
    /// hashed again.
    pub fn with_password_hash(mut self, hash: impl Into<String>) -> Result<Self, DomainError> {
        let hash = hash.into();
        if !is_password_hash(&hash) {
            return Err(DomainError::rule("Password hash is not a valid Argon2 PHC string"));
        }
        self.password = hash;
        self.password_is_hash = true;
        Ok(self)
    }

    pub fn with_role(mut self, role: UserRole) -> Self {
        self.role = role;
        self
    }

    pub fn full_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.to_string(),
            (None, Some(last)) => last.to_string(),
            (None, None) => self.username.clone(),
        }
    }

    fn password_modified(&self, previous: Option<&User>) -> bool {
        previous.map_or(true, |p| p.password != self.password)
    }

    /// Checks a candidate password against the stored hash.
    pub fn compare_password(&self, candidate: &str) -> Result<bool, DomainError> {
        Ok(verify_password(candidate, &self.password)?)
    }

    pub fn public_profile(&self) -> PublicProfile {
        PublicProfile {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            full_name: self.full_name(),
            role: self.role,
            avatar: self.avatar.clone(),
            bio: self.bio.clone(),
            phone: self.phone.clone(),
            department: self.department.clone(),
            is_active: self.is_active,
            is_verified: self.is_verified,
            last_login: self.last_login,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Issues a password reset token. Only its digest is kept on the record;
    /// the plaintext is returned for out-of-band delivery.
    pub fn generate_password_reset_token(&mut self, now: DateTime<Utc>) -> String {
        let token = generate_secure_token();
        self.password_reset_token = Some(sha256_hex(&token));
        self.password_reset_expires = Some(now + Duration::minutes(PASSWORD_RESET_TTL_MINUTES));
        token
    }

    pub fn matches_reset_token(&self, token: &str, now: DateTime<Utc>) -> bool {
        match (&self.password_reset_token, self.password_reset_expires) {
            (Some(digest), Some(expires)) => expires > now && *digest == sha256_hex(token),
            _ => false,
        }
    }

    /// Replaces the password when `token` is a live reset token. The new
    /// plaintext is hashed on the next save.
    pub fn reset_password(
        &mut self,
        token: &str,
        new_password: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if !self.matches_reset_token(token, now) {
            return Err(DomainError::InvalidToken);
        }
        self.password = new_password.into();
        self.password_reset_token = None;
        self.password_reset_expires = None;
        self.login_attempts = 0;
        self.lock_until = None;
        Ok(())
    }

    pub fn generate_verification_token(&mut self) -> String {
        let token = generate_secure_token();
        self.verification_token = Some(sha256_hex(&token));
        token
    }

    pub fn verify_email(&mut self, token: &str) -> Result<(), DomainError> {
        match &self.verification_token {
            Some(digest) if *digest == sha256_hex(token) => {
                self.is_verified = true;
                self.verification_token = None;
                Ok(())
            }
            _ => Err(DomainError::InvalidToken),
        }
    }

    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.lock_until.is_some_and(|until| until > now)
    }

    pub fn register_failed_login(&mut self, now: DateTime<Utc>) {
        if self.lock_until.is_some_and(|until| until <= now) {
            self.login_attempts = 1;
            self.lock_until = None;
            return;
        }
        self.login_attempts += 1;
        if self.login_attempts >= MAX_LOGIN_ATTEMPTS && !self.is_locked(now) {
            self.lock_until = Some(now + Duration::hours(LOCK_DURATION_HOURS));
        }
    }

    pub fn register_successful_login(&mut self, now: DateTime<Utc>) {
        self.login_attempts = 0;
        self.lock_until = None;
        self.last_login = Some(now);
    }
}

impl Document for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> Uuid {
        self.id
    }

    fn normalize(&mut self, _previous: Option<&Self>, _now: DateTime<Utc>) {
        self.username = self.username.trim().to_string();
        self.email = self.email.trim().to_lowercase();
    }

    fn check(&self, previous: Option<&Self>) -> Violations {
        let mut violations: Violations = self.validate().into();

        if self.password_modified(previous) && !self.password_is_hash {
            let len = self.password.chars().count();
            if len < MIN_PASSWORD_LENGTH {
                violations.push(
                    "password",
                    "length",
                    format!(
                        "Password must be at least {} characters",
                        MIN_PASSWORD_LENGTH
                    ),
                );
            } else if len > MAX_PASSWORD_LENGTH {
                violations.push(
                    "password",
                    "length",
                    format!("Password cannot exceed {} characters", MAX_PASSWORD_LENGTH),
                );
            }
        }
        violations
    }

    fn finalize(&mut self, previous: Option<&Self>, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.password_modified(previous) && !self.password_is_hash {
            self.password = hash_password(&self.password)?;
        }
        self.password_is_hash = false;
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
    use fake::faker::internet::en::SafeEmail;
    use fake::faker::name::en::{FirstName, LastName};
    use fake::Fake;

    fn new_user() -> User {
        let email: String = SafeEmail().fake();
        User::new("nurse_joy", email, "initial-pass-1")
    }

    fn saved_user() -> User {
        let mut user = new_user();
        prepare_for_save(&mut user, None, Utc::now()).unwrap();
        user
    }

    #[test]
    fn test_user_role_roundtrip_str() {
        for role in [
            UserRole::Admin,
            UserRole::Editor,
            UserRole::Author,
            UserRole::Viewer,
        ] {
            assert_eq!(UserRole::from_str(role.as_str()).unwrap(), role);
        }
        assert_eq!(UserRole::from_str("EDITOR").unwrap(), UserRole::Editor);
        assert!(UserRole::from_str("superuser").is_err());
        assert_eq!(UserRole::default(), UserRole::Viewer);
    }

    #[test]
    fn test_save_hashes_new_password() {
        let user = saved_user();
        assert!(user.password.starts_with("$argon2id$"));
        assert!(user.compare_password("initial-pass-1").unwrap());
        assert!(!user.compare_password("something-else").unwrap());
    }

    #[test]
    fn test_save_with_unmodified_hash_is_byte_identical() {
        let previous = saved_user();
        let mut user = previous.clone();
        user.bio = Some("Pediatric nurse".into());

        prepare_for_save(&mut user, Some(&previous), Utc::now()).unwrap();
        assert_eq!(user.password, previous.password);
    }

    #[test]
    fn test_save_with_changed_password_rehashes() {
        let previous = saved_user();
        let mut user = previous.clone();
        user.password = "brand-new-secret".into();

        prepare_for_save(&mut user, Some(&previous), Utc::now()).unwrap();
        assert_ne!(user.password, previous.password);
        assert!(user.compare_password("brand-new-secret").unwrap());
        assert!(!user.compare_password("initial-pass-1").unwrap());
    }

    #[test]
    fn test_short_password_rejected_before_hashing() {
        let mut user = User::new("short_pw", "short@example.com", "abc");
        let err = prepare_for_save(&mut user, None, Utc::now()).unwrap_err();
        assert!(err.violations().unwrap().has_field("password"));
        assert_eq!(user.password, "abc");
    }

    #[test]
    fn test_explicit_password_hash_passes_through() {
        let hash = hash_password("imported-secret").unwrap();
        let mut user = User::new("imported", "imported@example.com", "unused-plaintext")
            .with_password_hash(hash.clone())
            .unwrap();
        prepare_for_save(&mut user, None, Utc::now()).unwrap();
        assert_eq!(user.password, hash);
        assert!(user.compare_password("imported-secret").unwrap());
        assert!(!user.password_is_hash);
    }

    #[test]
    fn test_with_password_hash_rejects_plaintext() {
        let result = User::new("imported", "imported@example.com", "x")
            .with_password_hash("not-a-hash");
        assert!(matches!(result, Err(DomainError::Rule(_))));
    }

    #[test]
    fn test_hash_shaped_plaintext_is_still_hashed() {
        let look_alike = hash_password("other").unwrap();
        let mut user = User::new("look_alike", "look.alike@example.com", look_alike.clone());
        prepare_for_save(&mut user, None, Utc::now()).unwrap();

        assert_ne!(user.password, look_alike);
        assert!(user.compare_password(&look_alike).unwrap());
        assert!(!user.compare_password("other").unwrap());
    }

    #[test]
    fn test_changed_password_to_hash_shaped_value_is_hashed() {
        let previous = saved_user();
        let mut user = previous.clone();
        let look_alike = hash_password("other").unwrap();
        user.password = look_alike.clone();

        prepare_for_save(&mut user, Some(&previous), Utc::now()).unwrap();
        assert_ne!(user.password, look_alike);
        assert!(user.compare_password(&look_alike).unwrap());
    }

    #[test]
    fn test_email_is_normalized() {
        let mut user = User::new("mixed_case", "  Dr.Who@Clinic.Example ", "long-enough");
        prepare_for_save(&mut user, None, Utc::now()).unwrap();
        assert_eq!(user.email, "dr.who@clinic.example");
    }

    #[test]
    fn test_invalid_fields_reported() {
        let mut user = User::new("x", "not-an-email", "long-enough");
        user.phone = Some("call me maybe".into());
        let err = prepare_for_save(&mut user, None, Utc::now()).unwrap_err();
        let violations = err.violations().unwrap();
        assert!(violations.has_field("username"));
        assert!(violations.has_field("email"));
        assert!(violations.has_field("phone"));
    }

    #[test]
    fn test_public_profile_has_no_secrets() {
        let mut user = saved_user();
        user.first_name = Some(FirstName().fake());
        user.last_name = Some(LastName().fake());
        user.generate_password_reset_token(Utc::now());
        user.generate_verification_token();

        let json = serde_json::to_value(user.public_profile()).unwrap();
        let obj = json.as_object().unwrap();
        for key in [
            "password",
            "verificationToken",
            "passwordResetToken",
            "passwordResetExpires",
        ] {
            assert!(!obj.contains_key(key), "{} leaked", key);
        }
        assert_eq!(obj["username"], "nurse_joy");
        assert!(obj.contains_key("fullName"));
    }

    #[test]
    fn test_user_serialization_skips_secrets() {
        let mut user = saved_user();
        user.generate_password_reset_token(Utc::now());
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("passwordResetToken"));
        assert!(!json.contains("\"password\""));
    }

    #[test]
    fn test_reset_token_stored_as_digest_with_expiry() {
        let mut user = saved_user();
        let now = Utc::now();
        let token = user.generate_password_reset_token(now);

        assert_eq!(user.password_reset_token.as_deref(), Some(sha256_hex(&token).as_str()));
        assert_ne!(user.password_reset_token.as_deref(), Some(token.as_str()));
        assert_eq!(
            user.password_reset_expires,
            Some(now + Duration::minutes(30))
        );
        assert!(user.matches_reset_token(&token, now + Duration::minutes(29)));
        assert!(!user.matches_reset_token(&token, now + Duration::minutes(31)));
        assert!(!user.matches_reset_token("wrong", now));
    }

    #[test]
    fn test_reset_password_flow() {
        let previous = saved_user();
        let mut user = previous.clone();
        let now = Utc::now();
        let token = user.generate_password_reset_token(now);

        assert!(matches!(
            user.reset_password("bogus", "another-secret", now),
            Err(DomainError::InvalidToken)
        ));
        user.reset_password(&token, "another-secret", now).unwrap();
        assert!(user.password_reset_token.is_none());
        assert!(user.password_reset_expires.is_none());

        prepare_for_save(&mut user, Some(&previous), now).unwrap();
        assert!(user.compare_password("another-secret").unwrap());
    }

    #[test]
    fn test_verify_email() {
        let mut user = saved_user();
        let token = user.generate_verification_token();
        assert!(user.verify_email("nope").is_err());
        user.verify_email(&token).unwrap();
        assert!(user.is_verified);
        assert!(user.verification_token.is_none());
    }

    #[test]
    fn test_login_lockout() {
        let mut user = saved_user();
        let now = Utc::now();
        for _ in 0..MAX_LOGIN_ATTEMPTS {
            assert!(!user.is_locked(now));
            user.register_failed_login(now);
        }
        assert!(user.is_locked(now));
        assert!(!user.is_locked(now + Duration::hours(LOCK_DURATION_HOURS) + Duration::seconds(1)));

        let later = now + Duration::hours(3);
        user.register_failed_login(later);
        assert_eq!(user.login_attempts, 1);
        assert!(!user.is_locked(later));

        user.register_successful_login(later);
        assert_eq!(user.login_attempts, 0);
        assert_eq!(user.last_login, Some(later));
    }

    #[test]
    fn test_full_name_fallbacks() {
        let mut user = new_user();
        assert_eq!(user.full_name(), "nurse_joy");
        user.first_name = Some("Joy".into());
        assert_eq!(user.full_name(), "Joy");
        user.last_name = Some("Kimura".into());
        assert_eq!(user.full_name(), "Joy Kimura");
    }

    #[test]
    fn test_created_at_preserved_on_update() {
        let previous = saved_user();
        let mut user = previous.clone();
        user.created_at = Utc::now() + Duration::days(1);
        let now = Utc::now();
        prepare_for_save(&mut user, Some(&previous), now).unwrap();
        assert_eq!(user.created_at, previous.created_at);
        assert_eq!(user.updated_at, now);
    }
}
