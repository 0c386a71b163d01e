//! Common validation utilities.
//!
//! Every function returns a `validator::ValidationError` so it can be plugged
//! into `#[validate(custom(function = "..."))]` or called from hand-written
//! save-time checks.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
    static ref USERNAME_REGEX: Regex = Regex::new(r"^[A-Za-z0-9_]+$").unwrap();
    static ref HEX_COLOR_REGEX: Regex = Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap();
    static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9 ()\-.]{7,20}$").unwrap();
}

/// MIME types accepted for uploaded media.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/svg+xml",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "video/mp4",
    "video/webm",
    "audio/mpeg",
    "audio/wav",
];

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Validates a URL slug: lower-case letters, digits and single hyphens.
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if SLUG_REGEX.is_match(slug) {
        Ok(())
    } else {
        Err(error(
            "slug_format",
            "Slug may only contain lowercase letters, numbers, and hyphens",
        ))
    }
}

/// Validates a username: ASCII letters, digits and underscores.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if USERNAME_REGEX.is_match(username) {
        Ok(())
    } else {
        Err(error(
            "username_format",
            "Username may only contain letters, numbers, and underscores",
        ))
    }
}

/// Validates a `#RRGGBB` colour.
pub fn validate_hex_color(color: &str) -> Result<(), ValidationError> {
    if HEX_COLOR_REGEX.is_match(color) {
        Ok(())
    } else {
        Err(error("hex_color", "Color must be a hex value like #1A2B3C"))
    }
}

/// Validates a phone number loosely (digits, spaces, dashes, dots, parentheses).
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if PHONE_REGEX.is_match(phone) {
        Ok(())
    } else {
        Err(error("phone_format", "Phone number format is invalid"))
    }
}

/// Validates a percentage (0 to 100).
pub fn validate_percentage(value: i32) -> Result<(), ValidationError> {
    if (0..=100).contains(&value) {
        Ok(())
    } else {
        Err(error("percentage_range", "Value must be between 0 and 100"))
    }
}

/// Validates a value in the closed unit interval (0.0 to 1.0).
pub fn validate_unit_interval(value: f64) -> Result<(), ValidationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(error("unit_interval", "Value must be between 0 and 1"))
    }
}

/// Validates a MIME type against [`ALLOWED_MIME_TYPES`].
pub fn validate_mime_type(mime: &str) -> Result<(), ValidationError> {
    if ALLOWED_MIME_TYPES.contains(&mime) {
        Ok(())
    } else {
        Err(error("mime_type", "File type is not allowed"))
    }
}

/// Validates a link that is either an absolute http(s) URL or a site path.
pub fn validate_link(link: &str) -> Result<(), ValidationError> {
    let absolute = link.starts_with("http://") || link.starts_with("https://");
    let path = link.starts_with('/') && !link.starts_with("//");
    if (absolute || path) && !link.chars().any(char::is_whitespace) {
        Ok(())
    } else {
        Err(error(
            "link_format",
            "Link must be an http(s) URL or a path starting with /",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_slug() {
        assert!(validate_slug("about-us").is_ok());
        assert!(validate_slug("covid-19").is_ok());
        assert!(validate_slug("a").is_ok());
        assert!(validate_slug("About-Us").is_err());
        assert!(validate_slug("about--us").is_err());
        assert!(validate_slug("-about").is_err());
        assert!(validate_slug("about us").is_err());
        assert!(validate_slug("").is_err());
    }

    #[test]
    fn test_validate_slug_error_message() {
        let err = validate_slug("Bad Slug").unwrap_err();
        assert_eq!(err.code, "slug_format");
        assert_eq!(
            err.message.unwrap().to_string(),
            "Slug may only contain lowercase letters, numbers, and hyphens"
        );
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("dr_smith42").is_ok());
        assert!(validate_username("dr.smith").is_err());
        assert!(validate_username("dr smith").is_err());
    }

    #[test]
    fn test_validate_hex_color() {
        assert!(validate_hex_color("#3B82F6").is_ok());
        assert!(validate_hex_color("#ffffff").is_ok());
        assert!(validate_hex_color("3B82F6").is_err());
        assert!(validate_hex_color("#FFF").is_err());
        assert!(validate_hex_color("#GGGGGG").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+1 (555) 123-4567").is_ok());
        assert!(validate_phone("555.123.4567").is_ok());
        assert!(validate_phone("call me").is_err());
        assert!(validate_phone("123").is_err());
    }

    #[test]
    fn test_validate_percentage() {
        assert!(validate_percentage(0).is_ok());
        assert!(validate_percentage(85).is_ok());
        assert!(validate_percentage(100).is_ok());
        assert!(validate_percentage(-1).is_err());
        assert!(validate_percentage(101).is_err());
    }

    #[test]
    fn test_validate_unit_interval() {
        assert!(validate_unit_interval(0.0).is_ok());
        assert!(validate_unit_interval(0.5).is_ok());
        assert!(validate_unit_interval(1.0).is_ok());
        assert!(validate_unit_interval(1.01).is_err());
        assert!(validate_unit_interval(-0.1).is_err());
    }

    #[test]
    fn test_validate_mime_type() {
        assert!(validate_mime_type("image/png").is_ok());
        assert!(validate_mime_type("application/pdf").is_ok());
        assert!(validate_mime_type("application/x-msdownload").is_err());
        assert!(validate_mime_type("IMAGE/PNG").is_err());
    }

    #[test]
    fn test_validate_link() {
        assert!(validate_link("/services/cardiology").is_ok());
        assert!(validate_link("https://clinic.example/about").is_ok());
        assert!(validate_link("//evil.example").is_err());
        assert!(validate_link("ftp://files.example").is_err());
        assert!(validate_link("/has space").is_err());
    }
}
