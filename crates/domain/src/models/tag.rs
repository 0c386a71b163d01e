//! Tag domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::text::slugify;
use shared::validation::{validate_hex_color, validate_slug};
use uuid::Uuid;
use validator::Validate;

use crate::document::Document;
use crate::error::{DomainError, Violations};

pub const DEFAULT_TAG_COLOR: &str = "#3B82F6";

/// A categorization label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: Uuid,

    #[validate(length(min = 1, max = 50, message = "Tag name must be 1-50 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 60, message = "Tag slug must be 1-60 characters"))]
    #[validate(custom(function = "validate_slug"))]
    pub slug: String,

    #[validate(length(max = 200, message = "Description cannot exceed 200 characters"))]
    pub description: Option<String>,

    #[validate(custom(function = "validate_hex_color"))]
    pub color: String,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tag {
    /// Creates an unsaved tag; the slug is derived on save.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            slug: String::new(),
            description: None,
            color: DEFAULT_TAG_COLOR.to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Document for Tag {
    const COLLECTION: &'static str = "tags";

    fn id(&self) -> Uuid {
        self.id
    }

    fn normalize(&mut self, _previous: Option<&Self>, _now: DateTime<Utc>) {
        self.name = self.name.trim().to_string();
        let slug = self.slug.trim();
        self.slug = if slug.is_empty() {
            slugify(&self.name)
        } else {
            slug.to_lowercase()
        };
        self.color = self.color.trim().to_uppercase();
    }

    fn check(&self, _previous: Option<&Self>) -> Violations {
        self.validate().into()
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

    #[test]
    fn test_slug_derived_from_name() {
        let mut tag = Tag::new("  Heart Health ");
        prepare_for_save(&mut tag, None, Utc::now()).unwrap();
        assert_eq!(tag.name, "Heart Health");
        assert_eq!(tag.slug, "heart-health");
        assert_eq!(tag.color, DEFAULT_TAG_COLOR);
    }

    #[test]
    fn test_turkish_name_slug_transliterated() {
        let mut tag = Tag::new("Çocuk Sağlığı");
        prepare_for_save(&mut tag, None, Utc::now()).unwrap();
        assert_eq!(tag.slug, "cocuk-sagligi");
    }

    #[test]
    fn test_explicit_slug_is_lowercased() {
        let mut tag = Tag::new("Pediatrics");
        tag.slug = "Kids-Care".into();
        tag.color = "#ff00aa".into();
        prepare_for_save(&mut tag, None, Utc::now()).unwrap();
        assert_eq!(tag.slug, "kids-care");
        assert_eq!(tag.color, "#FF00AA");
    }

    #[test]
    fn test_invalid_tag_rejected() {
        let mut tag = Tag::new("");
        tag.color = "blue".into();
        let err = prepare_for_save(&mut tag, None, Utc::now()).unwrap_err();
        let violations = err.violations().unwrap();
        assert!(violations.has_field("name"));
        assert!(violations.has_field("slug"));
        assert!(violations.has_field("color"));
    }
}
