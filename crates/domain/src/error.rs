//! Domain error types.

use serde::Serialize;
use shared::password::PasswordError;
use std::fmt;
use thiserror::Error;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

/// Errors raised while preparing or mutating a document.
#[derive(Debug, Error)]
pub enum DomainError {
    /// One or more field-level constraints failed.
    #[error("Validation failed: {0}")]
    Validation(Violations),

    /// A save-time rule spanning several fields failed.
    #[error("{0}")]
    Rule(String),

    #[error("Version {0} not found")]
    VersionNotFound(i32),

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl DomainError {
    pub fn rule(message: impl Into<String>) -> Self {
        DomainError::Rule(message.into())
    }

    /// Returns the violations when this is a validation failure.
    pub fn violations(&self) -> Option<&Violations> {
        match self {
            DomainError::Validation(v) => Some(v),
            _ => None,
        }
    }
}

/// A single field-level violation. Nested fields use dotted paths
/// (`seo.meta_title`, `sections[2].title`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl FieldViolation {
    fn from_error(field: &str, err: &ValidationError) -> Self {
        Self {
            field: field.to_string(),
            code: err.code.to_string(),
            message: err
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("{} is invalid ({})", field, err.code)),
        }
    }
}

/// Structured list of field-level violations, sorted by field path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Violations(Vec<FieldViolation>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.0.push(FieldViolation {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        });
    }

    pub fn push_error(&mut self, field: &str, err: &ValidationError) {
        self.0.push(FieldViolation::from_error(field, err));
    }

    /// Flattens `validator` output (including nested structs and lists) into
    /// this list.
    pub fn extend_from(&mut self, errors: &ValidationErrors) {
        collect("", errors, &mut self.0);
        self.0.sort_by(|a, b| a.field.cmp(&b.field));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldViolation> {
        self.0.iter()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|v| v.field == field)
    }

    pub fn into_result(self) -> Result<(), DomainError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self))
        }
    }
}

impl From<ValidationErrors> for Violations {
    fn from(errors: ValidationErrors) -> Self {
        let mut v = Violations::new();
        v.extend_from(&errors);
        v
    }
}

impl From<Result<(), ValidationErrors>> for Violations {
    fn from(result: Result<(), ValidationErrors>) -> Self {
        match result {
            Ok(()) => Violations::new(),
            Err(errors) => errors.into(),
        }
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|v| format!("{}: {}", v.field, v.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

fn collect(prefix: &str, errors: &ValidationErrors, out: &mut Vec<FieldViolation>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                out.extend(errs.iter().map(|e| FieldViolation::from_error(&path, e)));
            }
            ValidationErrorsKind::Struct(inner) => collect(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    collect(&format!("{}[{}]", path, idx), inner, out);
                }
            }
        }
    }
}
