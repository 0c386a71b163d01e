//! Domain layer for the CareCMS backend.
//!
//! This crate contains:
//! - Document schemas (User, Tag, Media, Seo, Settings, Page)
//! - The explicit save-time transform every write path runs
//! - Domain error types and structured validation violations

pub mod document;
pub mod error;
pub mod models;

pub use document::{prepare_for_save, Document};
pub use error::{DomainError, FieldViolation, Violations};
