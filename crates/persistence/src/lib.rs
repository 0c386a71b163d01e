//! Persistence layer for CareCMS.
//!
//! This crate contains:
//! - Connection management for the selected environment
//! - Entity definitions (database row mappings)
//! - Repository implementations running the save-time transform
//! - Embedded SQL migrations

pub mod db;
pub mod entities;
pub mod error;
pub mod metrics;
pub mod repositories;

pub use db::{ConnectionError, ConnectionManager, DatabaseConfig, DatabaseEnvironments, Environment};
pub use error::RepositoryError;
