//! Shared utilities and common types for the CareCMS backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Password hashing with Argon2id
//! - Token generation and one-way token digests
//! - Reusable field validators
//! - Text helpers (slugs, truncation, tag normalization)
//! - Cursor pagination

pub mod crypto;
pub mod pagination;
pub mod password;
pub mod text;
pub mod validation;
