//! Common helpers for repository integration tests.
//!
//! Tests run against the database named by `TEST_DATABASE_URL`. When the
//! variable is unset, [`test_pool`] returns `None` and callers return early.

#![allow(dead_code)]

use domain::models::media::Media;
use domain::models::{Page, User};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use persistence::db::MIGRATOR;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Creates a migrated pool, or `None` when no test database is configured.
pub async fn test_pool() -> Option<PgPool> {
    let url = match std::env::var("TEST_DATABASE_URL") {
        Ok(url) if !url.trim().is_empty() => url,
        _ => {
            eprintln!("TEST_DATABASE_URL not set, skipping database test");
            return None;
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&url)
        .await
        .expect("Failed to connect to test database");

    MIGRATOR
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    Some(pool)
}

/// Short random suffix keeping unique columns apart across tests.
pub fn unique_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..12].to_string()
}

pub fn test_user() -> User {
    let suffix = unique_suffix();
    let email: String = SafeEmail().fake();
    let mut user = User::new(
        format!("user_{}", suffix),
        format!("{}.{}", suffix, email),
        TEST_PASSWORD,
    );
    user.first_name = Some(FirstName().fake());
    user.last_name = Some(LastName().fake());
    user
}

pub fn test_page(author: Uuid) -> Page {
    Page::new(
        format!("Patient Resources {}", unique_suffix()),
        "<p>Forms and guides for new patients.</p>",
        author,
    )
}

pub fn test_image() -> Media {
    let suffix = unique_suffix();
    Media::new(
        format!("{}.jpg", suffix),
        "waiting-room.jpg",
        "image/jpeg",
        120_000,
        format!("/uploads/{}.jpg", suffix),
    )
    .with_dimensions(1200, 800)
}
