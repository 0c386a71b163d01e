//! User repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::{User, UserRole};
use domain::prepare_for_save;
use shared::crypto::sha256_hex;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::entities::{UserEntity, UserRoleDb};
use crate::error::RepositoryError;
use crate::metrics::QueryTimer;

macro_rules! user_columns {
    () => {
        r#"id, username, email, password, first_name, last_name, role, avatar, bio, phone,
           department, is_active, is_verified, verification_token, password_reset_token,
           password_reset_expires, last_login, login_attempts, lock_until, created_at, updated_at"#
    };
}

/// Repository for user-related database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Validates, hashes a changed password and upserts the user.
    ///
    /// Password hashing runs on the blocking thread pool.
    pub async fn save(&self, user: User) -> Result<User, RepositoryError> {
        let timer = QueryTimer::new("users", "save");
        let mut tx = self.pool.begin().await?;

        let previous: Option<User> = sqlx::query_as::<_, UserEntity>(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users WHERE id = $1 FOR UPDATE"
        ))
        .bind(user.id)
        .fetch_optional(&mut *tx)
        .await?
        .map(Into::into);

        let user = tokio::task::spawn_blocking(move || {
            let mut user = user;
            prepare_for_save(&mut user, previous.as_ref(), Utc::now()).map(|()| user)
        })
        .await??;

        let result = sqlx::query_as::<_, UserEntity>(concat!(
            r#"
            INSERT INTO users (
                id, username, email, password, first_name, last_name, role, avatar, bio, phone,
                department, is_active, is_verified, verification_token, password_reset_token,
                password_reset_expires, last_login, login_attempts, lock_until, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                    $18, $19, $20, $21)
            ON CONFLICT (id) DO UPDATE SET
                username = EXCLUDED.username,
                email = EXCLUDED.email,
                password = EXCLUDED.password,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                role = EXCLUDED.role,
                avatar = EXCLUDED.avatar,
                bio = EXCLUDED.bio,
                phone = EXCLUDED.phone,
                department = EXCLUDED.department,
                is_active = EXCLUDED.is_active,
                is_verified = EXCLUDED.is_verified,
                verification_token = EXCLUDED.verification_token,
                password_reset_token = EXCLUDED.password_reset_token,
                password_reset_expires = EXCLUDED.password_reset_expires,
                last_login = EXCLUDED.last_login,
                login_attempts = EXCLUDED.login_attempts,
                lock_until = EXCLUDED.lock_until,
                updated_at = EXCLUDED.updated_at
            RETURNING "#,
            user_columns!()
        ))
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(UserRoleDb::from(user.role))
        .bind(&user.avatar)
        .bind(&user.bio)
        .bind(&user.phone)
        .bind(&user.department)
        .bind(user.is_active)
        .bind(user.is_verified)
        .bind(&user.verification_token)
        .bind(&user.password_reset_token)
        .bind(user.password_reset_expires)
        .bind(user.last_login)
        .bind(user.login_attempts)
        .bind(user.lock_until)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&mut *tx)
        .await;
        timer.observe(&result);
        let saved = result?;

        tx.commit().await?;
        info!(user_id = %saved.id, role = ?saved.role, "User saved");
        Ok(saved.into())
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        let timer = QueryTimer::new("users", "find_by_id");
        let result = sqlx::query_as::<_, UserEntity>(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.observe(&result);
        Ok(result?.map(Into::into))
    }

    /// Find a user by email address (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let timer = QueryTimer::new("users", "find_by_email");
        let result = sqlx::query_as::<_, UserEntity>(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users WHERE email = $1"
        ))
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await;
        timer.observe(&result);
        Ok(result?.map(Into::into))
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let timer = QueryTimer::new("users", "find_by_username");
        let result = sqlx::query_as::<_, UserEntity>(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users WHERE username = $1"
        ))
        .bind(username.trim())
        .fetch_optional(&self.pool)
        .await;
        timer.observe(&result);
        Ok(result?.map(Into::into))
    }

    /// Looks up the user holding an unexpired reset token. Only the digest of
    /// `token` is compared.
    pub async fn find_by_reset_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, RepositoryError> {
        let timer = QueryTimer::new("users", "find_by_reset_token");
        let result = sqlx::query_as::<_, UserEntity>(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users WHERE password_reset_token = $1 AND password_reset_expires > $2"
        ))
        .bind(sha256_hex(token))
        .bind(now)
        .fetch_optional(&self.pool)
        .await;
        timer.observe(&result);
        Ok(result?.map(Into::into))
    }

    /// Checks a login. `login` may be an email address or a username.
    ///
    /// Returns `None` for unknown, inactive or locked accounts and for a wrong
    /// password. Failed attempts are counted and lead to a temporary lock.
    pub async fn verify_credentials(
        &self,
        login: &str,
        candidate: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let user = if login.contains('@') {
            self.find_by_email(login).await?
        } else {
            self.find_by_username(login).await?
        };
        let Some(user) = user else {
            return Ok(None);
        };

        let now = Utc::now();
        if !user.is_active || user.is_locked(now) {
            warn!(user_id = %user.id, "Login rejected for inactive or locked account");
            return Ok(None);
        }

        let candidate = candidate.to_owned();
        let (user, matches) = tokio::task::spawn_blocking(move || {
            let matches = user.compare_password(&candidate);
            (user, matches)
        })
        .await?;

        if matches? {
            Ok(Some(user))
        } else {
            self.record_failed_login(user.id, now).await?;
            Ok(None)
        }
    }

    /// Resets login counters and stamps `last_login`.
    pub async fn record_login(&self, id: Uuid, now: DateTime<Utc>) -> Result<(), RepositoryError> {
        let timer = QueryTimer::new("users", "record_login");
        let result = sqlx::query(
            r#"
            UPDATE users
            SET last_login = $1, login_attempts = 0, lock_until = NULL, updated_at = $1
            WHERE id = $2
            "#,
        )
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await;
        timer.observe(&result);
        if result?.rows_affected() == 0 {
            return Err(RepositoryError::not_found("User"));
        }
        Ok(())
    }

    async fn record_failed_login(&self, id: Uuid, now: DateTime<Utc>) -> Result<(), RepositoryError> {
        let timer = QueryTimer::new("users", "record_failed_login");
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UserEntity>(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(row) = row else {
            return Ok(());
        };

        let mut user: User = row.into();
        user.register_failed_login(now);

        let result = sqlx::query(
            r#"
            UPDATE users
            SET login_attempts = $1, lock_until = $2, updated_at = $3
            WHERE id = $4
            "#,
        )
        .bind(user.login_attempts)
        .bind(user.lock_until)
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await;
        timer.observe(&result);
        result?;
        tx.commit().await?;

        if user.is_locked(now) {
            warn!(user_id = %id, attempts = user.login_attempts, "Account locked after failed logins");
        }
        Ok(())
    }

    /// Active users, optionally restricted to one role, ordered by username.
    pub async fn list_active(&self, role: Option<UserRole>) -> Result<Vec<User>, RepositoryError> {
        let timer = QueryTimer::new("users", "list_active");
        let result = sqlx::query_as::<_, UserEntity>(concat!(
            "SELECT ",
            user_columns!(),
            r#" FROM users
            WHERE is_active = true AND ($1::user_role IS NULL OR role = $1)
            ORDER BY username ASC"#
        ))
        .bind(role.map(UserRoleDb::from))
        .fetch_all(&self.pool)
        .await;
        timer.observe(&result);
        Ok(result?.into_iter().map(Into::into).collect())
    }
}
