//! User entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::UserRole;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for user_role that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum UserRoleDb {
    Admin,
    Editor,
    Author,
    Viewer,
}

impl From<UserRoleDb> for UserRole {
    fn from(db_role: UserRoleDb) -> Self {
        match db_role {
            UserRoleDb::Admin => UserRole::Admin,
            UserRoleDb::Editor => UserRole::Editor,
            UserRoleDb::Author => UserRole::Author,
            UserRoleDb::Viewer => UserRole::Viewer,
        }
    }
}

impl From<UserRole> for UserRoleDb {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Admin => UserRoleDb::Admin,
            UserRole::Editor => UserRoleDb::Editor,
            UserRole::Author => UserRoleDb::Author,
            UserRole::Viewer => UserRoleDb::Viewer,
        }
    }
}

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: UserRoleDb,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub verification_token: Option<String>,
    pub password_reset_token: Option<String>,
    pub password_reset_expires: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
    pub login_attempts: i32,
    pub lock_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserEntity> for domain::models::User {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            username: entity.username,
            email: entity.email,
            password: entity.password,
            password_is_hash: false,
            first_name: entity.first_name,
            last_name: entity.last_name,
            role: entity.role.into(),
            avatar: entity.avatar,
            bio: entity.bio,
            phone: entity.phone,
            department: entity.department,
            is_active: entity.is_active,
            is_verified: entity.is_verified,
            verification_token: entity.verification_token,
            password_reset_token: entity.password_reset_token,
            password_reset_expires: entity.password_reset_expires,
            last_login: entity.last_login,
            login_attempts: entity.login_attempts,
            lock_until: entity.lock_until,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
