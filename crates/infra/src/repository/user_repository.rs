//! # UserRepository
//!
//! Lưu trữ người dùng.
//!
//! ## Chính sách thiết kế
//!
//! - Email duy nhất do ràng buộc `users_email_key`; tầng usecase dịch
//!   vi phạm thành 409 Conflict
//! - Hash mật khẩu đi cùng bản ghi, không bao giờ trả ra ngoài API

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use khoahoc_domain::{
    password::PasswordHash,
    user::{Email, User, UserId, UserRole},
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::InfraError;

/// Tên ràng buộc UNIQUE trên cột email, dùng khi dịch lỗi trùng khoá
pub const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_key";

/// Trait repository người dùng
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Thêm người dùng mới
    ///
    /// Email trùng sẽ thất bại với vi phạm ràng buộc UNIQUE.
    async fn insert(&self, user: &User) -> Result<(), InfraError>;

    /// Tìm theo ID
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, InfraError>;

    /// Tìm theo email
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, InfraError>;

    /// Đếm số người dùng theo vai trò (dùng cho bootstrap admin đầu tiên)
    async fn count_by_role(&self, role: UserRole) -> Result<i64, InfraError>;
}

const SELECT_COLUMNS: &str =
    "id, email, name, password_hash, role, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id:            Uuid,
    email:         String,
    name:          String,
    password_hash: String,
    role:          String,
    created_at:    DateTime<Utc>,
    updated_at:    DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, InfraError> {
        Ok(User::from_db(
            UserId::from_uuid(self.id),
            Email::new(&self.email).map_err(|e| InfraError::Unexpected(e.to_string()))?,
            self.name,
            PasswordHash::new(self.password_hash),
            self.role
                .parse::<UserRole>()
                .map_err(|e| InfraError::Unexpected(e.to_string()))?,
            self.created_at,
            self.updated_at,
        ))
    }
}

/// Triển khai PostgreSQL
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn insert(&self, user: &User) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, password_hash, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id().as_uuid())
        .bind(user.email().as_str())
        .bind(user.name())
        .bind(user.password_hash().as_str())
        .bind(user.role().to_string())
        .bind(user.created_at())
        .bind(user.updated_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, InfraError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, InfraError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn count_by_role(&self, role: UserRole) -> Result<i64, InfraError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = $1")
            .bind(role.to_string())
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_là_send_và_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PostgresUserRepository>();
    }
}
