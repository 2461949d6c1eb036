//! # InstructorRepository
//!
//! Lưu trữ giảng viên. Danh sách công khai chỉ trả giảng viên `active`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use khoahoc_domain::instructor::{Instructor, InstructorId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::InfraError;

/// Trait repository giảng viên
#[async_trait]
pub trait InstructorRepository: Send + Sync {
    async fn insert(&self, instructor: &Instructor) -> Result<(), InfraError>;

    async fn find_by_id(&self, id: &InstructorId) -> Result<Option<Instructor>, InfraError>;

    /// Toàn bộ giảng viên (trang quản trị)
    async fn find_all(&self) -> Result<Vec<Instructor>, InfraError>;

    /// Giảng viên đang hoạt động (trang công khai)
    async fn find_active(&self) -> Result<Vec<Instructor>, InfraError>;
}

const SELECT_COLUMNS: &str = "id, name, title, bio, avatar_url, active, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct InstructorRow {
    id:         Uuid,
    name:       String,
    title:      Option<String>,
    bio:        Option<String>,
    avatar_url: Option<String>,
    active:     bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl InstructorRow {
    fn into_instructor(self) -> Instructor {
        Instructor::from_db(
            InstructorId::from_uuid(self.id),
            self.name,
            self.title,
            self.bio,
            self.avatar_url,
            self.active,
            self.created_at,
            self.updated_at,
        )
    }
}

/// Triển khai PostgreSQL
#[derive(Debug, Clone)]
pub struct PostgresInstructorRepository {
    pool: PgPool,
}

impl PostgresInstructorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InstructorRepository for PostgresInstructorRepository {
    async fn insert(&self, instructor: &Instructor) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            INSERT INTO instructors
                (id, name, title, bio, avatar_url, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(instructor.id().as_uuid())
        .bind(instructor.name())
        .bind(instructor.title())
        .bind(instructor.bio())
        .bind(instructor.avatar_url())
        .bind(instructor.is_active())
        .bind(instructor.created_at())
        .bind(instructor.updated_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: &InstructorId) -> Result<Option<Instructor>, InfraError> {
        let row = sqlx::query_as::<_, InstructorRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM instructors WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(InstructorRow::into_instructor))
    }

    async fn find_all(&self) -> Result<Vec<Instructor>, InfraError> {
        let rows = sqlx::query_as::<_, InstructorRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM instructors ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(InstructorRow::into_instructor).collect())
    }

    async fn find_active(&self) -> Result<Vec<Instructor>, InfraError> {
        let rows = sqlx::query_as::<_, InstructorRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM instructors WHERE active ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(InstructorRow::into_instructor).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_là_send_và_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PostgresInstructorRepository>();
    }
}
