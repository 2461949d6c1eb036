//! # CourseRepository
//!
//! CRUD khoá học. Cập nhật một phần theo ngữ nghĩa COALESCE (field không
//! truyền giữ nguyên giá trị cũ). Xoá dựa vào FK cascade ở tầng lưu trữ
//! để dọn bài học / tệp đính kèm, không xoá tay trong code ứng dụng.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use khoahoc_domain::{
    course::{Course, CourseId, CourseStatus},
    instructor::InstructorId,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::InfraError;

/// Dữ liệu cập nhật một phần: `None` nghĩa là giữ giá trị hiện có
#[derive(Debug, Default, Clone)]
pub struct CourseUpdate {
    pub title:         Option<String>,
    pub description:   Option<String>,
    pub price:         Option<i64>,
    pub status:        Option<CourseStatus>,
    pub instructor_id: Option<InstructorId>,
    pub thumbnail_url: Option<String>,
}

/// Trait repository khoá học
#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn insert(&self, course: &Course) -> Result<(), InfraError>;

    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, InfraError>;

    /// Toàn bộ khoá học, mới tạo trước
    async fn find_all(&self) -> Result<Vec<Course>, InfraError>;

    /// Cập nhật một phần, trả về bản ghi sau cập nhật
    ///
    /// `None` khi khoá học không tồn tại.
    async fn update(
        &self,
        id: &CourseId,
        update: CourseUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Course>, InfraError>;

    /// Xoá khoá học; bài học và dữ liệu phụ thuộc bị xoá theo FK cascade
    ///
    /// Trả về `false` khi không có bản ghi nào bị xoá.
    async fn delete(&self, id: &CourseId) -> Result<bool, InfraError>;
}

const SELECT_COLUMNS: &str =
    "id, title, description, price, status, instructor_id, thumbnail_url, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct CourseRow {
    id:            Uuid,
    title:         String,
    description:   Option<String>,
    price:         i64,
    status:        String,
    instructor_id: Option<Uuid>,
    thumbnail_url: Option<String>,
    created_at:    DateTime<Utc>,
    updated_at:    DateTime<Utc>,
}

impl CourseRow {
    fn into_course(self) -> Result<Course, InfraError> {
        Ok(Course::from_db(
            CourseId::from_uuid(self.id),
            self.title,
            self.description,
            self.price,
            self.status
                .parse::<CourseStatus>()
                .map_err(|e| InfraError::Unexpected(e.to_string()))?,
            self.instructor_id.map(InstructorId::from_uuid),
            self.thumbnail_url,
            self.created_at,
            self.updated_at,
        ))
    }
}

/// Triển khai PostgreSQL
#[derive(Debug, Clone)]
pub struct PostgresCourseRepository {
    pool: PgPool,
}

impl PostgresCourseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CourseRepository for PostgresCourseRepository {
    async fn insert(&self, course: &Course) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            INSERT INTO courses
                (id, title, description, price, status, instructor_id, thumbnail_url,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(course.id().as_uuid())
        .bind(course.title())
        .bind(course.description())
        .bind(course.price())
        .bind(course.status().to_string())
        .bind(course.instructor_id().map(|i| *i.as_uuid()))
        .bind(course.thumbnail_url())
        .bind(course.created_at())
        .bind(course.updated_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, InfraError> {
        let row = sqlx::query_as::<_, CourseRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM courses WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(CourseRow::into_course).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Course>, InfraError> {
        let rows = sqlx::query_as::<_, CourseRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM courses ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CourseRow::into_course).collect()
    }

    async fn update(
        &self,
        id: &CourseId,
        update: CourseUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Course>, InfraError> {
        let row = sqlx::query_as::<_, CourseRow>(&format!(
            r#"
            UPDATE courses SET
                title         = COALESCE($2, title),
                description   = COALESCE($3, description),
                price         = COALESCE($4, price),
                status        = COALESCE($5, status),
                instructor_id = COALESCE($6, instructor_id),
                thumbnail_url = COALESCE($7, thumbnail_url),
                updated_at    = $8
            WHERE id = $1
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(update.title)
        .bind(update.description)
        .bind(update.price)
        .bind(update.status.map(|s| s.to_string()))
        .bind(update.instructor_id.map(|i| *i.as_uuid()))
        .bind(update.thumbnail_url)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        row.map(CourseRow::into_course).transpose()
    }

    async fn delete(&self, id: &CourseId) -> Result<bool, InfraError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_là_send_và_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PostgresCourseRepository>();
    }
}
