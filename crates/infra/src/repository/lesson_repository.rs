//! # LessonRepository
//!
//! CRUD bài học và thao tác đổi thứ tự.
//!
//! ## Đổi thứ tự (reorder)
//!
//! Ba bước dịch chuyển chạy trong **một transaction** với khoá hàng
//! `FOR UPDATE`:
//!
//! 1. đọc `order_index` hiện tại của bài học đích
//! 2. dịch ±1 các bài nằm giữa vị trí cũ và mới
//! 3. đặt bài học đích vào vị trí mới
//!
//! Hai request reorder đồng thời trên cùng khoá học sẽ tuần tự hoá qua
//! khoá hàng; ràng buộc UNIQUE `(course_id, order_index)` (DEFERRABLE)
//! chặn mọi trạng thái trùng lọt ra ngoài transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use khoahoc_domain::{
    course::CourseId,
    lesson::{Lesson, LessonId},
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::InfraError;

/// Dữ liệu cập nhật một phần: `None` nghĩa là giữ giá trị hiện có
#[derive(Debug, Default, Clone)]
pub struct LessonUpdate {
    pub title:       Option<String>,
    pub description: Option<String>,
    pub video_url:   Option<String>,
}

/// Trait repository bài học
#[async_trait]
pub trait LessonRepository: Send + Sync {
    async fn insert(&self, lesson: &Lesson) -> Result<(), InfraError>;

    async fn find_by_id(&self, id: &LessonId) -> Result<Option<Lesson>, InfraError>;

    /// Bài học của một khoá học, sắp theo `order_index` tăng dần
    async fn find_by_course(&self, course_id: &CourseId) -> Result<Vec<Lesson>, InfraError>;

    /// `order_index` kế tiếp khi thêm bài vào cuối khoá học
    async fn next_order_index(&self, course_id: &CourseId) -> Result<i32, InfraError>;

    /// Cập nhật một phần, trả về bản ghi sau cập nhật (`None` nếu không tồn tại)
    async fn update(
        &self,
        id: &LessonId,
        update: LessonUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Lesson>, InfraError>;

    /// Ghi thời lượng video (giây)
    ///
    /// Trả về `false` khi bài học không tồn tại.
    async fn set_duration(
        &self,
        id: &LessonId,
        duration_seconds: i32,
        now: DateTime<Utc>,
    ) -> Result<bool, InfraError>;

    /// Chuyển bài học tới vị trí mới trong khoá học của nó
    ///
    /// Trả về `false` khi bài học không tồn tại;
    /// [`InfraError::InvalidInput`] khi vị trí nằm ngoài `1..=số bài`.
    async fn reorder(
        &self,
        id: &LessonId,
        new_index: i32,
        now: DateTime<Utc>,
    ) -> Result<bool, InfraError>;

    /// Xoá bài học, trả về `false` khi không có bản ghi nào bị xoá
    async fn delete(&self, id: &LessonId) -> Result<bool, InfraError>;
}

const SELECT_COLUMNS: &str = "id, course_id, title, description, video_url, order_index, \
                              duration_seconds, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct LessonRow {
    id:               Uuid,
    course_id:        Uuid,
    title:            String,
    description:      Option<String>,
    video_url:        Option<String>,
    order_index:      i32,
    duration_seconds: Option<i32>,
    created_at:       DateTime<Utc>,
    updated_at:       DateTime<Utc>,
}

impl LessonRow {
    fn into_lesson(self) -> Lesson {
        Lesson::from_db(
            LessonId::from_uuid(self.id),
            CourseId::from_uuid(self.course_id),
            self.title,
            self.description,
            self.video_url,
            self.order_index,
            self.duration_seconds,
            self.created_at,
            self.updated_at,
        )
    }
}

/// Triển khai PostgreSQL
#[derive(Debug, Clone)]
pub struct PostgresLessonRepository {
    pool: PgPool,
}

impl PostgresLessonRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LessonRepository for PostgresLessonRepository {
    async fn insert(&self, lesson: &Lesson) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            INSERT INTO lessons
                (id, course_id, title, description, video_url, order_index,
                 duration_seconds, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(lesson.id().as_uuid())
        .bind(lesson.course_id().as_uuid())
        .bind(lesson.title())
        .bind(lesson.description())
        .bind(lesson.video_url())
        .bind(lesson.order_index())
        .bind(lesson.duration_seconds())
        .bind(lesson.created_at())
        .bind(lesson.updated_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: &LessonId) -> Result<Option<Lesson>, InfraError> {
        let row = sqlx::query_as::<_, LessonRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM lessons WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(LessonRow::into_lesson))
    }

    async fn find_by_course(&self, course_id: &CourseId) -> Result<Vec<Lesson>, InfraError> {
        let rows = sqlx::query_as::<_, LessonRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM lessons WHERE course_id = $1 ORDER BY order_index"
        ))
        .bind(course_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(LessonRow::into_lesson).collect())
    }

    async fn next_order_index(&self, course_id: &CourseId) -> Result<i32, InfraError> {
        let max: Option<i32> =
            sqlx::query_scalar("SELECT MAX(order_index) FROM lessons WHERE course_id = $1")
                .bind(course_id.as_uuid())
                .fetch_one(&self.pool)
                .await?;

        Ok(max.unwrap_or(0) + 1)
    }

    async fn update(
        &self,
        id: &LessonId,
        update: LessonUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Lesson>, InfraError> {
        let row = sqlx::query_as::<_, LessonRow>(&format!(
            r#"
            UPDATE lessons SET
                title       = COALESCE($2, title),
                description = COALESCE($3, description),
                video_url   = COALESCE($4, video_url),
                updated_at  = $5
            WHERE id = $1
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(update.title)
        .bind(update.description)
        .bind(update.video_url)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(LessonRow::into_lesson))
    }

    async fn set_duration(
        &self,
        id: &LessonId,
        duration_seconds: i32,
        now: DateTime<Utc>,
    ) -> Result<bool, InfraError> {
        let result =
            sqlx::query("UPDATE lessons SET duration_seconds = $2, updated_at = $3 WHERE id = $1")
                .bind(id.as_uuid())
                .bind(duration_seconds)
                .bind(now)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn reorder(
        &self,
        id: &LessonId,
        new_index: i32,
        now: DateTime<Utc>,
    ) -> Result<bool, InfraError> {
        let mut tx = self.pool.begin().await?;

        let Some((course_id, old_index)) = sqlx::query_as::<_, (Uuid, i32)>(
            "SELECT course_id, order_index FROM lessons WHERE id = $1 FOR UPDATE",
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Ok(false);
        };

        // Khoá toàn bộ bài học anh em: hai reorder đồng thời trên cùng
        // khoá học phải tuần tự hoá tại đây. ORDER BY id cố định thứ tự
        // lấy khoá, tránh deadlock giữa hai transaction
        sqlx::query("SELECT id FROM lessons WHERE course_id = $1 ORDER BY id FOR UPDATE")
            .bind(course_id)
            .execute(&mut *tx)
            .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lessons WHERE course_id = $1")
            .bind(course_id)
            .fetch_one(&mut *tx)
            .await?;

        if new_index < 1 || i64::from(new_index) > total {
            return Err(InfraError::InvalidInput(format!(
                "Vị trí {new_index} nằm ngoài khoảng 1..{total}"
            )));
        }

        if new_index == old_index {
            tx.commit().await?;
            return Ok(true);
        }

        if new_index < old_index {
            // Chuyển lên trên: các bài trong [new, old) tụt xuống một bậc
            sqlx::query(
                r#"
                UPDATE lessons SET order_index = order_index + 1
                WHERE course_id = $1 AND order_index >= $2 AND order_index < $3
                "#,
            )
            .bind(course_id)
            .bind(new_index)
            .bind(old_index)
            .execute(&mut *tx)
            .await?;
        } else {
            // Chuyển xuống dưới: các bài trong (old, new] nhích lên một bậc
            sqlx::query(
                r#"
                UPDATE lessons SET order_index = order_index - 1
                WHERE course_id = $1 AND order_index > $2 AND order_index <= $3
                "#,
            )
            .bind(course_id)
            .bind(old_index)
            .bind(new_index)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("UPDATE lessons SET order_index = $2, updated_at = $3 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(new_index)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn delete(&self, id: &LessonId) -> Result<bool, InfraError> {
        let result = sqlx::query("DELETE FROM lessons WHERE id = $1")
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
        assert_send_sync::<PostgresLessonRepository>();
    }
}
