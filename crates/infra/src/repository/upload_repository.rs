//! # UploadRepository
//!
//! Bản ghi metadata tệp tải lên. Xoá chỉ gỡ bản ghi DB; object phía sau
//! giữ nguyên (quyết định sản phẩm còn bỏ ngỏ, xem DESIGN.md).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use khoahoc_domain::{
    lesson::LessonId,
    upload::{Upload, UploadId, UploadKind},
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::InfraError;

/// Trait repository tệp tải lên
#[async_trait]
pub trait UploadRepository: Send + Sync {
    async fn insert(&self, upload: &Upload) -> Result<(), InfraError>;

    /// Tệp của một bài học theo loại, mới nhất trước
    async fn find_by_lesson(
        &self,
        lesson_id: &LessonId,
        kind: UploadKind,
    ) -> Result<Vec<Upload>, InfraError>;

    /// Xoá bản ghi, trả về bản ghi đã xoá để tầng gọi ghi log key mồ côi
    async fn delete(&self, id: &UploadId) -> Result<Option<Upload>, InfraError>;
}

const SELECT_COLUMNS: &str =
    "id, lesson_id, file_name, s3_key, content_type, kind, size_bytes, created_at";

#[derive(sqlx::FromRow)]
struct UploadRow {
    id:           Uuid,
    lesson_id:    Option<Uuid>,
    file_name:    String,
    s3_key:       String,
    content_type: String,
    kind:         String,
    size_bytes:   Option<i64>,
    created_at:   DateTime<Utc>,
}

impl UploadRow {
    fn into_upload(self) -> Result<Upload, InfraError> {
        Ok(Upload::from_db(
            UploadId::from_uuid(self.id),
            self.lesson_id.map(LessonId::from_uuid),
            self.file_name,
            self.s3_key,
            self.content_type,
            self.kind
                .parse::<UploadKind>()
                .map_err(|e| InfraError::Unexpected(e.to_string()))?,
            self.size_bytes,
            self.created_at,
        ))
    }
}

/// Triển khai PostgreSQL
#[derive(Debug, Clone)]
pub struct PostgresUploadRepository {
    pool: PgPool,
}

impl PostgresUploadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UploadRepository for PostgresUploadRepository {
    async fn insert(&self, upload: &Upload) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            INSERT INTO uploads
                (id, lesson_id, file_name, s3_key, content_type, kind, size_bytes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(upload.id().as_uuid())
        .bind(upload.lesson_id().map(|l| *l.as_uuid()))
        .bind(upload.file_name())
        .bind(upload.s3_key())
        .bind(upload.content_type())
        .bind(upload.kind().to_string())
        .bind(upload.size_bytes())
        .bind(upload.created_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_lesson(
        &self,
        lesson_id: &LessonId,
        kind: UploadKind,
    ) -> Result<Vec<Upload>, InfraError> {
        let rows = sqlx::query_as::<_, UploadRow>(&format!(
            r#"
            SELECT {SELECT_COLUMNS} FROM uploads
            WHERE lesson_id = $1 AND kind = $2
            ORDER BY created_at DESC
            "#
        ))
        .bind(lesson_id.as_uuid())
        .bind(kind.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(UploadRow::into_upload).collect()
    }

    async fn delete(&self, id: &UploadId) -> Result<Option<Upload>, InfraError> {
        let row = sqlx::query_as::<_, UploadRow>(&format!(
            "DELETE FROM uploads WHERE id = $1 RETURNING {SELECT_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UploadRow::into_upload).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_là_send_và_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PostgresUploadRepository>();
    }
}
