//! # Tệp tải lên
//!
//! Bản ghi metadata của tệp đã tải lên object storage. Byte thật nằm trên
//! S3-compatible storage, ứng dụng chỉ giữ key và thông tin mô tả.
//!
//! Xoá bản ghi **không** xoá object phía sau (xem DESIGN.md, Open Question).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::{DomainError, lesson::LessonId};

define_uuid_id! {
    /// ID bản ghi tải lên
    pub struct UploadId;
}

/// Loại tệp tải lên
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UploadKind {
    /// Tài liệu (PDF, slide, ...)
    Document,
    /// Video bài giảng
    Video,
}

impl std::str::FromStr for UploadKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "document" => Ok(Self::Document),
            "video" => Ok(Self::Video),
            _ => Err(DomainError::Validation(format!(
                "Loại tệp không hợp lệ: {s}"
            ))),
        }
    }
}

/// Bản ghi metadata của một tệp đã tải lên
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    id:           UploadId,
    lesson_id:    Option<LessonId>,
    file_name:    String,
    s3_key:       String,
    content_type: String,
    kind:         UploadKind,
    size_bytes:   Option<i64>,
    created_at:   DateTime<Utc>,
}

impl Upload {
    /// Tạo bản ghi tải lên mới
    pub fn new(
        id: UploadId,
        lesson_id: Option<LessonId>,
        file_name: impl Into<String>,
        s3_key: impl Into<String>,
        content_type: impl Into<String>,
        kind: UploadKind,
        size_bytes: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let file_name = file_name.into().trim().to_string();
        if file_name.is_empty() {
            return Err(DomainError::Validation("Tên tệp là bắt buộc".to_string()));
        }

        let s3_key = s3_key.into();
        if s3_key.is_empty() {
            return Err(DomainError::Validation("Key lưu trữ là bắt buộc".to_string()));
        }

        Ok(Self {
            id,
            lesson_id,
            file_name,
            s3_key,
            content_type: content_type.into(),
            kind,
            size_bytes,
            created_at: now,
        })
    }

    /// Khôi phục entity từ dữ liệu đã lưu
    #[allow(clippy::too_many_arguments)]
    pub fn from_db(
        id: UploadId,
        lesson_id: Option<LessonId>,
        file_name: String,
        s3_key: String,
        content_type: String,
        kind: UploadKind,
        size_bytes: Option<i64>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            lesson_id,
            file_name,
            s3_key,
            content_type,
            kind,
            size_bytes,
            created_at,
        }
    }

    pub fn id(&self) -> &UploadId {
        &self.id
    }

    pub fn lesson_id(&self) -> Option<&LessonId> {
        self.lesson_id.as_ref()
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn s3_key(&self) -> &str {
        &self.s3_key
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn kind(&self) -> UploadKind {
        self.kind
    }

    pub fn size_bytes(&self) -> Option<i64> {
        self.size_bytes
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[rstest]
    fn test_tên_tệp_rỗng_bị_từ_chối(now: DateTime<Utc>) {
        let result = Upload::new(
            UploadId::new(),
            None,
            "",
            "documents/123-abc.pdf",
            "application/pdf",
            UploadKind::Document,
            None,
            now,
        );
        assert!(result.is_err());
    }

    #[rstest]
    #[case("document", UploadKind::Document)]
    #[case("video", UploadKind::Video)]
    fn test_parse_loại_tệp(#[case] input: &str, #[case] expected: UploadKind) {
        assert_eq!(input.parse::<UploadKind>().unwrap(), expected);
    }
}
