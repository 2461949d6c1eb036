//! # Khoá học
//!
//! Entity khoá học. Một khoá học có nhiều bài học ([`crate::lesson::Lesson`])
//! và tham chiếu tới một giảng viên ([`crate::instructor::InstructorId`]).
//!
//! ## Bất biến
//!
//! - Giá không âm, mặc định `0` (khoá học miễn phí)
//! - Trạng thái mặc định khi tạo là [`CourseStatus::Draft`]
//! - Xoá khoá học kéo theo xoá bài học ở tầng lưu trữ (FK cascade)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::{DomainError, instructor::InstructorId};

define_uuid_id! {
    /// ID khoá học
    pub struct CourseId;
}

/// Trạng thái vòng đời của khoá học
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CourseStatus {
    /// Bản nháp, chưa hiển thị công khai
    Draft,
    /// Đã xuất bản
    Published,
    /// Đã lưu trữ
    Archived,
}

impl std::str::FromStr for CourseStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "archived" => Ok(Self::Archived),
            _ => Err(DomainError::Validation(format!(
                "Trạng thái khoá học không hợp lệ: {s}"
            ))),
        }
    }
}

/// Entity khoá học
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    id:            CourseId,
    title:         String,
    description:   Option<String>,
    price:         i64,
    status:        CourseStatus,
    instructor_id: Option<InstructorId>,
    thumbnail_url: Option<String>,
    created_at:    DateTime<Utc>,
    updated_at:    DateTime<Utc>,
}

impl Course {
    /// Tạo khoá học mới
    ///
    /// `price` và `status` không truyền thì nhận giá trị mặc định
    /// (`0` và `Draft`).
    pub fn new(
        id: CourseId,
        title: impl Into<String>,
        description: Option<String>,
        price: Option<i64>,
        status: Option<CourseStatus>,
        instructor_id: Option<InstructorId>,
        thumbnail_url: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(DomainError::Validation(
                "Tiêu đề khoá học là bắt buộc".to_string(),
            ));
        }

        let price = price.unwrap_or(0);
        if price < 0 {
            return Err(DomainError::Validation(
                "Giá khoá học không được âm".to_string(),
            ));
        }

        Ok(Self {
            id,
            title,
            description,
            price,
            status: status.unwrap_or(CourseStatus::Draft),
            instructor_id,
            thumbnail_url,
            created_at: now,
            updated_at: now,
        })
    }

    /// Khôi phục entity từ dữ liệu đã lưu
    #[allow(clippy::too_many_arguments)]
    pub fn from_db(
        id: CourseId,
        title: String,
        description: Option<String>,
        price: i64,
        status: CourseStatus,
        instructor_id: Option<InstructorId>,
        thumbnail_url: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title,
            description,
            price,
            status,
            instructor_id,
            thumbnail_url,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &CourseId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn price(&self) -> i64 {
        self.price
    }

    pub fn status(&self) -> CourseStatus {
        self.status
    }

    pub fn instructor_id(&self) -> Option<&InstructorId> {
        self.instructor_id.as_ref()
    }

    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnail_url.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[rstest]
    fn test_giá_và_trạng_thái_mặc_định(now: DateTime<Utc>) {
        let course =
            Course::new(CourseId::new(), "Rust căn bản", None, None, None, None, None, now)
                .unwrap();

        assert_eq!(course.price(), 0);
        assert_eq!(course.status(), CourseStatus::Draft);
    }

    #[rstest]
    fn test_tiêu_đề_rỗng_bị_từ_chối(now: DateTime<Utc>) {
        let result = Course::new(CourseId::new(), "  ", None, None, None, None, None, now);
        assert!(result.is_err());
    }

    #[rstest]
    fn test_giá_âm_bị_từ_chối(now: DateTime<Utc>) {
        let result =
            Course::new(CourseId::new(), "Rust", None, Some(-1), None, None, None, now);
        assert!(result.is_err());
    }

    #[rstest]
    #[case("draft", CourseStatus::Draft)]
    #[case("published", CourseStatus::Published)]
    #[case("archived", CourseStatus::Archived)]
    fn test_parse_trạng_thái(#[case] input: &str, #[case] expected: CourseStatus) {
        assert_eq!(input.parse::<CourseStatus>().unwrap(), expected);
    }
}
