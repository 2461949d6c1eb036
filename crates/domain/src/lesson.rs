//! # Bài học
//!
//! Entity bài học thuộc một khoá học. Thứ tự hiển thị do `order_index`
//! quyết định (bắt đầu từ 1, duy nhất trong phạm vi khoá học).

use chrono::{DateTime, Utc};

use crate::{DomainError, course::CourseId};

define_uuid_id! {
    /// ID bài học
    pub struct LessonId;
}

/// Entity bài học
///
/// # Bất biến
///
/// - `order_index >= 1` và duy nhất trong khoá học (ràng buộc UNIQUE ở
///   tầng lưu trữ, thao tác đổi thứ tự chạy trong một transaction)
/// - `duration_seconds` không âm khi có giá trị
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    id:               LessonId,
    course_id:        CourseId,
    title:            String,
    description:      Option<String>,
    video_url:        Option<String>,
    order_index:      i32,
    duration_seconds: Option<i32>,
    created_at:       DateTime<Utc>,
    updated_at:       DateTime<Utc>,
}

impl Lesson {
    /// Tạo bài học mới
    pub fn new(
        id: LessonId,
        course_id: CourseId,
        title: impl Into<String>,
        description: Option<String>,
        video_url: Option<String>,
        order_index: i32,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(DomainError::Validation(
                "Tiêu đề bài học là bắt buộc".to_string(),
            ));
        }

        if order_index < 1 {
            return Err(DomainError::Validation(
                "Thứ tự bài học phải là số nguyên dương".to_string(),
            ));
        }

        Ok(Self {
            id,
            course_id,
            title,
            description,
            video_url,
            order_index,
            duration_seconds: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Khôi phục entity từ dữ liệu đã lưu
    #[allow(clippy::too_many_arguments)]
    pub fn from_db(
        id: LessonId,
        course_id: CourseId,
        title: String,
        description: Option<String>,
        video_url: Option<String>,
        order_index: i32,
        duration_seconds: Option<i32>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            course_id,
            title,
            description,
            video_url,
            order_index,
            duration_seconds,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &LessonId {
        &self.id
    }

    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn video_url(&self) -> Option<&str> {
        self.video_url.as_deref()
    }

    pub fn order_index(&self) -> i32 {
        self.order_index
    }

    pub fn duration_seconds(&self) -> Option<i32> {
        self.duration_seconds
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
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[rstest]
    fn test_bài_học_mới_chưa_có_thời_lượng(now: DateTime<Utc>) {
        let lesson = Lesson::new(
            LessonId::new(),
            CourseId::new(),
            "Bài 1: Ownership",
            None,
            None,
            1,
            now,
        )
        .unwrap();

        assert_eq!(lesson.duration_seconds(), None);
    }

    #[rstest]
    #[case(0)]
    #[case(-3)]
    fn test_thứ_tự_không_dương_bị_từ_chối(now: DateTime<Utc>, #[case] order_index: i32) {
        let result = Lesson::new(
            LessonId::new(),
            CourseId::new(),
            "Bài 1",
            None,
            None,
            order_index,
            now,
        );
        assert!(result.is_err());
    }

    #[rstest]
    fn test_tiêu_đề_rỗng_bị_từ_chối(now: DateTime<Utc>) {
        let result = Lesson::new(LessonId::new(), CourseId::new(), "", None, None, 1, now);
        assert!(result.is_err());
    }
}
