//! # Usecase bài học
//!
//! Tạo bài học (tự cấp `order_index` cuối danh sách), đổi thứ tự và ghi
//! thời lượng video. CRUD còn lại đủ mỏng để handler gọi thẳng repository.

use std::sync::Arc;

use khoahoc_domain::{
    clock::Clock,
    course::CourseId,
    lesson::{Lesson, LessonId},
};
use khoahoc_infra::repository::{CourseRepository, LessonRepository, LessonUpdate};

use crate::error::ApiError;

/// Usecase bài học
pub struct LessonUseCase {
    lesson_repository: Arc<dyn LessonRepository>,
    course_repository: Arc<dyn CourseRepository>,
    clock:             Arc<dyn Clock>,
}

impl LessonUseCase {
    pub fn new(
        lesson_repository: Arc<dyn LessonRepository>,
        course_repository: Arc<dyn CourseRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            lesson_repository,
            course_repository,
            clock,
        }
    }

    /// Thêm bài học vào cuối khoá học
    pub async fn create_lesson(
        &self,
        course_id: CourseId,
        title: String,
        description: Option<String>,
        video_url: Option<String>,
    ) -> Result<Lesson, ApiError> {
        if self.course_repository.find_by_id(&course_id).await?.is_none() {
            return Err(ApiError::NotFound("Không tìm thấy khoá học".to_string()));
        }

        let order_index = self.lesson_repository.next_order_index(&course_id).await?;
        let lesson = Lesson::new(
            LessonId::new(),
            course_id,
            title,
            description,
            video_url,
            order_index,
            self.clock.now(),
        )?;
        self.lesson_repository.insert(&lesson).await?;
        Ok(lesson)
    }

    /// Cập nhật một phần nội dung bài học
    pub async fn update_lesson(
        &self,
        lesson_id: &LessonId,
        update: LessonUpdate,
    ) -> Result<Lesson, ApiError> {
        self.lesson_repository
            .update(lesson_id, update, self.clock.now())
            .await?
            .ok_or_else(|| ApiError::NotFound("Không tìm thấy bài học".to_string()))
    }

    /// Chuyển bài học tới vị trí mới
    ///
    /// Vị trí ngoài khoảng hợp lệ trả về 400, bài học không tồn tại trả
    /// về 404. Tính nguyên tử do tầng repository đảm bảo.
    pub async fn reorder(&self, lesson_id: &LessonId, new_index: i32) -> Result<(), ApiError> {
        let moved = self
            .lesson_repository
            .reorder(lesson_id, new_index, self.clock.now())
            .await?;
        if !moved {
            return Err(ApiError::NotFound("Không tìm thấy bài học".to_string()));
        }
        Ok(())
    }

    /// Ghi thời lượng video (giây)
    pub async fn update_duration(
        &self,
        lesson_id: &LessonId,
        duration_seconds: i32,
    ) -> Result<(), ApiError> {
        if duration_seconds < 0 {
            return Err(ApiError::Validation(
                "Thời lượng không được âm".to_string(),
            ));
        }

        let updated = self
            .lesson_repository
            .set_duration(lesson_id, duration_seconds, self.clock.now())
            .await?;
        if !updated {
            return Err(ApiError::NotFound("Không tìm thấy bài học".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use khoahoc_domain::{clock::FixedClock, course::Course};
    use khoahoc_infra::mock::{MockCourseRepository, MockLessonRepository};
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn usecase(
        lessons: MockLessonRepository,
        courses: MockCourseRepository,
        now: DateTime<Utc>,
    ) -> LessonUseCase {
        LessonUseCase::new(
            Arc::new(lessons),
            Arc::new(courses),
            Arc::new(FixedClock::new(now)),
        )
    }

    fn course(now: DateTime<Utc>) -> Course {
        Course::new(CourseId::new(), "Rust căn bản", None, None, None, None, None, now).unwrap()
    }

    #[rstest]
    #[tokio::test]
    async fn test_bài_học_mới_vào_cuối_danh_sách(now: DateTime<Utc>) {
        let lessons = MockLessonRepository::new();
        let courses = MockCourseRepository::new();
        let course = course(now);
        let course_id = *course.id();
        courses.add_course(course);

        let usecase = usecase(lessons, courses, now);
        let first = usecase
            .create_lesson(course_id, "Bài 1".to_string(), None, None)
            .await
            .unwrap();
        let second = usecase
            .create_lesson(course_id, "Bài 2".to_string(), None, None)
            .await
            .unwrap();

        assert_eq!(first.order_index(), 1);
        assert_eq!(second.order_index(), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn test_khoá_học_không_tồn_tại_trả_404(now: DateTime<Utc>) {
        let usecase = usecase(MockLessonRepository::new(), MockCourseRepository::new(), now);

        let result = usecase
            .create_lesson(CourseId::new(), "Bài 1".to_string(), None, None)
            .await;

        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[rstest]
    #[tokio::test]
    async fn test_chuyển_vị_trí_3_về_1_trong_5_bài(now: DateTime<Utc>) {
        let lessons = MockLessonRepository::new();
        let courses = MockCourseRepository::new();
        let course = course(now);
        let course_id = *course.id();
        courses.add_course(course);

        let usecase = usecase(lessons.clone(), courses, now);
        let mut ids = Vec::new();
        for i in 1..=5 {
            let lesson = usecase
                .create_lesson(course_id, format!("Bài {i}"), None, None)
                .await
                .unwrap();
            ids.push(*lesson.id());
        }

        usecase.reorder(&ids[2], 1).await.unwrap();

        let ordered = lessons.find_by_course(&course_id).await.unwrap();
        let titles: Vec<&str> = ordered.iter().map(Lesson::title).collect();
        assert_eq!(titles, vec!["Bài 3", "Bài 1", "Bài 2", "Bài 4", "Bài 5"]);

        // Không có order_index trùng hay thiếu
        let indexes: Vec<i32> = ordered.iter().map(Lesson::order_index).collect();
        assert_eq!(indexes, vec![1, 2, 3, 4, 5]);
    }

    #[rstest]
    #[tokio::test]
    async fn test_chuyển_xuống_dưới_dịch_ngược(now: DateTime<Utc>) {
        let lessons = MockLessonRepository::new();
        let courses = MockCourseRepository::new();
        let course = course(now);
        let course_id = *course.id();
        courses.add_course(course);

        let usecase = usecase(lessons.clone(), courses, now);
        let mut ids = Vec::new();
        for i in 1..=4 {
            let lesson = usecase
                .create_lesson(course_id, format!("Bài {i}"), None, None)
                .await
                .unwrap();
            ids.push(*lesson.id());
        }

        usecase.reorder(&ids[0], 3).await.unwrap();

        let ordered = lessons.find_by_course(&course_id).await.unwrap();
        let titles: Vec<&str> = ordered.iter().map(Lesson::title).collect();
        assert_eq!(titles, vec!["Bài 2", "Bài 3", "Bài 1", "Bài 4"]);
    }

    #[rstest]
    #[tokio::test]
    async fn test_vị_trí_ngoài_khoảng_trả_400(now: DateTime<Utc>) {
        let lessons = MockLessonRepository::new();
        let courses = MockCourseRepository::new();
        let course = course(now);
        let course_id = *course.id();
        courses.add_course(course);

        let usecase = usecase(lessons, courses, now);
        let lesson = usecase
            .create_lesson(course_id, "Bài 1".to_string(), None, None)
            .await
            .unwrap();

        let result = usecase.reorder(lesson.id(), 9).await;

        assert!(matches!(
            result,
            Err(ApiError::Infra(khoahoc_infra::InfraError::InvalidInput(_)))
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn test_thời_lượng_âm_bị_từ_chối(now: DateTime<Utc>) {
        let usecase = usecase(MockLessonRepository::new(), MockCourseRepository::new(), now);

        let result = usecase.update_duration(&LessonId::new(), -1).await;

        assert!(matches!(result, Err(ApiError::Validation(_))));
    }
}
