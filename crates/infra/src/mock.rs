//! # Mock repository cho test
//!
//! Repository in-memory dùng trong test tầng usecase.
//! Bật feature `test-utils` để dùng từ crate khác:
//!
//! ```toml
//! [dev-dependencies]
//! khoahoc-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use khoahoc_domain::{
    course::{Course, CourseId},
    instructor::{Instructor, InstructorId},
    lesson::{Lesson, LessonId},
    security::{AdminAlert, AlertId, LoginSession, LoginStats},
    site_setting::SiteSetting,
    upload::{Upload, UploadId, UploadKind},
    user::{Email, User, UserId, UserRole},
};

use crate::{
    error::InfraError,
    repository::{
        CourseRepository,
        CourseUpdate,
        InstructorRepository,
        LessonRepository,
        LessonUpdate,
        LoginSecurityRepository,
        SiteSettingRepository,
        UploadRepository,
        UserRepository,
    },
};

// ===== MockUserRepository =====

#[derive(Clone, Default)]
pub struct MockUserRepository {
    users: Arc<Mutex<Vec<User>>>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user: User) {
        self.users.lock().unwrap().push(user);
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn insert(&self, user: &User) -> Result<(), InfraError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email() == user.email()) {
            return Err(InfraError::UniqueViolation(
                crate::repository::EMAIL_UNIQUE_CONSTRAINT.to_string(),
            ));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, InfraError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id() == id)
            .cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, InfraError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email() == email)
            .cloned())
    }

    async fn count_by_role(&self, role: UserRole) -> Result<i64, InfraError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.role() == role)
            .count() as i64)
    }
}

// ===== MockCourseRepository =====

#[derive(Clone, Default)]
pub struct MockCourseRepository {
    courses: Arc<Mutex<Vec<Course>>>,
}

impl MockCourseRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_course(&self, course: Course) {
        self.courses.lock().unwrap().push(course);
    }
}

#[async_trait]
impl CourseRepository for MockCourseRepository {
    async fn insert(&self, course: &Course) -> Result<(), InfraError> {
        self.courses.lock().unwrap().push(course.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, InfraError> {
        Ok(self
            .courses
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id() == id)
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<Course>, InfraError> {
        let mut courses = self.courses.lock().unwrap().clone();
        courses.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(courses)
    }

    async fn update(
        &self,
        id: &CourseId,
        update: CourseUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Course>, InfraError> {
        let mut courses = self.courses.lock().unwrap();
        let Some(course) = courses.iter_mut().find(|c| c.id() == id) else {
            return Ok(None);
        };

        let updated = Course::from_db(
            *course.id(),
            update.title.unwrap_or_else(|| course.title().to_owned()),
            update.description.or_else(|| course.description().map(str::to_owned)),
            update.price.unwrap_or_else(|| course.price()),
            update.status.unwrap_or_else(|| course.status()),
            update.instructor_id.or_else(|| course.instructor_id().copied()),
            update.thumbnail_url.or_else(|| course.thumbnail_url().map(str::to_owned)),
            course.created_at(),
            now,
        );
        *course = updated.clone();
        Ok(Some(updated))
    }

    async fn delete(&self, id: &CourseId) -> Result<bool, InfraError> {
        let mut courses = self.courses.lock().unwrap();
        let before = courses.len();
        courses.retain(|c| c.id() != id);
        Ok(courses.len() < before)
    }
}

// ===== MockLessonRepository =====

#[derive(Clone, Default)]
pub struct MockLessonRepository {
    lessons: Arc<Mutex<Vec<Lesson>>>,
}

impl MockLessonRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_lesson(&self, lesson: Lesson) {
        self.lessons.lock().unwrap().push(lesson);
    }
}

#[async_trait]
impl LessonRepository for MockLessonRepository {
    async fn insert(&self, lesson: &Lesson) -> Result<(), InfraError> {
        self.lessons.lock().unwrap().push(lesson.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &LessonId) -> Result<Option<Lesson>, InfraError> {
        Ok(self
            .lessons
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.id() == id)
            .cloned())
    }

    async fn find_by_course(&self, course_id: &CourseId) -> Result<Vec<Lesson>, InfraError> {
        let mut lessons: Vec<Lesson> = self
            .lessons
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.course_id() == course_id)
            .cloned()
            .collect();
        lessons.sort_by_key(|l| l.order_index());
        Ok(lessons)
    }

    async fn next_order_index(&self, course_id: &CourseId) -> Result<i32, InfraError> {
        let max = self
            .lessons
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.course_id() == course_id)
            .map(Lesson::order_index)
            .max()
            .unwrap_or(0);
        Ok(max + 1)
    }

    async fn update(
        &self,
        id: &LessonId,
        update: LessonUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Lesson>, InfraError> {
        let mut lessons = self.lessons.lock().unwrap();
        let Some(lesson) = lessons.iter_mut().find(|l| l.id() == id) else {
            return Ok(None);
        };

        let updated = Lesson::from_db(
            *lesson.id(),
            *lesson.course_id(),
            update.title.unwrap_or_else(|| lesson.title().to_owned()),
            update.description.or_else(|| lesson.description().map(str::to_owned)),
            update.video_url.or_else(|| lesson.video_url().map(str::to_owned)),
            lesson.order_index(),
            lesson.duration_seconds(),
            lesson.created_at(),
            now,
        );
        *lesson = updated.clone();
        Ok(Some(updated))
    }

    async fn set_duration(
        &self,
        id: &LessonId,
        duration_seconds: i32,
        now: DateTime<Utc>,
    ) -> Result<bool, InfraError> {
        let mut lessons = self.lessons.lock().unwrap();
        let Some(lesson) = lessons.iter_mut().find(|l| l.id() == id) else {
            return Ok(false);
        };

        *lesson = Lesson::from_db(
            *lesson.id(),
            *lesson.course_id(),
            lesson.title().to_owned(),
            lesson.description().map(str::to_owned),
            lesson.video_url().map(str::to_owned),
            lesson.order_index(),
            Some(duration_seconds),
            lesson.created_at(),
            now,
        );
        Ok(true)
    }

    async fn reorder(
        &self,
        id: &LessonId,
        new_index: i32,
        now: DateTime<Utc>,
    ) -> Result<bool, InfraError> {
        let mut lessons = self.lessons.lock().unwrap();
        let Some(target) = lessons.iter().find(|l| l.id() == id).cloned() else {
            return Ok(false);
        };
        let course_id = *target.course_id();
        let old_index = target.order_index();

        let total = lessons
            .iter()
            .filter(|l| l.course_id() == &course_id)
            .count() as i32;
        if new_index < 1 || new_index > total {
            return Err(InfraError::InvalidInput(format!(
                "Vị trí {new_index} nằm ngoài khoảng 1..{total}"
            )));
        }
        if new_index == old_index {
            return Ok(true);
        }

        for lesson in lessons.iter_mut().filter(|l| l.course_id() == &course_id) {
            let idx = lesson.order_index();
            let shifted = if lesson.id() == id {
                new_index
            } else if new_index < old_index && idx >= new_index && idx < old_index {
                idx + 1
            } else if new_index > old_index && idx > old_index && idx <= new_index {
                idx - 1
            } else {
                continue;
            };
            *lesson = Lesson::from_db(
                *lesson.id(),
                *lesson.course_id(),
                lesson.title().to_owned(),
                lesson.description().map(str::to_owned),
                lesson.video_url().map(str::to_owned),
                shifted,
                lesson.duration_seconds(),
                lesson.created_at(),
                now,
            );
        }
        Ok(true)
    }

    async fn delete(&self, id: &LessonId) -> Result<bool, InfraError> {
        let mut lessons = self.lessons.lock().unwrap();
        let before = lessons.len();
        lessons.retain(|l| l.id() != id);
        Ok(lessons.len() < before)
    }
}

// ===== MockInstructorRepository =====

#[derive(Clone, Default)]
pub struct MockInstructorRepository {
    instructors: Arc<Mutex<Vec<Instructor>>>,
}

impl MockInstructorRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_instructor(&self, instructor: Instructor) {
        self.instructors.lock().unwrap().push(instructor);
    }
}

#[async_trait]
impl InstructorRepository for MockInstructorRepository {
    async fn insert(&self, instructor: &Instructor) -> Result<(), InfraError> {
        self.instructors.lock().unwrap().push(instructor.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &InstructorId) -> Result<Option<Instructor>, InfraError> {
        Ok(self
            .instructors
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.id() == id)
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<Instructor>, InfraError> {
        Ok(self.instructors.lock().unwrap().clone())
    }

    async fn find_active(&self) -> Result<Vec<Instructor>, InfraError> {
        Ok(self
            .instructors
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.is_active())
            .cloned()
            .collect())
    }
}

// ===== MockUploadRepository =====

#[derive(Clone, Default)]
pub struct MockUploadRepository {
    uploads: Arc<Mutex<Vec<Upload>>>,
}

impl MockUploadRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_upload(&self, upload: Upload) {
        self.uploads.lock().unwrap().push(upload);
    }
}

#[async_trait]
impl UploadRepository for MockUploadRepository {
    async fn insert(&self, upload: &Upload) -> Result<(), InfraError> {
        self.uploads.lock().unwrap().push(upload.clone());
        Ok(())
    }

    async fn find_by_lesson(
        &self,
        lesson_id: &LessonId,
        kind: UploadKind,
    ) -> Result<Vec<Upload>, InfraError> {
        let mut uploads: Vec<Upload> = self
            .uploads
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.lesson_id() == Some(lesson_id) && u.kind() == kind)
            .cloned()
            .collect();
        uploads.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(uploads)
    }

    async fn delete(&self, id: &UploadId) -> Result<Option<Upload>, InfraError> {
        let mut uploads = self.uploads.lock().unwrap();
        let Some(pos) = uploads.iter().position(|u| u.id() == id) else {
            return Ok(None);
        };
        Ok(Some(uploads.remove(pos)))
    }
}

// ===== MockSiteSettingRepository =====

#[derive(Clone, Default)]
pub struct MockSiteSettingRepository {
    settings: Arc<Mutex<Vec<SiteSetting>>>,
}

impl MockSiteSettingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SiteSettingRepository for MockSiteSettingRepository {
    async fn get(&self, key: &str) -> Result<Option<SiteSetting>, InfraError> {
        Ok(self
            .settings
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.key() == key)
            .cloned())
    }

    async fn upsert(&self, setting: &SiteSetting) -> Result<(), InfraError> {
        let mut settings = self.settings.lock().unwrap();
        if let Some(existing) = settings.iter_mut().find(|s| s.key() == setting.key()) {
            *existing = setting.clone();
        } else {
            settings.push(setting.clone());
        }
        Ok(())
    }

    async fn all(&self) -> Result<Vec<SiteSetting>, InfraError> {
        let mut settings = self.settings.lock().unwrap().clone();
        settings.sort_by(|a, b| a.key().cmp(b.key()));
        Ok(settings)
    }
}

// ===== MockLoginSecurityRepository =====

#[derive(Clone, Default)]
pub struct MockLoginSecurityRepository {
    sessions: Arc<Mutex<Vec<LoginSession>>>,
    alerts:   Arc<Mutex<Vec<AdminAlert>>>,
}

impl MockLoginSecurityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_session(&self, session: LoginSession) {
        self.sessions.lock().unwrap().push(session);
    }

    pub fn alerts(&self) -> Vec<AdminAlert> {
        self.alerts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LoginSecurityRepository for MockLoginSecurityRepository {
    async fn insert_session(&self, session: &LoginSession) -> Result<(), InfraError> {
        self.sessions.lock().unwrap().push(session.clone());
        Ok(())
    }

    async fn login_stats(&self, user_id: &UserId) -> Result<LoginStats, InfraError> {
        let sessions = self.sessions.lock().unwrap();
        let total = sessions.iter().filter(|s| s.user_id() == user_id).count() as i64;
        let successes = sessions
            .iter()
            .filter(|s| s.user_id() == user_id && s.success())
            .count() as i64;
        Ok(LoginStats {
            total,
            successes,
            failures: total - successes,
        })
    }

    async fn recent_sessions(
        &self,
        user_id: &UserId,
        limit: i64,
    ) -> Result<Vec<LoginSession>, InfraError> {
        let mut sessions: Vec<LoginSession> = self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.user_id() == user_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        sessions.truncate(limit as usize);
        Ok(sessions)
    }

    async fn recent_ips(
        &self,
        user_id: &UserId,
        since: DateTime<Utc>,
    ) -> Result<Vec<String>, InfraError> {
        let mut sessions: Vec<LoginSession> = self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.user_id() == user_id && s.created_at() >= since)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.created_at().cmp(&a.created_at()));

        let mut ips: Vec<String> = Vec::new();
        for session in sessions {
            if !ips.iter().any(|ip| ip == session.ip()) {
                ips.push(session.ip().to_owned());
            }
        }
        Ok(ips)
    }

    async fn count_unique_ips(
        &self,
        user_id: &UserId,
        since: DateTime<Utc>,
    ) -> Result<i64, InfraError> {
        Ok(self.recent_ips(user_id, since).await?.len() as i64)
    }

    async fn insert_alert(&self, alert: &AdminAlert) -> Result<(), InfraError> {
        self.alerts.lock().unwrap().push(alert.clone());
        Ok(())
    }

    async fn unread_alerts(&self) -> Result<Vec<AdminAlert>, InfraError> {
        let mut alerts: Vec<AdminAlert> = self
            .alerts
            .lock()
            .unwrap()
            .iter()
            .filter(|a| !a.is_read())
            .cloned()
            .collect();
        alerts.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(alerts)
    }

    async fn all_alerts(&self) -> Result<Vec<AdminAlert>, InfraError> {
        let mut alerts = self.alerts.lock().unwrap().clone();
        alerts.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(alerts)
    }

    async fn mark_alert_read(&self, id: &AlertId) -> Result<bool, InfraError> {
        let mut alerts = self.alerts.lock().unwrap();
        let Some(alert) = alerts.iter_mut().find(|a| a.id() == id && !a.is_read()) else {
            return Ok(false);
        };
        *alert = alert.clone().marked_read();
        Ok(true)
    }

    async fn has_unread_alert(
        &self,
        user_id: &UserId,
        category: &str,
    ) -> Result<bool, InfraError> {
        Ok(self
            .alerts
            .lock()
            .unwrap()
            .iter()
            .any(|a| a.user_id() == user_id && a.category() == category && !a.is_read()))
    }
}
