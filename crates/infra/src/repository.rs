//! # Repository
//!
//! Mỗi aggregate có một trait repository và một triển khai Postgres.
//! Tầng usecase chỉ phụ thuộc trait; bản mock in-memory nằm ở
//! [`crate::mock`] (feature `test-utils`).

pub mod course_repository;
pub mod instructor_repository;
pub mod lesson_repository;
pub mod login_security_repository;
pub mod site_setting_repository;
pub mod upload_repository;
pub mod user_repository;

pub use course_repository::{CourseRepository, CourseUpdate, PostgresCourseRepository};
pub use instructor_repository::{InstructorRepository, PostgresInstructorRepository};
pub use lesson_repository::{LessonRepository, LessonUpdate, PostgresLessonRepository};
pub use login_security_repository::{LoginSecurityRepository, PostgresLoginSecurityRepository};
pub use site_setting_repository::{PostgresSiteSettingRepository, SiteSettingRepository};
pub use upload_repository::{PostgresUploadRepository, UploadRepository};
pub use user_repository::{EMAIL_UNIQUE_CONSTRAINT, PostgresUserRepository, UserRepository};
