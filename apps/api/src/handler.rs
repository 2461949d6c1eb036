//! # HTTP handler
//!
//! Hàm handler cho từng route của axum.
//!
//! ## Nguyên tắc
//!
//! - Mỗi nhóm route một submodule, re-export phẳng tại đây
//! - Handler giữ mỏng: parse đầu vào, gọi một usecase/repository,
//!   đóng gói JSON
//! - Thông điệp lỗi cho client bằng tiếng Việt, chi tiết kỹ thuật chỉ
//!   nằm trong log

pub mod admin;
pub mod auth;
pub mod course;
pub mod health;
pub mod instructor;
pub mod lesson;
pub mod site_setting;
pub mod upload;

pub use admin::{SecurityState, list_alerts, mark_alert_read, user_security};
pub use auth::{AuthState, check_auth, create_admin, login, register};
pub use course::{
    CourseState,
    create_course,
    delete_course,
    get_course,
    list_courses,
    update_course,
};
pub use health::health_check;
pub use instructor::{
    InstructorState,
    create_instructor,
    list_instructors_admin,
    list_instructors_public,
};
pub use lesson::{
    LessonState,
    create_course_lesson,
    delete_lesson,
    get_lesson,
    lesson_documents,
    lesson_videos,
    list_course_lessons,
    reorder_lesson,
    update_lesson,
    update_lesson_duration,
};
pub use site_setting::{
    SiteSettingState,
    get_site_rules,
    list_site_settings,
    upsert_site_setting,
};
pub use upload::{UploadState, delete_upload, generate_upload_url};
