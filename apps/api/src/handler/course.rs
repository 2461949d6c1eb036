//! # Handler khoá học
//!
//! ## Endpoint
//!
//! - `GET /courses`, `POST /courses`, `GET/PUT/DELETE /courses/{id}`
//! - Nhóm `/admin/courses` dùng chung handler, khác ở middleware gác cổng
//!
//! Cập nhật theo ngữ nghĩa một phần: trường vắng mặt giữ giá trị cũ.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use khoahoc_domain::{
    clock::Clock,
    course::{Course, CourseId, CourseStatus},
    instructor::InstructorId,
};
use khoahoc_infra::repository::{CourseRepository, CourseUpdate};
use khoahoc_shared::{ApiResponse, format::format_price_vnd};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// Trạng thái chia sẻ của nhóm route khoá học
pub struct CourseState {
    pub course_repository: Arc<dyn CourseRepository>,
    pub clock:             Arc<dyn Clock>,
}

// --- Kiểu request/response ---

#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
    pub title:         String,
    pub description:   Option<String>,
    pub price:         Option<i64>,
    pub status:        Option<String>,
    pub instructor_id: Option<Uuid>,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCourseRequest {
    pub title:         Option<String>,
    pub description:   Option<String>,
    pub price:         Option<i64>,
    pub status:        Option<String>,
    pub instructor_id: Option<Uuid>,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CourseResponse {
    pub id:              Uuid,
    pub title:           String,
    pub description:     Option<String>,
    pub price:           i64,
    /// Giá định dạng hiển thị, ví dụ `1.500.000₫`
    pub price_formatted: String,
    pub status:          String,
    pub instructor_id:   Option<Uuid>,
    pub thumbnail_url:   Option<String>,
    pub created_at:      DateTime<Utc>,
    pub updated_at:      DateTime<Utc>,
}

impl From<&Course> for CourseResponse {
    fn from(course: &Course) -> Self {
        Self {
            id:              *course.id().as_uuid(),
            title:           course.title().to_string(),
            description:     course.description().map(str::to_string),
            price:           course.price(),
            price_formatted: format_price_vnd(course.price()),
            status:          course.status().to_string(),
            instructor_id:   course.instructor_id().map(|i| *i.as_uuid()),
            thumbnail_url:   course.thumbnail_url().map(str::to_string),
            created_at:      course.created_at(),
            updated_at:      course.updated_at(),
        }
    }
}

fn parse_status(raw: Option<&str>) -> Result<Option<CourseStatus>, ApiError> {
    raw.map(|s| s.parse::<CourseStatus>().map_err(ApiError::from))
        .transpose()
}

// --- Handler ---

/// GET /courses
#[tracing::instrument(skip_all)]
pub async fn list_courses(
    State(state): State<Arc<CourseState>>,
) -> Result<impl IntoResponse, ApiError> {
    let courses = state.course_repository.find_all().await?;
    let data: Vec<CourseResponse> = courses.iter().map(CourseResponse::from).collect();
    Ok(Json(ApiResponse::new(data)))
}

/// POST /courses
///
/// `price` mặc định `0`, `status` mặc định `draft` khi vắng mặt.
#[tracing::instrument(skip_all)]
pub async fn create_course(
    State(state): State<Arc<CourseState>>,
    Json(request): Json<CreateCourseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let course = Course::new(
        CourseId::new(),
        request.title,
        request.description,
        request.price,
        parse_status(request.status.as_deref())?,
        request.instructor_id.map(InstructorId::from_uuid),
        request.thumbnail_url,
        state.clock.now(),
    )?;
    state.course_repository.insert(&course).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(CourseResponse::from(&course))),
    ))
}

/// GET /courses/{id}
#[tracing::instrument(skip_all)]
pub async fn get_course(
    State(state): State<Arc<CourseState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let course = state
        .course_repository
        .find_by_id(&CourseId::from_uuid(id))
        .await?
        .ok_or_else(|| ApiError::NotFound("Không tìm thấy khoá học".to_string()))?;

    Ok(Json(ApiResponse::new(CourseResponse::from(&course))))
}

/// PUT /courses/{id}
#[tracing::instrument(skip_all)]
pub async fn update_course(
    State(state): State<Arc<CourseState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCourseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(price) = request.price
        && price < 0
    {
        return Err(ApiError::Validation(
            "Giá khoá học không được âm".to_string(),
        ));
    }

    let update = CourseUpdate {
        title:         request.title,
        description:   request.description,
        price:         request.price,
        status:        parse_status(request.status.as_deref())?,
        instructor_id: request.instructor_id.map(InstructorId::from_uuid),
        thumbnail_url: request.thumbnail_url,
    };

    let course = state
        .course_repository
        .update(&CourseId::from_uuid(id), update, state.clock.now())
        .await?
        .ok_or_else(|| ApiError::NotFound("Không tìm thấy khoá học".to_string()))?;

    Ok(Json(ApiResponse::new(CourseResponse::from(&course))))
}

/// DELETE /courses/{id}
///
/// Bài học và tệp đính kèm bị xoá theo FK cascade ở tầng lưu trữ.
#[tracing::instrument(skip_all)]
pub async fn delete_course(
    State(state): State<Arc<CourseState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state
        .course_repository
        .delete(&CourseId::from_uuid(id))
        .await?;
    if !deleted {
        return Err(ApiError::NotFound("Không tìm thấy khoá học".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}
