//! # Handler giảng viên
//!
//! ## Endpoint
//!
//! - `GET /instructors` — công khai, chỉ giảng viên đang hoạt động.
//!   Khi tầng lưu trữ lỗi, trang chủ vẫn phải render được nên endpoint
//!   trả payload dự phòng cố định thay vì 500.
//! - `GET /admin/instructors` — toàn bộ giảng viên
//! - `POST /admin/instructors` — thêm giảng viên

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use khoahoc_domain::{
    clock::Clock,
    instructor::{Instructor, InstructorId},
};
use khoahoc_infra::repository::InstructorRepository;
use khoahoc_shared::ApiResponse;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// Trạng thái chia sẻ của nhóm route giảng viên
pub struct InstructorState {
    pub instructor_repository: Arc<dyn InstructorRepository>,
    pub clock:                 Arc<dyn Clock>,
}

// --- Kiểu request/response ---

#[derive(Debug, Deserialize)]
pub struct CreateInstructorRequest {
    pub title:      Option<String>,
    pub name:       String,
    pub bio:        Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InstructorResponse {
    pub id:         Uuid,
    pub name:       String,
    pub title:      Option<String>,
    pub bio:        Option<String>,
    pub avatar_url: Option<String>,
    pub active:     bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Instructor> for InstructorResponse {
    fn from(instructor: &Instructor) -> Self {
        Self {
            id:         *instructor.id().as_uuid(),
            name:       instructor.name().to_string(),
            title:      instructor.title().map(str::to_string),
            bio:        instructor.bio().map(str::to_string),
            avatar_url: instructor.avatar_url().map(str::to_string),
            active:     instructor.is_active(),
            created_at: instructor.created_at(),
        }
    }
}

/// Payload dự phòng khi không đọc được danh sách giảng viên
fn fallback_instructors() -> Vec<InstructorResponse> {
    vec![InstructorResponse {
        id:         Uuid::nil(),
        name:       "Đội ngũ giảng viên KhoaHoc".to_string(),
        title:      Some("Giảng viên".to_string()),
        bio:        Some(
            "Thông tin giảng viên đang được cập nhật, vui lòng quay lại sau.".to_string(),
        ),
        avatar_url: None,
        active:     true,
        created_at: DateTime::UNIX_EPOCH,
    }]
}

// --- Handler ---

/// GET /instructors
///
/// Không bao giờ trả 500: lỗi đọc dữ liệu được ghi log và thay bằng
/// payload dự phòng.
#[tracing::instrument(skip_all)]
pub async fn list_instructors_public(
    State(state): State<Arc<InstructorState>>,
) -> Json<ApiResponse<Vec<InstructorResponse>>> {
    let data = match state.instructor_repository.find_active().await {
        Ok(instructors) => instructors.iter().map(InstructorResponse::from).collect(),
        Err(e) => {
            tracing::error!("Không đọc được danh sách giảng viên, dùng payload dự phòng: {e}");
            fallback_instructors()
        }
    };
    Json(ApiResponse::new(data))
}

/// GET /admin/instructors
#[tracing::instrument(skip_all)]
pub async fn list_instructors_admin(
    State(state): State<Arc<InstructorState>>,
) -> Result<impl IntoResponse, ApiError> {
    let instructors = state.instructor_repository.find_all().await?;
    let data: Vec<InstructorResponse> =
        instructors.iter().map(InstructorResponse::from).collect();
    Ok(Json(ApiResponse::new(data)))
}

/// POST /admin/instructors
#[tracing::instrument(skip_all)]
pub async fn create_instructor(
    State(state): State<Arc<InstructorState>>,
    Json(request): Json<CreateInstructorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let instructor = Instructor::new(
        InstructorId::new(),
        request.name,
        request.title,
        request.bio,
        request.avatar_url,
        state.clock.now(),
    )?;
    state.instructor_repository.insert(&instructor).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(InstructorResponse::from(&instructor))),
    ))
}
