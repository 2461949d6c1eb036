//! # Handler bài học
//!
//! ## Endpoint
//!
//! - `GET/POST /courses/{id}/lessons` — danh sách / thêm bài học
//! - `GET/PUT/DELETE /admin/lessons/{id}` — thao tác từng bài
//! - `PUT /admin/lessons/{id}/order` — đổi thứ tự (nguyên tử)
//! - `GET /lessons/{id}/documents`, `GET /lessons/{id}/videos` — tệp đính kèm
//! - `POST /lessons/{id}/update-duration` — ghi thời lượng video

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use khoahoc_domain::{
    course::CourseId,
    lesson::{Lesson, LessonId},
    upload::{Upload, UploadKind},
};
use khoahoc_infra::repository::{LessonRepository, LessonUpdate, UploadRepository};
use khoahoc_shared::{ApiResponse, format::format_duration};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::ApiError, usecase::LessonUseCase};

/// Trạng thái chia sẻ của nhóm route bài học
pub struct LessonState {
    pub usecase:           Arc<LessonUseCase>,
    pub lesson_repository: Arc<dyn LessonRepository>,
    pub upload_repository: Arc<dyn UploadRepository>,
}

// --- Kiểu request/response ---

#[derive(Debug, Deserialize)]
pub struct CreateLessonRequest {
    pub title:       String,
    pub description: Option<String>,
    pub video_url:   Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateLessonRequest {
    pub title:       Option<String>,
    pub description: Option<String>,
    pub video_url:   Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderLessonRequest {
    pub order_index: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDurationRequest {
    pub duration_seconds: i32,
}

#[derive(Debug, Serialize)]
pub struct LessonResponse {
    pub id:                 Uuid,
    pub course_id:          Uuid,
    pub title:              String,
    pub description:        Option<String>,
    pub video_url:          Option<String>,
    pub order_index:        i32,
    pub duration_seconds:   Option<i32>,
    /// Thời lượng hiển thị, ví dụ `12:05` hoặc `1:02:30`
    pub duration_formatted: Option<String>,
    pub created_at:         DateTime<Utc>,
    pub updated_at:         DateTime<Utc>,
}

impl From<&Lesson> for LessonResponse {
    fn from(lesson: &Lesson) -> Self {
        Self {
            id:                 *lesson.id().as_uuid(),
            course_id:          *lesson.course_id().as_uuid(),
            title:              lesson.title().to_string(),
            description:        lesson.description().map(str::to_string),
            video_url:          lesson.video_url().map(str::to_string),
            order_index:        lesson.order_index(),
            duration_seconds:   lesson.duration_seconds(),
            duration_formatted: lesson
                .duration_seconds()
                .map(|s| format_duration(i64::from(s))),
            created_at:         lesson.created_at(),
            updated_at:         lesson.updated_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub id:           Uuid,
    pub file_name:    String,
    pub s3_key:       String,
    pub content_type: String,
    pub kind:         String,
    pub size_bytes:   Option<i64>,
    pub created_at:   DateTime<Utc>,
}

impl From<&Upload> for UploadResponse {
    fn from(upload: &Upload) -> Self {
        Self {
            id:           *upload.id().as_uuid(),
            file_name:    upload.file_name().to_string(),
            s3_key:       upload.s3_key().to_string(),
            content_type: upload.content_type().to_string(),
            kind:         upload.kind().to_string(),
            size_bytes:   upload.size_bytes(),
            created_at:   upload.created_at(),
        }
    }
}

// --- Handler ---

/// GET /courses/{id}/lessons
#[tracing::instrument(skip_all)]
pub async fn list_course_lessons(
    State(state): State<Arc<LessonState>>,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let lessons = state
        .lesson_repository
        .find_by_course(&CourseId::from_uuid(course_id))
        .await?;
    let data: Vec<LessonResponse> = lessons.iter().map(LessonResponse::from).collect();
    Ok(Json(ApiResponse::new(data)))
}

/// POST /courses/{id}/lessons
#[tracing::instrument(skip_all)]
pub async fn create_course_lesson(
    State(state): State<Arc<LessonState>>,
    Path(course_id): Path<Uuid>,
    Json(request): Json<CreateLessonRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let lesson = state
        .usecase
        .create_lesson(
            CourseId::from_uuid(course_id),
            request.title,
            request.description,
            request.video_url,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(LessonResponse::from(&lesson))),
    ))
}

/// GET /admin/lessons/{id}
#[tracing::instrument(skip_all)]
pub async fn get_lesson(
    State(state): State<Arc<LessonState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let lesson = state
        .lesson_repository
        .find_by_id(&LessonId::from_uuid(id))
        .await?
        .ok_or_else(|| ApiError::NotFound("Không tìm thấy bài học".to_string()))?;

    Ok(Json(ApiResponse::new(LessonResponse::from(&lesson))))
}

/// PUT /admin/lessons/{id}
#[tracing::instrument(skip_all)]
pub async fn update_lesson(
    State(state): State<Arc<LessonState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateLessonRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let update = LessonUpdate {
        title:       request.title,
        description: request.description,
        video_url:   request.video_url,
    };

    let lesson = state
        .usecase
        .update_lesson(&LessonId::from_uuid(id), update)
        .await?;

    Ok(Json(ApiResponse::new(LessonResponse::from(&lesson))))
}

/// DELETE /admin/lessons/{id}
#[tracing::instrument(skip_all)]
pub async fn delete_lesson(
    State(state): State<Arc<LessonState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state
        .lesson_repository
        .delete(&LessonId::from_uuid(id))
        .await?;
    if !deleted {
        return Err(ApiError::NotFound("Không tìm thấy bài học".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /admin/lessons/{id}/order
#[tracing::instrument(skip_all)]
pub async fn reorder_lesson(
    State(state): State<Arc<LessonState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<ReorderLessonRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .usecase
        .reorder(&LessonId::from_uuid(id), request.order_index)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /lessons/{id}/documents
#[tracing::instrument(skip_all)]
pub async fn lesson_documents(
    State(state): State<Arc<LessonState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    list_lesson_uploads(&state, id, UploadKind::Document).await
}

/// GET /lessons/{id}/videos
#[tracing::instrument(skip_all)]
pub async fn lesson_videos(
    State(state): State<Arc<LessonState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    list_lesson_uploads(&state, id, UploadKind::Video).await
}

async fn list_lesson_uploads(
    state: &LessonState,
    lesson_id: Uuid,
    kind: UploadKind,
) -> Result<Json<ApiResponse<Vec<UploadResponse>>>, ApiError> {
    let uploads = state
        .upload_repository
        .find_by_lesson(&LessonId::from_uuid(lesson_id), kind)
        .await?;
    let data: Vec<UploadResponse> = uploads.iter().map(UploadResponse::from).collect();
    Ok(Json(ApiResponse::new(data)))
}

/// POST /lessons/{id}/update-duration
#[tracing::instrument(skip_all)]
pub async fn update_lesson_duration(
    State(state): State<Arc<LessonState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateDurationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .usecase
        .update_duration(&LessonId::from_uuid(id), request.duration_seconds)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
