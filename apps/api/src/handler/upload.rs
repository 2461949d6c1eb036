//! # Handler tải tệp
//!
//! ## Endpoint
//!
//! - `POST /generate-upload-url` — phát presigned PUT URL hiệu lực 5 phút
//! - `POST /upload-longvan` — alias cũ của cùng luồng phát URL, giữ cho
//!   client chưa nâng cấp
//! - `DELETE /admin/uploads/{id}` — xoá bản ghi metadata (object giữ nguyên)

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use khoahoc_domain::{
    lesson::LessonId,
    upload::{UploadId, UploadKind},
};
use khoahoc_shared::ApiResponse;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::ApiError,
    usecase::{GenerateUploadUrlInput, UploadUseCase},
};

/// Trạng thái chia sẻ của nhóm route tải tệp
pub struct UploadState {
    pub usecase: Arc<UploadUseCase>,
}

// --- Kiểu request/response ---

#[derive(Debug, Deserialize)]
pub struct GenerateUploadUrlRequest {
    pub file_name:    String,
    pub content_type: String,
    /// Thư mục logic, mặc định `uploads`
    pub folder:       Option<String>,
    /// `document` hoặc `video`, mặc định `document`
    pub kind:         Option<String>,
    pub lesson_id:    Option<Uuid>,
    pub size_bytes:   Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PresignedUploadResponse {
    pub upload_id:       Uuid,
    pub upload_url:      String,
    pub s3_key:          String,
    pub expires_in_secs: u64,
}

// --- Handler ---

/// POST /generate-upload-url (và alias POST /upload-longvan)
#[tracing::instrument(skip_all)]
pub async fn generate_upload_url(
    State(state): State<Arc<UploadState>>,
    Json(request): Json<GenerateUploadUrlRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = match request.kind.as_deref() {
        None => UploadKind::Document,
        Some(raw) => raw.parse::<UploadKind>()?,
    };

    let presigned = state
        .usecase
        .generate_upload_url(GenerateUploadUrlInput {
            file_name: request.file_name,
            content_type: request.content_type,
            folder: request.folder.unwrap_or_else(|| "uploads".to_string()),
            kind,
            lesson_id: request.lesson_id.map(LessonId::from_uuid),
            size_bytes: request.size_bytes,
        })
        .await?;

    Ok(Json(ApiResponse::new(PresignedUploadResponse {
        upload_id:       *presigned.upload_id.as_uuid(),
        upload_url:      presigned.upload_url,
        s3_key:          presigned.s3_key,
        expires_in_secs: presigned.expires_in_secs,
    })))
}

/// DELETE /admin/uploads/{id}
#[tracing::instrument(skip_all)]
pub async fn delete_upload(
    State(state): State<Arc<UploadState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .usecase
        .delete_upload(&UploadId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
