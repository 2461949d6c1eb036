//! # Lỗi tầng API
//!
//! Định nghĩa lỗi của API server và cách dịch sang phản hồi HTTP.
//!
//! ## Phân loại
//!
//! | Biến thể | HTTP | Ghi chú |
//! |----------|------|---------|
//! | `Validation` | 400 | Thiếu / sai trường đầu vào |
//! | `Unauthorized` | 401 | Thiếu thông tin định danh |
//! | `Forbidden` | 403 | Sai vai trò hoặc secret |
//! | `NotFound` | 404 | Bản ghi không tồn tại |
//! | `Conflict` | 409 | Trùng khoá duy nhất |
//! | `Infra` / `Internal` | 500 | Chi tiết chỉ ghi log phía server |
//!
//! Thông điệp trả cho client bằng tiếng Việt; lỗi 500 luôn trả thông điệp
//! chung chung, nguyên nhân gốc chỉ nằm trong log.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use khoahoc_domain::DomainError;
use khoahoc_infra::InfraError;
use serde::Serialize;
use thiserror::Error;

/// Thân phản hồi lỗi (RFC 7807 Problem Details)
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(rename = "type")]
    pub error_type: String,
    pub title:      String,
    pub status:     u16,
    pub detail:     String,
}

/// Lỗi phát sinh trong API server
#[derive(Debug, Error)]
pub enum ApiError {
    /// Đầu vào không hợp lệ
    #[error("Dữ liệu không hợp lệ: {0}")]
    Validation(String),

    /// Chưa xác thực
    #[error("Chưa xác thực: {0}")]
    Unauthorized(String),

    /// Không đủ quyền
    #[error("Không đủ quyền: {0}")]
    Forbidden(String),

    /// Không tìm thấy bản ghi
    #[error("Không tìm thấy: {0}")]
    NotFound(String),

    /// Xung đột dữ liệu (trùng khoá duy nhất)
    #[error("Xung đột dữ liệu: {0}")]
    Conflict(String),

    /// Lỗi tầng hạ tầng
    #[error("Lỗi hạ tầng: {0}")]
    Infra(#[from] InfraError),

    /// Lỗi nội bộ khác
    #[error("Lỗi nội bộ: {0}")]
    Internal(String),
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => Self::Validation(msg),
            DomainError::NotFound { .. } => Self::NotFound(err.to_string()),
            DomainError::Conflict(msg) => Self::Conflict(msg),
            DomainError::Forbidden(msg) => Self::Forbidden(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, title, detail) = match &self {
            ApiError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "https://khoahoc.example.com/errors/bad-request",
                "Bad Request",
                msg.clone(),
            ),
            ApiError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                "https://khoahoc.example.com/errors/unauthorized",
                "Unauthorized",
                msg.clone(),
            ),
            ApiError::Forbidden(msg) => (
                StatusCode::FORBIDDEN,
                "https://khoahoc.example.com/errors/forbidden",
                "Forbidden",
                msg.clone(),
            ),
            ApiError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                "https://khoahoc.example.com/errors/not-found",
                "Not Found",
                msg.clone(),
            ),
            ApiError::Conflict(msg) => (
                StatusCode::CONFLICT,
                "https://khoahoc.example.com/errors/conflict",
                "Conflict",
                msg.clone(),
            ),
            ApiError::Infra(InfraError::InvalidInput(msg)) => (
                StatusCode::BAD_REQUEST,
                "https://khoahoc.example.com/errors/bad-request",
                "Bad Request",
                msg.clone(),
            ),
            ApiError::Infra(e) => {
                tracing::error!("Lỗi hạ tầng: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "https://khoahoc.example.com/errors/internal-error",
                    "Internal Server Error",
                    "Đã xảy ra lỗi hệ thống, vui lòng thử lại sau".to_string(),
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!("Lỗi nội bộ: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "https://khoahoc.example.com/errors/internal-error",
                    "Internal Server Error",
                    "Đã xảy ra lỗi hệ thống, vui lòng thử lại sau".to_string(),
                )
            }
        };

        (
            status,
            Json(ErrorResponse {
                error_type: error_type.to_string(),
                title: title.to_string(),
                status: status.as_u16(),
                detail,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::response::IntoResponse;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_lỗi_hạ_tầng_không_lộ_chi_tiết() {
        let err = ApiError::Infra(InfraError::Unexpected("connection refused".to_string()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_invalid_input_hạ_tầng_thành_400() {
        let err = ApiError::Infra(InfraError::InvalidInput("vị trí sai".to_string()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_trùng_khoá_thành_409() {
        let err = ApiError::Conflict("Email đã được sử dụng".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
