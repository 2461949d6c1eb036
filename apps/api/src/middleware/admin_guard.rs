//! # Gác cổng admin
//!
//! Mọi route dưới `/admin` đi qua middleware này. Danh tính client lấy
//! từ cặp header `x-user-id` / `x-user-email` (do lớp proxy phía trước
//! gắn sau khi giải cookie phiên); middleware đối chiếu với bản ghi
//! người dùng và yêu cầu vai trò admin.
//!
//! - Thiếu hoặc sai định dạng header: 401
//! - Tài khoản không tồn tại: 401
//! - Email không khớp hoặc không phải admin: 403

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use khoahoc_domain::user::{Email, UserId};
use uuid::Uuid;

use crate::{error::ApiError, usecase::AuthUseCase};

/// Trạng thái của middleware gác cổng
pub struct AdminGuardState {
    pub usecase: Arc<AuthUseCase>,
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, ApiError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized(format!("Thiếu header {name}")))
}

/// Chặn request không phải admin
pub async fn require_admin(
    State(state): State<Arc<AdminGuardState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user_id = header_value(request.headers(), "x-user-id")?
        .parse::<Uuid>()
        .map_err(|_| ApiError::Unauthorized("Header x-user-id không hợp lệ".to_string()))?;
    let email = Email::new(header_value(request.headers(), "x-user-email")?)
        .map_err(|_| ApiError::Unauthorized("Header x-user-email không hợp lệ".to_string()))?;

    state
        .usecase
        .check_admin(&UserId::from_uuid(user_id), &email)
        .await?;

    Ok(next.run(request).await)
}
