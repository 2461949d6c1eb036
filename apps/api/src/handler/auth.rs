//! # Handler tài khoản
//!
//! ## Endpoint
//!
//! - `POST /auth/register` — đăng ký học viên, email trùng trả 409
//! - `POST /auth/login` — đăng nhập, mọi lần thử đều vào nhật ký phiên
//! - `POST /admin/check-auth` — xác minh cặp (id, email) là admin
//! - `POST /admin/create-admin` — tạo admin đầu tiên, canh bằng secret

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use khoahoc_domain::{
    password::PlainPassword,
    user::{Email, User, UserId},
};
use khoahoc_shared::{
    ApiResponse,
    client_ip::{extract_client_ip, extract_user_agent},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::ApiError,
    usecase::{AuthUseCase, CreateAdminInput, LoginInput, RegisterInput},
};

/// Trạng thái chia sẻ của nhóm route tài khoản
pub struct AuthState {
    pub usecase: Arc<AuthUseCase>,
}

// --- Kiểu request/response ---

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email:    String,
    pub name:     String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email:    String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckAuthRequest {
    pub user_id: Uuid,
    pub email:   String,
}

#[derive(Debug, Deserialize)]
pub struct CreateAdminRequest {
    pub secret:   String,
    pub email:    String,
    pub name:     String,
    pub password: String,
}

/// Thông tin tài khoản trả cho client (không bao giờ kèm hash mật khẩu)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id:    Uuid,
    pub email: String,
    pub name:  String,
    pub role:  String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id:    *user.id().as_uuid(),
            email: user.email().as_str().to_string(),
            name:  user.name().to_string(),
            role:  user.role().to_string(),
        }
    }
}

// --- Handler ---

/// POST /auth/register
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<Arc<AuthState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .usecase
        .register(RegisterInput {
            email:    Email::new(&request.email)?,
            name:     request.name,
            password: PlainPassword::new(request.password),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(UserResponse::from(&user))),
    ))
}

/// POST /auth/login
///
/// IP và user agent lấy từ header proxy để ghi nhật ký phiên.
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<Arc<AuthState>>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .usecase
        .login(LoginInput {
            email:      Email::new(&request.email)?,
            password:   PlainPassword::new(request.password),
            ip:         extract_client_ip(&headers),
            user_agent: extract_user_agent(&headers),
        })
        .await?;

    Ok(Json(ApiResponse::new(UserResponse::from(&user))))
}

/// POST /admin/check-auth
#[tracing::instrument(skip_all)]
pub async fn check_auth(
    State(state): State<Arc<AuthState>>,
    Json(request): Json<CheckAuthRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .usecase
        .check_admin(
            &UserId::from_uuid(request.user_id),
            &Email::new(&request.email)?,
        )
        .await?;

    Ok(Json(ApiResponse::new(UserResponse::from(&user))))
}

/// POST /admin/create-admin
#[tracing::instrument(skip_all)]
pub async fn create_admin(
    State(state): State<Arc<AuthState>>,
    Json(request): Json<CreateAdminRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .usecase
        .create_admin(CreateAdminInput {
            secret:   request.secret,
            email:    Email::new(&request.email)?,
            name:     request.name,
            password: PlainPassword::new(request.password),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(UserResponse::from(&user))),
    ))
}
