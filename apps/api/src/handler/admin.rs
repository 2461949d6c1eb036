//! # Handler an ninh quản trị
//!
//! ## Endpoint
//!
//! - `GET /admin/alerts` — cảnh báo chưa đọc, thêm `?all=true` để lấy hết
//! - `PUT /admin/alerts` — đánh dấu một cảnh báo đã đọc (idempotent)
//! - `GET /admin/users/{id}/security` — hồ sơ an ninh tổng hợp một người dùng

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use khoahoc_domain::{
    security::{AdminAlert, AlertId, LoginSession, LoginStats},
    user::UserId,
};
use khoahoc_shared::ApiResponse;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::ApiError, usecase::LoginSecurityUseCase};

/// Trạng thái chia sẻ của nhóm route an ninh
pub struct SecurityState {
    pub usecase: Arc<LoginSecurityUseCase>,
}

// --- Kiểu request/response ---

#[derive(Debug, Deserialize)]
pub struct ListAlertsQuery {
    /// `true` để lấy cả cảnh báo đã đọc
    pub all: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct MarkAlertReadRequest {
    pub alert_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SecurityQuery {
    /// Số phiên gần nhất muốn xem (bị kẹp trần phía server)
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AlertResponse {
    pub id:         Uuid,
    pub user_id:    Uuid,
    pub category:   String,
    pub message:    String,
    pub read:       bool,
    pub created_at: DateTime<Utc>,
}

impl From<&AdminAlert> for AlertResponse {
    fn from(alert: &AdminAlert) -> Self {
        Self {
            id:         *alert.id().as_uuid(),
            user_id:    *alert.user_id().as_uuid(),
            category:   alert.category().to_string(),
            message:    alert.message().to_string(),
            read:       alert.is_read(),
            created_at: alert.created_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id:         Uuid,
    pub ip:         String,
    pub user_agent: Option<String>,
    pub success:    bool,
    pub created_at: DateTime<Utc>,
}

impl From<&LoginSession> for SessionResponse {
    fn from(session: &LoginSession) -> Self {
        Self {
            id:         *session.id().as_uuid(),
            ip:         session.ip().to_string(),
            user_agent: session.user_agent().map(str::to_string),
            success:    session.success(),
            created_at: session.created_at(),
        }
    }
}

/// Hồ sơ an ninh trả cho trang quản trị
#[derive(Debug, Serialize)]
pub struct SecurityDossierResponse {
    pub stats:           LoginStats,
    pub sessions:        Vec<SessionResponse>,
    pub recent_ips:      Vec<String>,
    pub unique_ip_count: i64,
}

// --- Handler ---

/// GET /admin/alerts
#[tracing::instrument(skip_all)]
pub async fn list_alerts(
    State(state): State<Arc<SecurityState>>,
    Query(query): Query<ListAlertsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let alerts = if query.all.unwrap_or(false) {
        state.usecase.all_alerts().await?
    } else {
        state.usecase.unread_alerts().await?
    };

    let data: Vec<AlertResponse> = alerts.iter().map(AlertResponse::from).collect();
    Ok(Json(ApiResponse::new(data)))
}

/// PUT /admin/alerts
#[tracing::instrument(skip_all)]
pub async fn mark_alert_read(
    State(state): State<Arc<SecurityState>>,
    Json(request): Json<MarkAlertReadRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .usecase
        .mark_alert_read(&AlertId::from_uuid(request.alert_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /admin/users/{id}/security
#[tracing::instrument(skip_all)]
pub async fn user_security(
    State(state): State<Arc<SecurityState>>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<SecurityQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let dossier = state
        .usecase
        .security_dossier(UserId::from_uuid(user_id), query.limit)
        .await?;

    Ok(Json(ApiResponse::new(SecurityDossierResponse {
        stats:           dossier.stats,
        sessions:        dossier.sessions.iter().map(SessionResponse::from).collect(),
        recent_ips:      dossier.recent_ips,
        unique_ip_count: dossier.unique_ip_count,
    })))
}
