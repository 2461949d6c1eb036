//! # Handler cấu hình trang
//!
//! ## Endpoint
//!
//! - `GET /admin/site-settings` — toàn bộ cặp key/value
//! - `POST /admin/site-settings` — ghi theo ngữ nghĩa upsert
//! - `GET /site-rules` — đọc công khai một key duy nhất

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use khoahoc_domain::{
    clock::Clock,
    site_setting::{SITE_RULES_KEY, SiteSetting},
};
use khoahoc_infra::repository::SiteSettingRepository;
use khoahoc_shared::ApiResponse;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Trạng thái chia sẻ của nhóm route cấu hình trang
pub struct SiteSettingState {
    pub site_setting_repository: Arc<dyn SiteSettingRepository>,
    pub clock:                   Arc<dyn Clock>,
}

// --- Kiểu request/response ---

#[derive(Debug, Deserialize)]
pub struct UpsertSiteSettingRequest {
    pub key:   String,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct SiteSettingResponse {
    pub key:        String,
    pub value:      String,
    pub updated_at: DateTime<Utc>,
}

impl From<&SiteSetting> for SiteSettingResponse {
    fn from(setting: &SiteSetting) -> Self {
        Self {
            key:        setting.key().to_string(),
            value:      setting.value().to_string(),
            updated_at: setting.updated_at(),
        }
    }
}

// --- Handler ---

/// GET /admin/site-settings
#[tracing::instrument(skip_all)]
pub async fn list_site_settings(
    State(state): State<Arc<SiteSettingState>>,
) -> Result<impl IntoResponse, ApiError> {
    let settings = state.site_setting_repository.all().await?;
    let data: Vec<SiteSettingResponse> =
        settings.iter().map(SiteSettingResponse::from).collect();
    Ok(Json(ApiResponse::new(data)))
}

/// POST /admin/site-settings
#[tracing::instrument(skip_all)]
pub async fn upsert_site_setting(
    State(state): State<Arc<SiteSettingState>>,
    Json(request): Json<UpsertSiteSettingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let setting = SiteSetting::new(request.key, request.value, state.clock.now())?;
    state.site_setting_repository.upsert(&setting).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(SiteSettingResponse::from(&setting))),
    ))
}

/// GET /site-rules
#[tracing::instrument(skip_all)]
pub async fn get_site_rules(
    State(state): State<Arc<SiteSettingState>>,
) -> Result<impl IntoResponse, ApiError> {
    let setting = state
        .site_setting_repository
        .get(SITE_RULES_KEY)
        .await?
        .ok_or_else(|| ApiError::NotFound("Nội quy trang chưa được thiết lập".to_string()))?;

    Ok(Json(ApiResponse::new(SiteSettingResponse::from(&setting))))
}
