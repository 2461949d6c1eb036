//! # Health check
//!
//! Endpoint kiểm tra trạng thái cho load balancer / orchestrator.
//!
//! ```text
//! GET /health
//! ```

use axum::Json;
use serde::Serialize;

/// Phản hồi health check
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status:  String,
    /// Phiên bản ứng dụng (lấy từ Cargo.toml)
    pub version: String,
}

/// Xác nhận server còn sống
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status:  "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
