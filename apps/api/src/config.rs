//! # Cấu hình API server
//!
//! Đọc toàn bộ cấu hình từ biến môi trường **một lần duy nhất** lúc khởi
//! động. Tầng usecase và handler chỉ nhận struct này (hoặc phần con của
//! nó) qua tham số, không bao giờ tự đọc biến môi trường.

use std::env;

/// Cấu hình API server
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Địa chỉ bind
    pub host: String,
    /// Cổng
    pub port: u16,
    /// URL kết nối PostgreSQL
    pub database_url: String,
    /// Endpoint S3 (đặt khi dùng MinIO, bỏ trống để dùng AWS S3 mặc định)
    pub s3_endpoint_url: Option<String>,
    /// Tên bucket S3
    pub s3_bucket_name: String,
    /// Secret cấp quyền tạo tài khoản admin đầu tiên
    pub admin_bootstrap_secret: String,
    /// Chính sách cảnh báo an ninh đăng nhập
    pub security: SecurityPolicy,
}

/// Chính sách heuristic cảnh báo an ninh
///
/// Ngưỡng là quyết định vận hành, không cố định trong code nghiệp vụ;
/// đổi qua biến môi trường không cần build lại.
#[derive(Debug, Clone, Copy)]
pub struct SecurityPolicy {
    /// Cửa sổ trượt tính IP lạ (ngày)
    pub window_days: i64,
    /// Số IP công cộng khác nhau trong cửa sổ đủ để bật cảnh báo
    pub unique_ip_threshold: i64,
    /// Trần số bản ghi lịch sử đăng nhập trả về một lần
    pub history_limit_cap: i64,
}

impl Default for SecurityPolicy {
    fn default() -> Self {
        Self {
            window_days:         7,
            unique_ip_threshold: 3,
            history_limit_cap:   200,
        }
    }
}

impl ApiConfig {
    /// Đọc cấu hình từ biến môi trường
    ///
    /// | Biến | Bắt buộc | Mô tả |
    /// |------|----------|-------|
    /// | `API_HOST` | Không | Địa chỉ bind (mặc định `0.0.0.0`) |
    /// | `API_PORT` | **Có** | Cổng |
    /// | `DATABASE_URL` | **Có** | URL PostgreSQL |
    /// | `S3_ENDPOINT_URL` | Không | Endpoint MinIO/S3 tuỳ chỉnh |
    /// | `S3_BUCKET_NAME` | **Có** | Tên bucket |
    /// | `ADMIN_BOOTSTRAP_SECRET` | **Có** | Secret tạo admin đầu tiên |
    /// | `SECURITY_WINDOW_DAYS` | Không | Mặc định 7 |
    /// | `SECURITY_UNIQUE_IP_THRESHOLD` | Không | Mặc định 3 |
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("API_PORT")
                .map_err(|_| anyhow::anyhow!("API_PORT chưa được đặt"))?
                .parse()
                .map_err(|_| anyhow::anyhow!("API_PORT phải là số cổng hợp lệ"))?,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL chưa được đặt"))?,
            s3_endpoint_url: env::var("S3_ENDPOINT_URL").ok(),
            s3_bucket_name: env::var("S3_BUCKET_NAME")
                .map_err(|_| anyhow::anyhow!("S3_BUCKET_NAME chưa được đặt"))?,
            admin_bootstrap_secret: env::var("ADMIN_BOOTSTRAP_SECRET")
                .map_err(|_| anyhow::anyhow!("ADMIN_BOOTSTRAP_SECRET chưa được đặt"))?,
            security: SecurityPolicy::from_env()?,
        })
    }
}

impl SecurityPolicy {
    fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            window_days:         optional_i64("SECURITY_WINDOW_DAYS", defaults.window_days)?,
            unique_ip_threshold: optional_i64(
                "SECURITY_UNIQUE_IP_THRESHOLD",
                defaults.unique_ip_threshold,
            )?,
            history_limit_cap:   optional_i64(
                "SECURITY_HISTORY_LIMIT_CAP",
                defaults.history_limit_cap,
            )?,
        })
    }
}

fn optional_i64(name: &str, default: i64) -> anyhow::Result<i64> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| anyhow::anyhow!("{name} phải là số nguyên")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_chính_sách_mặc_định() {
        let policy = SecurityPolicy::default();
        assert_eq!(policy.window_days, 7);
        assert_eq!(policy.unique_ip_threshold, 3);
        assert_eq!(policy.history_limit_cap, 200);
    }
}
