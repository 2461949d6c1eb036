//! # An ninh đăng nhập
//!
//! Entity cho tính năng theo dõi đăng nhập và cảnh báo quản trị:
//!
//! - [`LoginSession`]: một lần thử đăng nhập, ghi lại IP (đã chuẩn hoá),
//!   user agent và kết quả. **Bất biến sau khi ghi** — không có đường cập
//!   nhật hay xoá.
//! - [`AdminAlert`]: sự kiện an ninh được đánh dấu cho quản trị viên xem.
//!   Thay đổi duy nhất được phép là lật cờ `read`. Không bao giờ bị xoá
//!   bởi ứng dụng.
//!
//! ## Bất biến
//!
//! - `AdminAlert` luôn tham chiếu một `User` tồn tại lúc tạo
//! - Đánh dấu đã đọc là idempotent

use chrono::{DateTime, Utc};

use crate::user::UserId;

define_uuid_id! {
    /// ID phiên đăng nhập
    pub struct SessionId;
}

define_uuid_id! {
    /// ID cảnh báo quản trị
    pub struct AlertId;
}

/// Danh mục cảnh báo
///
/// Lưu dạng chuỗi để thêm danh mục mới không cần migration.
pub mod alert_category {
    /// Số IP công cộng khác nhau trong cửa sổ trượt vượt ngưỡng
    pub const NEW_IP_THRESHOLD: &str = "new_ip_threshold";
}

/// Một lần thử đăng nhập (thành công hoặc thất bại)
///
/// Ghi một bản ghi cho **mọi** lần thử, không khử trùng lặp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSession {
    id:         SessionId,
    user_id:    UserId,
    ip:         String,
    user_agent: Option<String>,
    success:    bool,
    created_at: DateTime<Utc>,
}

impl LoginSession {
    /// Ghi nhận một lần thử đăng nhập
    ///
    /// `ip` phải đã được chuẩn hoá bởi tầng phân giải IP client trước khi
    /// tới đây; entity không chuẩn hoá lại.
    pub fn new(
        id: SessionId,
        user_id: UserId,
        ip: impl Into<String>,
        user_agent: Option<String>,
        success: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            ip: ip.into(),
            user_agent,
            success,
            created_at: now,
        }
    }

    /// Khôi phục từ dữ liệu đã lưu
    pub fn from_db(
        id: SessionId,
        user_id: UserId,
        ip: String,
        user_agent: Option<String>,
        success: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            ip,
            user_agent,
            success,
            created_at,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn ip(&self) -> &str {
        &self.ip
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Thống kê đăng nhập tổng hợp của một người dùng
///
/// Trường hợp chưa có phiên nào: tất cả bộ đếm bằng 0, không phải lỗi.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct LoginStats {
    pub total:     i64,
    pub successes: i64,
    pub failures:  i64,
}

/// Sự kiện an ninh dành cho quản trị viên
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminAlert {
    id:         AlertId,
    user_id:    UserId,
    category:   String,
    message:    String,
    read:       bool,
    created_at: DateTime<Utc>,
}

impl AdminAlert {
    /// Tạo cảnh báo mới (chưa đọc)
    pub fn new(
        id: AlertId,
        user_id: UserId,
        category: impl Into<String>,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            category: category.into(),
            message: message.into(),
            read: false,
            created_at: now,
        }
    }

    /// Khôi phục từ dữ liệu đã lưu
    pub fn from_db(
        id: AlertId,
        user_id: UserId,
        category: String,
        message: String,
        read: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            category,
            message,
            read,
            created_at,
        }
    }

    pub fn id(&self) -> &AlertId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_read(&self) -> bool {
        self.read
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Bản sao đã đánh dấu đọc — gọi trên cảnh báo đã đọc không đổi gì
    pub fn marked_read(self) -> Self {
        Self { read: true, ..self }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[fixture]
    fn alert(now: DateTime<Utc>) -> AdminAlert {
        AdminAlert::new(
            AlertId::new(),
            UserId::new(),
            alert_category::NEW_IP_THRESHOLD,
            "Phát hiện 3 IP khác nhau trong 7 ngày",
            now,
        )
    }

    #[rstest]
    fn test_cảnh_báo_mới_chưa_đọc(alert: AdminAlert) {
        assert!(!alert.is_read());
    }

    #[rstest]
    fn test_đánh_dấu_đọc(alert: AdminAlert) {
        assert!(alert.marked_read().is_read());
    }

    #[rstest]
    fn test_đánh_dấu_đọc_là_idempotent(alert: AdminAlert) {
        let once = alert.marked_read();
        let twice = once.clone().marked_read();
        assert_eq!(once, twice);
    }

    #[rstest]
    fn test_phiên_đăng_nhập_giữ_nguyên_ip_đã_chuẩn_hoá(now: DateTime<Utc>) {
        let session = LoginSession::new(
            SessionId::new(),
            UserId::new(),
            "203.0.113.5",
            Some("Mozilla/5.0".to_string()),
            true,
            now,
        );
        assert_eq!(session.ip(), "203.0.113.5");
    }

    #[test]
    fn test_thống_kê_mặc_định_toàn_số_không() {
        let stats = LoginStats::default();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.successes, 0);
        assert_eq!(stats.failures, 0);
    }
}
