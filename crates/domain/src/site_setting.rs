//! # Cấu hình trang
//!
//! Cặp key/value cấu hình do quản trị viên chỉnh sửa (nội quy, thông tin
//! liên hệ, ...). Key `site_rules` được đọc công khai qua `GET /site-rules`.

use chrono::{DateTime, Utc};

use crate::DomainError;

/// Key của nội quy trang, endpoint công khai duy nhất đọc trực tiếp
pub const SITE_RULES_KEY: &str = "site_rules";

/// Một mục cấu hình trang
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSetting {
    key:        String,
    value:      String,
    updated_at: DateTime<Utc>,
}

impl SiteSetting {
    /// Tạo mục cấu hình mới
    ///
    /// Key chỉ gồm chữ thường, số và `_` để tránh key bẩn lọt vào bảng.
    pub fn new(
        key: impl Into<String>,
        value: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let key = key.into().trim().to_string();

        if key.is_empty() {
            return Err(DomainError::Validation("Key cấu hình là bắt buộc".to_string()));
        }

        if !key
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
        {
            return Err(DomainError::Validation(format!(
                "Key cấu hình không hợp lệ: {key}"
            )));
        }

        Ok(Self {
            key,
            value: value.into(),
            updated_at: now,
        })
    }

    /// Khôi phục từ dữ liệu đã lưu
    pub fn from_db(key: String, value: String, updated_at: DateTime<Utc>) -> Self {
        Self {
            key,
            value,
            updated_at,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("site_rules")]
    #[case("contact_email")]
    #[case("banner_v2")]
    fn test_key_hợp_lệ(#[case] key: &str) {
        assert!(SiteSetting::new(key, "giá trị", Utc::now()).is_ok());
    }

    #[rstest]
    #[case("")]
    #[case("Có Hoa")]
    #[case("dấu cách")]
    #[case("chấm.than")]
    fn test_key_không_hợp_lệ(#[case] key: &str) {
        assert!(SiteSetting::new(key, "giá trị", Utc::now()).is_err());
    }
}
