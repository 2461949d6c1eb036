//! # Value object mật khẩu
//!
//! Tách mật khẩu thô và hash thành hai kiểu riêng để không bao giờ
//! lẫn lộn, và để Debug không in mật khẩu thô ra log.

/// Mật khẩu thô do người dùng nhập
///
/// `Debug` in `[REDACTED]`, không có `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct PlainPassword(String);

impl PlainPassword {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for PlainPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PlainPassword([REDACTED])")
    }
}

/// Hash mật khẩu ở định dạng PHC (Argon2id)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_không_lộ_mật_khẩu_thô() {
        let password = PlainPassword::new("bí-mật-123");
        let debug = format!("{password:?}");

        assert!(!debug.contains("bí-mật-123"));
        assert!(debug.contains("REDACTED"));
    }
}
