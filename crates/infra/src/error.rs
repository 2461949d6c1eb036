//! # Lỗi tầng hạ tầng
//!
//! Bọc lỗi phát sinh khi giao tiếp với cơ sở dữ liệu và object storage.
//! Tầng API dịch các biến thể này sang phản hồi HTTP; chi tiết bên trong
//! chỉ được ghi log phía server.

use thiserror::Error;

/// Lỗi phát sinh trong tầng hạ tầng
#[derive(Debug, Error)]
pub enum InfraError {
    /// Lỗi cơ sở dữ liệu (truy vấn thất bại, mất kết nối, vi phạm ràng buộc)
    #[error("Lỗi cơ sở dữ liệu: {0}")]
    Database(#[from] sqlx::Error),

    /// Lỗi object storage
    ///
    /// Kiểu lỗi của AWS SDK có generic sâu khó dùng `#[from]`,
    /// map thủ công về String.
    #[error("Lỗi object storage: {0}")]
    S3(String),

    /// Đầu vào không hợp lệ phát hiện ở tầng hạ tầng
    #[error("Đầu vào không hợp lệ: {0}")]
    InvalidInput(String),

    /// Vi phạm ràng buộc UNIQUE, mang tên ràng buộc
    ///
    /// Postgres trả về qua biến thể `Database`; biến thể này dành cho
    /// mock in-memory mô phỏng trùng khoá.
    #[error("Vi phạm ràng buộc duy nhất: {0}")]
    UniqueViolation(String),

    /// Lỗi không phân loại được
    #[error("Lỗi không xác định: {0}")]
    Unexpected(String),
}

impl InfraError {
    /// Lỗi có phải vi phạm ràng buộc UNIQUE mang tên `constraint` không
    ///
    /// Dùng ở tầng usecase để dịch trùng khoá (ví dụ email đã tồn tại)
    /// thành phản hồi 409 Conflict.
    pub fn is_unique_violation(&self, constraint: &str) -> bool {
        match self {
            Self::UniqueViolation(c) => c == constraint,
            Self::Database(db_err) => db_err
                .as_database_error()
                .is_some_and(|e| e.is_unique_violation() && e.constraint() == Some(constraint)),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lỗi_không_phải_database_không_là_unique_violation() {
        let err = InfraError::Unexpected("x".to_string());
        assert!(!err.is_unique_violation("users_email_key"));
    }

    #[test]
    fn test_row_not_found_không_là_unique_violation() {
        let err = InfraError::from(sqlx::Error::RowNotFound);
        assert!(!err.is_unique_violation("users_email_key"));
    }

    #[test]
    fn test_unique_violation_khớp_đúng_tên_ràng_buộc() {
        let err = InfraError::UniqueViolation("users_email_key".to_string());
        assert!(err.is_unique_violation("users_email_key"));
        assert!(!err.is_unique_violation("lessons_course_order_key"));
    }
}
