//! # Lỗi tầng nghiệp vụ
//!
//! Biểu diễn vi phạm quy tắc nghiệp vụ. Tầng API ánh xạ các biến thể này
//! sang mã trạng thái HTTP:
//!
//! | Biến thể | HTTP |
//! |----------|------|
//! | `Validation` | 400 Bad Request |
//! | `NotFound` | 404 Not Found |
//! | `Conflict` | 409 Conflict |
//! | `Forbidden` | 403 Forbidden |

use thiserror::Error;

/// Lỗi phát sinh trong tầng nghiệp vụ
#[derive(Debug, Error)]
pub enum DomainError {
    /// Dữ liệu đầu vào vi phạm quy tắc nghiệp vụ
    #[error("Dữ liệu không hợp lệ: {0}")]
    Validation(String),

    /// Entity không tồn tại
    ///
    /// `entity_type` là tên loại entity ("Course", "Lesson", ...) để thông
    /// điệp lỗi cụ thể hơn.
    #[error("Không tìm thấy {entity_type}: {id}")]
    NotFound {
        /// Loại entity ("Course", "Lesson", "User", ...)
        entity_type: &'static str,
        /// Định danh dùng khi tra cứu
        id:          String,
    },

    /// Xung đột dữ liệu (trùng khoá duy nhất, cập nhật đồng thời)
    #[error("Xung đột dữ liệu: {0}")]
    Conflict(String),

    /// Không đủ quyền thực hiện thao tác
    #[error("Không có quyền: {0}")]
    Forbidden(String),
}
