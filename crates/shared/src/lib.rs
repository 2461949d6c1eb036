//! # KhoaHoc Shared
//!
//! Các tiện ích dùng chung giữa các crate, không phụ thuộc tầng nào khác.
//!
//! ## Hướng phụ thuộc
//!
//! ```text
//! api → infra → domain → shared
//! ```
//!
//! Crate này chỉ chứa code thuần (không I/O): envelope phản hồi API,
//! phân giải IP client từ header proxy, và các hàm định dạng hiển thị.

pub mod api_response;
pub mod client_ip;
pub mod format;

pub use api_response::ApiResponse;
