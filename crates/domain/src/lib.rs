//! # KhoaHoc Domain
//!
//! Mô hình nghiệp vụ của nền tảng khoá học: entity, value object và lỗi
//! nghiệp vụ. Crate này không biết gì về HTTP hay cơ sở dữ liệu.
//!
//! ## Hướng phụ thuộc
//!
//! ```text
//! api → infra → domain → shared
//! ```
//!
//! ## Quy ước
//!
//! - **Newtype ID**: mọi ID là UUID v7 bọc trong newtype (xem
//!   [`macros`](crate::course::CourseId))
//! - **Bất biến**: entity không có setter; thay đổi qua phương thức `with_*`
//!   trả về bản sao mới
//! - **Thời gian tiêm vào**: không gọi `Utc::now()` trong entity, thời điểm
//!   do tầng gọi cung cấp qua [`clock::Clock`]

#[macro_use]
mod macros;

pub mod clock;
pub mod course;
pub mod error;
pub mod instructor;
pub mod lesson;
pub mod password;
pub mod security;
pub mod site_setting;
pub mod upload;
pub mod user;

pub use error::DomainError;
