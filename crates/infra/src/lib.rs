//! # KhoaHoc Infra
//!
//! Tầng hạ tầng: truy cập PostgreSQL qua sqlx, object storage qua
//! aws-sdk-s3, và băm mật khẩu Argon2id.
//!
//! ## Chính sách thiết kế
//!
//! - **Repository trait + impl Postgres**: tầng usecase chỉ phụ thuộc trait,
//!   test dùng mock in-memory (feature `test-utils`)
//! - **Không retry**: mọi truy vấn DB / gọi S3 chạy đúng một lần, lỗi nổi
//!   thẳng lên tầng API (lựa chọn đơn giản có chủ đích)
//! - **Truy vấn tham số hoá**: toàn bộ SQL đều bind tham số, không nối chuỗi

pub mod db;
pub mod error;
pub mod password;
pub mod repository;
pub mod s3;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use error::InfraError;
