//! # Người dùng
//!
//! Entity người dùng và các value object liên quan.
//!
//! ## Chính sách thiết kế
//!
//! - **Newtype**: [`UserId`] bọc UUID để an toàn kiểu
//! - **Bất biến**: field không công khai, thay đổi qua phương thức `with_*`
//! - **Kiểm tra khi tạo**: [`Email`] tự kiểm tra định dạng lúc khởi tạo

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::{DomainError, password::PasswordHash};

define_uuid_id! {
    /// ID người dùng (UUID v7, sắp xếp được theo thứ tự tạo)
    pub struct UserId;
}

/// Địa chỉ email (value object)
///
/// Kiểm tra cấu trúc cơ bản `local@domain` lúc tạo, tối đa 255 ký tự.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_string();

        if value.is_empty() {
            return Err(DomainError::Validation("Email là bắt buộc".to_string()));
        }

        let Some((local, domain)) = value.split_once('@') else {
            return Err(DomainError::Validation(
                "Email không đúng định dạng".to_string(),
            ));
        };

        if local.is_empty() || domain.is_empty() {
            return Err(DomainError::Validation(
                "Email không đúng định dạng".to_string(),
            ));
        }

        if value.len() > 255 {
            return Err(DomainError::Validation(
                "Email không được dài quá 255 ký tự".to_string(),
            ));
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Vai trò người dùng
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UserRole {
    /// Học viên (mặc định khi đăng ký)
    Student,
    /// Quản trị viên
    Admin,
}

impl std::str::FromStr for UserRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Self::Student),
            "admin" => Ok(Self::Admin),
            _ => Err(DomainError::Validation(format!(
                "Vai trò không hợp lệ: {s}"
            ))),
        }
    }
}

/// Entity người dùng
///
/// # Bất biến
///
/// - `email` duy nhất trong toàn hệ thống (ràng buộc ở tầng lưu trữ)
/// - Mật khẩu chỉ tồn tại dưới dạng hash Argon2id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id:            UserId,
    email:         Email,
    name:          String,
    password_hash: PasswordHash,
    role:          UserRole,
    created_at:    DateTime<Utc>,
    updated_at:    DateTime<Utc>,
}

impl User {
    /// Tạo người dùng mới
    ///
    /// Tên không được rỗng. Vai trò do tầng gọi quyết định (đăng ký thường
    /// là `Student`, bootstrap là `Admin`).
    pub fn new(
        id: UserId,
        email: Email,
        name: impl Into<String>,
        password_hash: PasswordHash,
        role: UserRole,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::Validation("Tên là bắt buộc".to_string()));
        }

        Ok(Self {
            id,
            email,
            name,
            password_hash,
            role,
            created_at: now,
            updated_at: now,
        })
    }

    /// Khôi phục entity từ dữ liệu đã lưu
    pub fn from_db(
        id: UserId,
        email: Email,
        name: String,
        password_hash: PasswordHash,
        role: UserRole,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            name,
            password_hash,
            role,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    pub fn role(&self) -> UserRole {
        self.role
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Người dùng có vai trò quản trị hay không
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
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
    fn student(now: DateTime<Utc>) -> User {
        User::new(
            UserId::new(),
            Email::new("hocvien@example.com").unwrap(),
            "Nguyễn Văn A",
            PasswordHash::new("$argon2id$stub"),
            UserRole::Student,
            now,
        )
        .unwrap()
    }

    // Email

    #[test]
    fn test_email_hợp_lệ_được_chấp_nhận() {
        assert!(Email::new("user@example.com").is_ok());
    }

    #[rstest]
    #[case("", "chuỗi rỗng")]
    #[case("khong-co-a-còng", "thiếu @")]
    #[case("@example.com", "phần local rỗng")]
    #[case("user@", "phần domain rỗng")]
    fn test_email_không_hợp_lệ_bị_từ_chối(#[case] input: &str, #[case] _reason: &str) {
        assert!(Email::new(input).is_err());
    }

    #[test]
    fn test_email_quá_255_ký_tự_bị_từ_chối() {
        let long = format!("{}@example.com", "a".repeat(256));
        assert!(Email::new(long).is_err());
    }

    // UserRole

    #[rstest]
    #[case("student", UserRole::Student)]
    #[case("admin", UserRole::Admin)]
    fn test_parse_vai_trò(#[case] input: &str, #[case] expected: UserRole) {
        assert_eq!(input.parse::<UserRole>().unwrap(), expected);
    }

    #[test]
    fn test_vai_trò_lạ_bị_từ_chối() {
        assert!("teacher".parse::<UserRole>().is_err());
    }

    // User

    #[rstest]
    fn test_học_viên_không_phải_quản_trị(student: User) {
        assert!(!student.is_admin());
    }

    #[rstest]
    fn test_tên_rỗng_bị_từ_chối(now: DateTime<Utc>) {
        let result = User::new(
            UserId::new(),
            Email::new("a@b.vn").unwrap(),
            "   ",
            PasswordHash::new("$argon2id$stub"),
            UserRole::Student,
            now,
        );
        assert!(result.is_err());
    }

    #[rstest]
    fn test_created_at_và_updated_at_bằng_thời_điểm_tiêm(now: DateTime<Utc>, student: User) {
        assert_eq!(student.created_at(), now);
        assert_eq!(student.updated_at(), now);
    }
}
