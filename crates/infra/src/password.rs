//! # Băm và kiểm tra mật khẩu
//!
//! Argon2id với tham số khuyến nghị OWASP (RFC 9106):
//! memory 64 MB, 1 iteration, parallelism 1.

use argon2::{
    Argon2,
    Params,
    PasswordHasher as _,
    PasswordVerifier as _,
    password_hash::{PasswordHash as Argon2PasswordHash, SaltString, rand_core::OsRng},
};
use khoahoc_domain::password::{PasswordHash, PlainPassword};

use crate::InfraError;

/// Trait băm / kiểm tra mật khẩu
///
/// Tách trait để test usecase không phải trả chi phí Argon2 thật.
pub trait PasswordService: Send + Sync {
    /// Băm mật khẩu thô thành chuỗi PHC
    fn hash(&self, password: &PlainPassword) -> Result<PasswordHash, InfraError>;

    /// Kiểm tra mật khẩu thô với hash đã lưu
    ///
    /// # Errors
    ///
    /// Trả lỗi khi hash đã lưu sai định dạng PHC.
    fn verify(&self, password: &PlainPassword, hash: &PasswordHash) -> Result<bool, InfraError>;
}

/// Triển khai bằng Argon2id
pub struct Argon2PasswordService {
    argon2: Argon2<'static>,
}

impl Argon2PasswordService {
    pub fn new() -> Self {
        let params = Params::new(
            65536, // memory (KB) = 64 MB
            1,     // iterations
            1,     // parallelism
            None,  // độ dài output (mặc định 32)
        )
        .expect("tham số Argon2 không hợp lệ");

        Self {
            argon2: Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params),
        }
    }
}

impl Default for Argon2PasswordService {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordService for Argon2PasswordService {
    fn hash(&self, password: &PlainPassword) -> Result<PasswordHash, InfraError> {
        let salt = SaltString::generate(&mut OsRng);
        let hashed = self
            .argon2
            .hash_password(password.as_str().as_bytes(), &salt)
            .map_err(|e| InfraError::Unexpected(format!("Băm mật khẩu thất bại: {e}")))?;

        Ok(PasswordHash::new(hashed.to_string()))
    }

    fn verify(&self, password: &PlainPassword, hash: &PasswordHash) -> Result<bool, InfraError> {
        let parsed = Argon2PasswordHash::new(hash.as_str())
            .map_err(|e| InfraError::Unexpected(format!("Hash sai định dạng: {e}")))?;

        Ok(self
            .argon2
            .verify_password(password.as_str().as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_băm_rồi_kiểm_tra_đúng_mật_khẩu() {
        let service = Argon2PasswordService::new();
        let password = PlainPassword::new("matkhau123");

        let hash = service.hash(&password).unwrap();

        assert!(service.verify(&password, &hash).unwrap());
    }

    #[rstest]
    fn test_mật_khẩu_sai_không_khớp() {
        let service = Argon2PasswordService::new();
        let hash = service.hash(&PlainPassword::new("matkhau123")).unwrap();

        let result = service.verify(&PlainPassword::new("saimatkhau"), &hash).unwrap();

        assert!(!result);
    }

    #[rstest]
    fn test_hash_sai_định_dạng_trả_lỗi() {
        let service = Argon2PasswordService::new();
        let result = service.verify(
            &PlainPassword::new("matkhau123"),
            &PasswordHash::new("khong-phai-hash"),
        );

        assert!(result.is_err());
    }
}
