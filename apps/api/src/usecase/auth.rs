//! # Usecase tài khoản
//!
//! Đăng ký, đăng nhập, kiểm tra quyền admin và tạo admin đầu tiên.
//!
//! ## Tạo admin đầu tiên
//!
//! Endpoint cấp phát một lần, canh bằng secret chia sẻ. So sánh secret
//! dùng [`subtle::ConstantTimeEq`] để không lộ độ dài tiền tố khớp qua
//! thời gian phản hồi; mọi lần gọi, khớp hay không, đều để lại log
//! kiểm toán.

use std::sync::Arc;

use khoahoc_domain::{
    clock::Clock,
    password::PlainPassword,
    user::{Email, User, UserId, UserRole},
};
use khoahoc_infra::{
    password::PasswordService,
    repository::{EMAIL_UNIQUE_CONSTRAINT, UserRepository},
};
use subtle::ConstantTimeEq;

use crate::{error::ApiError, usecase::login_security::LoginSecurityUseCase};

/// Đầu vào đăng ký tài khoản
pub struct RegisterInput {
    pub email:    Email,
    pub name:     String,
    pub password: PlainPassword,
}

/// Đầu vào đăng nhập
pub struct LoginInput {
    pub email:      Email,
    pub password:   PlainPassword,
    /// IP đã chuẩn hoá của client
    pub ip:         String,
    pub user_agent: Option<String>,
}

/// Đầu vào tạo admin đầu tiên
pub struct CreateAdminInput {
    pub secret:   String,
    pub email:    Email,
    pub name:     String,
    pub password: PlainPassword,
}

/// Usecase tài khoản
pub struct AuthUseCase {
    user_repository:        Arc<dyn UserRepository>,
    password_service:       Arc<dyn PasswordService>,
    security:               Arc<LoginSecurityUseCase>,
    clock:                  Arc<dyn Clock>,
    admin_bootstrap_secret: String,
}

impl AuthUseCase {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        password_service: Arc<dyn PasswordService>,
        security: Arc<LoginSecurityUseCase>,
        clock: Arc<dyn Clock>,
        admin_bootstrap_secret: String,
    ) -> Self {
        Self {
            user_repository,
            password_service,
            security,
            clock,
            admin_bootstrap_secret,
        }
    }

    /// Đăng ký tài khoản học viên
    ///
    /// Email trùng trả về 409, không tạo bản ghi thứ hai.
    pub async fn register(&self, input: RegisterInput) -> Result<User, ApiError> {
        let hash = self.password_service.hash(&input.password)?;
        let user = User::new(
            UserId::new(),
            input.email,
            input.name,
            hash,
            UserRole::Student,
            self.clock.now(),
        )?;

        match self.user_repository.insert(&user).await {
            Ok(()) => Ok(user),
            Err(e) if e.is_unique_violation(EMAIL_UNIQUE_CONSTRAINT) => Err(ApiError::Conflict(
                "Email đã được sử dụng".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Đăng nhập
    ///
    /// Mọi lần thử (kể cả thất bại) được ghi vào nhật ký phiên. Thông
    /// điệp lỗi không phân biệt "email không tồn tại" và "sai mật khẩu".
    pub async fn login(&self, input: LoginInput) -> Result<User, ApiError> {
        const WRONG_CREDENTIALS: &str = "Email hoặc mật khẩu không đúng";

        let Some(user) = self.user_repository.find_by_email(&input.email).await? else {
            return Err(ApiError::Unauthorized(WRONG_CREDENTIALS.to_string()));
        };

        let verified = self
            .password_service
            .verify(&input.password, user.password_hash())?;

        self.security
            .record_attempt(*user.id(), &input.ip, input.user_agent, verified)
            .await?;

        if !verified {
            return Err(ApiError::Unauthorized(WRONG_CREDENTIALS.to_string()));
        }
        Ok(user)
    }

    /// Kiểm tra cặp (id, email) có phải tài khoản admin không
    pub async fn check_admin(&self, user_id: &UserId, email: &Email) -> Result<User, ApiError> {
        let Some(user) = self.user_repository.find_by_id(user_id).await? else {
            return Err(ApiError::Unauthorized(
                "Tài khoản không tồn tại".to_string(),
            ));
        };

        if user.email() != email || !user.is_admin() {
            return Err(ApiError::Forbidden(
                "Tài khoản không có quyền quản trị".to_string(),
            ));
        }
        Ok(user)
    }

    /// Tạo tài khoản admin đầu tiên, canh bằng secret chia sẻ
    pub async fn create_admin(&self, input: CreateAdminInput) -> Result<User, ApiError> {
        let matched: bool = input
            .secret
            .as_bytes()
            .ct_eq(self.admin_bootstrap_secret.as_bytes())
            .into();

        if !matched {
            tracing::warn!(email = %input.email, "Tạo admin bị từ chối: secret không khớp");
            return Err(ApiError::Forbidden("Secret không hợp lệ".to_string()));
        }

        let existing_admins = self.user_repository.count_by_role(UserRole::Admin).await?;
        tracing::warn!(
            email = %input.email,
            existing_admins,
            "Chấp nhận yêu cầu tạo tài khoản admin"
        );

        let hash = self.password_service.hash(&input.password)?;
        let user = User::new(
            UserId::new(),
            input.email,
            input.name,
            hash,
            UserRole::Admin,
            self.clock.now(),
        )?;

        match self.user_repository.insert(&user).await {
            Ok(()) => Ok(user),
            Err(e) if e.is_unique_violation(EMAIL_UNIQUE_CONSTRAINT) => Err(ApiError::Conflict(
                "Email đã được sử dụng".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use khoahoc_domain::clock::FixedClock;
    use khoahoc_infra::{
        mock::{MockLoginSecurityRepository, MockUserRepository},
        repository::LoginSecurityRepository,
    };
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::config::SecurityPolicy;

    #[fixture]
    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    /// PasswordService giả, không chạy Argon2 thật cho nhanh
    struct PlainTextPasswordService;

    impl PasswordService for PlainTextPasswordService {
        fn hash(
            &self,
            password: &PlainPassword,
        ) -> Result<khoahoc_domain::password::PasswordHash, khoahoc_infra::InfraError> {
            Ok(khoahoc_domain::password::PasswordHash::new(
                password.as_str().to_string(),
            ))
        }

        fn verify(
            &self,
            password: &PlainPassword,
            hash: &khoahoc_domain::password::PasswordHash,
        ) -> Result<bool, khoahoc_infra::InfraError> {
            Ok(password.as_str() == hash.as_str())
        }
    }

    fn usecase(
        users: MockUserRepository,
        security: MockLoginSecurityRepository,
        now: DateTime<Utc>,
    ) -> AuthUseCase {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(now));
        AuthUseCase::new(
            Arc::new(users),
            Arc::new(PlainTextPasswordService),
            Arc::new(LoginSecurityUseCase::new(
                Arc::new(security),
                Arc::clone(&clock),
                SecurityPolicy::default(),
            )),
            clock,
            "bi-mat".to_string(),
        )
    }

    fn register_input(email: &str) -> RegisterInput {
        RegisterInput {
            email:    Email::new(email).unwrap(),
            name:     "Nguyễn Văn A".to_string(),
            password: PlainPassword::new("mat-khau-123"),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn test_đăng_ký_thành_công(now: DateTime<Utc>) {
        let usecase = usecase(
            MockUserRepository::new(),
            MockLoginSecurityRepository::new(),
            now,
        );

        let user = usecase.register(register_input("a@example.com")).await.unwrap();

        assert_eq!(user.email().as_str(), "a@example.com");
        assert_eq!(user.role(), UserRole::Student);
    }

    #[rstest]
    #[tokio::test]
    async fn test_email_trùng_trả_về_conflict(now: DateTime<Utc>) {
        let usecase = usecase(
            MockUserRepository::new(),
            MockLoginSecurityRepository::new(),
            now,
        );

        usecase.register(register_input("a@example.com")).await.unwrap();
        let result = usecase.register(register_input("a@example.com")).await;

        assert!(matches!(result, Err(ApiError::Conflict(_))));
    }

    #[rstest]
    #[tokio::test]
    async fn test_đăng_nhập_ghi_phiên_thành_công(now: DateTime<Utc>) {
        let users = MockUserRepository::new();
        let security = MockLoginSecurityRepository::new();
        let usecase = usecase(users, security.clone(), now);

        usecase.register(register_input("a@example.com")).await.unwrap();
        let user = usecase
            .login(LoginInput {
                email:      Email::new("a@example.com").unwrap(),
                password:   PlainPassword::new("mat-khau-123"),
                ip:         "203.0.113.5".to_string(),
                user_agent: Some("Mozilla/5.0".to_string()),
            })
            .await
            .unwrap();

        let stats = security.login_stats(user.id()).await.unwrap();
        assert_eq!(stats.successes, 1);
        assert_eq!(stats.failures, 0);
    }

    #[rstest]
    #[tokio::test]
    async fn test_sai_mật_khẩu_vẫn_ghi_phiên_thất_bại(now: DateTime<Utc>) {
        let security = MockLoginSecurityRepository::new();
        let usecase = usecase(MockUserRepository::new(), security.clone(), now);

        let user = usecase.register(register_input("a@example.com")).await.unwrap();
        let result = usecase
            .login(LoginInput {
                email:      Email::new("a@example.com").unwrap(),
                password:   PlainPassword::new("sai-mat-khau"),
                ip:         "203.0.113.5".to_string(),
                user_agent: None,
            })
            .await;

        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
        let stats = security.login_stats(user.id()).await.unwrap();
        assert_eq!(stats.failures, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_kiểm_tra_admin_từ_chối_học_viên(now: DateTime<Utc>) {
        let usecase = usecase(
            MockUserRepository::new(),
            MockLoginSecurityRepository::new(),
            now,
        );

        let user = usecase.register(register_input("a@example.com")).await.unwrap();
        let result = usecase.check_admin(user.id(), user.email()).await;

        assert!(matches!(result, Err(ApiError::Forbidden(_))));
    }

    #[rstest]
    #[tokio::test]
    async fn test_tạo_admin_sai_secret_bị_từ_chối(now: DateTime<Utc>) {
        let usecase = usecase(
            MockUserRepository::new(),
            MockLoginSecurityRepository::new(),
            now,
        );

        let result = usecase
            .create_admin(CreateAdminInput {
                secret:   "sai".to_string(),
                email:    Email::new("admin@example.com").unwrap(),
                name:     "Quản trị".to_string(),
                password: PlainPassword::new("mat-khau-123"),
            })
            .await;

        assert!(matches!(result, Err(ApiError::Forbidden(_))));
    }

    #[rstest]
    #[tokio::test]
    async fn test_tạo_admin_đúng_secret(now: DateTime<Utc>) {
        let usecase = usecase(
            MockUserRepository::new(),
            MockLoginSecurityRepository::new(),
            now,
        );

        let user = usecase
            .create_admin(CreateAdminInput {
                secret:   "bi-mat".to_string(),
                email:    Email::new("admin@example.com").unwrap(),
                name:     "Quản trị".to_string(),
                password: PlainPassword::new("mat-khau-123"),
            })
            .await
            .unwrap();

        assert!(user.is_admin());
    }
}
