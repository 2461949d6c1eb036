//! # Usecase
//!
//! Logic nghiệp vụ của API server. Handler giữ mỏng, mọi quyết định
//! nghiệp vụ nằm ở đây; usecase chỉ phụ thuộc trait repository nên test
//! được bằng mock in-memory.

pub mod auth;
pub mod lesson;
pub mod login_security;
pub mod upload;

pub use auth::{AuthUseCase, CreateAdminInput, LoginInput, RegisterInput};
pub use lesson::LessonUseCase;
pub use login_security::{LoginSecurityUseCase, SecurityDossier};
pub use upload::{GenerateUploadUrlInput, PresignedUpload, UploadUseCase};
