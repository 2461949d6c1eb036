//! # Usecase tải tệp
//!
//! Phát presigned URL cho client PUT thẳng lên object storage và quản lý
//! bản ghi metadata đi kèm.
//!
//! ## Bố cục key
//!
//! `{folder}/{epoch_ms}-{token}.{ext}` — timestamp mili giây cộng token
//! ngẫu nhiên 8 ký tự chống trùng key khi hai client tải cùng lúc.

use std::{sync::Arc, time::Duration};

use khoahoc_domain::{
    clock::Clock,
    lesson::LessonId,
    upload::{Upload, UploadId, UploadKind},
};
use khoahoc_infra::{repository::UploadRepository, s3::S3Client};
use rand::distr::{Alphanumeric, SampleString};

use crate::error::ApiError;

/// Thời hạn hiệu lực presigned URL
const UPLOAD_URL_TTL: Duration = Duration::from_secs(5 * 60);

/// Độ dài token ngẫu nhiên trong key
const KEY_TOKEN_LEN: usize = 8;

/// Đầu vào yêu cầu presigned URL
pub struct GenerateUploadUrlInput {
    pub file_name:    String,
    pub content_type: String,
    /// Thư mục logic trên bucket (`documents`, `videos`, ...)
    pub folder:       String,
    pub kind:         UploadKind,
    pub lesson_id:    Option<LessonId>,
    pub size_bytes:   Option<i64>,
}

/// Kết quả phát presigned URL
pub struct PresignedUpload {
    pub upload_id:       UploadId,
    pub upload_url:      String,
    pub s3_key:          String,
    pub expires_in_secs: u64,
}

/// Usecase tải tệp
pub struct UploadUseCase {
    s3_client:         Arc<dyn S3Client>,
    upload_repository: Arc<dyn UploadRepository>,
    clock:             Arc<dyn Clock>,
}

impl UploadUseCase {
    pub fn new(
        s3_client: Arc<dyn S3Client>,
        upload_repository: Arc<dyn UploadRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            s3_client,
            upload_repository,
            clock,
        }
    }

    /// Phát presigned PUT URL và ghi bản ghi metadata
    pub async fn generate_upload_url(
        &self,
        input: GenerateUploadUrlInput,
    ) -> Result<PresignedUpload, ApiError> {
        if !input
            .folder
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
            || input.folder.is_empty()
        {
            return Err(ApiError::Validation(
                "Thư mục chỉ được chứa chữ thường, số, gạch ngang và gạch dưới".to_string(),
            ));
        }

        let extension = input
            .file_name
            .rsplit_once('.')
            .map_or("bin", |(_, ext)| ext);
        let epoch_ms = self.clock.now().timestamp_millis();
        let token = Alphanumeric
            .sample_string(&mut rand::rng(), KEY_TOKEN_LEN)
            .to_lowercase();
        let s3_key = format!("{}/{epoch_ms}-{token}.{extension}", input.folder);

        let upload_url = self
            .s3_client
            .generate_presigned_put_url(&s3_key, &input.content_type, UPLOAD_URL_TTL)
            .await?;

        let upload = Upload::new(
            UploadId::new(),
            input.lesson_id,
            input.file_name,
            s3_key.clone(),
            input.content_type,
            input.kind,
            input.size_bytes,
            self.clock.now(),
        )?;
        self.upload_repository.insert(&upload).await?;

        Ok(PresignedUpload {
            upload_id: *upload.id(),
            upload_url,
            s3_key,
            expires_in_secs: UPLOAD_URL_TTL.as_secs(),
        })
    }

    /// Xoá bản ghi tải lên
    ///
    /// Chỉ xoá bản ghi DB; object trên bucket giữ nguyên và key mồ côi
    /// được ghi log để dọn tay sau.
    pub async fn delete_upload(&self, id: &UploadId) -> Result<(), ApiError> {
        let Some(deleted) = self.upload_repository.delete(id).await? else {
            return Err(ApiError::NotFound(
                "Không tìm thấy bản ghi tải lên".to_string(),
            ));
        };

        tracing::warn!(
            s3_key = deleted.s3_key(),
            "Đã xoá bản ghi tải lên, object trên bucket trở thành mồ côi"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use khoahoc_domain::clock::FixedClock;
    use khoahoc_infra::{InfraError, mock::MockUploadRepository};
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use super::*;

    /// S3Client giả, trả URL cố định và ghi lại key đã nhận
    struct FakeS3Client;

    #[async_trait]
    impl S3Client for FakeS3Client {
        async fn generate_presigned_put_url(
            &self,
            s3_key: &str,
            _content_type: &str,
            _expires_in: Duration,
        ) -> Result<String, InfraError> {
            Ok(format!("https://bucket.example.com/{s3_key}?signature=x"))
        }

        async fn generate_presigned_get_url(
            &self,
            s3_key: &str,
            _expires_in: Duration,
        ) -> Result<String, InfraError> {
            Ok(format!("https://bucket.example.com/{s3_key}"))
        }
    }

    #[fixture]
    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn usecase(repository: MockUploadRepository, now: DateTime<Utc>) -> UploadUseCase {
        UploadUseCase::new(
            Arc::new(FakeS3Client),
            Arc::new(repository),
            Arc::new(FixedClock::new(now)),
        )
    }

    fn input(file_name: &str, folder: &str) -> GenerateUploadUrlInput {
        GenerateUploadUrlInput {
            file_name:    file_name.to_string(),
            content_type: "application/pdf".to_string(),
            folder:       folder.to_string(),
            kind:         UploadKind::Document,
            lesson_id:    None,
            size_bytes:   Some(1024),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn test_key_theo_bố_cục_thư_mục_timestamp_token(now: DateTime<Utc>) {
        let usecase = usecase(MockUploadRepository::new(), now);

        let result = usecase
            .generate_upload_url(input("bai-giang.pdf", "documents"))
            .await
            .unwrap();

        let epoch_ms = now.timestamp_millis();
        assert!(result.s3_key.starts_with(&format!("documents/{epoch_ms}-")));
        assert!(result.s3_key.ends_with(".pdf"));
        assert_eq!(result.expires_in_secs, 300);
    }

    #[rstest]
    #[tokio::test]
    async fn test_tệp_không_đuôi_dùng_bin(now: DateTime<Utc>) {
        let usecase = usecase(MockUploadRepository::new(), now);

        let result = usecase
            .generate_upload_url(input("README", "documents"))
            .await
            .unwrap();

        assert!(result.s3_key.ends_with(".bin"));
    }

    #[rstest]
    #[tokio::test]
    async fn test_thư_mục_không_hợp_lệ_bị_từ_chối(now: DateTime<Utc>) {
        let usecase = usecase(MockUploadRepository::new(), now);

        let result = usecase
            .generate_upload_url(input("a.pdf", "../etc"))
            .await;

        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[rstest]
    #[tokio::test]
    async fn test_xoá_bản_ghi_không_tồn_tại_trả_404(now: DateTime<Utc>) {
        let usecase = usecase(MockUploadRepository::new(), now);

        let result = usecase.delete_upload(&UploadId::new()).await;

        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[rstest]
    #[tokio::test]
    async fn test_xoá_chỉ_gỡ_bản_ghi_db(now: DateTime<Utc>) {
        let repository = MockUploadRepository::new();
        let usecase = usecase(repository.clone(), now);

        let result = usecase
            .generate_upload_url(input("a.pdf", "documents"))
            .await
            .unwrap();
        usecase.delete_upload(&result.upload_id).await.unwrap();

        let remaining = repository.delete(&result.upload_id).await.unwrap();
        assert_eq!(remaining, None);
    }
}
