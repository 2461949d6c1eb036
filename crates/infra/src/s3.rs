//! # Object storage (S3-compatible)
//!
//! Sinh presigned URL cho client tải tệp trực tiếp lên object storage,
//! không proxy byte qua ứng dụng.
//!
//! ## Chính sách thiết kế
//!
//! - **Phát triển cục bộ**: MinIO qua `S3_ENDPOINT_URL`
//! - **Production**: Long Vân / AWS S3, xác thực bằng chuỗi credential
//!   mặc định của SDK
//! - Ứng dụng chỉ phát URL; upload thật do trình duyệt PUT thẳng lên bucket

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::{Client, presigning::PresigningConfig};

use crate::InfraError;

/// Interface sinh presigned URL
///
/// Tách trait để test usecase thay bằng mock, không gọi SDK thật.
#[async_trait]
pub trait S3Client: Send + Sync {
    /// Sinh presigned PUT URL (tải lên)
    ///
    /// # Tham số
    ///
    /// * `s3_key` - key của object (ví dụ `documents/1717000000000-a1b2c3.pdf`)
    /// * `content_type` - MIME type client phải gửi kèm
    /// * `expires_in` - thời hạn hiệu lực của URL
    async fn generate_presigned_put_url(
        &self,
        s3_key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String, InfraError>;

    /// Sinh presigned GET URL (tải xuống)
    async fn generate_presigned_get_url(
        &self,
        s3_key: &str,
        expires_in: Duration,
    ) -> Result<String, InfraError>;
}

/// Triển khai bằng `aws-sdk-s3`, tương thích MinIO
pub struct AwsS3Client {
    client:      Client,
    bucket_name: String,
}

impl AwsS3Client {
    pub fn new(client: Client, bucket_name: String) -> Self {
        Self {
            client,
            bucket_name,
        }
    }
}

#[async_trait]
impl S3Client for AwsS3Client {
    async fn generate_presigned_put_url(
        &self,
        s3_key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String, InfraError> {
        let presign_config = PresigningConfig::expires_in(expires_in)
            .map_err(|e| InfraError::S3(format!("Cấu hình presign thất bại: {e}")))?;

        let presigned = self
            .client
            .put_object()
            .bucket(&self.bucket_name)
            .key(s3_key)
            .content_type(content_type)
            .presigned(presign_config)
            .await
            .map_err(|e| InfraError::S3(format!("Sinh presigned PUT URL thất bại: {e}")))?;

        Ok(presigned.uri().to_string())
    }

    async fn generate_presigned_get_url(
        &self,
        s3_key: &str,
        expires_in: Duration,
    ) -> Result<String, InfraError> {
        let presign_config = PresigningConfig::expires_in(expires_in)
            .map_err(|e| InfraError::S3(format!("Cấu hình presign thất bại: {e}")))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket_name)
            .key(s3_key)
            .presigned(presign_config)
            .await
            .map_err(|e| InfraError::S3(format!("Sinh presigned GET URL thất bại: {e}")))?;

        Ok(presigned.uri().to_string())
    }
}

/// Tạo client S3
///
/// `endpoint` là `Some` khi dùng MinIO hoặc nhà cung cấp S3-compatible khác;
/// `None` dùng endpoint AWS mặc định. Credential lấy từ chuỗi xác thực mặc
/// định của SDK (biến môi trường `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`
/// khi chạy cục bộ, IAM role trên production).
pub async fn create_client(endpoint: Option<&str>) -> Client {
    let mut config_builder = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new("ap-southeast-1"));

    if let Some(endpoint_url) = endpoint {
        config_builder = config_builder.endpoint_url(endpoint_url);
    }

    let config = config_builder.load().await;

    // MinIO và phần lớn storage S3-compatible yêu cầu path-style URL
    let s3_config_builder = aws_sdk_s3::config::Builder::from(&config);
    let s3_config = if endpoint.is_some() {
        s3_config_builder.force_path_style(true).build()
    } else {
        s3_config_builder.build()
    };

    Client::from_conf(s3_config)
}
