//! # SiteSettingRepository
//!
//! Cấu hình trang theo cặp key/value, ghi theo ngữ nghĩa upsert.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use khoahoc_domain::site_setting::SiteSetting;
use sqlx::PgPool;

use crate::error::InfraError;

/// Trait repository cấu hình trang
#[async_trait]
pub trait SiteSettingRepository: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<SiteSetting>, InfraError>;

    /// Ghi đè nếu key đã tồn tại, tạo mới nếu chưa
    async fn upsert(&self, setting: &SiteSetting) -> Result<(), InfraError>;

    async fn all(&self) -> Result<Vec<SiteSetting>, InfraError>;
}

#[derive(sqlx::FromRow)]
struct SiteSettingRow {
    key:        String,
    value:      String,
    updated_at: DateTime<Utc>,
}

impl SiteSettingRow {
    fn into_setting(self) -> SiteSetting {
        SiteSetting::from_db(self.key, self.value, self.updated_at)
    }
}

/// Triển khai PostgreSQL
#[derive(Debug, Clone)]
pub struct PostgresSiteSettingRepository {
    pool: PgPool,
}

impl PostgresSiteSettingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SiteSettingRepository for PostgresSiteSettingRepository {
    async fn get(&self, key: &str) -> Result<Option<SiteSetting>, InfraError> {
        let row = sqlx::query_as::<_, SiteSettingRow>(
            "SELECT key, value, updated_at FROM site_settings WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SiteSettingRow::into_setting))
    }

    async fn upsert(&self, setting: &SiteSetting) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            INSERT INTO site_settings (key, value, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (key) DO UPDATE
                SET value = EXCLUDED.value, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(setting.key())
        .bind(setting.value())
        .bind(setting.updated_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn all(&self) -> Result<Vec<SiteSetting>, InfraError> {
        let rows = sqlx::query_as::<_, SiteSettingRow>(
            "SELECT key, value, updated_at FROM site_settings ORDER BY key",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SiteSettingRow::into_setting).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_là_send_và_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PostgresSiteSettingRepository>();
    }
}
