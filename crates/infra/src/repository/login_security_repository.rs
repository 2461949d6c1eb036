//! # LoginSecurityRepository
//!
//! Nhật ký phiên đăng nhập và cảnh báo quản trị.
//!
//! ## Chính sách thiết kế
//!
//! - Phiên đăng nhập là bản ghi bất biến, chỉ ghi thêm
//! - Thống kê IP lạ tính theo cửa sổ thời gian do tầng gọi truyền vào
//!   (`since`), repository không tự quyết định chính sách
//! - `mark_alert_read` idempotent: gọi lại trên cảnh báo đã đọc hoặc
//!   không tồn tại đều không có tác dụng phụ

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use khoahoc_domain::{
    security::{AdminAlert, AlertId, LoginSession, LoginStats, SessionId},
    user::UserId,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::InfraError;

/// Trait repository an ninh đăng nhập
#[async_trait]
pub trait LoginSecurityRepository: Send + Sync {
    async fn insert_session(&self, session: &LoginSession) -> Result<(), InfraError>;

    /// Tổng / thành công / thất bại của một người dùng
    async fn login_stats(&self, user_id: &UserId) -> Result<LoginStats, InfraError>;

    /// Các phiên gần nhất, mới trước
    async fn recent_sessions(
        &self,
        user_id: &UserId,
        limit: i64,
    ) -> Result<Vec<LoginSession>, InfraError>;

    /// IP khác nhau xuất hiện trong nhật ký kể từ `since` (tính cả lần
    /// thử thất bại), sắp theo lần xuất hiện gần nhất
    async fn recent_ips(
        &self,
        user_id: &UserId,
        since: DateTime<Utc>,
    ) -> Result<Vec<String>, InfraError>;

    /// Số IP khác nhau xuất hiện trong nhật ký kể từ `since`, tính cả
    /// lần thử thất bại
    async fn count_unique_ips(
        &self,
        user_id: &UserId,
        since: DateTime<Utc>,
    ) -> Result<i64, InfraError>;

    async fn insert_alert(&self, alert: &AdminAlert) -> Result<(), InfraError>;

    /// Cảnh báo chưa đọc, mới trước
    async fn unread_alerts(&self) -> Result<Vec<AdminAlert>, InfraError>;

    /// Toàn bộ cảnh báo, mới trước
    async fn all_alerts(&self) -> Result<Vec<AdminAlert>, InfraError>;

    /// Đánh dấu đã đọc; trả về `false` khi cảnh báo không tồn tại
    /// hoặc đã đọc từ trước
    async fn mark_alert_read(&self, id: &AlertId) -> Result<bool, InfraError>;

    /// Người dùng đã có cảnh báo chưa đọc thuộc nhóm `category` chưa
    async fn has_unread_alert(
        &self,
        user_id: &UserId,
        category: &str,
    ) -> Result<bool, InfraError>;
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    id:         Uuid,
    user_id:    Uuid,
    ip:         String,
    user_agent: Option<String>,
    success:    bool,
    created_at: DateTime<Utc>,
}

impl SessionRow {
    fn into_session(self) -> LoginSession {
        LoginSession::from_db(
            SessionId::from_uuid(self.id),
            UserId::from_uuid(self.user_id),
            self.ip,
            self.user_agent,
            self.success,
            self.created_at,
        )
    }
}

#[derive(sqlx::FromRow)]
struct AlertRow {
    id:         Uuid,
    user_id:    Uuid,
    category:   String,
    message:    String,
    read:       bool,
    created_at: DateTime<Utc>,
}

impl AlertRow {
    fn into_alert(self) -> AdminAlert {
        AdminAlert::from_db(
            AlertId::from_uuid(self.id),
            UserId::from_uuid(self.user_id),
            self.category,
            self.message,
            self.read,
            self.created_at,
        )
    }
}

const SESSION_COLUMNS: &str = "id, user_id, ip, user_agent, success, created_at";
const ALERT_COLUMNS: &str = "id, user_id, category, message, read, created_at";

/// Triển khai PostgreSQL
#[derive(Debug, Clone)]
pub struct PostgresLoginSecurityRepository {
    pool: PgPool,
}

impl PostgresLoginSecurityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoginSecurityRepository for PostgresLoginSecurityRepository {
    async fn insert_session(&self, session: &LoginSession) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            INSERT INTO login_sessions (id, user_id, ip, user_agent, success, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(session.id().as_uuid())
        .bind(session.user_id().as_uuid())
        .bind(session.ip())
        .bind(session.user_agent())
        .bind(session.success())
        .bind(session.created_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn login_stats(&self, user_id: &UserId) -> Result<LoginStats, InfraError> {
        let (total, successes): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COUNT(*) FILTER (WHERE success)
            FROM login_sessions WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(LoginStats {
            total,
            successes,
            failures: total - successes,
        })
    }

    async fn recent_sessions(
        &self,
        user_id: &UserId,
        limit: i64,
    ) -> Result<Vec<LoginSession>, InfraError> {
        let rows = sqlx::query_as::<_, SessionRow>(&format!(
            r#"
            SELECT {SESSION_COLUMNS} FROM login_sessions
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#
        ))
        .bind(user_id.as_uuid())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SessionRow::into_session).collect())
    }

    async fn recent_ips(
        &self,
        user_id: &UserId,
        since: DateTime<Utc>,
    ) -> Result<Vec<String>, InfraError> {
        let ips: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT ip FROM login_sessions
            WHERE user_id = $1 AND created_at >= $2
            GROUP BY ip
            ORDER BY MAX(created_at) DESC
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(ips)
    }

    async fn count_unique_ips(
        &self,
        user_id: &UserId,
        since: DateTime<Utc>,
    ) -> Result<i64, InfraError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(DISTINCT ip) FROM login_sessions
            WHERE user_id = $1 AND created_at >= $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn insert_alert(&self, alert: &AdminAlert) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            INSERT INTO admin_alerts (id, user_id, category, message, read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(alert.id().as_uuid())
        .bind(alert.user_id().as_uuid())
        .bind(alert.category())
        .bind(alert.message())
        .bind(alert.is_read())
        .bind(alert.created_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn unread_alerts(&self) -> Result<Vec<AdminAlert>, InfraError> {
        let rows = sqlx::query_as::<_, AlertRow>(&format!(
            "SELECT {ALERT_COLUMNS} FROM admin_alerts WHERE NOT read ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(AlertRow::into_alert).collect())
    }

    async fn all_alerts(&self) -> Result<Vec<AdminAlert>, InfraError> {
        let rows = sqlx::query_as::<_, AlertRow>(&format!(
            "SELECT {ALERT_COLUMNS} FROM admin_alerts ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(AlertRow::into_alert).collect())
    }

    async fn mark_alert_read(&self, id: &AlertId) -> Result<bool, InfraError> {
        let result = sqlx::query("UPDATE admin_alerts SET read = TRUE WHERE id = $1 AND NOT read")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn has_unread_alert(
        &self,
        user_id: &UserId,
        category: &str,
    ) -> Result<bool, InfraError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM admin_alerts
                WHERE user_id = $1 AND category = $2 AND NOT read
            )
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(category)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_là_send_và_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PostgresLoginSecurityRepository>();
    }
}
