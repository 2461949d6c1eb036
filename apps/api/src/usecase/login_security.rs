//! # Usecase an ninh đăng nhập
//!
//! Ghi nhận mọi lần thử đăng nhập và phát cảnh báo quản trị khi tín hiệu
//! IP lạ vượt ngưỡng.
//!
//! ## Heuristic cảnh báo
//!
//! Chỉ xét khi đăng nhập **thành công** từ IP **công cộng** (IP riêng /
//! không phân tích được bị loại vì nhiều người dùng chung dải NAT):
//!
//! 1. đếm số IP khác nhau trong cửa sổ trượt
//!    (`SecurityPolicy::window_days`), tính cả lần thử thất bại vì một
//!    đợt dò mật khẩu để lại chủ yếu phiên thất bại
//! 2. nếu đạt ngưỡng `unique_ip_threshold` và người dùng **chưa có** cảnh
//!    báo chưa đọc cùng danh mục thì tạo [`AdminAlert`] mới
//!
//! Điều kiện (2) giữ bất biến: tối đa một cảnh báo chưa đọc cho mỗi cặp
//! (người dùng, danh mục).

use std::sync::Arc;

use chrono::Duration;
use khoahoc_domain::{
    clock::Clock,
    security::{AdminAlert, AlertId, LoginSession, LoginStats, SessionId, alert_category},
    user::UserId,
};
use khoahoc_infra::repository::LoginSecurityRepository;
use khoahoc_shared::client_ip::is_private_ip;

use crate::{config::SecurityPolicy, error::ApiError};

/// Hồ sơ an ninh tổng hợp của một người dùng
pub struct SecurityDossier {
    pub stats:           LoginStats,
    pub sessions:        Vec<LoginSession>,
    pub recent_ips:      Vec<String>,
    pub unique_ip_count: i64,
}

/// Usecase an ninh đăng nhập
pub struct LoginSecurityUseCase {
    repository: Arc<dyn LoginSecurityRepository>,
    clock:      Arc<dyn Clock>,
    policy:     SecurityPolicy,
}

impl LoginSecurityUseCase {
    pub fn new(
        repository: Arc<dyn LoginSecurityRepository>,
        clock: Arc<dyn Clock>,
        policy: SecurityPolicy,
    ) -> Self {
        Self {
            repository,
            clock,
            policy,
        }
    }

    /// Ghi nhận một lần thử đăng nhập, chạy heuristic cảnh báo nếu cần
    ///
    /// `ip` phải đã qua chuẩn hoá của tầng phân giải IP client.
    pub async fn record_attempt(
        &self,
        user_id: UserId,
        ip: &str,
        user_agent: Option<String>,
        success: bool,
    ) -> Result<(), ApiError> {
        let now = self.clock.now();
        let session = LoginSession::new(SessionId::new(), user_id, ip, user_agent, success, now);
        self.repository.insert_session(&session).await?;

        if success && !is_private_ip(ip) {
            self.maybe_raise_alert(user_id).await?;
        }

        Ok(())
    }

    async fn maybe_raise_alert(&self, user_id: UserId) -> Result<(), ApiError> {
        let now = self.clock.now();
        let since = now - Duration::days(self.policy.window_days);

        let unique_ips = self.repository.count_unique_ips(&user_id, since).await?;
        if unique_ips < self.policy.unique_ip_threshold {
            return Ok(());
        }

        let already_flagged = self
            .repository
            .has_unread_alert(&user_id, alert_category::NEW_IP_THRESHOLD)
            .await?;
        if already_flagged {
            return Ok(());
        }

        let alert = AdminAlert::new(
            AlertId::new(),
            user_id,
            alert_category::NEW_IP_THRESHOLD,
            format!(
                "Phát hiện {unique_ips} địa chỉ IP khác nhau trong {} ngày gần nhất",
                self.policy.window_days
            ),
            now,
        );
        self.repository.insert_alert(&alert).await?;

        tracing::warn!(
            user_id = %user_id,
            unique_ips,
            window_days = self.policy.window_days,
            "Đã tạo cảnh báo IP lạ"
        );
        Ok(())
    }

    /// Hồ sơ an ninh tổng hợp cho trang quản trị
    ///
    /// `limit` bị kẹp vào `1..=history_limit_cap` để chặn truy vấn
    /// không giới hạn.
    pub async fn security_dossier(
        &self,
        user_id: UserId,
        limit: Option<i64>,
    ) -> Result<SecurityDossier, ApiError> {
        let limit = limit.unwrap_or(50).clamp(1, self.policy.history_limit_cap);
        let since = self.clock.now() - Duration::days(self.policy.window_days);

        let stats = self.repository.login_stats(&user_id).await?;
        let sessions = self.repository.recent_sessions(&user_id, limit).await?;
        let recent_ips = self.repository.recent_ips(&user_id, since).await?;
        let unique_ip_count = self.repository.count_unique_ips(&user_id, since).await?;

        Ok(SecurityDossier {
            stats,
            sessions,
            recent_ips,
            unique_ip_count,
        })
    }

    pub async fn unread_alerts(&self) -> Result<Vec<AdminAlert>, ApiError> {
        Ok(self.repository.unread_alerts().await?)
    }

    pub async fn all_alerts(&self) -> Result<Vec<AdminAlert>, ApiError> {
        Ok(self.repository.all_alerts().await?)
    }

    /// Đánh dấu cảnh báo đã đọc
    ///
    /// Idempotent: cảnh báo đã đọc hoặc không tồn tại đều trả về thành
    /// công, không có tác dụng phụ.
    pub async fn mark_alert_read(&self, id: &AlertId) -> Result<(), ApiError> {
        self.repository.mark_alert_read(id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use khoahoc_domain::clock::FixedClock;
    use khoahoc_infra::mock::MockLoginSecurityRepository;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn usecase(
        repository: MockLoginSecurityRepository,
        now: DateTime<Utc>,
    ) -> LoginSecurityUseCase {
        LoginSecurityUseCase::new(
            Arc::new(repository),
            Arc::new(FixedClock::new(now)),
            SecurityPolicy::default(),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn test_đủ_ip_lạ_tạo_cảnh_báo(now: DateTime<Utc>) {
        let repository = MockLoginSecurityRepository::new();
        let usecase = usecase(repository.clone(), now);
        let user_id = UserId::new();

        for ip in ["203.0.113.1", "203.0.113.2", "203.0.113.3"] {
            usecase
                .record_attempt(user_id, ip, None, true)
                .await
                .unwrap();
        }

        let alerts = repository.alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].category(), alert_category::NEW_IP_THRESHOLD);
        assert!(!alerts[0].is_read());
    }

    #[rstest]
    #[tokio::test]
    async fn test_cùng_một_ip_không_tạo_cảnh_báo(now: DateTime<Utc>) {
        let repository = MockLoginSecurityRepository::new();
        let usecase = usecase(repository.clone(), now);
        let user_id = UserId::new();

        for _ in 0..5 {
            usecase
                .record_attempt(user_id, "203.0.113.1", None, true)
                .await
                .unwrap();
        }

        assert!(repository.alerts().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_ip_riêng_không_tính_vào_heuristic(now: DateTime<Utc>) {
        let repository = MockLoginSecurityRepository::new();
        let usecase = usecase(repository.clone(), now);
        let user_id = UserId::new();

        for ip in ["10.0.0.1", "192.168.1.2", "127.0.0.1", "172.16.0.9"] {
            usecase
                .record_attempt(user_id, ip, None, true)
                .await
                .unwrap();
        }

        assert!(repository.alerts().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_đăng_nhập_thất_bại_không_kích_hoạt_heuristic(now: DateTime<Utc>) {
        let repository = MockLoginSecurityRepository::new();
        let usecase = usecase(repository.clone(), now);
        let user_id = UserId::new();

        for ip in ["203.0.113.1", "203.0.113.2", "203.0.113.3"] {
            usecase
                .record_attempt(user_id, ip, None, false)
                .await
                .unwrap();
        }

        assert!(repository.alerts().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_ip_thất_bại_vẫn_vào_hồ_sơ_an_ninh(now: DateTime<Utc>) {
        let repository = MockLoginSecurityRepository::new();
        let usecase = usecase(repository, now);
        let user_id = UserId::new();

        usecase
            .record_attempt(user_id, "203.0.113.9", None, false)
            .await
            .unwrap();

        let dossier = usecase.security_dossier(user_id, None).await.unwrap();
        assert_eq!(dossier.recent_ips, vec!["203.0.113.9".to_string()]);
        assert_eq!(dossier.unique_ip_count, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_ip_thất_bại_tính_vào_ngưỡng_cảnh_báo(now: DateTime<Utc>) {
        let repository = MockLoginSecurityRepository::new();
        let usecase = usecase(repository.clone(), now);
        let user_id = UserId::new();

        // Hai lần thử thất bại từ IP lạ, rồi một lần thành công từ IP thứ ba
        for ip in ["203.0.113.1", "203.0.113.2"] {
            usecase
                .record_attempt(user_id, ip, None, false)
                .await
                .unwrap();
        }
        usecase
            .record_attempt(user_id, "203.0.113.3", None, true)
            .await
            .unwrap();

        assert_eq!(repository.alerts().len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_không_tạo_cảnh_báo_trùng_khi_chưa_đọc(now: DateTime<Utc>) {
        let repository = MockLoginSecurityRepository::new();
        let usecase = usecase(repository.clone(), now);
        let user_id = UserId::new();

        for ip in [
            "203.0.113.1",
            "203.0.113.2",
            "203.0.113.3",
            "203.0.113.4",
            "203.0.113.5",
        ] {
            usecase
                .record_attempt(user_id, ip, None, true)
                .await
                .unwrap();
        }

        assert_eq!(repository.alerts().len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn test_phiên_ngoài_cửa_sổ_không_tính(now: DateTime<Utc>) {
        let repository = MockLoginSecurityRepository::new();
        let user_id = UserId::new();

        // Hai IP cũ nằm ngoài cửa sổ 7 ngày
        let old = now - Duration::days(30);
        for ip in ["198.51.100.1", "198.51.100.2"] {
            repository.add_session(LoginSession::new(
                SessionId::new(),
                user_id,
                ip,
                None,
                true,
                old,
            ));
        }

        let usecase = usecase(repository.clone(), now);
        usecase
            .record_attempt(user_id, "203.0.113.1", None, true)
            .await
            .unwrap();

        assert!(repository.alerts().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_thêm_ip_đã_thấy_không_tăng_số_đếm(now: DateTime<Utc>) {
        let repository = MockLoginSecurityRepository::new();
        let usecase = usecase(repository.clone(), now);
        let user_id = UserId::new();

        usecase
            .record_attempt(user_id, "203.0.113.1", None, true)
            .await
            .unwrap();
        let before = usecase.security_dossier(user_id, None).await.unwrap();

        usecase
            .record_attempt(user_id, "203.0.113.1", None, true)
            .await
            .unwrap();
        let after = usecase.security_dossier(user_id, None).await.unwrap();

        assert_eq!(before.unique_ip_count, 1);
        assert_eq!(after.unique_ip_count, 1);
        assert_eq!(after.stats.total, 2);
    }

    #[rstest]
    #[tokio::test]
    async fn test_đánh_dấu_đọc_idempotent(now: DateTime<Utc>) {
        let repository = MockLoginSecurityRepository::new();
        let usecase = usecase(repository.clone(), now);
        let user_id = UserId::new();

        let alert = AdminAlert::new(
            AlertId::new(),
            user_id,
            alert_category::NEW_IP_THRESHOLD,
            "test",
            now,
        );
        repository.insert_alert(&alert).await.unwrap();

        usecase.mark_alert_read(alert.id()).await.unwrap();
        usecase.mark_alert_read(alert.id()).await.unwrap();
        // Cảnh báo không tồn tại cũng không lỗi
        usecase.mark_alert_read(&AlertId::new()).await.unwrap();

        assert!(repository.alerts()[0].is_read());
    }

    #[rstest]
    #[tokio::test]
    async fn test_hồ_sơ_người_dùng_chưa_có_phiên(now: DateTime<Utc>) {
        let repository = MockLoginSecurityRepository::new();
        let usecase = usecase(repository, now);

        let dossier = usecase.security_dossier(UserId::new(), None).await.unwrap();

        assert_eq!(dossier.stats, LoginStats::default());
        assert!(dossier.sessions.is_empty());
        assert!(dossier.recent_ips.is_empty());
        assert_eq!(dossier.unique_ip_count, 0);
    }

    #[rstest]
    #[tokio::test]
    async fn test_giới_hạn_lịch_sử_bị_kẹp_trần(now: DateTime<Utc>) {
        let repository = MockLoginSecurityRepository::new();
        let user_id = UserId::new();
        for i in 0..250 {
            repository.add_session(LoginSession::new(
                SessionId::new(),
                user_id,
                "203.0.113.1",
                None,
                true,
                now - Duration::seconds(i),
            ));
        }

        let usecase = usecase(repository, now);
        let dossier = usecase
            .security_dossier(user_id, Some(10_000))
            .await
            .unwrap();

        assert_eq!(dossier.sessions.len(), 200);
    }
}
