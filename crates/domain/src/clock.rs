//! # Clock (nguồn thời gian)
//!
//! Thay thế việc gọi `Utc::now()` trực tiếp trong tầng usecase, cho phép
//! tiêm thời điểm cố định trong test.

use chrono::{DateTime, Utc};

/// Trait cung cấp thời điểm hiện tại
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Trả về thời gian hệ thống thật
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Trả về thời điểm cố định, dùng trong test
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_trả_về_thời_gian_hiện_tại() {
        let clock = SystemClock;
        let before = Utc::now();
        let result = clock.now();
        let after = Utc::now();

        assert!(result >= before);
        assert!(result <= after);
    }

    #[test]
    fn test_fixed_clock_trả_về_thời_điểm_đã_tiêm() {
        let fixed = Utc::now();
        let clock = FixedClock::new(fixed);

        assert_eq!(clock.now(), fixed);
    }
}
