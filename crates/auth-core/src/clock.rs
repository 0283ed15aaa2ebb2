//! 시간 소스 추상화.
//!
//! 토큰 만료 판정과 타임스탬프 기록은 모두 [`Clock`]을 거칩니다.
//! 테스트에서는 [`FixedClock`]으로 시간을 앞당겨 만료를 재현합니다.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Duration, Utc};

/// 현재 시각 제공자.
pub trait Clock: Send + Sync + fmt::Debug {
    /// 현재 UTC 시각.
    fn now(&self) -> DateTime<Utc>;
}

/// 시스템 시계.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 수동으로 조작하는 시계 (밀리초 해상도).
#[derive(Debug)]
pub struct FixedClock {
    millis: AtomicI64,
}

impl FixedClock {
    /// 주어진 시각으로 고정된 시계 생성.
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(at.timestamp_millis()),
        }
    }

    /// 시각 재설정.
    pub fn set(&self, at: DateTime<Utc>) {
        self.millis.store(at.timestamp_millis(), Ordering::SeqCst);
    }

    /// 시각을 앞으로 이동.
    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst)).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_advance() {
        let start = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let clock = FixedClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance(Duration::hours(24));
        assert_eq!(clock.now(), start + Duration::hours(24));

        clock.set(start);
        assert_eq!(clock.now(), start);
    }
}
