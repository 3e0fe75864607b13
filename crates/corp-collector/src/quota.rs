//! DART 일일 호출 한도 관리.
//!
//! 모든 DART 작업이 하나의 [`QuotaGate`]를 공유합니다. 한도를 다 쓰거나 서버가
//! 한도 초과 상태를 돌려주면 다음 KST 자정까지 잠든 뒤 카운터를 초기화합니다.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use corp_core::datetime;
use tokio::sync::Mutex;

/// 현재 KST 시각 제공자.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Tz>;
}

/// 시스템 시계.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Tz> {
        datetime::kst_now()
    }
}

/// 하루 단위 호출 카운터.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyQuota {
    default_limit: u32,
    pub limit: u32,
    pub used: u32,
    pub day: NaiveDate,
}

impl DailyQuota {
    pub fn new(limit: u32, now: DateTime<Tz>) -> Self {
        Self {
            default_limit: limit,
            limit,
            used: 0,
            day: now.date_naive(),
        }
    }

    /// 날짜가 바뀌었으면 카운터와 한도를 초기화합니다.
    pub fn roll_over(&mut self, now: DateTime<Tz>) -> bool {
        let today = now.date_naive();
        if today == self.day {
            return false;
        }

        self.day = today;
        self.used = 0;
        self.limit = self.default_limit;
        true
    }

    /// 남은 호출이 있으면 하나를 사용합니다.
    pub fn try_acquire(&mut self) -> bool {
        if self.used < self.limit {
            self.used += 1;
            true
        } else {
            false
        }
    }

    /// 서버가 한도 초과를 알린 경우 오늘 남은 호출을 모두 소진합니다.
    pub fn exhaust(&mut self) {
        self.used = self.limit;
    }

    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.used)
    }
}

/// 여러 작업이 공유하는 호출 한도 게이트.
pub struct QuotaGate {
    state: Mutex<DailyQuota>,
    clock: Arc<dyn Clock>,
}

impl QuotaGate {
    pub fn new(limit: u32) -> Self {
        Self::with_clock(limit, Arc::new(SystemClock))
    }

    pub fn with_clock(limit: u32, clock: Arc<dyn Clock>) -> Self {
        let quota = DailyQuota::new(limit, clock.now());
        Self {
            state: Mutex::new(quota),
            clock,
        }
    }

    /// 호출 한 번을 확보합니다. 한도를 다 썼으면 자정까지 기다립니다.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut quota = self.state.lock().await;
                let now = self.clock.now();
                if quota.roll_over(now) {
                    tracing::info!(day = %quota.day, limit = quota.limit, "일일 호출 한도 초기화");
                }
                if quota.try_acquire() {
                    return;
                }
                datetime::until_next_midnight(now)
            };

            tracing::warn!(
                wait_secs = wait.num_seconds(),
                "일일 호출 한도 소진, 자정까지 대기"
            );
            tokio::time::sleep(wait.to_std().unwrap_or_default()).await;
        }
    }

    /// 서버가 한도 초과 상태를 반환했을 때 호출합니다.
    pub async fn exhaust_and_wait(&self) {
        let wait = {
            let mut quota = self.state.lock().await;
            let now = self.clock.now();
            quota.roll_over(now);
            quota.exhaust();
            datetime::until_next_midnight(now)
        };

        tracing::warn!(
            wait_secs = wait.num_seconds(),
            "DART 호출 제한 응답, 자정까지 대기"
        );
        tokio::time::sleep(wait.to_std().unwrap_or_default()).await;

        let mut quota = self.state.lock().await;
        quota.roll_over(self.clock.now());
    }

    /// 현재 상태 스냅샷.
    pub async fn snapshot(&self) -> DailyQuota {
        self.state.lock().await.clone()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Asia::Seoul;

    /// 고정 시각에서 실제 시간만큼 흐르는 시계.
    struct OffsetClock {
        base: DateTime<Tz>,
        started: std::time::Instant,
    }

    impl Clock for OffsetClock {
        fn now(&self) -> DateTime<Tz> {
            let elapsed = chrono::Duration::from_std(self.started.elapsed()).unwrap();
            self.base + elapsed
        }
    }

    /// 자정 1초 전(2024-05-01 KST)에서 출발하는 게이트.
    ///
    /// 한도 응답을 받으면 실제로 2초 남짓 기다린 뒤 다음 날로 넘어갑니다.
    pub(crate) fn gate_before_midnight(limit: u32) -> QuotaGate {
        let base = Seoul.with_ymd_and_hms(2024, 5, 1, 23, 59, 59).unwrap();
        QuotaGate::with_clock(
            limit,
            Arc::new(OffsetClock {
                base,
                started: std::time::Instant::now(),
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Asia::Seoul;

    /// tokio 가상 시간을 따라가는 시계.
    struct TokioClock {
        base: DateTime<Tz>,
        started: tokio::time::Instant,
    }

    impl Clock for TokioClock {
        fn now(&self) -> DateTime<Tz> {
            let elapsed = chrono::Duration::from_std(self.started.elapsed()).unwrap();
            self.base + elapsed
        }
    }

    fn kst(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Tz> {
        Seoul.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn gate(limit: u32, base: DateTime<Tz>) -> QuotaGate {
        QuotaGate::with_clock(
            limit,
            Arc::new(TokioClock {
                base,
                started: tokio::time::Instant::now(),
            }),
        )
    }

    #[test]
    fn test_daily_quota_roll_over() {
        let mut quota = DailyQuota::new(2, kst(2024, 5, 1, 10, 0, 0));
        assert!(quota.try_acquire());
        assert!(quota.try_acquire());
        assert!(!quota.try_acquire());
        assert_eq!(quota.remaining(), 0);

        // 같은 날에는 초기화되지 않음
        assert!(!quota.roll_over(kst(2024, 5, 1, 23, 59, 59)));
        assert!(quota.roll_over(kst(2024, 5, 2, 0, 0, 1)));
        assert_eq!(quota.used, 0);
        assert!(quota.try_acquire());
    }

    #[test]
    fn test_exhaust() {
        let mut quota = DailyQuota::new(100, kst(2024, 5, 1, 10, 0, 0));
        quota.try_acquire();
        quota.exhaust();
        assert!(!quota.try_acquire());
        assert_eq!(quota.used, quota.limit);
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_waits_until_midnight() {
        let gate = gate(2, kst(2024, 5, 1, 23, 0, 0));
        let started = tokio::time::Instant::now();

        gate.acquire().await;
        gate.acquire().await;
        assert_eq!(started.elapsed().as_secs(), 0);

        // 세 번째 호출은 자정(+1초)까지 대기
        gate.acquire().await;
        assert!(started.elapsed().as_secs() >= 3_600);

        let snapshot = gate.snapshot().await;
        assert_eq!(snapshot.day, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
        assert_eq!(snapshot.used, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaust_and_wait() {
        let gate = gate(19_900, kst(2024, 5, 1, 22, 30, 0));
        let started = tokio::time::Instant::now();

        gate.acquire().await;
        gate.exhaust_and_wait().await;
        assert!(started.elapsed().as_secs() >= 5_400);

        let snapshot = gate.snapshot().await;
        assert_eq!(snapshot.used, 0);
        assert_eq!(snapshot.limit, 19_900);
        assert_eq!(snapshot.day, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
    }
}
