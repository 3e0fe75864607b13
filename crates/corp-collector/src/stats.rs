//! 수집 통계 구조체.

use std::time::Duration;

use corp_core::VentureTableCounts;
use serde::{Deserialize, Serialize};

/// 수집 작업 통계
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionStats {
    /// 총 시도 횟수
    pub total: usize,
    /// 성공 횟수
    pub success: usize,
    /// 에러 횟수
    pub errors: usize,
    /// 건너뛴 횟수 (이미 수집된 데이터)
    pub skipped: usize,
    /// 빈 데이터 (조회 성공, 데이터 없음)
    pub empty: usize,
    /// 저장된 총 행 수
    pub saved: usize,
    /// 저장에 실패한 행 수 (조회 실패와 별도로 셉니다)
    pub unsaved: usize,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl CollectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// 성공률 계산 (%)
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.success as f64 / self.total as f64) * 100.0
        }
    }

    /// 다른 작업 단위의 통계를 합칩니다 (소요 시간 제외).
    pub fn merge(&mut self, other: &CollectionStats) {
        self.total += other.total;
        self.success += other.success;
        self.errors += other.errors;
        self.skipped += other.skipped;
        self.empty += other.empty;
        self.saved += other.saved;
        self.unsaved += other.unsaved;
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            total = self.total,
            success = self.success,
            errors = self.errors,
            skipped = self.skipped,
            empty = self.empty,
            saved = self.saved,
            unsaved = self.unsaved,
            success_rate = format!("{:.1}%", self.success_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "수집 완료"
        );
    }
}

/// 벤처기업 상세정보 테이블별 누적 저장 건수.
///
/// 통계 메시지를 보낸 뒤 [`take`](Self::take)로 초기화합니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VentureStatistics {
    counts: VentureTableCounts,
}

impl VentureStatistics {
    pub fn record(&mut self, counts: VentureTableCounts) {
        self.counts += counts;
    }

    pub fn counts(&self) -> VentureTableCounts {
        self.counts
    }

    /// 누적값을 꺼내고 0으로 되돌립니다.
    pub fn take(&mut self) -> VentureTableCounts {
        std::mem::take(&mut self.counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate() {
        let mut stats = CollectionStats::new();
        assert_eq!(stats.success_rate(), 0.0);

        stats.total = 8;
        stats.success = 6;
        assert!((stats.success_rate() - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_merge() {
        let mut total = CollectionStats {
            total: 2,
            success: 1,
            errors: 1,
            ..Default::default()
        };
        let part = CollectionStats {
            total: 3,
            success: 3,
            saved: 120,
            unsaved: 40,
            ..Default::default()
        };
        total.merge(&part);
        assert_eq!(total.total, 5);
        assert_eq!(total.success, 4);
        assert_eq!(total.errors, 1);
        assert_eq!(total.saved, 120);
        assert_eq!(total.unsaved, 40);
    }

    #[test]
    fn test_venture_statistics_take() {
        let mut stats = VentureStatistics::default();
        stats.record(VentureTableCounts {
            info: 2,
            finance_balance: 4,
            ..Default::default()
        });
        stats.record(VentureTableCounts {
            info: 1,
            certificate: 1,
            ..Default::default()
        });

        let counts = stats.take();
        assert_eq!(counts.info, 3);
        assert_eq!(counts.finance_balance, 4);
        assert_eq!(counts.certificate, 1);
        assert_eq!(stats.counts(), VentureTableCounts::default());
    }
}
