//! 알림 타입 및 trait 정의.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use corp_core::{PortalDailyStats, VentureTableCounts};
use serde::{Deserialize, Serialize};

/// 알림 우선순위 레벨.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPriority {
    /// 정보성
    Low,
    #[default]
    Normal,
    /// 작업 실패
    High,
    Critical,
}

/// 알림 이벤트 타입.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationEvent {
    /// 수집 작업 시작
    ScrapeStarted { job: String, started_at: String },
    /// 수집 작업 종료
    ScrapeFinished {
        job: String,
        started_at: String,
        finished_at: String,
    },
    /// 포털별 뉴스 일일 요약
    NewsDailySummary {
        date: NaiveDate,
        portals: Vec<PortalDailyStats>,
    },
    /// 뉴스 스크래핑 에러
    NewsError {
        portal: String,
        message: String,
        occurred_at: String,
    },
    /// 벤처기업 상세정보 저장 통계
    VentureStatistics {
        until: String,
        counts: VentureTableCounts,
    },
    /// 사용자 정의 알림
    Custom { title: String, message: String },
}

/// 알림 메시지.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// 고유 알림 ID
    pub id: String,
    pub event: NotificationEvent,
    pub priority: NotificationPriority,
    pub timestamp: DateTime<Utc>,
    /// 추가 메타데이터
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl Notification {
    /// 새 알림을 생성합니다.
    pub fn new(event: NotificationEvent) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            event,
            priority: NotificationPriority::Normal,
            timestamp: Utc::now(),
            metadata: serde_json::Value::Null,
        }
    }

    pub fn with_priority(mut self, priority: NotificationPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// 운영 채널 대신 개발 채널로 보내야 하는 알림인지 확인합니다.
    pub fn is_error_report(&self) -> bool {
        matches!(self.event, NotificationEvent::NewsError { .. })
            || self.priority >= NotificationPriority::High
    }
}

/// 알림 작업용 Result 타입.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// 알림 에러.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("알림 전송 실패: {0}")]
    SendFailed(String),

    #[error("잘못된 설정: {0}")]
    InvalidConfig(String),

    #[error("요청 한도 초과: {0}초 후 재시도")]
    RateLimited(u64),

    #[error("네트워크 에러: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("직렬화 에러: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// 알림 전송기 trait.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// 알림을 전송합니다.
    async fn send(&self, notification: &Notification) -> NotificationResult<()>;

    /// 전송기가 활성화되어 있는지 확인합니다.
    fn is_enabled(&self) -> bool;

    /// 전송기 이름을 반환합니다.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_report_routing() {
        let error = Notification::new(NotificationEvent::NewsError {
            portal: "naver".to_string(),
            message: "timeout".to_string(),
            occurred_at: "2024-05-01 10:00:00".to_string(),
        });
        assert!(error.is_error_report());

        let custom = Notification::new(NotificationEvent::Custom {
            title: "t".to_string(),
            message: "m".to_string(),
        });
        assert!(!custom.is_error_report());
        assert!(custom.with_priority(NotificationPriority::Critical).is_error_report());
    }

    #[test]
    fn test_event_serialization_tag() {
        let event = NotificationEvent::ScrapeStarted {
            job: "venture".to_string(),
            started_at: "2024-05-01 00:00:00".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "scrape_started");
        assert_eq!(json["job"], "venture");
    }
}
