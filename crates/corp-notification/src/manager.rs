//! 여러 전송기를 관리하는 알림 관리자.

use chrono::NaiveDate;
use corp_core::{datetime, PortalDailyStats, VentureTableCounts};
use tracing::error;

use crate::types::{
    Notification, NotificationEvent, NotificationPriority, NotificationResult, NotificationSender,
};

/// 여러 전송기를 관리하는 알림 관리자.
///
/// 전송기가 하나도 없으면 모든 알림은 조용히 무시됩니다.
#[derive(Default)]
pub struct NotificationManager {
    senders: Vec<Box<dyn NotificationSender>>,
}

impl NotificationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 알림 전송기를 추가합니다.
    pub fn add_sender<S: NotificationSender + 'static>(&mut self, sender: S) {
        self.senders.push(Box::new(sender));
    }

    /// 활성화된 전송기 수.
    pub fn enabled_count(&self) -> usize {
        self.senders.iter().filter(|s| s.is_enabled()).count()
    }

    /// 활성화된 모든 전송기를 통해 알림을 전송합니다.
    ///
    /// 활성 전송기가 모두 실패한 경우에만 마지막 에러를 반환합니다.
    pub async fn notify(&self, notification: &Notification) -> NotificationResult<()> {
        let mut failures = 0;
        let mut last_error = None;

        for sender in self.senders.iter().filter(|s| s.is_enabled()) {
            if let Err(e) = sender.send(notification).await {
                error!(sender = sender.name(), error = %e, "알림 전송 실패");
                failures += 1;
                last_error = Some(e);
            }
        }

        match last_error {
            Some(e) if failures == self.enabled_count() => Err(e),
            _ => Ok(()),
        }
    }

    pub async fn notify_scrape_started(&self, job: &str, started_at: &str) -> NotificationResult<()> {
        let notification = Notification::new(NotificationEvent::ScrapeStarted {
            job: job.to_string(),
            started_at: started_at.to_string(),
        })
        .with_priority(NotificationPriority::Low);
        self.notify(&notification).await
    }

    pub async fn notify_scrape_finished(
        &self,
        job: &str,
        started_at: &str,
        finished_at: &str,
    ) -> NotificationResult<()> {
        let notification = Notification::new(NotificationEvent::ScrapeFinished {
            job: job.to_string(),
            started_at: started_at.to_string(),
            finished_at: finished_at.to_string(),
        })
        .with_priority(NotificationPriority::Low);
        self.notify(&notification).await
    }

    /// 포털별 뉴스 일일 요약을 전송합니다.
    pub async fn notify_news_summary(
        &self,
        date: NaiveDate,
        portals: Vec<PortalDailyStats>,
    ) -> NotificationResult<()> {
        let notification = Notification::new(NotificationEvent::NewsDailySummary { date, portals });
        self.notify(&notification).await
    }

    /// 뉴스 스크래핑 에러를 보고합니다. 발생 시각은 현재 KST입니다.
    pub async fn notify_news_error(&self, portal: &str, message: &str) -> NotificationResult<()> {
        let occurred_at = datetime::format_standard(&datetime::kst_now().naive_local());
        let notification = Notification::new(NotificationEvent::NewsError {
            portal: portal.to_string(),
            message: message.to_string(),
            occurred_at,
        })
        .with_priority(NotificationPriority::High);
        self.notify(&notification).await
    }

    /// 벤처기업 상세정보 저장 통계를 전송합니다.
    pub async fn notify_venture_statistics(
        &self,
        until: &str,
        counts: VentureTableCounts,
    ) -> NotificationResult<()> {
        let notification = Notification::new(NotificationEvent::VentureStatistics {
            until: until.to_string(),
            counts,
        });
        self.notify(&notification).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NotificationError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingSender {
        sent: Arc<AtomicUsize>,
        enabled: bool,
        fail: bool,
    }

    #[async_trait]
    impl NotificationSender for CountingSender {
        async fn send(&self, _notification: &Notification) -> NotificationResult<()> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(NotificationError::SendFailed("down".to_string()))
            } else {
                Ok(())
            }
        }

        fn is_enabled(&self) -> bool {
            self.enabled
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    fn sender(sent: &Arc<AtomicUsize>, enabled: bool, fail: bool) -> CountingSender {
        CountingSender {
            sent: Arc::clone(sent),
            enabled,
            fail,
        }
    }

    #[tokio::test]
    async fn test_skips_disabled_senders() {
        let sent = Arc::new(AtomicUsize::new(0));
        let mut manager = NotificationManager::new();
        manager.add_sender(sender(&sent, true, false));
        manager.add_sender(sender(&sent, false, false));

        manager.notify_scrape_started("뉴스", "2024-05-01 00:00:00").await.unwrap();
        assert_eq!(sent.load(Ordering::SeqCst), 1);
        assert_eq!(manager.enabled_count(), 1);
    }

    #[tokio::test]
    async fn test_partial_failure_is_ok() {
        let sent = Arc::new(AtomicUsize::new(0));
        let mut manager = NotificationManager::new();
        manager.add_sender(sender(&sent, true, true));
        manager.add_sender(sender(&sent, true, false));

        assert!(manager.notify_news_error("naver", "timeout").await.is_ok());
        assert_eq!(sent.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_all_failed_returns_error() {
        let sent = Arc::new(AtomicUsize::new(0));
        let mut manager = NotificationManager::new();
        manager.add_sender(sender(&sent, true, true));

        let result = manager
            .notify_venture_statistics("2024-05-01 00:00:00", VentureTableCounts::default())
            .await;
        assert!(matches!(result, Err(NotificationError::SendFailed(_))));
    }

    #[tokio::test]
    async fn test_no_senders() {
        let manager = NotificationManager::new();
        assert!(manager
            .notify_news_summary(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), vec![])
            .await
            .is_ok());
    }
}
