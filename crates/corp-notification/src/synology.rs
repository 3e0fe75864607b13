//! Synology Chat 알림 서비스.
//!
//! incoming webhook(`SYNO.Chat.External`)으로 평문 메시지를 전송합니다.
//! 에러 보고는 개발 채널 토큰이 있으면 그쪽으로 보냅니다.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::types::{
    Notification, NotificationError, NotificationEvent, NotificationResult, NotificationSender,
};

const DIVIDER: &str = "-------------------------";

/// Synology Chat 전송 설정.
#[derive(Debug, Clone)]
pub struct SynologyConfig {
    /// `https://{nas}/webapi/entry.cgi`
    pub api_url: String,
    /// 운영 채널 토큰
    pub token: String,
    /// 에러 보고용 개발 채널 토큰
    pub dev_token: Option<String>,
    pub enabled: bool,
}

impl SynologyConfig {
    pub fn new(api_url: String, token: String) -> Self {
        Self {
            api_url,
            token,
            dev_token: None,
            enabled: true,
        }
    }

    pub fn with_dev_token(mut self, dev_token: impl Into<String>) -> Self {
        self.dev_token = Some(dev_token.into());
        self
    }

    /// 환경 변수에서 설정을 생성합니다.
    ///
    /// `SYNOLOGY_CHAT_URL`과 `SYNOLOGY_CHAT_TOKEN`이 없으면 `None`입니다.
    pub fn from_env() -> Option<Self> {
        let api_url = std::env::var("SYNOLOGY_CHAT_URL").ok()?;
        let token = std::env::var("SYNOLOGY_CHAT_TOKEN").ok()?;
        let dev_token = std::env::var("SYNOLOGY_DEV_TOKEN")
            .ok()
            .filter(|t| !t.is_empty());
        let enabled = std::env::var("SYNOLOGY_ENABLED")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(true);

        Some(Self {
            api_url,
            token,
            dev_token,
            enabled,
        })
    }
}

/// 알림을 Synology Chat 평문 메시지로 포맷합니다.
pub fn format_message(notification: &Notification) -> String {
    match &notification.event {
        NotificationEvent::ScrapeStarted { job, started_at } => {
            format!("{job} 스크래핑을 시작합니다. ({started_at})")
        }

        NotificationEvent::ScrapeFinished {
            job,
            started_at,
            finished_at,
        } => {
            format!(
                "{job} 스크래핑을 종료합니다. \n\
                 시작시간: {started_at}\n\
                 종료시간: {finished_at}"
            )
        }

        NotificationEvent::NewsDailySummary { date, portals } => {
            let blocks: Vec<String> = portals
                .iter()
                .map(|stats| {
                    format!(
                        "{}:\n- 성공 개수: {}\n- 실패 개수: {}",
                        stats.portal.to_uppercase(),
                        stats.success,
                        stats.fail
                    )
                })
                .collect();

            format!(
                "📅 {date} 뉴스 스크래핑 요약\n{DIVIDER}\n{}\n{DIVIDER}",
                blocks.join("\n\n")
            )
        }

        NotificationEvent::NewsError {
            portal,
            message,
            occurred_at,
        } => {
            format!(
                "❌ {} 뉴스 스크래핑 에러\n{DIVIDER}\n{message}\n{occurred_at}\n{DIVIDER}",
                portal.to_uppercase()
            )
        }

        NotificationEvent::VentureStatistics { until, counts } => {
            format!(
                "[{until}]까지 수집/업데이트한 벤처기업 상세정보 통계\n\
                 벤처기업 정보: {}\n\
                 벤처기업 재무정보(대차대조표): {}\n\
                 벤처기업 재무정보(손익계산서): {}\n\
                 벤처기업 투자정보: {}\n\
                 벤처기업 벤처기업확인서: {}\n",
                counts.info,
                counts.finance_balance,
                counts.finance_income,
                counts.investment,
                counts.certificate
            )
        }

        NotificationEvent::Custom { title, message } => format!("{title}\n{message}"),
    }
}

/// Synology Chat 전송기.
pub struct SynologySender {
    config: SynologyConfig,
    client: reqwest::Client,
}

impl SynologySender {
    pub fn new(config: SynologyConfig) -> NotificationResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { config, client })
    }

    /// 환경 변수에서 전송기를 생성합니다.
    pub fn from_env() -> Option<NotificationResult<Self>> {
        SynologyConfig::from_env().map(Self::new)
    }

    fn token_for(&self, notification: &Notification) -> &str {
        match &self.config.dev_token {
            Some(dev) if notification.is_error_report() => dev,
            _ => &self.config.token,
        }
    }

    /// 원시 텍스트를 전송합니다.
    pub async fn send_text(&self, text: &str, token: &str) -> NotificationResult<()> {
        let payload = serde_json::json!({ "text": text }).to_string();

        debug!(api_url = %self.config.api_url, "Synology Chat 메시지 전송");

        let response = self
            .client
            .post(&self.config.api_url)
            .query(&[
                ("api", "SYNO.Chat.External"),
                ("method", "incoming"),
                ("version", "2"),
                ("token", token),
            ])
            .form(&[("payload", payload.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            warn!("Synology Chat rate limited");
            return Err(NotificationError::RateLimited(60));
        }

        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            error!(%status, body = %body, "Synology Chat 전송 실패");
            return Err(NotificationError::SendFailed(format!("HTTP {}: {}", status, body)));
        }

        // 웹훅은 200과 함께 {"success": false, "error": {...}}를 돌려주기도 합니다.
        let accepted = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("success").and_then(|s| s.as_bool()))
            .unwrap_or(true);
        if !accepted {
            error!(body = %body, "Synology Chat이 메시지를 거부했습니다");
            return Err(NotificationError::SendFailed(body));
        }

        info!("Synology Chat 알림 전송 완료");
        Ok(())
    }
}

#[async_trait]
impl NotificationSender for SynologySender {
    async fn send(&self, notification: &Notification) -> NotificationResult<()> {
        if !self.is_enabled() {
            debug!("Synology Chat 알림 비활성화, 건너뜀");
            return Ok(());
        }

        let message = format_message(notification);
        self.send_text(&message, self.token_for(notification)).await
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled && !self.config.api_url.is_empty() && !self.config.token.is_empty()
    }

    fn name(&self) -> &str {
        "synology"
    }
}
