//! 뉴스 기사와 스크래핑 세션 로그.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 저장 대상 뉴스 기사.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub url: String,
    /// URL의 MD5 hex (고유)
    pub url_md5: String,
    pub title: String,
    pub content: String,
    pub create_date: NaiveDateTime,
    /// 포털 카테고리에 대응하는 분류 코드
    pub kind: String,
    pub image_url: Option<String>,
    pub portal: String,
    pub media: Option<String>,
    pub category: String,
}

/// 한 번의 스크래핑 사이클 기록.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapSessionLog {
    pub portal: String,
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    pub total_records_processed: i32,
    pub success_count: i32,
    pub fail_count: i32,
    pub dup_count: i32,
}

impl ScrapSessionLog {
    pub fn start(portal: impl Into<String>, now: NaiveDateTime) -> Self {
        Self {
            portal: portal.into(),
            start_time: now,
            end_time: None,
            total_records_processed: 0,
            success_count: 0,
            fail_count: 0,
            dup_count: 0,
        }
    }

    pub fn record_processed(&mut self) {
        self.total_records_processed += 1;
    }

    pub fn record_success(&mut self, count: i32) {
        self.success_count += count;
    }

    pub fn record_fail(&mut self) {
        self.fail_count += 1;
    }

    pub fn record_dup(&mut self) {
        self.dup_count += 1;
    }

    pub fn finish(&mut self, now: NaiveDateTime) {
        self.end_time = Some(now);
    }
}

/// URL 단위 실패 기록.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapErrorLog {
    pub portal: String,
    pub url: String,
    pub error_message: String,
    pub error_time: NaiveDateTime,
}

/// 포털별 일일 성공/실패 집계.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct PortalDailyStats {
    pub portal: String,
    pub success: i64,
    pub fail: i64,
}
