//! 뉴스 포털 주기 수집 모듈.
//!
//! 세션 한 번은 포털의 모든 목록을 훑고 새 기사만 저장한 뒤 세션 로그를 남깁니다.
//! [`run_loop`]는 포털마다 세션을 반복하고, 자정마다 전날의 일일 요약을 보냅니다.

use std::ops::RangeInclusive;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use corp_core::{datetime, NewsArticle, ScrapErrorLog, ScrapSessionLog};
use corp_data::provider::{
    portal_by_name, BoardItem, NaverNewsScraper, NewsFetcher, NewsPortal, ScrapedUrlCache,
    NAVER_PORTAL,
};
use corp_data::storage::CollectionsRepository;
use corp_notification::NotificationManager;
use futures::future::{join_all, BoxFuture, FutureExt};
use rand::Rng;
use sqlx::PgPool;
use tracing::{debug, error, info, warn};

use crate::config::NewsConfig;
use crate::{CollectorConfig, Result};

/// 기사 사이 대기 시간 (밀리초)
const ARTICLE_DELAY_MS: RangeInclusive<u64> = 1_000..=5_000;

/// 이미 저장된 기사 확인.
#[async_trait]
pub trait StoredUrls: Send + Sync {
    async fn is_stored(&self, url_md5: &str) -> corp_data::Result<bool>;
}

#[async_trait]
impl StoredUrls for CollectionsRepository {
    async fn is_stored(&self, url_md5: &str) -> corp_data::Result<bool> {
        self.news_url_exists(url_md5).await
    }
}

/// 세션 한 번의 수집 결과 (저장 전).
#[derive(Debug)]
pub struct SessionOutcome {
    pub articles: Vec<NewsArticle>,
    pub errors: Vec<ScrapErrorLog>,
    pub log: ScrapSessionLog,
}

/// 설정의 포털 이름으로 파서를 만듭니다. 네이버는 설정된 섹션만 수집합니다.
pub fn build_portal(name: &str, config: &NewsConfig) -> corp_data::Result<Box<dyn NewsPortal>> {
    if name == NAVER_PORTAL {
        return Ok(Box::new(
            NaverNewsScraper::new()?.with_categories(config.naver_categories.clone()),
        ));
    }
    portal_by_name(name)
}

/// 포털 하나의 수집 세션.
pub struct PortalSession {
    fetcher: NewsFetcher,
    portal: Box<dyn NewsPortal>,
    article_delay_ms: RangeInclusive<u64>,
}

impl PortalSession {
    pub fn new(portal: Box<dyn NewsPortal>) -> corp_data::Result<Self> {
        Ok(Self::with_parts(NewsFetcher::new()?, portal))
    }

    pub fn with_parts(fetcher: NewsFetcher, portal: Box<dyn NewsPortal>) -> Self {
        Self {
            fetcher,
            portal,
            article_delay_ms: ARTICLE_DELAY_MS,
        }
    }

    /// 기사 사이 대기 범위를 바꿉니다.
    pub fn with_article_delay(mut self, range_ms: RangeInclusive<u64>) -> Self {
        self.article_delay_ms = range_ms;
        self
    }

    pub fn portal_name(&self) -> &str {
        self.portal.name()
    }

    /// 모든 목록을 돌며 새 기사를 모읍니다.
    ///
    /// 목록 조회/파싱 실패나 빈 목록은 에러 로그로 남기고 다음 목록으로 넘어갑니다.
    /// 피드에 본문이 포함된 항목은 기사 페이지를 조회하지 않습니다.
    pub async fn collect(
        &self,
        cache: &ScrapedUrlCache,
        stored: &dyn StoredUrls,
    ) -> SessionOutcome {
        let portal = self.portal.name();
        let media = self.portal.media();
        let now = || datetime::kst_now().naive_local();
        let mut log = ScrapSessionLog::start(portal, now());
        let mut articles: Vec<NewsArticle> = Vec::new();
        let mut errors = Vec::new();

        for board in self.portal.boards() {
            let items = match self.fetcher.fetch_with_retry(&board.url, media).await {
                Ok(body) => self.portal.parse_board(&board, &body),
                Err(e) => Err(e),
            };
            let items = match items {
                Ok(items) if items.is_empty() => {
                    warn!(portal, board = %board.url, "뉴스 링크가 없습니다");
                    errors.push(error_log(portal, &board.url, "뉴스 링크가 없습니다".to_string()));
                    continue;
                }
                Ok(items) => items,
                Err(e) => {
                    warn!(portal, board = %board.url, error = %e, "뉴스 목록 조회 실패");
                    let message = format!("뉴스 목록 조회 실패: {}", e);
                    errors.push(error_log(portal, &board.url, message));
                    continue;
                }
            };
            debug!(portal, category = %board.category, items = items.len(), "뉴스 목록");

            for item in items {
                log.record_processed();

                let url = item.url().to_string();
                let digest = corp_data::provider::url_md5(&url);
                let duplicated = cache.contains(&url)
                    || articles.iter().any(|a| a.url_md5 == digest)
                    || match stored.is_stored(&digest).await {
                        Ok(exists) => exists,
                        Err(e) => {
                            warn!(url = %url, error = %e, "저장 여부 확인 실패");
                            false
                        }
                    };
                if duplicated {
                    log.record_dup();
                    continue;
                }

                let parsed = match item {
                    BoardItem::Feed { article, .. } => article,
                    BoardItem::Link(url) => {
                        let wait_ms = rand::thread_rng().gen_range(self.article_delay_ms.clone());
                        tokio::time::sleep(Duration::from_millis(wait_ms)).await;

                        match self.fetcher.fetch_with_retry(&url, media).await {
                            Ok(html) => self.portal.parse_article(&url, &html, &board.category),
                            Err(e) => Err(e),
                        }
                    }
                };
                match parsed {
                    Ok(article) => articles.push(article),
                    Err(e) => {
                        log.record_fail();
                        debug!(url = %url, error = %e, "기사 수집 실패");
                        errors.push(error_log(portal, &url, e.to_string()));
                    }
                }
            }
        }

        log.finish(now());
        SessionOutcome {
            articles,
            errors,
            log,
        }
    }
}

fn error_log(portal: &str, url: &str, message: String) -> ScrapErrorLog {
    ScrapErrorLog {
        portal: portal.to_string(),
        url: url.to_string(),
        error_message: message,
        error_time: datetime::kst_now().naive_local(),
    }
}

/// 세션 한 번 실행 후 기사와 로그를 저장합니다.
///
/// 저장된 기사는 URL 캐시에 추가합니다.
pub async fn run_session(
    collections: &CollectionsRepository,
    session: &PortalSession,
    cache: &mut ScrapedUrlCache,
) -> Result<ScrapSessionLog> {
    let SessionOutcome {
        articles,
        errors,
        mut log,
    } = session.collect(cache, collections).await;

    let inserted = collections.insert_news_articles(&articles).await?;
    log.record_success(inserted as i32);
    for article in &articles {
        cache.insert(&article.url);
    }

    if !errors.is_empty() {
        if let Err(e) = collections.insert_error_logs(&errors).await {
            error!(count = errors.len(), error = %e, "에러 로그 저장 실패");
        }
    }
    collections.insert_session_log(&log).await?;

    info!(
        portal = %log.portal,
        processed = log.total_records_processed,
        success = log.success_count,
        fail = log.fail_count,
        dup = log.dup_count,
        "뉴스 세션 완료"
    );
    Ok(log)
}

/// 하루치 세션 로그로 포털별 요약을 보냅니다.
pub async fn send_daily_summary(
    pool: &PgPool,
    notifier: &NotificationManager,
    date: NaiveDate,
) -> Result<()> {
    let collections = CollectionsRepository::new(pool.clone());
    let portals = collections.daily_news_statistics(date).await?;
    info!(date = %date, portals = portals.len(), "뉴스 일일 요약 전송");
    notifier.notify_news_summary(date, portals).await?;
    Ok(())
}

/// 포털 하나의 세션 반복.
///
/// 세션이 실패하면 `NEWS_RETRY_DELAY_SECS`만큼 기다리고 에러를 알립니다.
async fn portal_loop(
    collections: CollectionsRepository,
    session: PortalSession,
    interval: Duration,
    retry_delay: Duration,
    notifier: &NotificationManager,
) {
    let portal = session.portal_name().to_string();
    let mut cache = ScrapedUrlCache::default();
    info!(portal = %portal, interval_secs = interval.as_secs(), "뉴스 수집 루프 시작");

    loop {
        match run_session(&collections, &session, &mut cache).await {
            Ok(_) => tokio::time::sleep(interval).await,
            Err(e) => {
                error!(portal = %portal, error = %e, "뉴스 세션 실패");
                tokio::time::sleep(retry_delay).await;
                let message = format!("THERE WAS AN ERROR WHILE SCRAPING NEWS\n{}", e);
                if let Err(e) = notifier.notify_news_error(&portal, &message).await {
                    warn!(error = %e, "에러 알림 전송 실패");
                }
            }
        }
    }
}

/// 자정마다 전날 요약 전송.
async fn summary_loop(pool: &PgPool, notifier: &NotificationManager) {
    loop {
        let now = datetime::kst_now();
        let today = now.date_naive();
        let wait = datetime::until_next_midnight(now);
        tokio::time::sleep(wait.to_std().unwrap_or_default()).await;

        if let Err(e) = send_daily_summary(pool, notifier, today).await {
            warn!(date = %today, error = %e, "뉴스 일일 요약 전송 실패");
        }
    }
}

/// 설정된 포털을 동시에 반복 수집합니다.
///
/// 반환하지 않으므로 종료는 호출 측에서 `select!`로 처리합니다.
pub async fn run_loop(
    pool: &PgPool,
    config: &CollectorConfig,
    notifier: &NotificationManager,
) -> Result<()> {
    let mut loops: Vec<BoxFuture<'_, ()>> = Vec::with_capacity(config.news.portals.len() + 1);
    for name in &config.news.portals {
        let session = PortalSession::new(build_portal(name, &config.news)?)?;
        loops.push(
            portal_loop(
                CollectionsRepository::new(pool.clone()),
                session,
                config.news.interval_for(name),
                config.news.retry_delay(),
                notifier,
            )
            .boxed(),
        );
    }
    loops.push(summary_loop(pool, notifier).boxed());

    info!(portals = ?config.news.portals, "뉴스 수집 시작");
    join_all(loops).await;
    Ok(())
}
