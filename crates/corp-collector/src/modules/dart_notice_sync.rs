//! DART 공시검색(list.json) 수집 모듈.
//!
//! 회사마다 첫 페이지로 전체 페이지 수를 확인한 뒤 나머지 페이지를 병렬로 조회합니다.
//! 조회 결과는 채널로 저장 태스크에 넘깁니다.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use corp_core::{datetime, DartNotice};
use corp_data::provider::{DartClient, DartStatus, NoticePage, NoticeQuery};
use corp_data::storage::CollectionsRepository;
use futures::stream::{self, StreamExt};
use sqlx::PgPool;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::DartJobConfig;
use crate::{CollectionStats, CollectorConfig, QuotaGate, Result};

const CHANNEL_CAPACITY: usize = 64;

/// 공시 저장소.
#[async_trait]
pub trait NoticeStore: Send + Sync {
    /// 새로 저장된 건수를 반환합니다 (`rcept_no` 중복은 무시).
    async fn insert_notices(&self, notices: &[DartNotice]) -> corp_data::Result<u64>;
}

#[async_trait]
impl NoticeStore for CollectionsRepository {
    async fn insert_notices(&self, notices: &[DartNotice]) -> corp_data::Result<u64> {
        self.insert_dart_notices(notices).await
    }
}

/// 페이지 한 건 조회 결과
enum PageOutcome {
    Page(NoticePage),
    Empty,
    Failed,
}

/// 공시 수집.
///
/// `corp_codes`가 없으면 기업개황이 저장된 모든 회사를 대상으로 합니다.
pub async fn sync_dart_notices(
    pool: &PgPool,
    config: &CollectorConfig,
    gate: &QuotaGate,
    corp_codes: Option<Vec<String>>,
) -> Result<CollectionStats> {
    let start = Instant::now();

    let client = DartClient::new(config.dart.require_api_key()?)?;
    let collections = CollectionsRepository::new(pool.clone());

    let mut targets: Vec<String> = collections
        .dart_infos_by_company(None)
        .await?
        .into_iter()
        .map(|(_, corp_code)| corp_code)
        .collect();
    if let Some(filter) = &corp_codes {
        targets.retain(|code| filter.contains(code));
    }

    if targets.is_empty() {
        warn!("공시를 수집할 회사가 없습니다");
        let mut stats = CollectionStats::new();
        stats.elapsed = start.elapsed();
        return Ok(stats);
    }

    let end_de = datetime::yyyymmdd(datetime::kst_now());
    info!(
        companies = targets.len(),
        bgn_de = %config.dart.notice_begin_date,
        end_de = %end_de,
        "공시 수집 시작"
    );

    let (tx, rx) = mpsc::channel::<Vec<DartNotice>>(CHANNEL_CAPACITY);
    let writer = tokio::spawn(write_notices(collections, rx));

    let mut stats = CollectionStats::new();
    for corp_code in targets {
        let query = NoticeQuery {
            corp_code,
            bgn_de: config.dart.notice_begin_date.clone(),
            end_de: end_de.clone(),
            page_count: config.dart.notice_page_count,
        };
        let company_stats = collect_company(&client, gate, &config.dart.notice, &query, &tx).await;
        stats.merge(&company_stats);
    }

    drop(tx);
    match writer.await {
        Ok(written) => stats.merge(&written),
        Err(e) => error!(error = %e, "공시 저장 태스크 종료 실패"),
    }

    stats.elapsed = start.elapsed();
    Ok(stats)
}

/// 한 회사의 모든 페이지를 조회해 채널로 보냅니다.
async fn collect_company(
    client: &DartClient,
    gate: &QuotaGate,
    job: &DartJobConfig,
    query: &NoticeQuery,
    tx: &mpsc::Sender<Vec<DartNotice>>,
) -> CollectionStats {
    let mut stats = CollectionStats::new();
    let delay = job.request_delay();

    stats.total += 1;
    let first = fetch_page(client, gate, query, 1, delay).await;
    let total_page = match first {
        PageOutcome::Page(page) => {
            stats.success += 1;
            let total_page = page.total_page;
            debug!(corp_code = %query.corp_code, total_page, total_count = page.total_count, "공시 첫 페이지");
            send(tx, page.list).await;
            total_page
        }
        PageOutcome::Empty => {
            stats.empty += 1;
            return stats;
        }
        PageOutcome::Failed => {
            stats.errors += 1;
            return stats;
        }
    };

    if total_page < 2 {
        return stats;
    }

    let mut pages = stream::iter(2..=total_page)
        .map(|page_no| fetch_page(client, gate, query, page_no, delay))
        .buffer_unordered(job.concurrency.max(1));

    while let Some(outcome) = pages.next().await {
        stats.total += 1;
        match outcome {
            PageOutcome::Page(page) => {
                stats.success += 1;
                send(tx, page.list).await;
            }
            PageOutcome::Empty => stats.empty += 1,
            PageOutcome::Failed => stats.errors += 1,
        }
    }

    info!(corp_code = %query.corp_code, pages = total_page, "공시 조회 완료");
    stats
}

async fn send(tx: &mpsc::Sender<Vec<DartNotice>>, notices: Vec<DartNotice>) {
    if notices.is_empty() {
        return;
    }
    if tx.send(notices).await.is_err() {
        error!("공시 저장 채널이 닫혔습니다");
    }
}

/// 한 페이지 조회. 한도 응답을 받으면 자정 이후 같은 페이지를 다시 요청합니다.
async fn fetch_page(
    client: &DartClient,
    gate: &QuotaGate,
    query: &NoticeQuery,
    page_no: u32,
    delay: Duration,
) -> PageOutcome {
    loop {
        gate.acquire().await;
        let result = client.fetch_notice_page(query, page_no).await;
        tokio::time::sleep(delay).await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                warn!(corp_code = %query.corp_code, page_no, error = %e, "공시 페이지 조회 실패");
                return PageOutcome::Failed;
            }
        };

        match response.kind() {
            DartStatus::Ok => {
                return match response.data {
                    Some(page) => PageOutcome::Page(page),
                    None => PageOutcome::Empty,
                };
            }
            DartStatus::NoData => return PageOutcome::Empty,
            DartStatus::QuotaOrAccess => gate.exhaust_and_wait().await,
            DartStatus::Other => {
                warn!(
                    corp_code = %query.corp_code,
                    page_no,
                    status = %response.status,
                    message = %response.message,
                    "공시검색 API 오류"
                );
                return PageOutcome::Failed;
            }
        }
    }
}

/// 저장 태스크.
///
/// 반환 통계에는 저장 건수(`saved`)와 저장하지 못한 공시 수(`unsaved`)만 담깁니다.
async fn write_notices(
    store: impl NoticeStore,
    mut rx: mpsc::Receiver<Vec<DartNotice>>,
) -> CollectionStats {
    let mut stats = CollectionStats::new();

    while let Some(notices) = rx.recv().await {
        match store.insert_notices(&notices).await {
            Ok(inserted) => {
                stats.saved += inserted as usize;
                debug!(count = notices.len(), inserted, "공시 저장");
            }
            Err(e) => {
                stats.unsaved += notices.len();
                error!(count = notices.len(), error = %e, "공시 저장 실패");
            }
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quota::testing::gate_before_midnight;
    use mockito::Matcher;
    use secrecy::SecretString;
    use std::sync::Mutex;

    fn notice(rcept_no: &str) -> DartNotice {
        DartNotice {
            corp_code: "00126380".to_string(),
            rcept_no: rcept_no.to_string(),
            ..Default::default()
        }
    }

    fn page_body(page_no: u32, total_page: u32, rcept_nos: &[&str]) -> String {
        let list: Vec<serde_json::Value> = rcept_nos
            .iter()
            .map(|no| serde_json::json!({"corp_code": "00126380", "rcept_no": no}))
            .collect();
        serde_json::json!({
            "status": "000",
            "message": "정상",
            "page_no": page_no,
            "page_count": 2,
            "total_count": rcept_nos.len(),
            "total_page": total_page,
            "list": list,
        })
        .to_string()
    }

    fn query() -> NoticeQuery {
        NoticeQuery {
            corp_code: "00126380".to_string(),
            bgn_de: "19000101".to_string(),
            end_de: "20240501".to_string(),
            page_count: 2,
        }
    }

    fn job() -> DartJobConfig {
        DartJobConfig {
            concurrency: 2,
            request_delay_ms: 0,
        }
    }

    fn client(server: &mockito::ServerGuard) -> DartClient {
        DartClient::with_base_url(SecretString::from("key"), server.url()).unwrap()
    }

    fn page_matcher(page_no: &str) -> Matcher {
        Matcher::UrlEncoded("page_no".into(), page_no.into())
    }

    #[tokio::test]
    async fn test_collect_company_fetches_remaining_pages() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("GET", "/list.json")
            .match_query(page_matcher("1"))
            .with_body(page_body(1, 3, &["20240101000001", "20240101000002"]))
            .expect(1)
            .create_async()
            .await;
        let second = server
            .mock("GET", "/list.json")
            .match_query(page_matcher("2"))
            .with_body(page_body(2, 3, &["20240101000003"]))
            .expect(1)
            .create_async()
            .await;
        let third = server
            .mock("GET", "/list.json")
            .match_query(page_matcher("3"))
            .with_body(r#"{"status": "013", "message": "조회된 데이타가 없습니다."}"#)
            .expect(1)
            .create_async()
            .await;

        let gate = QuotaGate::new(100);
        let (tx, mut rx) = mpsc::channel(8);
        let stats = collect_company(&client(&server), &gate, &job(), &query(), &tx).await;
        drop(tx);

        let mut received = Vec::new();
        while let Some(notices) = rx.recv().await {
            received.extend(notices.into_iter().map(|n| n.rcept_no));
        }
        received.sort();

        assert_eq!(
            received,
            vec!["20240101000001", "20240101000002", "20240101000003"]
        );
        assert_eq!(stats.total, 3);
        assert_eq!(stats.success, 2);
        assert_eq!(stats.empty, 1);
        assert_eq!(stats.errors, 0);
        assert_eq!(gate.snapshot().await.used, 3);
        first.assert_async().await;
        second.assert_async().await;
        third.assert_async().await;
    }

    #[tokio::test]
    async fn test_collect_company_single_page() {
        let mut server = mockito::Server::new_async().await;
        let other_pages = server
            .mock("GET", "/list.json")
            .match_query(Matcher::Regex("page_no=[2-9]".to_string()))
            .expect(0)
            .create_async()
            .await;
        server
            .mock("GET", "/list.json")
            .match_query(page_matcher("1"))
            .with_body(page_body(1, 1, &["20240101000001"]))
            .create_async()
            .await;

        let gate = QuotaGate::new(100);
        let (tx, mut rx) = mpsc::channel(8);
        let stats = collect_company(&client(&server), &gate, &job(), &query(), &tx).await;
        drop(tx);

        assert_eq!(rx.recv().await.map(|n| n.len()), Some(1));
        assert_eq!(stats.total, 1);
        assert_eq!(stats.success, 1);
        other_pages.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_page_waits_out_quota_status() {
        let mut server = mockito::Server::new_async().await;
        let limited = server
            .mock("GET", "/list.json")
            .match_query(Matcher::Any)
            .with_body(r#"{"status": "020", "message": "요청 제한을 초과하였습니다."}"#)
            .expect(1)
            .create_async()
            .await;
        let ok = server
            .mock("GET", "/list.json")
            .match_query(Matcher::Any)
            .with_body(page_body(1, 1, &["20240101000001"]))
            .expect(1)
            .create_async()
            .await;

        let gate = gate_before_midnight(100);
        let day = gate.snapshot().await.day;
        let outcome = fetch_page(&client(&server), &gate, &query(), 1, Duration::ZERO).await;

        assert!(matches!(outcome, PageOutcome::Page(page) if page.list.len() == 1));
        let snapshot = gate.snapshot().await;
        assert_eq!(snapshot.day, day.succ_opt().unwrap());
        assert_eq!(snapshot.used, 1);
        limited.assert_async().await;
        ok.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_page_transport_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/list.json")
            .match_query(Matcher::Any)
            .with_status(500)
            .expect(1)
            .create_async()
            .await;

        let gate = QuotaGate::new(100);
        let outcome = fetch_page(&client(&server), &gate, &query(), 1, Duration::ZERO).await;
        assert!(matches!(outcome, PageOutcome::Failed));
    }

    /// `rcept_no`가 `fail_on`인 공시가 섞인 묶음은 저장에 실패하는 저장소.
    struct FlakyStore {
        fail_on: &'static str,
        saved: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl NoticeStore for FlakyStore {
        async fn insert_notices(&self, notices: &[DartNotice]) -> corp_data::Result<u64> {
            if notices.iter().any(|n| n.rcept_no == self.fail_on) {
                return Err(corp_data::DataError::InvalidData("중복 키".to_string()));
            }
            let mut saved = self.saved.lock().unwrap();
            saved.extend(notices.iter().map(|n| n.rcept_no.clone()));
            Ok(notices.len() as u64)
        }
    }

    #[tokio::test]
    async fn test_write_notices_counts_unsaved_rows() {
        let (tx, rx) = mpsc::channel(4);
        let writer = tokio::spawn(write_notices(
            FlakyStore {
                fail_on: "bad",
                saved: Mutex::new(Vec::new()),
            },
            rx,
        ));

        tx.send(vec![notice("1"), notice("2")]).await.unwrap();
        tx.send(vec![notice("3"), notice("bad"), notice("4")]).await.unwrap();
        tx.send(vec![notice("5")]).await.unwrap();
        drop(tx);

        let stats = writer.await.unwrap();
        assert_eq!(stats.saved, 3);
        assert_eq!(stats.unsaved, 3);
        assert_eq!(stats.errors, 0);
        assert_eq!(stats.total, 0);
    }
}
