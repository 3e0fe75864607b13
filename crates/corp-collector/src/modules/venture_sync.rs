//! 벤처기업 상세정보 수집 모듈.
//!
//! 전체 목록을 워커 수만큼 나눠 각 워커가 자기 세션(쿠키)으로 캡차를 풀고 상세 페이지를 조회합니다.
//! 실패한 항목은 목록 끝으로 다시 넣어 정해진 횟수만큼 재시도하고,
//! 끝까지 실패한 일련번호는 `{data_dir}/{worker}_failed_list.txt`에 추가합니다.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use corp_core::{datetime, normalize_registration_number, VentureDetail};
use corp_data::provider::{OcrClient, VentureClient, VentureList};
use corp_data::storage::{CollectionsRepository, CompaniesRepository};
use corp_notification::NotificationManager;
use sqlx::PgPool;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::captcha::CaptchaReader;
use crate::{
    CaptchaSolver, CollectionStats, CollectorConfig, HttpCaptchaSource, Result, VentureStatistics,
};

const JOB_NAME: &str = "벤처기업 상세정보";
const LIST_CACHE_FILE: &str = "vntr_list.json";
const CAPTCHA_RETRY_DELAY: Duration = Duration::from_secs(1);
const STATISTICS_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// 목록 한 건 (일련번호, 업종코드)
pub type VentureItem = (String, Option<String>);

/// 상세정보 한 건 조회.
#[async_trait]
pub trait DetailFetcher: Send + Sync {
    async fn fetch_detail(
        &self,
        vnia_sn: &str,
        indsty_cd: Option<String>,
    ) -> corp_data::Result<VentureDetail>;
}

/// 캡차 키를 확보한 세션으로 상세 페이지를 조회합니다.
pub struct CaptchaDetailFetcher {
    client: VentureClient,
    solver: CaptchaSolver,
}

impl CaptchaDetailFetcher {
    pub fn new(client: VentureClient, ocr: Arc<dyn CaptchaReader>, captcha_attempts: u32) -> Self {
        let solver = CaptchaSolver::new(
            Arc::new(HttpCaptchaSource::new(client.clone())),
            ocr,
            captcha_attempts,
            CAPTCHA_RETRY_DELAY,
        );
        Self { client, solver }
    }
}

#[async_trait]
impl DetailFetcher for CaptchaDetailFetcher {
    async fn fetch_detail(
        &self,
        vnia_sn: &str,
        indsty_cd: Option<String>,
    ) -> corp_data::Result<VentureDetail> {
        let key = self.solver.solve().await.ok_or_else(|| {
            corp_data::DataError::CaptchaRejected("캡차 키를 얻지 못했습니다".to_string())
        })?;
        self.client.fetch_detail(vnia_sn, &key, indsty_cd).await
    }
}

/// 목록을 `workers`개로 나누고 각 조각을 뒤집습니다.
///
/// 조각 크기 차이는 최대 1입니다.
pub fn split_into_parts(items: Vec<VentureItem>, workers: usize) -> Vec<Vec<VentureItem>> {
    let workers = workers.max(1);
    let len = items.len();
    let mut parts = Vec::with_capacity(workers);
    let mut iter = items.into_iter();

    for i in 0..workers {
        let end = (i + 1) * len / workers;
        let start = i * len / workers;
        let mut part: Vec<VentureItem> = iter.by_ref().take(end - start).collect();
        part.reverse();
        parts.push(part);
    }
    parts
}

/// 실패한 일련번호를 파일 끝에 추가합니다.
pub async fn append_failed_list(path: &Path, failed: &[String]) -> std::io::Result<()> {
    if failed.is_empty() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    let mut body = failed.join("\n");
    body.push('\n');
    file.write_all(body.as_bytes()).await?;
    file.flush().await
}

/// 벤처기업 상세정보 수집.
pub async fn sync_venture(
    pool: &PgPool,
    config: &CollectorConfig,
    notifier: Arc<NotificationManager>,
    refresh_list: bool,
) -> Result<CollectionStats> {
    let start = Instant::now();
    let started_at = datetime::format_standard(&datetime::kst_now().naive_local());
    if let Err(e) = notifier.notify_scrape_started(JOB_NAME, &started_at).await {
        warn!(error = %e, "시작 알림 전송 실패");
    }

    let list_client = VentureClient::new()?;
    let list: VentureList = list_client
        .load_or_fetch_list(&config.data_dir.join(LIST_CACHE_FILE), refresh_list)
        .await?;
    let items: Vec<VentureItem> = list.into_iter().collect();

    let venture = &config.venture;
    info!(
        total = items.len(),
        workers = venture.workers,
        passes = venture.item_passes,
        "벤처기업 상세정보 수집 시작"
    );

    let ocr: Arc<dyn CaptchaReader> = Arc::new(OcrClient::with_endpoint(config.ocr.endpoint())?);

    let (tx, rx) = mpsc::channel::<VentureDetail>(venture.batch_size.max(1) * 2);
    let writer = tokio::spawn(write_details(
        CollectionsRepository::new(pool.clone()),
        CompaniesRepository::new(pool.clone()),
        rx,
        venture.batch_size.max(1),
        notifier.clone(),
    ));

    let mut handles = Vec::with_capacity(venture.workers.max(1));
    for (idx, part) in split_into_parts(items, venture.workers).into_iter().enumerate() {
        let worker = Worker {
            name: format!("SCP {}", idx + 1),
            fetcher: Box::new(CaptchaDetailFetcher::new(
                VentureClient::new()?,
                ocr.clone(),
                venture.captcha_attempts,
            )),
            tx: tx.clone(),
            item_passes: venture.item_passes,
            delay: venture.request_delay(),
            data_dir: config.data_dir.clone(),
        };
        handles.push(tokio::spawn(worker.run(part)));
    }
    drop(tx);

    let mut stats = CollectionStats::new();
    for handle in handles {
        match handle.await {
            Ok(worker_stats) => stats.merge(&worker_stats),
            Err(e) => error!(error = %e, "벤처 수집 워커 비정상 종료"),
        }
    }

    let mut statistics = match writer.await {
        Ok((saved, statistics)) => {
            stats.saved += saved;
            statistics
        }
        Err(e) => {
            error!(error = %e, "벤처 저장 태스크 종료 실패");
            VentureStatistics::default()
        }
    };

    let finished_at = datetime::format_standard(&datetime::kst_now().naive_local());
    if let Err(e) = notifier
        .notify_venture_statistics(&finished_at, statistics.take())
        .await
    {
        warn!(error = %e, "통계 알림 전송 실패");
    }
    if let Err(e) = notifier
        .notify_scrape_finished(JOB_NAME, &started_at, &finished_at)
        .await
    {
        warn!(error = %e, "종료 알림 전송 실패");
    }

    stats.elapsed = start.elapsed();
    Ok(stats)
}

/// 한 조각을 처리하는 워커.
struct Worker {
    name: String,
    fetcher: Box<dyn DetailFetcher>,
    tx: mpsc::Sender<VentureDetail>,
    item_passes: u32,
    delay: Duration,
    data_dir: PathBuf,
}

impl Worker {
    async fn run(self, items: Vec<VentureItem>) -> CollectionStats {
        let mut stats = CollectionStats::new();

        let total = items.len();
        let mut queue: VecDeque<(VentureItem, u32)> =
            items.into_iter().map(|item| (item, 1)).collect();
        let mut failed = Vec::new();
        let mut done = 0;

        while let Some(((vnia_sn, indsty_cd), pass)) = queue.pop_front() {
            stats.total += 1;

            match self.fetcher.fetch_detail(&vnia_sn, indsty_cd.clone()).await {
                Ok(detail) => {
                    stats.success += 1;
                    done += 1;
                    debug!(
                        worker = %self.name,
                        vnia_sn = %vnia_sn,
                        progress = format!("{}/{}", done, total),
                        "상세정보 조회"
                    );
                    if self.tx.send(detail).await.is_err() {
                        error!(worker = %self.name, "저장 채널이 닫혔습니다");
                        break;
                    }
                }
                Err(e) if pass < self.item_passes => {
                    warn!(
                        worker = %self.name,
                        vnia_sn = %vnia_sn,
                        pass,
                        error = %e,
                        "상세정보 조회 실패, 목록 끝에서 재시도"
                    );
                    queue.push_back(((vnia_sn, indsty_cd), pass + 1));
                }
                Err(e) => {
                    stats.errors += 1;
                    done += 1;
                    warn!(worker = %self.name, vnia_sn = %vnia_sn, error = %e, "상세정보 조회 실패");
                    failed.push(vnia_sn);
                }
            }

            tokio::time::sleep(self.delay).await;
        }

        if !failed.is_empty() {
            let path = self.data_dir.join(format!("{}_failed_list.txt", self.name));
            match append_failed_list(&path, &failed).await {
                Ok(()) => info!(
                    worker = %self.name,
                    failed = failed.len(),
                    path = %path.display(),
                    "실패 목록 저장"
                ),
                Err(e) => error!(worker = %self.name, error = %e, "실패 목록 저장 실패"),
            }
        }

        info!(
            worker = %self.name,
            total,
            success = stats.success,
            failed = failed.len(),
            "워커 완료"
        );
        stats
    }
}

/// 상세정보에 회사 id를 붙입니다.
pub fn attach_company_ids(
    details: &mut [VentureDetail],
    company_ids: &std::collections::HashMap<String, i64>,
) {
    for detail in details {
        let biz_no = normalize_registration_number(&detail.company.biz_no);
        detail.company.company_id = company_ids.get(&biz_no).copied();
    }
}

/// 배치 저장 태스크. (저장된 기본정보 수, 통계)를 반환합니다.
///
/// 실행 중에는 하루마다 누적 통계를 알림으로 보내고 초기화합니다.
async fn write_details(
    collections: CollectionsRepository,
    companies: CompaniesRepository,
    mut rx: mpsc::Receiver<VentureDetail>,
    batch_size: usize,
    notifier: Arc<NotificationManager>,
) -> (usize, VentureStatistics) {
    let mut statistics = VentureStatistics::default();
    let mut saved = 0;
    let mut batch: Vec<VentureDetail> = Vec::with_capacity(batch_size);

    let mut ticker = tokio::time::interval(STATISTICS_INTERVAL);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    ticker.tick().await;

    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Some(detail) => {
                    batch.push(detail);
                    if batch.len() >= batch_size {
                        saved += save_batch(&collections, &companies, &mut batch, &mut statistics).await;
                    }
                }
                None => break,
            },
            _ = ticker.tick() => {
                let until = datetime::format_standard(&datetime::kst_now().naive_local());
                if let Err(e) = notifier.notify_venture_statistics(&until, statistics.take()).await {
                    warn!(error = %e, "통계 알림 전송 실패");
                }
            }
        }
    }

    saved += save_batch(&collections, &companies, &mut batch, &mut statistics).await;
    (saved, statistics)
}

async fn save_batch(
    collections: &CollectionsRepository,
    companies: &CompaniesRepository,
    batch: &mut Vec<VentureDetail>,
    statistics: &mut VentureStatistics,
) -> usize {
    if batch.is_empty() {
        return 0;
    }

    let mut details = std::mem::take(batch);
    let business_nums: Vec<String> = details
        .iter()
        .map(|d| normalize_registration_number(&d.company.biz_no))
        .filter(|num| !num.is_empty())
        .collect();
    match companies.company_ids_by_business_num(&business_nums).await {
        Ok(ids) => attach_company_ids(&mut details, &ids),
        Err(e) => warn!(error = %e, "사업자등록번호로 회사 id 조회 실패, id 없이 저장"),
    }

    match collections.insert_venture_details(&details).await {
        Ok(counts) => {
            statistics.record(counts);
            info!(
                count = details.len(),
                info = counts.info,
                balance = counts.finance_balance,
                income = counts.finance_income,
                investment = counts.investment,
                certificate = counts.certificate,
                "벤처기업 상세정보 저장"
            );
            counts.info as usize
        }
        Err(e) => {
            error!(count = details.len(), error = %e, "벤처기업 상세정보 저장 실패");
            0
        }
    }
}
