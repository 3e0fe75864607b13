//! DART 단일회사 전체 재무제표(fnlttSinglAcntAll.json) 수집 및 가공 모듈.
//!
//! 회사 × 사업연도 × 보고서 × 재무제표구분 조합마다 한 번씩 호출하며,
//! 모든 호출은 공유 [`QuotaGate`]를 거칩니다.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Datelike};
use chrono_tz::Tz;
use corp_core::{datetime, CompanyRef, DartFinanceItem, FsDiv, ReportCode};
use corp_data::preprocessing::build_company_finance;
use corp_data::provider::{DartClient, DartStatus};
use corp_data::storage::{CollectionsRepository, CompaniesRepository};
use futures::stream::{self, StreamExt};
use sqlx::PgPool;
use tracing::{debug, error, info, warn};

use crate::{CollectionStats, CollectorConfig, QuotaGate, Result};

/// HTTP 오류/전송 오류 시 최대 시도 횟수
const MAX_FETCH_ATTEMPTS: u32 = 3;

/// 재무제표 수집 옵션
#[derive(Debug, Clone, Default)]
pub struct FinanceSyncOptions {
    /// 특정 사업연도만 수집
    pub bsns_year: Option<i32>,
    /// 특정 고유번호만 수집
    pub corp_codes: Option<Vec<String>>,
    /// 특정 보고서만 수집 (기본: 전체)
    pub reports: Option<Vec<ReportCode>>,
}

/// 호출 한 건의 요청 값
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinanceRequest {
    pub corp_code: String,
    pub bsns_year: String,
    pub reprt_code: ReportCode,
    pub fs_div: FsDiv,
}

/// 재무제표 라인 저장소.
#[async_trait]
pub trait FinanceStore: Send + Sync {
    async fn finance_exists(&self, request: &FinanceRequest) -> corp_data::Result<bool>;
    async fn insert_finance_items(&self, items: &[DartFinanceItem]) -> corp_data::Result<u64>;
}

#[async_trait]
impl FinanceStore for CollectionsRepository {
    async fn finance_exists(&self, request: &FinanceRequest) -> corp_data::Result<bool> {
        CollectionsRepository::finance_exists(
            self,
            &request.corp_code,
            &request.bsns_year,
            request.reprt_code.code(),
            request.fs_div.code(),
        )
        .await
    }

    async fn insert_finance_items(&self, items: &[DartFinanceItem]) -> corp_data::Result<u64> {
        self.insert_dart_finance_items(items).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FinanceOutcome {
    Saved(u64),
    Skipped,
    Empty,
    Failed,
}

/// 기본 수집 연도.
///
/// 사업보고서가 대부분 제출되는 5월부터는 작년, 그 전에는 재작년을 기준으로
/// 기준 연도와 3년 전 연도를 수집합니다. 기준 연도 보고서에 직전 2개 연도가 함께 담깁니다.
pub fn target_years(now: DateTime<Tz>, bsns_year: Option<i32>) -> Vec<String> {
    if let Some(year) = bsns_year {
        return vec![year.to_string()];
    }

    let target = if now.month() > 4 {
        now.year() - 1
    } else {
        now.year() - 2
    };
    vec![target.to_string(), (target - 3).to_string()]
}

/// 회사별 요청 목록 (연도 → 보고서 → 재무제표구분 순).
pub fn build_requests(
    corp_codes: &[String],
    years: &[String],
    reports: &[ReportCode],
) -> Vec<FinanceRequest> {
    let mut requests =
        Vec::with_capacity(corp_codes.len() * years.len() * reports.len() * FsDiv::ALL.len());
    for corp_code in corp_codes {
        for year in years {
            for &reprt_code in reports {
                for fs_div in FsDiv::ALL {
                    requests.push(FinanceRequest {
                        corp_code: corp_code.clone(),
                        bsns_year: year.clone(),
                        reprt_code,
                        fs_div,
                    });
                }
            }
        }
    }
    requests
}

/// 재무제표 수집.
pub async fn sync_dart_finance(
    pool: &PgPool,
    config: &CollectorConfig,
    gate: &QuotaGate,
    options: FinanceSyncOptions,
) -> Result<CollectionStats> {
    let start = Instant::now();
    let mut stats = CollectionStats::new();

    let client = DartClient::new(config.dart.require_api_key()?)?;
    let collections = CollectionsRepository::new(pool.clone());

    let mut corp_codes: Vec<String> = collections
        .dart_infos_by_company(None)
        .await?
        .into_iter()
        .map(|(_, corp_code)| corp_code)
        .collect();
    if let Some(filter) = &options.corp_codes {
        corp_codes.retain(|code| filter.contains(code));
    }

    if corp_codes.is_empty() {
        warn!("재무제표를 수집할 회사가 없습니다");
        stats.elapsed = start.elapsed();
        return Ok(stats);
    }

    let years = target_years(datetime::kst_now(), options.bsns_year);
    let reports = options.reports.as_deref().unwrap_or(&ReportCode::ALL);
    let requests = build_requests(&corp_codes, &years, reports);
    let job = &config.dart.finance;

    info!(
        companies = corp_codes.len(),
        years = ?years,
        requests = requests.len(),
        concurrency = job.concurrency,
        "재무제표 수집 시작"
    );

    let delay = job.request_delay();
    let client = &client;
    let store: &dyn FinanceStore = &collections;
    let total = requests.len();

    let mut outcomes = stream::iter(requests.into_iter().enumerate())
        .map(|(idx, request)| async move {
            debug!(
                progress = format!("{}/{}", idx + 1, total),
                corp_code = %request.corp_code,
                bsns_year = %request.bsns_year,
                reprt_code = %request.reprt_code,
                fs_div = %request.fs_div,
                "재무제표 요청"
            );
            let outcome = collect_one(client, store, gate, &request, delay).await;
            tokio::time::sleep(delay).await;
            outcome
        })
        .buffer_unordered(job.concurrency.max(1));

    while let Some(outcome) = outcomes.next().await {
        stats.total += 1;
        match outcome {
            FinanceOutcome::Saved(rows) => {
                stats.success += 1;
                stats.saved += rows as usize;
            }
            FinanceOutcome::Skipped => stats.skipped += 1,
            FinanceOutcome::Empty => stats.empty += 1,
            FinanceOutcome::Failed => stats.errors += 1,
        }
    }

    stats.elapsed = start.elapsed();
    Ok(stats)
}

/// 요청 한 건 처리. 이미 저장된 조합은 호출하지 않습니다.
async fn collect_one(
    client: &DartClient,
    store: &dyn FinanceStore,
    gate: &QuotaGate,
    request: &FinanceRequest,
    retry_delay: Duration,
) -> FinanceOutcome {
    match store.finance_exists(request).await {
        Ok(true) => {
            debug!(corp_code = %request.corp_code, bsns_year = %request.bsns_year, "이미 수집됨");
            return FinanceOutcome::Skipped;
        }
        Ok(false) => {}
        Err(e) => {
            error!(corp_code = %request.corp_code, error = %e, "수집 여부 확인 실패");
            return FinanceOutcome::Failed;
        }
    }

    let mut attempts = 0;
    loop {
        gate.acquire().await;
        attempts += 1;

        let response = match client
            .fetch_finance(
                &request.corp_code,
                &request.bsns_year,
                request.reprt_code,
                request.fs_div,
            )
            .await
        {
            Ok(response) => response,
            Err(e) if attempts < MAX_FETCH_ATTEMPTS => {
                warn!(corp_code = %request.corp_code, attempts, error = %e, "재무제표 요청 실패, 재시도");
                tokio::time::sleep(retry_delay).await;
                continue;
            }
            Err(e) => {
                error!(corp_code = %request.corp_code, attempts, error = %e, "재무제표 요청 실패, 건너뜀");
                return FinanceOutcome::Failed;
            }
        };

        match response.kind() {
            DartStatus::Ok => {
                let items = response.data.unwrap_or_default();
                if items.is_empty() {
                    return FinanceOutcome::Empty;
                }
                return match store.insert_finance_items(&items).await {
                    Ok(inserted) => {
                        info!(
                            corp_code = %request.corp_code,
                            bsns_year = %request.bsns_year,
                            reprt_code = %request.reprt_code,
                            fs_div = %request.fs_div,
                            rows = items.len(),
                            inserted,
                            "재무제표 저장"
                        );
                        FinanceOutcome::Saved(inserted)
                    }
                    Err(e) => {
                        error!(corp_code = %request.corp_code, error = %e, "재무제표 저장 실패");
                        FinanceOutcome::Failed
                    }
                };
            }
            DartStatus::NoData => return FinanceOutcome::Empty,
            DartStatus::QuotaOrAccess => {
                warn!(
                    status = %response.status,
                    message = %response.message,
                    "호출 제한 응답, 자정 이후 재시도"
                );
                gate.exhaust_and_wait().await;
                attempts = 0;
            }
            DartStatus::Other => {
                warn!(
                    corp_code = %request.corp_code,
                    status = %response.status,
                    message = %response.message,
                    "재무제표 API 오류"
                );
                return FinanceOutcome::Failed;
            }
        }
    }
}

/// 저장된 재무제표 라인으로 `company_finance`를 생성/갱신합니다.
///
/// 사업보고서(11011) 라인만 사용합니다.
pub async fn preprocess_finance(pool: &PgPool, company_id: Option<i64>) -> Result<CollectionStats> {
    let start = Instant::now();
    let mut stats = CollectionStats::new();

    let collections = CollectionsRepository::new(pool.clone());
    let companies = CompaniesRepository::new(pool.clone());

    let targets = collections.dart_infos_by_company(company_id).await?;
    info!(targets = targets.len(), "재무 요약 가공 시작");

    for (company_id, corp_code) in targets {
        stats.total += 1;

        let company = match companies.company_ref(company_id).await {
            Ok(Some(company)) => company,
            Ok(None) => CompanyRef {
                company_id,
                corp_code: Some(corp_code.clone()),
                ..Default::default()
            },
            Err(e) => {
                stats.errors += 1;
                warn!(company_id, error = %e, "회사 식별자 조회 실패");
                continue;
            }
        };

        let mut rows = match collections.dart_finance_rows(&corp_code).await {
            Ok(rows) => rows,
            Err(e) => {
                stats.errors += 1;
                warn!(company_id, corp_code = %corp_code, error = %e, "재무제표 라인 조회 실패");
                continue;
            }
        };
        rows.retain(|row| row.reprt_code == ReportCode::Annual.code());

        let records = build_company_finance(&company, &rows);
        if records.is_empty() {
            stats.empty += 1;
            continue;
        }

        match collections.upsert_company_finance(&records).await {
            Ok(saved) => {
                stats.success += 1;
                stats.saved += saved as usize;
                debug!(company_id, records = records.len(), "재무 요약 저장");
            }
            Err(e) => {
                stats.errors += 1;
                error!(company_id, error = %e, "재무 요약 저장 실패");
            }
        }
    }

    stats.elapsed = start.elapsed();
    Ok(stats)
}
