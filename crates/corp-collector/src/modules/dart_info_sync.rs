//! DART 기업개황(company.json) 수집 모듈.

use std::collections::HashMap;
use std::time::Instant;

use corp_core::{normalize_registration_number, DartCompanyInfo};
use corp_data::preprocessing::{enrich, KsicTable};
use corp_data::provider::DartClient;
use corp_data::storage::{CollectionsRepository, CompaniesRepository};
use futures::stream::{self, StreamExt};
use sqlx::PgPool;
use tracing::{debug, error, info, warn};

use crate::{CollectionStats, CollectorConfig, Result};

/// 기업개황 수집.
///
/// `from_xml`이면 DART 고유번호 전체(corpCode.xml)를, 아니면 companies DB에서
/// 고유번호가 있는 회사만 대상으로 합니다.
pub async fn sync_dart_infos(
    pool: &PgPool,
    config: &CollectorConfig,
    from_xml: bool,
) -> Result<CollectionStats> {
    let start = Instant::now();
    let mut stats = CollectionStats::new();

    let client = DartClient::new(config.dart.require_api_key()?)?;
    let collections = CollectionsRepository::new(pool.clone());
    let companies = CompaniesRepository::new(pool.clone());

    let corp_codes: Vec<String> = if from_xml {
        client
            .fetch_corp_codes()
            .await?
            .into_iter()
            .map(|c| c.corp_code)
            .collect()
    } else {
        companies
            .dart_targets(None)
            .await?
            .into_iter()
            .filter_map(|c| c.corp_code)
            .collect()
    };

    if corp_codes.is_empty() {
        warn!("수집할 DART 고유번호가 없습니다");
        stats.elapsed = start.elapsed();
        return Ok(stats);
    }

    let ksic = companies.ksic_table().await?;
    let job = &config.dart.info;
    let batch_size = config.dart.info_batch_size.max(1);

    info!(
        targets = corp_codes.len(),
        concurrency = job.concurrency,
        source = if from_xml { "corpCode.xml" } else { "companies" },
        "기업개황 수집 시작"
    );

    let delay = job.request_delay();
    let client = &client;
    let mut responses = stream::iter(corp_codes.iter())
        .map(|corp_code| async move {
            let result = client.fetch_company(corp_code).await;
            tokio::time::sleep(delay).await;
            (corp_code, result)
        })
        .buffer_unordered(job.concurrency.max(1));

    let mut batch: Vec<DartCompanyInfo> = Vec::with_capacity(batch_size);

    while let Some((corp_code, result)) = responses.next().await {
        stats.total += 1;

        match result.and_then(|response| response.into_data()) {
            Ok(Some(info)) => {
                stats.success += 1;
                debug!(corp_code = %corp_code, corp_name = %info.corp_name, "기업개황 조회");
                batch.push(info);

                if batch.len() >= batch_size {
                    flush(&collections, &companies, &ksic, &mut batch, &mut stats).await;
                }
            }
            Ok(None) => {
                stats.empty += 1;
                debug!(corp_code = %corp_code, "기업개황 없음");
            }
            Err(e) => {
                stats.errors += 1;
                warn!(corp_code = %corp_code, error = %e, "기업개황 조회 실패");
            }
        }
    }

    flush(&collections, &companies, &ksic, &mut batch, &mut stats).await;

    stats.elapsed = start.elapsed();
    Ok(stats)
}

/// 모인 기업개황에 회사 id와 업종/시장 정보를 붙여 저장합니다.
async fn flush(
    collections: &CollectionsRepository,
    companies: &CompaniesRepository,
    ksic: &KsicTable,
    batch: &mut Vec<DartCompanyInfo>,
    stats: &mut CollectionStats,
) {
    if batch.is_empty() {
        return;
    }

    let infos = std::mem::take(batch);
    let corporation_nums: Vec<String> = infos
        .iter()
        .map(|info| normalize_registration_number(&info.jurir_no))
        .filter(|num| !num.is_empty())
        .collect();

    let company_ids = match companies.company_ids_by_corporation_num(&corporation_nums).await {
        Ok(ids) => ids,
        Err(e) => {
            warn!(error = %e, "법인등록번호로 회사 id 조회 실패, id 없이 저장");
            HashMap::new()
        }
    };

    let prepared = prepare_infos(infos, &company_ids, ksic);
    match collections.upsert_dart_infos(&prepared).await {
        Ok(saved) => {
            stats.saved += saved as usize;
            info!(count = prepared.len(), saved, "기업개황 저장");
        }
        Err(e) => {
            stats.unsaved += prepared.len();
            error!(count = prepared.len(), error = %e, "기업개황 저장 실패");
        }
    }
}

/// 회사 id 연결과 상장시장/KSIC 보강.
pub fn prepare_infos(
    infos: Vec<DartCompanyInfo>,
    company_ids: &HashMap<String, i64>,
    ksic: &KsicTable,
) -> Vec<DartCompanyInfo> {
    infos
        .into_iter()
        .map(|mut info| {
            let corporation_num = normalize_registration_number(&info.jurir_no);
            info.company_id = company_ids.get(&corporation_num).copied();
            enrich(info, ksic)
        })
        .collect()
}
