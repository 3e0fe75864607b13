//! Standalone company data collector CLI.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use corp_collector::config::parse_list;
use corp_collector::{modules, CollectorConfig, QuotaGate};
use corp_core::{datetime, init_logging, LogConfig, ReportCode};
use corp_data::provider::ScrapedUrlCache;
use corp_data::storage::{CollectionsRepository, MIGRATOR};
use corp_notification::{NotificationManager, SynologySender};

#[derive(Parser)]
#[command(name = "corp-collector")]
#[command(about = "Company Data Collector (DART, 벤처기업, 뉴스)", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// DART 기업개황 수집
    DartInfo {
        /// corpCode.xml 전체를 대상으로 수집
        #[arg(long)]
        from_xml: bool,
    },

    /// DART 재무제표 수집
    DartFinance {
        /// 특정 사업연도만 수집
        #[arg(long)]
        year: Option<i32>,
        /// 특정 고유번호만 수집 (쉼표로 구분, 예: "00126380,00164779")
        #[arg(long)]
        corp_codes: Option<String>,
        /// 특정 보고서만 수집 (쉼표로 구분, 예: "11011,q1")
        #[arg(long, value_delimiter = ',')]
        reports: Vec<ReportCode>,
    },

    /// 수집한 재무제표로 재무 요약 생성
    DartFinancePreprocess {
        /// 특정 회사만 가공
        #[arg(long)]
        company_id: Option<i64>,
    },

    /// DART 공시 수집
    DartNotice {
        /// 특정 고유번호만 수집 (쉼표로 구분)
        #[arg(long)]
        corp_codes: Option<String>,
    },

    /// 벤처기업 상세정보 수집
    Venture {
        /// 캐시를 무시하고 목록을 다시 받음
        #[arg(long)]
        refresh_list: bool,
    },

    /// 뉴스 포털 수집 (기본: 반복 실행)
    News {
        /// 포털마다 세션 한 번만 실행
        #[arg(long)]
        once: bool,
        /// 수집할 포털 (쉼표로 구분, 기본: NEWS_PORTALS)
        #[arg(long, value_delimiter = ',')]
        portals: Vec<String>,
    },

    /// 오늘의 뉴스 수집 요약 전송
    NewsSummary,

    /// 전체 워크플로우 실행 (기업개황 → 재무제표 → 재무 요약 → 공시)
    RunAll,

    /// 데몬 모드: 주기적으로 전체 워크플로우 실행
    Daemon,
}

fn corp_code_filter(value: Option<String>) -> Option<Vec<String>> {
    value.map(|v| parse_list(&v)).filter(|codes| !codes.is_empty())
}

fn notification_manager() -> NotificationManager {
    let mut manager = NotificationManager::new();
    match SynologySender::from_env() {
        Some(Ok(sender)) => manager.add_sender(sender),
        Some(Err(e)) => tracing::warn!("Synology 알림 설정 오류: {}", e),
        None => tracing::debug!("Synology 알림 비활성화"),
    }
    manager
}

/// DART 전체 워크플로우.
async fn run_dart_workflow(
    pool: &sqlx::PgPool,
    config: &CollectorConfig,
    gate: &QuotaGate,
) -> corp_collector::Result<()> {
    tracing::info!("Step 1/4: 기업개황 수집");
    let stats = modules::sync_dart_infos(pool, config, false).await?;
    stats.log_summary("기업개황 수집");

    tracing::info!("Step 2/4: 재무제표 수집");
    let stats =
        modules::sync_dart_finance(pool, config, gate, modules::FinanceSyncOptions::default()).await?;
    stats.log_summary("재무제표 수집");

    tracing::info!("Step 3/4: 재무 요약 가공");
    let stats = modules::preprocess_finance(pool, None).await?;
    stats.log_summary("재무 요약 가공");

    tracing::info!("Step 4/4: 공시 수집");
    let stats = modules::sync_dart_notices(pool, config, gate, None).await?;
    stats.log_summary("공시 수집");

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    // 로깅 초기화
    init_logging(LogConfig::from_env(&format!(
        "corp_collector={0},corp_data={0},corp_notification={0}",
        cli.log_level
    )))?;

    tracing::info!("Company Data Collector 시작");

    // 설정 로드
    let mut config = CollectorConfig::from_env()?;
    tracing::debug!(data_dir = %config.data_dir.display(), "설정 로드 완료");

    // DB 연결
    let pool = sqlx::PgPool::connect(&config.database_url).await?;
    MIGRATOR.run(&pool).await?;
    tracing::info!("데이터베이스 연결 성공");

    let notifier = Arc::new(notification_manager());
    let gate = QuotaGate::new(config.dart.daily_limit);

    // 명령 실행
    match cli.command {
        Commands::DartInfo { from_xml } => {
            let stats = modules::sync_dart_infos(&pool, &config, from_xml).await?;
            stats.log_summary("기업개황 수집");
        }
        Commands::DartFinance {
            year,
            corp_codes,
            reports,
        } => {
            let options = modules::FinanceSyncOptions {
                bsns_year: year,
                corp_codes: corp_code_filter(corp_codes),
                reports: (!reports.is_empty()).then_some(reports),
            };
            let stats = modules::sync_dart_finance(&pool, &config, &gate, options).await?;
            stats.log_summary("재무제표 수집");
        }
        Commands::DartFinancePreprocess { company_id } => {
            let stats = modules::preprocess_finance(&pool, company_id).await?;
            stats.log_summary("재무 요약 가공");
        }
        Commands::DartNotice { corp_codes } => {
            let stats =
                modules::sync_dart_notices(&pool, &config, &gate, corp_code_filter(corp_codes)).await?;
            stats.log_summary("공시 수집");
        }
        Commands::Venture { refresh_list } => {
            let stats = modules::sync_venture(&pool, &config, notifier.clone(), refresh_list).await?;
            stats.log_summary("벤처기업 상세정보 수집");
        }
        Commands::News { once, portals } => {
            if !portals.is_empty() {
                config.news.portals = portals;
            }
            if once {
                let collections = CollectionsRepository::new(pool.clone());
                for name in &config.news.portals {
                    let session =
                        modules::PortalSession::new(modules::build_portal(name, &config.news)?)?;
                    let mut cache = ScrapedUrlCache::default();
                    modules::run_news_session(&collections, &session, &mut cache).await?;
                }
            } else {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("종료 신호 수신, 뉴스 수집 종료 중...");
                    }
                    result = modules::run_news_loop(&pool, &config, &notifier) => {
                        result?;
                    }
                }
            }
        }
        Commands::NewsSummary => {
            let today = datetime::kst_now().date_naive();
            modules::send_daily_summary(&pool, &notifier, today).await?;
        }
        Commands::RunAll => {
            tracing::info!("=== 전체 워크플로우 시작 ===");
            run_dart_workflow(&pool, &config, &gate).await?;
            tracing::info!("=== 전체 워크플로우 완료 ===");
        }
        Commands::Daemon => {
            tracing::info!(
                "=== 데몬 모드 시작 (주기: {}분) ===",
                config.daemon.interval_minutes
            );

            let mut interval = tokio::time::interval(config.daemon.interval());
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("종료 신호 수신, 데몬 종료 중...");
                        break;
                    }
                    _ = interval.tick() => {
                        tracing::info!("=== 워크플로우 실행 시작 ===");

                        if let Err(e) = run_dart_workflow(&pool, &config, &gate).await {
                            tracing::error!("DART 워크플로우 실패: {}", e);
                        }

                        tracing::info!(
                            "=== 워크플로우 완료, 다음 실행: {}분 후 ===",
                            config.daemon.interval_minutes
                        );
                    }
                }
            }
        }
    }

    pool.close().await;
    tracing::info!("Company Data Collector 종료");

    Ok(())
}
