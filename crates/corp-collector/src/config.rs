//! 환경변수 기반 설정 모듈.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::CollectorError;
use crate::Result;

/// Collector 전체 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// 데이터베이스 URL
    pub database_url: String,
    pub dart: DartConfig,
    pub ocr: OcrConfig,
    pub venture: VentureConfig,
    pub news: NewsConfig,
    /// 목록 캐시, 실패 목록 파일 위치
    pub data_dir: PathBuf,
    pub daemon: DaemonConfig,
}

/// DART OpenAPI 설정
#[derive(Debug, Clone)]
pub struct DartConfig {
    /// `crtfc_key` (DART 작업에서만 필수)
    pub api_key: Option<SecretString>,
    /// 일일 호출 한도
    pub daily_limit: u32,
    pub info: DartJobConfig,
    pub finance: DartJobConfig,
    pub notice: DartJobConfig,
    /// 공시검색 시작일 (YYYYMMDD)
    pub notice_begin_date: String,
    /// 공시검색 페이지 크기
    pub notice_page_count: u32,
    /// 기업개황 저장 배치 크기
    pub info_batch_size: usize,
}

/// DART 작업별 동시성/딜레이
#[derive(Debug, Clone)]
pub struct DartJobConfig {
    pub concurrency: usize,
    pub request_delay_ms: u64,
}

/// OCR 서버 설정
#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub host: String,
    pub port: u16,
}

/// 벤처기업 상세정보 수집 설정
#[derive(Debug, Clone)]
pub struct VentureConfig {
    /// 목록을 나눠 처리할 워커 수
    pub workers: usize,
    /// 캡차 인식 최대 시도 횟수
    pub captcha_attempts: u32,
    /// 실패 항목 재처리 횟수
    pub item_passes: u32,
    /// 저장 배치 크기
    pub batch_size: usize,
    pub request_delay_ms: u64,
}

/// 뉴스 수집 설정
#[derive(Debug, Clone)]
pub struct NewsConfig {
    /// 수집할 포털 이름
    pub portals: Vec<String>,
    /// 네이버 세션 주기 (초)
    pub naver_interval_secs: u64,
    /// 다음 세션 주기 (초)
    pub daum_interval_secs: u64,
    /// 그 밖의 포털 세션 주기 (초)
    pub interval_secs: u64,
    /// 세션 실패 후 대기 (초)
    pub retry_delay_secs: u64,
    /// 수집할 네이버 섹션 (sid1)
    pub naver_categories: Vec<String>,
}

/// 데몬 모드 설정
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// 워크플로우 실행 주기 (분 단위)
    pub interval_minutes: u64,
}

impl CollectorConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL").map_err(|_| {
            CollectorError::Config("DATABASE_URL 환경변수가 설정되지 않았습니다".to_string())
        })?;

        Ok(Self {
            database_url,
            dart: DartConfig {
                api_key: std::env::var("DART_API_KEY")
                    .ok()
                    .filter(|k| !k.is_empty())
                    .map(SecretString::from),
                daily_limit: env_var_parse("DART_DAILY_LIMIT", 19_900),
                info: DartJobConfig {
                    concurrency: env_var_parse("DART_INFO_CONCURRENCY", 5),
                    request_delay_ms: env_var_parse("DART_INFO_DELAY_MS", 1_500),
                },
                finance: DartJobConfig {
                    concurrency: env_var_parse("DART_FINANCE_CONCURRENCY", 10),
                    request_delay_ms: env_var_parse("DART_FINANCE_DELAY_MS", 25_000),
                },
                notice: DartJobConfig {
                    concurrency: env_var_parse("DART_NOTICE_CONCURRENCY", 5),
                    request_delay_ms: env_var_parse("DART_NOTICE_DELAY_MS", 2_000),
                },
                notice_begin_date: std::env::var("DART_NOTICE_BEGIN_DATE")
                    .unwrap_or_else(|_| "19000101".to_string()),
                notice_page_count: env_var_parse("DART_NOTICE_PAGE_COUNT", 100),
                info_batch_size: env_var_parse("DART_INFO_BATCH_SIZE", 100),
            },
            ocr: OcrConfig {
                host: std::env::var("OCR_HOST").unwrap_or_else(|_| "localhost".to_string()),
                port: env_var_parse("OCR_PORT", 8080),
            },
            venture: VentureConfig {
                workers: env_var_parse("VNTR_WORKERS", 4),
                captcha_attempts: env_var_parse("VNTR_CAPTCHA_ATTEMPTS", 3),
                item_passes: env_var_parse("VNTR_ITEM_PASSES", 2),
                batch_size: env_var_parse("VNTR_BATCH_SIZE", 50),
                request_delay_ms: env_var_parse("VNTR_DELAY_MS", 1_000),
            },
            news: NewsConfig {
                portals: env_var_list("NEWS_PORTALS", corp_data::provider::PORTAL_NAMES),
                naver_interval_secs: env_var_parse("NEWS_NAVER_INTERVAL_SECS", 120),
                daum_interval_secs: env_var_parse("NEWS_DAUM_INTERVAL_SECS", 10),
                interval_secs: env_var_parse("NEWS_INTERVAL_SECS", 7_200),
                retry_delay_secs: env_var_parse("NEWS_RETRY_DELAY_SECS", 5),
                naver_categories: env_var_list(
                    "NEWS_NAVER_CATEGORIES",
                    corp_data::provider::NAVER_CATEGORIES,
                ),
            },
            data_dir: PathBuf::from(std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string())),
            daemon: DaemonConfig {
                interval_minutes: env_var_parse("DAEMON_INTERVAL_MINUTES", 1_440),
            },
        })
    }
}

impl DartConfig {
    /// DART 작업용 API 키. 없으면 설정 에러입니다.
    pub fn require_api_key(&self) -> Result<SecretString> {
        self.api_key.clone().ok_or_else(|| {
            CollectorError::Config("DART_API_KEY 환경변수가 설정되지 않았습니다".to_string())
        })
    }
}

impl DartJobConfig {
    /// API 요청 간 딜레이를 Duration으로 반환
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl OcrConfig {
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}/api/v1/trocr", self.host, self.port)
    }
}

impl VentureConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl NewsConfig {
    /// 포털별 세션 주기.
    pub fn interval_for(&self, portal: &str) -> Duration {
        let secs = match portal {
            "naver" => self.naver_interval_secs,
            "daum" => self.daum_interval_secs,
            _ => self.interval_secs,
        };
        Duration::from_secs(secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

impl DaemonConfig {
    /// 워크플로우 실행 주기를 Duration으로 반환
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes * 60)
    }
}

/// 환경변수에서 값을 파싱 (실패 시 기본값 사용)
fn env_var_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// 쉼표로 구분된 목록 (비어 있으면 기본값)
fn env_var_list(key: &str, default: &[&str]) -> Vec<String> {
    let parsed: Vec<String> = std::env::var(key)
        .map(|v| parse_list(&v))
        .unwrap_or_default();

    if parsed.is_empty() {
        default.iter().map(|s| s.to_string()).collect()
    } else {
        parsed
    }
}

/// 쉼표로 구분된 문자열을 공백 제거 후 나눕니다.
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
