//! Standalone company data collector.
//!
//! 이 crate는 기업 데이터를 수집하는 바이너리와 작업 모듈을 제공합니다:
//! - DART 기업개황, 재무제표, 공시 수집 (일일 호출 한도 관리)
//! - 벤처기업 확인 사이트 상세정보 수집 (캡차 OCR)
//! - 네이버 뉴스 주기 수집과 일일 요약 알림

pub mod captcha;
pub mod config;
pub mod error;
pub mod modules;
pub mod quota;
pub mod stats;

pub use captcha::{CaptchaSolver, CaptchaSource, HttpCaptchaSource};
pub use config::CollectorConfig;
pub use error::{CollectorError, Result};
pub use quota::{DailyQuota, QuotaGate};
pub use stats::{CollectionStats, VentureStatistics};
