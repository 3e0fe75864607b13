//! # Corp Core
//!
//! 기업 데이터 수집기 전반에서 사용하는 핵심 도메인 레코드와 유틸리티를 제공합니다.
//!
//! - DART 기업개황, 재무제표, 공시 레코드
//! - 벤처기업 확인 정보 레코드
//! - 뉴스 기사 및 스크래핑 세션 로그
//! - 날짜 문자열 정규화 (KST 기준)
//! - 로깅 인프라

pub mod datetime;
pub mod domain;
pub mod error;
pub mod logging;

pub use domain::*;
pub use error::*;
pub use logging::*;
