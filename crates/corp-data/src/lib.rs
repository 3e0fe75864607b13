//! # Corp Data
//!
//! 외부 데이터 소스 연동, 전처리, 저장을 담당합니다.
//!
//! - `provider`: DART OpenAPI, OCR 서버, 벤처확인 사이트, 네이버 뉴스
//! - `preprocessing`: 재무 계정 매칭, 기업개황 보강 (KSIC, 상장시장)
//! - `storage`: collections / companies Postgres 저장소

pub mod error;
pub mod preprocessing;
pub mod provider;
pub mod storage;

pub use error::{DataError, Result};
pub use preprocessing::*;
pub use provider::*;
pub use storage::*;
