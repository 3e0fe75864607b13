//! 수집 시스템 공통 에러 타입.

use thiserror::Error;

/// 핵심 에러.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// 문자열 값을 도메인 타입으로 해석하지 못함 (보고서 코드, 로그 형식 등)
    #[error("파싱 에러: {0}")]
    Parse(String),
}
