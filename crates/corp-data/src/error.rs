//! 데이터 모듈 오류 타입.

use thiserror::Error;

/// 데이터 소스/저장소 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// HTTP 전송 오류
    #[error("HTTP 요청 실패: {0}")]
    Http(#[from] reqwest::Error),

    /// 200 이외의 HTTP 상태
    #[error("HTTP 상태 오류 {status}: {url}")]
    HttpStatus { status: u16, url: String },

    /// API가 오류 상태 코드를 반환
    #[error("API 오류 [{status}]: {message}")]
    Api { status: String, message: String },

    /// 일일 호출 한도 초과 또는 접근 제한
    #[error("호출 한도 초과 [{status}]: {message}")]
    QuotaExceeded { status: String, message: String },

    /// 캡차 키가 거부됨 (상세 페이지 제목 불일치)
    #[error("캡차 인증 실패: {0}")]
    CaptchaRejected(String),

    /// 파싱 오류
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 직렬화/역직렬화 오류
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// 압축 파일 오류
    #[error("Archive error: {0}")]
    ArchiveError(String),

    /// 쿼리 실행 오류
    #[error("Query error: {0}")]
    QueryError(String),

    /// 레코드를 찾을 수 없음
    #[error("Record not found: {0}")]
    NotFound(String),

    /// 중복 레코드
    #[error("Duplicate record: {0}")]
    DuplicateError(String),

    /// 잘못된 데이터
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// 파일 입출력 오류
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DataError {
    /// 같은 요청을 다시 보내 볼 만한 오류인지 확인합니다.
    pub fn is_retryable(&self) -> bool {
        match self {
            DataError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            DataError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<sqlx::Error> for DataError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DataError::NotFound("Row not found".to_string()),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().unwrap_or_default();
                if code == "23505" {
                    // PostgreSQL 고유 제약 조건 위반
                    DataError::DuplicateError(db_err.message().to_string())
                } else {
                    DataError::QueryError(db_err.message().to_string())
                }
            }
            _ => DataError::QueryError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::SerializationError(err.to_string())
    }
}

impl From<zip::result::ZipError> for DataError {
    fn from(err: zip::result::ZipError) -> Self {
        DataError::ArchiveError(err.to_string())
    }
}

impl From<quick_xml::de::DeError> for DataError {
    fn from(err: quick_xml::de::DeError) -> Self {
        DataError::ParseError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
