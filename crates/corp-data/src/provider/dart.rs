//! DART OpenAPI 클라이언트.
//!
//! 금융감독원 전자공시(DART) OpenAPI에서 기업 데이터를 수집합니다.
//!
//! # 지원 API
//!
//! - `corpCode.xml`: 공시대상회사 고유번호 (zip 압축 XML)
//! - `company.json`: 기업개황
//! - `fnlttSinglAcntAll.json`: 단일회사 전체 재무제표
//! - `list.json`: 공시검색
//!
//! # 응답 상태 코드
//!
//! 모든 응답은 HTTP 200과 함께 본문의 `status`로 결과를 알립니다.
//! `000`은 정상, `013`은 조회 데이터 없음이며, 한도 초과/접근 제한 코드는
//! 자정까지 기다린 뒤 재시도해야 합니다.
//!
//! ```rust,ignore
//! let client = DartClient::new(SecretString::from(api_key))?;
//! let response = client.fetch_company("00126380").await?;
//! if let Some(info) = response.into_data()? {
//!     println!("{} ({})", info.corp_name, info.stock_code);
//! }
//! ```

use std::io::{Cursor, Read};
use std::time::Duration;

use corp_core::{CorpCode, DartCompanyInfo, DartFinanceItem, DartNotice, FsDiv, ReportCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{DataError, Result};

/// DART OpenAPI 기본 URL.
pub const DART_API_BASE_URL: &str = "https://opendart.fss.or.kr/api";

/// 한도 초과/접근 제한 상태 코드.
///
/// - 010: 등록되지 않은 키
/// - 011: 사용할 수 없는 키
/// - 012: 접근할 수 없는 IP
/// - 020: 요청 제한 초과
/// - 021: 조회 가능한 회사 개수 초과
/// - 800: 시스템 점검
/// - 901: 개인정보 보유기간 만료 키
pub const QUOTA_STATUS_CODES: [&str; 7] = ["010", "011", "012", "020", "021", "800", "901"];

/// 응답 상태 분류.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DartStatus {
    /// 000
    Ok,
    /// 013 조회된 데이터 없음
    NoData,
    /// 자정까지 대기 후 재시도
    QuotaOrAccess,
    /// 그 외 오류
    Other,
}

impl DartStatus {
    pub fn classify(status: &str) -> Self {
        match status {
            "000" => Self::Ok,
            "013" => Self::NoData,
            s if QUOTA_STATUS_CODES.contains(&s) => Self::QuotaOrAccess,
            _ => Self::Other,
        }
    }
}

/// 상태 코드와 본문을 함께 담은 응답.
#[derive(Debug, Clone)]
pub struct DartResponse<T> {
    pub status: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T> DartResponse<T> {
    pub fn kind(&self) -> DartStatus {
        DartStatus::classify(&self.status)
    }

    /// 상태 코드를 오류로 변환합니다.
    ///
    /// 정상은 `Some`, 데이터 없음은 `None`, 나머지는 오류입니다.
    pub fn into_data(self) -> Result<Option<T>> {
        match self.kind() {
            DartStatus::Ok => Ok(self.data),
            DartStatus::NoData => Ok(None),
            DartStatus::QuotaOrAccess => Err(DataError::QuotaExceeded {
                status: self.status,
                message: self.message,
            }),
            DartStatus::Other => Err(DataError::Api {
                status: self.status,
                message: self.message,
            }),
        }
    }
}

/// 공시검색 한 페이지.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoticePage {
    #[serde(default)]
    pub page_no: u32,
    #[serde(default)]
    pub page_count: u32,
    #[serde(default)]
    pub total_count: u32,
    #[serde(default)]
    pub total_page: u32,
    #[serde(default)]
    pub list: Vec<DartNotice>,
}

/// 공시검색 조건.
#[derive(Debug, Clone)]
pub struct NoticeQuery {
    pub corp_code: String,
    /// 시작일 (YYYYMMDD)
    pub bgn_de: String,
    /// 종료일 (YYYYMMDD)
    pub end_de: String,
    pub page_count: u32,
}

/// DART OpenAPI 클라이언트.
#[derive(Clone)]
pub struct DartClient {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl DartClient {
    pub fn new(api_key: SecretString) -> Result<Self> {
        Self::with_base_url(api_key, DART_API_BASE_URL)
    }

    /// 기본 URL을 지정해 생성합니다 (테스트용 mock 서버 등).
    pub fn with_base_url(api_key: SecretString, base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<reqwest::Response> {
        let url = format!("{}/{}", self.base_url, path);

        tracing::debug!(url = %url, ?params, "DART API 요청");

        let response = self
            .client
            .get(&url)
            .query(&[("crtfc_key", self.api_key.expose_secret())])
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DataError::HttpStatus {
                status: response.status().as_u16(),
                url,
            });
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(&str, &str)]) -> Result<T> {
        let body = self.get(path, params).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// 기업개황 조회.
    pub async fn fetch_company(&self, corp_code: &str) -> Result<DartResponse<DartCompanyInfo>> {
        #[derive(Deserialize)]
        struct RawCompany {
            status: String,
            #[serde(default)]
            message: String,
            #[serde(flatten)]
            info: DartCompanyInfo,
        }

        let raw: RawCompany = self
            .get_json("company.json", &[("corp_code", corp_code)])
            .await?;

        let data = (raw.status == "000").then_some(raw.info);
        Ok(DartResponse {
            status: raw.status,
            message: raw.message,
            data,
        })
    }

    /// 단일회사 전체 재무제표 조회.
    ///
    /// 응답 항목에 없는 `fs_div`, `fs_nm`, `corp_code`는 요청 값으로 채웁니다.
    pub async fn fetch_finance(
        &self,
        corp_code: &str,
        bsns_year: &str,
        reprt_code: ReportCode,
        fs_div: FsDiv,
    ) -> Result<DartResponse<Vec<DartFinanceItem>>> {
        #[derive(Deserialize)]
        struct RawFinance {
            status: String,
            #[serde(default)]
            message: String,
            #[serde(default)]
            list: Vec<DartFinanceItem>,
        }

        let raw: RawFinance = self
            .get_json(
                "fnlttSinglAcntAll.json",
                &[
                    ("corp_code", corp_code),
                    ("bsns_year", bsns_year),
                    ("reprt_code", reprt_code.code()),
                    ("fs_div", fs_div.code()),
                ],
            )
            .await?;

        let items: Vec<DartFinanceItem> = raw
            .list
            .into_iter()
            .map(|mut item| {
                item.corp_code = corp_code.to_string();
                item.fs_div = fs_div.code().to_string();
                item.fs_nm = fs_div.statement_name().to_string();
                if item.bsns_year.is_empty() {
                    item.bsns_year = bsns_year.to_string();
                }
                if item.reprt_code.is_empty() {
                    item.reprt_code = reprt_code.code().to_string();
                }
                item
            })
            .collect();

        tracing::debug!(
            corp_code,
            bsns_year,
            reprt_code = %reprt_code,
            fs_div = %fs_div,
            status = %raw.status,
            count = items.len(),
            "재무제표 조회 완료"
        );

        let data = (raw.status == "000").then_some(items);
        Ok(DartResponse {
            status: raw.status,
            message: raw.message,
            data,
        })
    }

    /// 공시검색 한 페이지 조회.
    pub async fn fetch_notice_page(
        &self,
        query: &NoticeQuery,
        page_no: u32,
    ) -> Result<DartResponse<NoticePage>> {
        #[derive(Deserialize)]
        struct RawNotice {
            status: String,
            #[serde(default)]
            message: String,
            #[serde(flatten)]
            page: NoticePage,
        }

        let page_no = page_no.to_string();
        let page_count = query.page_count.to_string();
        let raw: RawNotice = self
            .get_json(
                "list.json",
                &[
                    ("corp_code", query.corp_code.as_str()),
                    ("bgn_de", query.bgn_de.as_str()),
                    ("end_de", query.end_de.as_str()),
                    ("page_no", page_no.as_str()),
                    ("page_count", page_count.as_str()),
                ],
            )
            .await?;

        let data = (raw.status == "000").then_some(raw.page);
        Ok(DartResponse {
            status: raw.status,
            message: raw.message,
            data,
        })
    }

    /// 공시대상회사 고유번호 전체 조회.
    pub async fn fetch_corp_codes(&self) -> Result<Vec<CorpCode>> {
        let bytes = self.get("corpCode.xml", &[]).await?.bytes().await?;

        // 키 오류, 한도 초과 등은 zip 대신 XML 상태 응답으로 옴
        if !bytes.starts_with(b"PK") {
            let text = String::from_utf8_lossy(&bytes);
            let status = extract_xml_tag(&text, "status").unwrap_or_default();
            let message = extract_xml_tag(&text, "message").unwrap_or_else(|| text.to_string());
            return Err(match DartStatus::classify(&status) {
                DartStatus::QuotaOrAccess => DataError::QuotaExceeded { status, message },
                _ => DataError::Api { status, message },
            });
        }

        let codes = parse_corp_code_archive(&bytes)?;
        tracing::info!(count = codes.len(), "고유번호 목록 조회 완료");
        Ok(codes)
    }
}

/// `corpCode.xml` zip 아카이브에서 고유번호 목록을 추출합니다.
pub fn parse_corp_code_archive(bytes: &[u8]) -> Result<Vec<CorpCode>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    if archive.is_empty() {
        return Err(DataError::ArchiveError("빈 압축 파일".to_string()));
    }

    let mut xml = String::new();
    let index = archive.index_for_name("CORPCODE.xml").unwrap_or(0);
    archive.by_index(index)?.read_to_string(&mut xml)?;

    parse_corp_code_xml(&xml)
}

/// `<result><list>...</list></result>` 형식의 고유번호 XML 파싱.
pub fn parse_corp_code_xml(xml: &str) -> Result<Vec<CorpCode>> {
    #[derive(Deserialize)]
    struct RawResult {
        #[serde(rename = "list", default)]
        list: Vec<RawCorp>,
    }

    #[derive(Deserialize)]
    struct RawCorp {
        corp_code: String,
        #[serde(default)]
        corp_name: String,
        #[serde(default)]
        stock_code: Option<String>,
        #[serde(default)]
        modify_date: String,
    }

    let raw: RawResult = quick_xml::de::from_str(xml)?;

    Ok(raw
        .list
        .into_iter()
        .map(|c| CorpCode {
            corp_code: c.corp_code.trim().to_string(),
            corp_name: c.corp_name.trim().to_string(),
            stock_code: c
                .stock_code
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            modify_date: c.modify_date.trim().to_string(),
        })
        .collect())
}

fn extract_xml_tag(text: &str, tag: &str) -> Option<String> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    let start = text.find(&open)? + open.len();
    let end = text[start..].find(&close)? + start;
    Some(text[start..end].trim().to_string())
}
