//! 벤처확인종합관리시스템 클라이언트.
//!
//! 중소벤처기업부 벤처확인 사이트(smes.go.kr/venturein)에서 벤처기업 정보를 수집합니다.
//!
//! ## 수집 흐름
//! 1. `searchVntrCmpAction`: 전체 벤처기업 일련번호와 업종코드 목록
//! 2. `captchaImg.do`: 세션별 캡차 이미지
//! 3. `searchVntrCmpDtls`: 캡차 키를 붙인 상세 페이지 (기본정보, 재무, 투자, 확인서)
//!
//! 캡차는 세션 쿠키에 묶여 있으므로 이미지 조회와 상세 조회는 같은 클라이언트로 해야 합니다.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use corp_core::{
    is_business_number, normalize_registration_number, StatementKind, VentureCertificate,
    VentureCompany, VentureDetail, VentureInvestment, VentureStatement,
};
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;

use crate::error::{DataError, Result};

/// 벤처확인 사이트 기본 URL.
pub const VENTURE_BASE_URL: &str = "https://www.smes.go.kr/venturein/pbntc";

/// 캡차가 통과되었을 때의 상세 페이지 제목.
pub const DETAIL_PAGE_TITLE: &str = "벤처기업 상세정보";

const NO_INVESTMENT_TEXT: &str = "투자정보 내용이 없습니다";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

// 상세 페이지 구조 (탭 순서: 기본정보, 재무정보, 투자정보, 벤처기업확인서)
const TITLE_SELECTOR: &str = "#real_contents > h2";
const COMPANY_CELL_SELECTOR: &str =
    "#real_contents > div > div:nth-of-type(1) > div:nth-of-type(1) > table > tbody > tr > td";
const BALANCE_LEFT_SELECTOR: &str = "#real_contents > div > div:nth-of-type(1) > div:nth-of-type(2) > div > div:nth-of-type(1) > div:nth-of-type(2) > div:nth-of-type(2) > div:nth-of-type(1) > table";
const BALANCE_RIGHT_SELECTOR: &str = "#real_contents > div > div:nth-of-type(1) > div:nth-of-type(2) > div > div:nth-of-type(1) > div:nth-of-type(2) > div:nth-of-type(2) > div:nth-of-type(2) > table";
const INCOME_SELECTOR: &str = "#real_contents > div > div:nth-of-type(1) > div:nth-of-type(2) > div > div:nth-of-type(2) > div:nth-of-type(2) > table";
const INVESTMENT_ROW_SELECTOR: &str = "#real_contents > div > div:nth-of-type(1) > div:nth-of-type(3) > div:nth-of-type(2) > table > tbody > tr";
const CERTIFICATE_ROW_SELECTOR: &str = "#real_contents > div > div:nth-of-type(1) > div:nth-of-type(4) > div:nth-of-type(2) > div:nth-of-type(2) > table > tbody > tr";

/// 벤처기업 일련번호 → 업종코드.
pub type VentureList = BTreeMap<String, Option<String>>;

#[derive(Deserialize)]
struct RawSearch {
    #[serde(rename = "TOTAL_COUNT", default)]
    total_count: Option<serde_json::Value>,
    #[serde(rename = "DATA_LIST", default)]
    data_list: Vec<RawVentureRow>,
}

#[derive(Deserialize)]
struct RawVentureRow {
    vnia_sn: serde_json::Value,
    #[serde(default)]
    indsty_cd: Option<String>,
}

/// 벤처확인 사이트 클라이언트 (쿠키 세션 유지).
#[derive(Clone)]
pub struct VentureClient {
    client: reqwest::Client,
    base_url: String,
}

impl VentureClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(VENTURE_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn search(&self, page_size: u64) -> Result<RawSearch> {
        let url = format!("{}/searchVntrCmpAction", self.base_url);
        let payload = serde_json::json!({
            "cmpNm": "",
            "rprsvNm": "",
            "bizRNo": "",
            "pg": "",
            "pageSize": page_size,
            "areaCd": null,
            "sigunguAreaCd": "",
            "indstyCd": "",
        });

        let response = self
            .client
            .post(&url)
            .header("Accept", "application/json, text/javascript, */*; q=0.01")
            .header("X-Requested-With", "XMLHttpRequest")
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DataError::HttpStatus {
                status: response.status().as_u16(),
                url,
            });
        }

        Ok(response.json().await?)
    }

    /// 전체 벤처기업 수.
    pub async fn fetch_total_count(&self) -> Result<u64> {
        let raw = self.search(1).await?;
        let total = raw
            .total_count
            .as_ref()
            .and_then(json_to_u64)
            .unwrap_or(0);

        tracing::info!(total, "벤처기업 전체 건수 조회");
        Ok(total)
    }

    /// 첫 페이지 `page_size`건의 목록을 조회합니다.
    ///
    /// 전체 목록은 `page_size`에 [`fetch_total_count`](Self::fetch_total_count)를 넘깁니다.
    pub async fn fetch_list(&self, page_size: u64) -> Result<VentureList> {
        let raw = self.search(page_size).await?;
        let list: VentureList = raw
            .data_list
            .into_iter()
            .filter_map(|row| {
                let sn = json_to_string(&row.vnia_sn)?;
                Some((sn, row.indsty_cd.filter(|c| !c.is_empty())))
            })
            .collect();

        tracing::info!(count = list.len(), "벤처기업 목록 조회 완료");
        Ok(list)
    }

    /// 캐시 파일이 있으면 읽고, 없거나 `refresh`이면 새로 조회해 저장합니다.
    pub async fn load_or_fetch_list(&self, cache_path: &Path, refresh: bool) -> Result<VentureList> {
        if !refresh {
            match tokio::fs::read_to_string(cache_path).await {
                Ok(text) => {
                    let list: VentureList = serde_json::from_str(&text)?;
                    tracing::info!(count = list.len(), path = %cache_path.display(), "캐시된 벤처기업 목록 사용");
                    return Ok(list);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::info!(path = %cache_path.display(), "벤처기업 목록 캐시 없음");
                }
                Err(e) => return Err(e.into()),
            }
        }

        let total = self.fetch_total_count().await?;
        if total == 0 {
            return Err(DataError::InvalidData("벤처기업 목록이 비어 있습니다".to_string()));
        }

        let list = self.fetch_list(total).await?;
        if let Some(parent) = cache_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(cache_path, serde_json::to_vec(&list)?).await?;
        Ok(list)
    }

    /// 현재 세션의 캡차 이미지.
    pub async fn fetch_captcha_image(&self) -> Result<Vec<u8>> {
        let url = format!("{}/captchaImg.do", self.base_url);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(DataError::HttpStatus {
                status: response.status().as_u16(),
                url,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// 캡차 키로 상세 페이지를 조회해 파싱합니다.
    pub async fn fetch_detail(
        &self,
        vnia_sn: &str,
        captcha_key: &str,
        indsty_cd: Option<String>,
    ) -> Result<VentureDetail> {
        let url = format!("{}/searchVntrCmpDtls", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("vniaSn", vnia_sn), ("captcha", captcha_key)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DataError::HttpStatus {
                status: response.status().as_u16(),
                url,
            });
        }

        let html = response.text().await?;
        parse_detail(&html, vnia_sn, indsty_cd)
    }
}

fn json_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn json_to_u64(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// 천원 단위 변환.
///
/// 사이트는 원 단위에 쉼표를 붙여 보여주므로 마지막 쉼표 그룹을 버립니다.
/// `"0"`과 빈 문자열은 그대로 둡니다.
///
/// ```
/// use corp_data::provider::venture::preprocess_digit_value;
/// assert_eq!(preprocess_digit_value("1,234,567"), "1234");
/// assert_eq!(preprocess_digit_value("500"), "");
/// assert_eq!(preprocess_digit_value("0"), "0");
/// ```
pub fn preprocess_digit_value(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() || value == "0" {
        return value.to_string();
    }

    let groups: Vec<&str> = value.split(',').collect();
    groups[..groups.len() - 1].concat()
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| DataError::ParseError(format!("{}: {}", css, e)))
}

fn cell_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_line(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .find(|t| !t.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// 상세 페이지 HTML 파싱.
///
/// 제목이 [`DETAIL_PAGE_TITLE`]가 아니면 캡차가 거부된 것으로 봅니다.
/// 사업자등록번호가 비어 있으면 저장할 수 없으므로 오류입니다.
pub fn parse_detail(html: &str, vnia_sn: &str, indsty_cd: Option<String>) -> Result<VentureDetail> {
    let document = Html::parse_document(html);

    let title = document
        .select(&selector(TITLE_SELECTOR)?)
        .next()
        .map(cell_text)
        .unwrap_or_default();
    if title != DETAIL_PAGE_TITLE {
        return Err(DataError::CaptchaRejected(format!(
            "{}: 상세 페이지 제목 불일치 ({:?})",
            vnia_sn, title
        )));
    }

    let company = parse_company(&document, vnia_sn, indsty_cd)?;

    let balance_sheets = parse_statement(
        &document,
        &[BALANCE_LEFT_SELECTOR, BALANCE_RIGHT_SELECTOR],
        StatementKind::BalanceSheet,
    )?;
    let income_statements =
        parse_statement(&document, &[INCOME_SELECTOR], StatementKind::IncomeStatement)?;
    let investments = parse_investments(&document)?;
    let certificates = parse_certificates(&document)?;

    tracing::debug!(
        vnia_sn,
        biz_no = %company.biz_no,
        balance_sheets = balance_sheets.len(),
        income_statements = income_statements.len(),
        investments = investments.len(),
        certificates = certificates.len(),
        "벤처기업 상세정보 파싱 완료"
    );

    Ok(VentureDetail {
        company,
        balance_sheets,
        income_statements,
        investments,
        certificates,
    })
}

fn parse_company(document: &Html, vnia_sn: &str, indsty_cd: Option<String>) -> Result<VentureCompany> {
    let cells: Vec<String> = document
        .select(&selector(COMPANY_CELL_SELECTOR)?)
        .map(cell_text)
        .collect();

    // 기업명, 대표자, 법인번호, 업종, 주생산품, 사업자번호, 전화번호, 주소
    if cells.len() < 8 {
        return Err(DataError::ParseError(format!(
            "{}: 회사 정보 항목 부족 ({}개)",
            vnia_sn,
            cells.len()
        )));
    }

    let biz_no = normalize_registration_number(&cells[5]);
    if biz_no.is_empty() {
        return Err(DataError::InvalidData(format!("{}: 사업자등록번호 없음", vnia_sn)));
    }
    if !is_business_number(&biz_no) {
        tracing::warn!(vnia_sn, biz_no = %biz_no, "사업자등록번호 형식 아님");
    }

    Ok(VentureCompany {
        company_id: None,
        vnia_sn: vnia_sn.to_string(),
        company_nm: cells[0].clone(),
        representative_nm: cells[1].clone(),
        corp_no: normalize_registration_number(&cells[2]),
        indsty_cd,
        indsty_nm: cells[3].clone(),
        main_prod: cells[4].clone(),
        biz_no,
        tel_no: cells[6].clone(),
        address: cells[7].clone(),
    })
}

/// 연도가 열, 계정이 행인 표를 연도별 레코드로 전치합니다.
///
/// 여러 표로 나뉜 경우 연도 머리글은 첫 번째 표의 것을 사용합니다.
fn parse_statement(
    document: &Html,
    table_selectors: &[&str],
    kind: StatementKind,
) -> Result<Vec<VentureStatement>> {
    let header_sel = selector("thead tr")?;
    let header_cell_sel = selector("th, td")?;
    let row_sel = selector("tbody tr")?;
    let label_sel = selector("th")?;
    let value_sel = selector("td")?;

    let mut years: Vec<String> = Vec::new();
    let mut rows: Vec<(String, Vec<String>)> = Vec::new();

    for css in table_selectors {
        let Some(table) = document.select(&selector(css)?).next() else {
            continue;
        };

        if years.is_empty() {
            if let Some(header) = table.select(&header_sel).next() {
                years = header
                    .select(&header_cell_sel)
                    .skip(1)
                    .map(cell_text)
                    .filter(|y| !y.is_empty())
                    .collect();
            }
        }

        for tr in table.select(&row_sel) {
            let mut values: Vec<String> = tr.select(&value_sel).map(cell_text).collect();
            let label = match tr.select(&label_sel).next() {
                Some(th) => cell_text(th),
                None if !values.is_empty() => values.remove(0),
                None => continue,
            };
            rows.push((label, values));
        }
    }

    let statements = years
        .iter()
        .enumerate()
        .map(|(idx, year)| {
            let items: BTreeMap<String, String> = rows
                .iter()
                .map(|(label, values)| {
                    let value = values.get(idx).map(String::as_str).unwrap_or("");
                    (label.clone(), preprocess_digit_value(value))
                })
                .collect();
            VentureStatement {
                kind,
                year: year.clone(),
                items,
            }
        })
        .filter(|s| !s.is_blank())
        .collect();

    Ok(statements)
}

/// 안내 문구 행이거나 일자가 빈 행이면 투자정보 없음으로 봅니다.
fn is_no_investment_cell(first: &str) -> bool {
    NO_INVESTMENT_TEXT.contains(first) || first.contains(NO_INVESTMENT_TEXT)
}

fn parse_investments(document: &Html) -> Result<Vec<VentureInvestment>> {
    let cell_sel = selector("td")?;
    let mut investments = Vec::new();

    for tr in document.select(&selector(INVESTMENT_ROW_SELECTOR)?) {
        let cells: Vec<String> = tr.select(&cell_sel).map(cell_text).collect();
        if cells.len() < 3 || is_no_investment_cell(&cells[0]) {
            return Ok(Vec::new());
        }

        let investment = VentureInvestment {
            invest_date: cells[0].clone(),
            invest_amount: preprocess_digit_value(&cells[1]),
            change_amount: preprocess_digit_value(&cells[2]),
        };
        if !investment.is_blank() {
            investments.push(investment);
        }
    }

    Ok(investments)
}

fn parse_certificates(document: &Html) -> Result<Vec<VentureCertificate>> {
    let cell_sel = selector("td")?;
    let mut certificates = Vec::new();

    for tr in document.select(&selector(CERTIFICATE_ROW_SELECTOR)?) {
        let cells: Vec<ElementRef<'_>> = tr.select(&cell_sel).collect();
        if cells.len() < 7 {
            continue;
        }

        let certificate = VentureCertificate {
            certificate_no: cell_text(cells[0]),
            certificate_type: cell_text(cells[1]),
            announcement_date: cell_text(cells[2]),
            validity_period: cell_text(cells[3]),
            certificate_number: first_line(cells[4]),
            certificate_date: cell_text(cells[5]),
            changes: cell_text(cells[6]),
        };
        if !certificate.is_blank() {
            certificates.push(certificate);
        }
    }

    Ok(certificates)
}
