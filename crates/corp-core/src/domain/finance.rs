//! DART 재무제표 레코드.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// 보고서 코드 (`reprt_code`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportCode {
    /// 사업보고서
    Annual,
    /// 반기보고서
    HalfYear,
    /// 1분기보고서
    FirstQuarter,
    /// 3분기보고서
    ThirdQuarter,
}

impl ReportCode {
    pub const ALL: [ReportCode; 4] = [
        ReportCode::Annual,
        ReportCode::HalfYear,
        ReportCode::FirstQuarter,
        ReportCode::ThirdQuarter,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Annual => "11011",
            Self::HalfYear => "11012",
            Self::FirstQuarter => "11013",
            Self::ThirdQuarter => "11014",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.code() == code)
    }
}

/// 보고서 코드(`11011`) 또는 약칭(`annual`, `half`, `q1`, `q3`)을 받습니다.
impl FromStr for ReportCode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        if let Some(code) = Self::from_code(value) {
            return Ok(code);
        }
        match value.to_lowercase().as_str() {
            "annual" => Ok(Self::Annual),
            "half" => Ok(Self::HalfYear),
            "q1" => Ok(Self::FirstQuarter),
            "q3" => Ok(Self::ThirdQuarter),
            _ => Err(CoreError::Parse(format!("알 수 없는 보고서 코드: {}", s))),
        }
    }
}

impl std::fmt::Display for ReportCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// 개별/연결 구분 (`fs_div`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FsDiv {
    /// 연결재무제표
    Consolidated,
    /// 재무제표 (별도)
    Separate,
}

impl FsDiv {
    pub const ALL: [FsDiv; 2] = [FsDiv::Consolidated, FsDiv::Separate];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Consolidated => "CFS",
            Self::Separate => "OFS",
        }
    }

    /// 저장용 재무제표명.
    pub fn statement_name(&self) -> &'static str {
        match self {
            Self::Consolidated => "연결재무제표",
            Self::Separate => "별도재무제표",
        }
    }

    /// `CFS`가 아니면 모두 별도재무제표로 취급합니다.
    pub fn from_code(code: &str) -> Self {
        if code.eq_ignore_ascii_case("CFS") {
            Self::Consolidated
        } else {
            Self::Separate
        }
    }
}

impl std::fmt::Display for FsDiv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// 단일회사 전체 재무제표 (`fnlttSinglAcntAll.json`)의 계정 한 줄.
///
/// `corp_code`, `fs_div`, `fs_nm`은 응답에 없으므로 요청 파라미터로 채웁니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
#[serde(default)]
pub struct DartFinanceItem {
    pub rcept_no: String,
    pub corp_code: String,
    pub bsns_year: String,
    pub reprt_code: String,
    pub fs_div: String,
    pub fs_nm: String,
    /// 재무제표구분 (BS, IS, CIS, CF, SCE)
    pub sj_div: String,
    pub sj_nm: String,
    pub account_id: String,
    pub account_nm: String,
    pub account_detail: Option<String>,
    pub thstrm_nm: Option<String>,
    /// 당기금액 (원)
    pub thstrm_amount: Option<String>,
    pub frmtrm_nm: Option<String>,
    /// 전기금액 (원)
    pub frmtrm_amount: Option<String>,
    pub bfefrmtrm_nm: Option<String>,
    /// 전전기금액 (원)
    pub bfefrmtrm_amount: Option<String>,
    pub ord: Option<String>,
    pub currency: Option<String>,
}

/// 회사별 연도/재무제표 구분 단위의 가공 재무 정보.
///
/// 금액은 모두 천원 단위입니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyFinance {
    pub company_id: i64,
    pub biz_num: Option<String>,
    pub corporation_num: Option<String>,
    pub illu_id: Option<String>,
    /// 회계연도 (YYYY)
    pub acct_dt: String,
    /// `fs_div` 코드
    pub financial_decide_code: String,
    /// `fs_div` 명칭
    pub financial_decide_desc: String,

    pub sales: Option<i64>,
    pub sales_cost: Option<i64>,
    pub operating_profit: Option<i64>,
    pub net_profit: Option<i64>,
    pub capital_amount: Option<i64>,
    pub capital_total: Option<i64>,
    pub debt_total: Option<i64>,
    pub assets_total: Option<i64>,
    pub comprehensive_income: Option<i64>,
    pub tangible_asset: Option<i64>,
    pub intangible_asset: Option<i64>,
    pub current_asset: Option<i64>,
    pub non_current_asset: Option<i64>,
    pub current_liabilities: Option<i64>,
    pub inventories_asset: Option<i64>,
    pub accounts_payable: Option<i64>,
    pub trade_receivable: Option<i64>,
    pub short_term_loan: Option<i64>,
    pub admin_expenses: Option<i64>,

    /// 부채비율 (%), 소수점 4자리
    pub debt_ratio: Option<Decimal>,
    /// 순자산 (자산총계 - 부채총계)
    pub net_worth: Option<i64>,
    /// 당좌자산 (유동자산 - 재고자산)
    pub quick_asset: Option<i64>,
    /// 순운전자본 (유동자산 - 유동부채)
    pub net_working_capital: Option<i64>,
}

impl CompanyFinance {
    /// 값이 하나라도 채워져 있는지 확인합니다.
    pub fn has_values(&self) -> bool {
        let amounts = [
            self.sales,
            self.sales_cost,
            self.operating_profit,
            self.net_profit,
            self.capital_amount,
            self.capital_total,
            self.debt_total,
            self.assets_total,
            self.comprehensive_income,
            self.tangible_asset,
            self.intangible_asset,
            self.current_asset,
            self.non_current_asset,
            self.current_liabilities,
            self.inventories_asset,
            self.accounts_payable,
            self.trade_receivable,
            self.short_term_loan,
            self.admin_expenses,
            self.net_worth,
            self.quick_asset,
            self.net_working_capital,
        ];
        amounts.iter().any(Option::is_some) || self.debt_ratio.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_code_roundtrip() {
        assert_eq!(ReportCode::from_code("11013"), Some(ReportCode::FirstQuarter));
        assert_eq!(ReportCode::Annual.to_string(), "11011");
        assert_eq!(ReportCode::from_code("99999"), None);
        assert_eq!("11012".parse::<ReportCode>().unwrap(), ReportCode::HalfYear);
        assert_eq!(" Q3 ".parse::<ReportCode>().unwrap(), ReportCode::ThirdQuarter);
        assert!(matches!(
            "11015".parse::<ReportCode>(),
            Err(CoreError::Parse(_))
        ));
    }

    #[test]
    fn test_fs_div_statement_name() {
        assert_eq!(FsDiv::from_code("CFS").statement_name(), "연결재무제표");
        assert_eq!(FsDiv::from_code("OFS").statement_name(), "별도재무제표");
        assert_eq!(FsDiv::from_code("").statement_name(), "별도재무제표");
    }

    #[test]
    fn test_company_finance_has_values() {
        let mut finance = CompanyFinance::default();
        assert!(!finance.has_values());
        finance.debt_ratio = Some(Decimal::ONE);
        assert!(finance.has_values());
    }

    #[test]
    fn test_finance_item_tolerates_missing_fields() {
        let item: DartFinanceItem = serde_json::from_str(
            r#"{"bsns_year":"2023","sj_div":"BS","account_id":"ifrs-full_Assets","account_nm":"자산총계","thstrm_amount":"1000000"}"#,
        )
        .unwrap();
        assert_eq!(item.sj_div, "BS");
        assert_eq!(item.thstrm_amount.as_deref(), Some("1000000"));
        assert!(item.frmtrm_amount.is_none());
    }
}
