//! 벤처기업 확인 정보 레코드.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 벤처기업 기본 정보.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VentureCompany {
    /// companies DB의 회사 id (사업자등록번호로 매칭)
    pub company_id: Option<i64>,
    /// 벤처기업 일련번호
    pub vnia_sn: String,
    pub company_nm: String,
    pub representative_nm: String,
    /// 법인등록번호 (구분자 제거)
    pub corp_no: String,
    /// 업종코드 (목록 API)
    pub indsty_cd: Option<String>,
    pub indsty_nm: String,
    pub main_prod: String,
    /// 사업자등록번호 (구분자 제거)
    pub biz_no: String,
    pub tel_no: String,
    pub address: String,
}

/// 재무제표 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    /// 대차대조표
    BalanceSheet,
    /// 손익계산서
    IncomeStatement,
}

/// 연도별 재무제표. 항목명(한글 계정명) → 천원 단위 금액.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VentureStatement {
    pub kind: StatementKind,
    pub year: String,
    pub items: BTreeMap<String, String>,
}

impl VentureStatement {
    /// 모든 항목 값이 비어 있는지 확인합니다.
    pub fn is_blank(&self) -> bool {
        self.items.values().all(|v| v.is_empty())
    }
}

/// 투자 이력 한 줄.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VentureInvestment {
    pub invest_date: String,
    /// 투자금액 (천원)
    pub invest_amount: String,
    /// 변경사항 잔액 (천원)
    pub change_amount: String,
}

impl VentureInvestment {
    pub fn is_blank(&self) -> bool {
        self.invest_date.is_empty() && self.invest_amount.is_empty() && self.change_amount.is_empty()
    }
}

/// 벤처기업확인서 한 줄.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VentureCertificate {
    pub certificate_no: String,
    pub certificate_type: String,
    pub announcement_date: String,
    pub validity_period: String,
    pub certificate_number: String,
    pub certificate_date: String,
    pub changes: String,
}

impl VentureCertificate {
    pub fn is_blank(&self) -> bool {
        [
            &self.certificate_no,
            &self.certificate_type,
            &self.announcement_date,
            &self.validity_period,
            &self.certificate_number,
            &self.certificate_date,
            &self.changes,
        ]
        .iter()
        .all(|v| v.is_empty())
    }
}

/// 상세 페이지 한 건에서 얻은 전체 정보.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VentureDetail {
    pub company: VentureCompany,
    pub balance_sheets: Vec<VentureStatement>,
    pub income_statements: Vec<VentureStatement>,
    pub investments: Vec<VentureInvestment>,
    pub certificates: Vec<VentureCertificate>,
}

/// 테이블별 저장 건수.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VentureTableCounts {
    pub info: u64,
    pub finance_balance: u64,
    pub finance_income: u64,
    pub investment: u64,
    pub certificate: u64,
}

impl std::ops::AddAssign for VentureTableCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.info += rhs.info;
        self.finance_balance += rhs.finance_balance;
        self.finance_income += rhs.finance_income;
        self.investment += rhs.investment;
        self.certificate += rhs.certificate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_is_blank() {
        let mut items = BTreeMap::new();
        items.insert("유동자산".to_string(), String::new());
        let mut statement = VentureStatement {
            kind: StatementKind::BalanceSheet,
            year: "2023".to_string(),
            items,
        };
        assert!(statement.is_blank());

        statement.items.insert("자본금".to_string(), "100".to_string());
        assert!(!statement.is_blank());
    }

    #[test]
    fn test_table_counts_add_assign() {
        let mut total = VentureTableCounts::default();
        total += VentureTableCounts {
            info: 1,
            finance_balance: 3,
            finance_income: 3,
            investment: 0,
            certificate: 2,
        };
        total += VentureTableCounts {
            info: 1,
            ..Default::default()
        };
        assert_eq!(total.info, 2);
        assert_eq!(total.finance_balance, 3);
        assert_eq!(total.certificate, 2);
    }
}
