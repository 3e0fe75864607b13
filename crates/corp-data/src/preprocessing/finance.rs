//! DART 재무제표 → 회사 재무 요약 변환.
//!
//! 단일회사 전체 재무제표(`fnlttSinglAcntAll`)는 회사마다 계정 ID와 계정명이 조금씩
//! 다릅니다. 항목별로 기본 조건을 먼저 찾고, 없으면 대체 계정명 → 대체 계정 ID →
//! 대체 재무제표구분 순으로 찾습니다.
//!
//! 금액은 원 단위 문자열이며 천원 단위 정수로 저장합니다.

use std::collections::BTreeSet;

use corp_core::{CompanyFinance, CompanyRef, DartFinanceItem};
use rust_decimal::Decimal;

/// 원 단위 금액 문자열을 천원 단위로 변환합니다 (마지막 세 자리 절사).
///
/// 비어 있거나 숫자가 아니면 `None`입니다.
pub fn to_thousands(amount: Option<&str>) -> Option<i64> {
    let cleaned: String = amount?.trim().chars().filter(|&c| c != ',').collect();
    let (cut, _) = cleaned.char_indices().rev().nth(2)?;
    cleaned[..cut].parse().ok()
}

/// 당기/전기/전전기 금액 (천원).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeriodAmounts {
    pub current: Option<i64>,
    pub previous: Option<i64>,
    pub before_previous: Option<i64>,
}

impl PeriodAmounts {
    fn from_row(row: &DartFinanceItem) -> Self {
        Self {
            current: to_thousands(row.thstrm_amount.as_deref()),
            previous: to_thousands(row.frmtrm_amount.as_deref()),
            before_previous: to_thousands(row.bfefrmtrm_amount.as_deref()),
        }
    }

    fn get(&self, period: usize) -> Option<i64> {
        match period {
            0 => self.current,
            1 => self.previous,
            _ => self.before_previous,
        }
    }
}

/// 계정 검색 조건.
///
/// `account_id`가 있으면 계정 ID로, 없으면 계정명으로 찾습니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountQuery<'a> {
    pub account_nm: Option<&'a str>,
    pub account_id: Option<&'a str>,
    pub sj_div: Option<&'a str>,
    pub alt_account_nms: &'a [&'a str],
    pub alt_account_ids: &'a [&'a str],
    pub alt_sj_divs: &'a [&'a str],
}

fn find_first(
    rows: &[DartFinanceItem],
    account_nm: Option<&str>,
    account_id: Option<&str>,
    sj_div: Option<&str>,
) -> Option<PeriodAmounts> {
    rows.iter()
        .find(|row| {
            let account_matches = match account_id {
                Some(id) => row.account_id == id,
                None => account_nm.is_some_and(|nm| row.account_nm == nm),
            };
            account_matches && sj_div.map_or(true, |sj| row.sj_div == sj)
        })
        .map(PeriodAmounts::from_row)
}

/// 조건에 맞는 첫 행의 금액을 찾습니다.
///
/// 기본 조건에 맞는 행은 금액이 비어 있어도 그대로 반환합니다.
/// 대체 조건은 당기 금액이 있는 경우에만 채택합니다.
pub fn resolve(rows: &[DartFinanceItem], query: &AccountQuery<'_>) -> PeriodAmounts {
    if let Some(found) = find_first(rows, query.account_nm, query.account_id, query.sj_div) {
        return found;
    }

    let accept = |found: Option<PeriodAmounts>| found.filter(|a| a.current.is_some());

    let alternates = query
        .alt_account_nms
        .iter()
        .map(|nm| (Some(*nm), None, query.sj_div))
        .chain(
            query
                .alt_account_ids
                .iter()
                .map(|id| (None, Some(*id), query.sj_div)),
        )
        .chain(
            query
                .alt_sj_divs
                .iter()
                .map(|sj| (query.account_nm, query.account_id, Some(*sj))),
        );

    for (nm, id, sj) in alternates {
        if let Some(found) = accept(find_first(rows, nm, id, sj)) {
            return found;
        }
    }

    PeriodAmounts::default()
}

/// 재무 요약 항목.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinanceField {
    Sales,
    SalesCost,
    OperatingProfit,
    NetProfit,
    CapitalAmount,
    CapitalTotal,
    DebtTotal,
    AssetsTotal,
    ComprehensiveIncome,
    TangibleAsset,
    IntangibleAsset,
    CurrentAsset,
    NonCurrentAsset,
    CurrentLiabilities,
    InventoriesAsset,
    AccountsPayable,
    TradeReceivable,
    ShortTermLoan,
    AdminExpenses,
}

impl FinanceField {
    fn apply(self, record: &mut CompanyFinance, value: Option<i64>) {
        let slot = match self {
            Self::Sales => &mut record.sales,
            Self::SalesCost => &mut record.sales_cost,
            Self::OperatingProfit => &mut record.operating_profit,
            Self::NetProfit => &mut record.net_profit,
            Self::CapitalAmount => &mut record.capital_amount,
            Self::CapitalTotal => &mut record.capital_total,
            Self::DebtTotal => &mut record.debt_total,
            Self::AssetsTotal => &mut record.assets_total,
            Self::ComprehensiveIncome => &mut record.comprehensive_income,
            Self::TangibleAsset => &mut record.tangible_asset,
            Self::IntangibleAsset => &mut record.intangible_asset,
            Self::CurrentAsset => &mut record.current_asset,
            Self::NonCurrentAsset => &mut record.non_current_asset,
            Self::CurrentLiabilities => &mut record.current_liabilities,
            Self::InventoriesAsset => &mut record.inventories_asset,
            Self::AccountsPayable => &mut record.accounts_payable,
            Self::TradeReceivable => &mut record.trade_receivable,
            Self::ShortTermLoan => &mut record.short_term_loan,
            Self::AdminExpenses => &mut record.admin_expenses,
        };
        *slot = value;
    }
}

const fn by_id(id: &'static str) -> AccountQuery<'static> {
    AccountQuery {
        account_nm: None,
        account_id: Some(id),
        sj_div: None,
        alt_account_nms: &[],
        alt_account_ids: &[],
        alt_sj_divs: &[],
    }
}

const fn bs_by_name(nm: &'static str) -> AccountQuery<'static> {
    AccountQuery {
        account_nm: Some(nm),
        account_id: None,
        sj_div: Some("BS"),
        alt_account_nms: &[],
        alt_account_ids: &[],
        alt_sj_divs: &[],
    }
}

/// 항목별 계정 검색 조건.
pub const FIELD_SPECS: &[(FinanceField, AccountQuery<'static>)] = &[
    (
        FinanceField::Sales,
        AccountQuery {
            alt_account_nms: &["매출액"],
            ..by_id("ifrs-full_Revenue")
        },
    ),
    (
        FinanceField::SalesCost,
        AccountQuery {
            alt_account_nms: &["매출원가"],
            ..by_id("ifrs-full_CostOfSales")
        },
    ),
    (
        FinanceField::OperatingProfit,
        AccountQuery {
            alt_account_nms: &["영업이익"],
            ..by_id("dart_OperatingIncomeLoss")
        },
    ),
    (
        FinanceField::NetProfit,
        AccountQuery {
            sj_div: Some("CIS"),
            alt_account_nms: &["당기순이익", "당기순이익(손실)"],
            alt_sj_divs: &["IS"],
            ..by_id("ifrs-full_ProfitLoss")
        },
    ),
    (FinanceField::CapitalAmount, bs_by_name("자본금")),
    (FinanceField::CapitalTotal, bs_by_name("자본총계")),
    (FinanceField::DebtTotal, bs_by_name("부채총계")),
    (FinanceField::AssetsTotal, bs_by_name("자산총계")),
    (
        FinanceField::ComprehensiveIncome,
        AccountQuery {
            sj_div: Some("CIS"),
            alt_account_nms: &["총포괄손익"],
            alt_account_ids: &["ifrs_ComprehensiveIncome"],
            ..by_id("ifrs-full_ComprehensiveIncome")
        },
    ),
    (
        FinanceField::TangibleAsset,
        AccountQuery {
            alt_account_nms: &["유형자산"],
            alt_account_ids: &["ifrs_PropertyPlantAndEquipment"],
            ..by_id("ifrs-full_PropertyPlantAndEquipment")
        },
    ),
    (
        FinanceField::IntangibleAsset,
        AccountQuery {
            alt_account_nms: &["무형자산"],
            alt_account_ids: &["dart_OtherIntangibleAssetsGross", "dart_GoodwillGross"],
            ..by_id("ifrs-full_IntangibleAssetsOtherThanGoodwill")
        },
    ),
    (
        FinanceField::CurrentAsset,
        AccountQuery {
            alt_account_nms: &["유동자산"],
            alt_account_ids: &["ifrs_CurrentAssets"],
            ..by_id("ifrs-full_CurrentAssets")
        },
    ),
    (
        FinanceField::NonCurrentAsset,
        AccountQuery {
            alt_account_nms: &["비유동자산"],
            alt_account_ids: &["ifrs_NonCurrentAssets"],
            ..by_id("ifrs-full_NoncurrentAssets")
        },
    ),
    (
        FinanceField::CurrentLiabilities,
        AccountQuery {
            alt_account_nms: &["유동부채"],
            alt_account_ids: &["ifrs_CurrentLiabilities"],
            ..by_id("ifrs-full_CurrentLiabilities")
        },
    ),
    (
        FinanceField::InventoriesAsset,
        AccountQuery {
            alt_account_nms: &["재고자산"],
            alt_account_ids: &["ifrs_Inventories"],
            ..by_id("ifrs-full_Inventories")
        },
    ),
    (
        FinanceField::AccountsPayable,
        AccountQuery {
            sj_div: Some("BS"),
            alt_account_nms: &["매입채무", "단기매입채무"],
            alt_account_ids: &["dart_ShortTermTradePayables"],
            ..by_id("ifrs-full_TradeAndOtherCurrentPayables")
        },
    ),
    (
        FinanceField::TradeReceivable,
        AccountQuery {
            sj_div: Some("BS"),
            alt_account_nms: &["매출채권", "단기매출채권"],
            alt_account_ids: &["dart_ShortTermTradeReceivable"],
            ..by_id("ifrs-full_TradeAndOtherCurrentReceivables")
        },
    ),
    (
        FinanceField::ShortTermLoan,
        AccountQuery {
            sj_div: Some("BS"),
            alt_account_nms: &["단기차입금"],
            ..by_id("ifrs-full_ShorttermBorrowings")
        },
    ),
    (
        FinanceField::AdminExpenses,
        by_id("dart_TotalSellingGeneralAdministrativeExpenses"),
    ),
];

fn debt_ratio(debt_total: Option<i64>, capital_total: Option<i64>) -> Option<Decimal> {
    let ratio = Decimal::from(debt_total?).checked_div(Decimal::from(capital_total?))?;
    Some((ratio * Decimal::ONE_HUNDRED).round_dp(4))
}

fn fill_derived(record: &mut CompanyFinance) {
    record.debt_ratio = debt_ratio(record.debt_total, record.capital_total);
    record.net_worth = record
        .assets_total
        .zip(record.debt_total)
        .and_then(|(a, d)| a.checked_sub(d));
    record.quick_asset = record
        .current_asset
        .zip(record.inventories_asset)
        .and_then(|(c, i)| c.checked_sub(i));
    record.net_working_capital = record
        .current_asset
        .zip(record.current_liabilities)
        .and_then(|(c, l)| c.checked_sub(l));
}

/// 한 회사의 재무제표 라인을 (사업연도, 재무제표구분)별 당기/전기/전전기 요약으로 변환합니다.
///
/// 값이 하나도 없는 기간은 만들지 않습니다.
pub fn build_company_finance(company: &CompanyRef, rows: &[DartFinanceItem]) -> Vec<CompanyFinance> {
    let groups: BTreeSet<(&str, &str)> = rows
        .iter()
        .map(|r| (r.bsns_year.as_str(), r.fs_div.as_str()))
        .collect();

    let mut records = Vec::new();

    for (bsns_year, fs_div) in groups {
        let Ok(year) = bsns_year.trim().parse::<i32>() else {
            tracing::warn!(company_id = company.company_id, bsns_year, "사업연도 형식 오류");
            continue;
        };

        let group: Vec<DartFinanceItem> = rows
            .iter()
            .filter(|r| r.bsns_year == bsns_year && r.fs_div == fs_div)
            .cloned()
            .collect();
        let fs_nm = group.first().map(|r| r.fs_nm.clone()).unwrap_or_default();

        let resolved: Vec<(FinanceField, PeriodAmounts)> = FIELD_SPECS
            .iter()
            .map(|(field, query)| (*field, resolve(&group, query)))
            .collect();

        for period in 0..3 {
            let mut record = CompanyFinance {
                company_id: company.company_id,
                biz_num: company.biz_num.clone(),
                corporation_num: company.corporation_num.clone(),
                illu_id: company.illu_id.clone(),
                acct_dt: (year - period as i32).to_string(),
                financial_decide_code: fs_div.to_string(),
                financial_decide_desc: fs_nm.clone(),
                ..Default::default()
            };

            for (field, amounts) in &resolved {
                field.apply(&mut record, amounts.get(period));
            }
            fill_derived(&mut record);

            if record.has_values() {
                records.push(record);
            }
        }
    }

    tracing::debug!(
        company_id = company.company_id,
        rows = rows.len(),
        records = records.len(),
        "재무 요약 생성"
    );
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(sj_div: &str, account_id: &str, account_nm: &str, amounts: [&str; 3]) -> DartFinanceItem {
        DartFinanceItem {
            bsns_year: "2023".to_string(),
            fs_div: "CFS".to_string(),
            fs_nm: "연결재무제표".to_string(),
            sj_div: sj_div.to_string(),
            account_id: account_id.to_string(),
            account_nm: account_nm.to_string(),
            thstrm_amount: Some(amounts[0].to_string()).filter(|s| !s.is_empty()),
            frmtrm_amount: Some(amounts[1].to_string()).filter(|s| !s.is_empty()),
            bfefrmtrm_amount: Some(amounts[2].to_string()).filter(|s| !s.is_empty()),
            ..Default::default()
        }
    }

    fn company() -> CompanyRef {
        CompanyRef {
            company_id: 7,
            corp_code: Some("00126380".to_string()),
            biz_num: Some("1248100998".to_string()),
            corporation_num: Some("1301110006246".to_string()),
            illu_id: None,
        }
    }

    #[test]
    fn test_to_thousands() {
        assert_eq!(to_thousands(Some("1234567000")), Some(1234567));
        assert_eq!(to_thousands(Some("1,234,567")), Some(1234));
        assert_eq!(to_thousands(Some("-5000")), Some(-5));
        assert_eq!(to_thousands(Some("999")), None);
        assert_eq!(to_thousands(Some("-500")), None);
        assert_eq!(to_thousands(Some("")), None);
        assert_eq!(to_thousands(Some("abc000")), None);
        assert_eq!(to_thousands(None), None);
    }

    #[test]
    fn test_primary_match_returns_even_if_empty() {
        let rows = vec![
            row("IS", "ifrs-full_Revenue", "수익(매출액)", ["", "", ""]),
            row("IS", "x", "매출액", ["1000000", "", ""]),
        ];
        let query = AccountQuery {
            alt_account_nms: &["매출액"],
            ..by_id("ifrs-full_Revenue")
        };
        assert_eq!(resolve(&rows, &query), PeriodAmounts::default());
    }

    #[test]
    fn test_alternate_name_then_id_then_sj_div() {
        let rows = vec![
            row("IS", "-표준계정코드 미사용-", "당기순이익(손실)", ["", "", ""]),
            row("IS", "ifrs-full_ProfitLoss", "당기순이익", ["3000000", "2000000", "1000000"]),
        ];
        let query = FIELD_SPECS
            .iter()
            .find(|(f, _)| *f == FinanceField::NetProfit)
            .map(|(_, q)| *q)
            .unwrap();

        // CIS에서 찾지 못하면 IS로 넘어갑니다.
        assert_eq!(
            resolve(&rows, &query),
            PeriodAmounts {
                current: Some(3000),
                previous: Some(2000),
                before_previous: Some(1000),
            }
        );
    }

    #[test]
    fn test_alternate_id() {
        let rows = vec![row("BS", "ifrs_CurrentAssets", "유동 자산", ["5000000", "", ""])];
        let query = AccountQuery {
            alt_account_nms: &["유동자산"],
            alt_account_ids: &["ifrs_CurrentAssets"],
            ..by_id("ifrs-full_CurrentAssets")
        };
        assert_eq!(resolve(&rows, &query).current, Some(5000));
    }

    #[test]
    fn test_exhausted_query() {
        let rows = vec![row("BS", "a", "b", ["1000", "", ""])];
        assert_eq!(resolve(&rows, &bs_by_name("자본금")), PeriodAmounts::default());
    }

    #[test]
    fn test_build_company_finance() {
        let rows = vec![
            row("BS", "ifrs-full_Assets", "자산총계", ["500000000", "400000000", ""]),
            row("BS", "ifrs-full_Liabilities", "부채총계", ["200000000", "100000000", ""]),
            row("BS", "ifrs-full_Equity", "자본총계", ["300000000", "300000000", ""]),
            row("BS", "ifrs-full_CurrentAssets", "유동자산", ["150000000", "", ""]),
            row("BS", "ifrs-full_Inventories", "재고자산", ["50000000", "", ""]),
            row("BS", "ifrs-full_CurrentLiabilities", "유동부채", ["70000000", "", ""]),
        ];

        let records = build_company_finance(&company(), &rows);
        // 전전기는 값이 없어 생성되지 않습니다.
        assert_eq!(records.len(), 2);

        let current = &records[0];
        assert_eq!(current.acct_dt, "2023");
        assert_eq!(current.financial_decide_code, "CFS");
        assert_eq!(current.financial_decide_desc, "연결재무제표");
        assert_eq!(current.assets_total, Some(500000));
        assert_eq!(current.debt_ratio, Some(dec!(66.6667)));
        assert_eq!(current.net_worth, Some(300000));
        assert_eq!(current.quick_asset, Some(100000));
        assert_eq!(current.net_working_capital, Some(80000));

        let previous = &records[1];
        assert_eq!(previous.acct_dt, "2022");
        assert_eq!(previous.debt_ratio, Some(dec!(33.3333)));
        assert_eq!(previous.quick_asset, None);
    }

    #[test]
    fn test_zero_capital_has_no_ratio() {
        assert_eq!(debt_ratio(Some(100), Some(0)), None);
        assert_eq!(debt_ratio(None, Some(10)), None);
    }

    #[test]
    fn test_groups_by_year_and_fs_div() {
        let mut separate = row("BS", "x", "자본금", ["1000000", "", ""]);
        separate.fs_div = "OFS".to_string();
        separate.fs_nm = "재무제표".to_string();
        let mut older = row("BS", "x", "자본금", ["2000000", "", ""]);
        older.bsns_year = "2020".to_string();

        let records = build_company_finance(&company(), &[separate, older]);
        let keys: Vec<_> = records
            .iter()
            .map(|r| (r.acct_dt.as_str(), r.financial_decide_code.as_str(), r.capital_amount))
            .collect();
        assert_eq!(
            keys,
            vec![("2020", "CFS", Some(2000)), ("2023", "OFS", Some(1000))]
        );
    }
}
