//! 기업개황 보강 (상장시장, KSIC 업종).

use std::collections::HashMap;

use corp_core::DartCompanyInfo;
use serde::{Deserialize, Serialize};

/// 법인구분 → (상장시장 id, 이름).
pub fn listing_market(corp_cls: &str) -> Option<(i32, &'static str)> {
    match corp_cls.trim() {
        "Y" => Some((1, "코스피")),
        "K" => Some((2, "코스닥")),
        "N" => Some((3, "코넥스")),
        "E" => Some((9, "대상아님")),
        _ => None,
    }
}

/// KSIC 코드표 한 행 (예: `C26110` / `전자집적회로 제조업`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct KsicEntry {
    pub code_value: String,
    pub code_desc: String,
}

/// 업종 분류 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KsicMatch {
    /// 대분류 문자 (예: `C`)
    pub condition_code: String,
    /// 대분류 이름 (`C00000`의 설명)
    pub condition_desc: Option<String>,
    /// 대분류 문자 + 업종코드 (예: `C2611`)
    pub category_code: String,
    pub category_desc: String,
}

/// KSIC 코드표.
///
/// DART `induty_code`는 대분류 문자 없이 뒤쪽 0이 잘린 형태라서
/// 코드값에서 첫 글자를 떼고 끝의 0을 제거한 값으로 찾습니다.
#[derive(Debug, Clone, Default)]
pub struct KsicTable {
    by_industry: HashMap<String, KsicEntry>,
    by_code: HashMap<String, String>,
}

impl KsicTable {
    pub fn new(entries: Vec<KsicEntry>) -> Self {
        let mut table = Self::default();
        for entry in entries {
            table
                .by_code
                .insert(entry.code_value.clone(), entry.code_desc.clone());

            // 대분류 행(`C00000`)은 업종코드가 비므로 대분류 이름으로만 씁니다.
            let industry_code = entry
                .code_value
                .get(1..)
                .unwrap_or_default()
                .trim_end_matches('0')
                .to_string();
            if !industry_code.is_empty() {
                table.by_industry.entry(industry_code).or_insert(entry);
            }
        }
        table
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    pub fn lookup(&self, induty_code: &str) -> Option<KsicMatch> {
        let entry = self.by_industry.get(induty_code.trim())?;
        let letter = entry.code_value.get(..1)?;
        let industry_code = entry.code_value.get(1..)?.trim_end_matches('0');

        Some(KsicMatch {
            condition_code: letter.to_string(),
            condition_desc: self.by_code.get(&format!("{}00000", letter)).cloned(),
            category_code: format!("{}{}", letter, industry_code),
            category_desc: entry.code_desc.clone(),
        })
    }
}

/// 상장시장과 업종 정보를 채웁니다.
pub fn enrich(mut info: DartCompanyInfo, ksic: &KsicTable) -> DartCompanyInfo {
    if let Some((id, desc)) = listing_market(&info.corp_cls) {
        info.listing_market_id = Some(id);
        info.listing_market_desc = Some(desc.to_string());
    }

    match ksic.lookup(&info.induty_code) {
        Some(found) => {
            info.business_condition_code = Some(found.condition_code);
            info.business_condition_desc = found.condition_desc;
            info.business_category_code = Some(found.category_code);
            info.business_category_desc = Some(found.category_desc);
        }
        None if !info.induty_code.is_empty() => {
            tracing::debug!(corp_code = %info.corp_code, induty_code = %info.induty_code, "KSIC 코드 없음");
        }
        None => {}
    }

    info
}
