//! DART 기업개황 레코드.

use serde::{Deserialize, Serialize};

/// `corpCode.xml`의 고유번호 항목.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpCode {
    /// 고유번호 (8자리)
    pub corp_code: String,
    /// 정식 회사명
    pub corp_name: String,
    /// 종목코드 (비상장사는 None)
    pub stock_code: Option<String>,
    /// 최종변경일자 (YYYYMMDD)
    pub modify_date: String,
}

/// companies DB의 수집 대상 회사.
///
/// DART, 벤처확인 레코드를 회사 id로 연결할 때 사용하는 식별자 묶음입니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct CompanyRef {
    pub company_id: i64,
    pub corp_code: Option<String>,
    pub biz_num: Option<String>,
    pub corporation_num: Option<String>,
    pub illu_id: Option<String>,
}

/// DART 기업개황 (`company.json`) 및 보강 정보.
///
/// 응답 필드명 그대로 역직렬화하며, 응답에 없는 필드는 빈 문자열이 됩니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DartCompanyInfo {
    /// companies DB의 회사 id (법인등록번호로 매칭)
    pub company_id: Option<i64>,
    pub corp_code: String,
    pub corp_name: String,
    pub corp_name_eng: String,
    pub stock_name: String,
    pub stock_code: String,
    pub ceo_nm: String,
    /// 법인구분 (Y: 유가, K: 코스닥, N: 코넥스, E: 기타)
    pub corp_cls: String,
    /// 법인등록번호
    pub jurir_no: String,
    /// 사업자등록번호
    pub bizr_no: String,
    pub adres: String,
    pub hm_url: String,
    pub ir_url: String,
    pub phn_no: String,
    pub fax_no: String,
    /// 업종코드 (KSIC)
    pub induty_code: String,
    /// 설립일 (YYYYMMDD)
    pub est_dt: String,
    /// 결산월 (MM)
    pub acc_mt: String,

    pub listing_market_id: Option<i32>,
    pub listing_market_desc: Option<String>,
    pub business_condition_code: Option<String>,
    pub business_condition_desc: Option<String>,
    pub business_category_code: Option<String>,
    pub business_category_desc: Option<String>,
}
