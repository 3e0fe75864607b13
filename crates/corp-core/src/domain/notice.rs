//! DART 공시검색 (`list.json`) 레코드.

use serde::{Deserialize, Serialize};

/// 공시 한 건.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DartNotice {
    pub corp_cls: String,
    pub corp_name: String,
    pub corp_code: String,
    pub stock_code: String,
    /// 보고서명
    pub report_nm: String,
    /// 접수번호 (고유)
    pub rcept_no: String,
    /// 공시 제출인명
    pub flr_nm: String,
    /// 접수일자 (YYYYMMDD)
    pub rcept_dt: String,
    /// 비고
    pub rm: String,
}
