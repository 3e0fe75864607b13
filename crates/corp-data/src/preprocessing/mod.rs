//! 수집 데이터 전처리.
//!
//! - `finance`: DART 재무제표 라인을 회사별 재무 요약으로 변환
//! - `company_info`: 기업개황에 상장시장과 KSIC 업종 정보를 보강

pub mod company_info;
pub mod finance;

pub use company_info::{enrich, listing_market, KsicEntry, KsicMatch, KsicTable};
pub use finance::{
    build_company_finance, resolve, to_thousands, AccountQuery, FinanceField, PeriodAmounts,
    FIELD_SPECS,
};
