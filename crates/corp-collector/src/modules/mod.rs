//! 데이터 수집 모듈.

pub mod dart_finance_sync;
pub mod dart_info_sync;
pub mod dart_notice_sync;
pub mod news_sync;
pub mod venture_sync;

pub use dart_finance_sync::{preprocess_finance, sync_dart_finance, target_years, FinanceSyncOptions};
pub use dart_info_sync::sync_dart_infos;
pub use dart_notice_sync::sync_dart_notices;
pub use news_sync::{
    build_portal, run_loop as run_news_loop, run_session as run_news_session, send_daily_summary,
    PortalSession,
};
pub use venture_sync::{split_into_parts, sync_venture};
