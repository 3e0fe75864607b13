//! # Corp Notification
//!
//! 수집 작업 알림 서비스.
//!
//! 지원 채널:
//! - Synology Chat (incoming webhook)
//!
//! 메시지 종류:
//! - 작업 시작/종료
//! - 뉴스 일일 요약, 뉴스 스크래핑 에러
//! - 벤처기업 상세정보 수집 통계

pub mod manager;
pub mod synology;
pub mod types;

pub use manager::*;
pub use synology::*;
pub use types::*;
