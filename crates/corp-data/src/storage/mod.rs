//! Postgres 저장소.
//!
//! - `collections`: 수집 원본 테이블 (DART, 벤처기업, 뉴스)과 재무 요약
//! - `companies`: 기준 회사 목록, KSIC 코드표
//!
//! 스키마는 `migrations/`에 있습니다.

pub mod collections;
pub mod companies;

pub use collections::CollectionsRepository;
pub use companies::CompaniesRepository;

use sqlx::migrate::Migrator;

/// 스키마 마이그레이션.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");
