//! 기준 회사 목록 조회.

use std::collections::HashMap;

use corp_core::CompanyRef;
use sqlx::PgPool;

use crate::error::Result;
use crate::preprocessing::{KsicEntry, KsicTable};

/// `company_info` / `ksic_code` 조회 저장소.
#[derive(Clone)]
pub struct CompaniesRepository {
    pool: PgPool,
}

impl CompaniesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 법인등록번호 → 회사 id.
    pub async fn company_ids_by_corporation_num(
        &self,
        corporation_nums: &[String],
    ) -> Result<HashMap<String, i64>> {
        if corporation_nums.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT corporation_num, MIN(id)
            FROM company_info
            WHERE corporation_num = ANY($1)
            GROUP BY corporation_num
            "#,
        )
        .bind(corporation_nums)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    /// 사업자등록번호 → 회사 id.
    pub async fn company_ids_by_business_num(
        &self,
        business_nums: &[String],
    ) -> Result<HashMap<String, i64>> {
        if business_nums.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT biz_num, MIN(id)
            FROM company_info
            WHERE biz_num = ANY($1)
            GROUP BY biz_num
            "#,
        )
        .bind(business_nums)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    /// DART 고유번호가 있는 회사 목록.
    ///
    /// `corp_codes`를 주면 해당 회사만 조회합니다.
    pub async fn dart_targets(&self, corp_codes: Option<&[String]>) -> Result<Vec<CompanyRef>> {
        let targets = sqlx::query_as::<_, CompanyRef>(
            r#"
            SELECT id AS company_id, corp_code, biz_num, corporation_num, illu_id
            FROM company_info
            WHERE corp_code IS NOT NULL AND corp_code <> ''
              AND ($1::text[] IS NULL OR corp_code = ANY($1))
            ORDER BY id
            "#,
        )
        .bind(corp_codes)
        .fetch_all(&self.pool)
        .await?;

        Ok(targets)
    }

    /// 회사 한 건의 식별자.
    pub async fn company_ref(&self, company_id: i64) -> Result<Option<CompanyRef>> {
        let company = sqlx::query_as::<_, CompanyRef>(
            r#"
            SELECT id AS company_id, corp_code, biz_num, corporation_num, illu_id
            FROM company_info
            WHERE id = $1
            "#,
        )
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(company)
    }

    pub async fn ksic_table(&self) -> Result<KsicTable> {
        let entries = sqlx::query_as::<_, KsicEntry>(
            "SELECT code_value, code_desc FROM ksic_code ORDER BY code_value",
        )
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(count = entries.len(), "KSIC 코드표 로드");
        Ok(KsicTable::new(entries))
    }
}
