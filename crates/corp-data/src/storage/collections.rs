//! 수집 원본 테이블 저장소.
//!
//! 일괄 저장은 `QueryBuilder::push_values`로 청크 단위 INSERT를 만들고,
//! 중복은 `ON CONFLICT`로 처리합니다.

use std::collections::HashMap;

use chrono::NaiveDate;
use corp_core::{
    CompanyFinance, DartCompanyInfo, DartFinanceItem, DartNotice, NewsArticle, PortalDailyStats,
    ScrapErrorLog, ScrapSessionLog, StatementKind, VentureDetail, VentureTableCounts,
};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, info, instrument};

use crate::error::Result;

/// 한 INSERT에 담는 최대 행 수 (Postgres 바인드 파라미터 65535개 제한).
const CHUNK_SIZE: usize = 500;

/// 수집 테이블 저장소.
#[derive(Clone)]
pub struct CollectionsRepository {
    pool: PgPool,
}

impl CollectionsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // ==================== DART ====================

    /// 기업개황을 고유번호 기준으로 저장/갱신합니다.
    #[instrument(skip(self, infos), fields(count = infos.len()))]
    pub async fn upsert_dart_infos(&self, infos: &[DartCompanyInfo]) -> Result<u64> {
        // 같은 청크에 동일 키가 두 번 있으면 DO UPDATE가 실패하므로 마지막 값만 남깁니다.
        let mut latest: HashMap<&str, &DartCompanyInfo> = HashMap::new();
        for info in infos {
            latest.insert(info.corp_code.as_str(), info);
        }
        let unique: Vec<&DartCompanyInfo> = latest.into_values().collect();

        let mut affected = 0;
        for chunk in unique.chunks(CHUNK_SIZE) {
            let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO collect_dart (corp_code, company_id, corp_name, corp_name_eng, \
                 stock_name, stock_code, ceo_nm, corp_cls, jurir_no, bizr_no, adres, hm_url, \
                 ir_url, phn_no, fax_no, induty_code, est_dt, acc_mt, listing_market_id, \
                 listing_market_desc, business_condition_code, business_condition_desc, \
                 business_category_code, business_category_desc) ",
            );
            qb.push_values(chunk.iter().copied(), |mut b, info| {
                b.push_bind(&info.corp_code)
                    .push_bind(info.company_id)
                    .push_bind(&info.corp_name)
                    .push_bind(&info.corp_name_eng)
                    .push_bind(&info.stock_name)
                    .push_bind(&info.stock_code)
                    .push_bind(&info.ceo_nm)
                    .push_bind(&info.corp_cls)
                    .push_bind(&info.jurir_no)
                    .push_bind(&info.bizr_no)
                    .push_bind(&info.adres)
                    .push_bind(&info.hm_url)
                    .push_bind(&info.ir_url)
                    .push_bind(&info.phn_no)
                    .push_bind(&info.fax_no)
                    .push_bind(&info.induty_code)
                    .push_bind(&info.est_dt)
                    .push_bind(&info.acc_mt)
                    .push_bind(info.listing_market_id)
                    .push_bind(&info.listing_market_desc)
                    .push_bind(&info.business_condition_code)
                    .push_bind(&info.business_condition_desc)
                    .push_bind(&info.business_category_code)
                    .push_bind(&info.business_category_desc);
            });
            qb.push(
                " ON CONFLICT (corp_code) DO UPDATE SET \
                 company_id = COALESCE(EXCLUDED.company_id, collect_dart.company_id), \
                 corp_name = EXCLUDED.corp_name, corp_name_eng = EXCLUDED.corp_name_eng, \
                 stock_name = EXCLUDED.stock_name, stock_code = EXCLUDED.stock_code, \
                 ceo_nm = EXCLUDED.ceo_nm, corp_cls = EXCLUDED.corp_cls, \
                 jurir_no = EXCLUDED.jurir_no, bizr_no = EXCLUDED.bizr_no, \
                 adres = EXCLUDED.adres, hm_url = EXCLUDED.hm_url, ir_url = EXCLUDED.ir_url, \
                 phn_no = EXCLUDED.phn_no, fax_no = EXCLUDED.fax_no, \
                 induty_code = EXCLUDED.induty_code, est_dt = EXCLUDED.est_dt, \
                 acc_mt = EXCLUDED.acc_mt, listing_market_id = EXCLUDED.listing_market_id, \
                 listing_market_desc = EXCLUDED.listing_market_desc, \
                 business_condition_code = EXCLUDED.business_condition_code, \
                 business_condition_desc = EXCLUDED.business_condition_desc, \
                 business_category_code = EXCLUDED.business_category_code, \
                 business_category_desc = EXCLUDED.business_category_desc, \
                 update_date = NOW()",
            );

            affected += qb.build().execute(&self.pool).await?.rows_affected();
        }

        info!(affected, "기업개황 저장");
        Ok(affected)
    }

    /// 해당 요청의 재무제표 라인이 이미 저장되어 있는지 확인합니다.
    pub async fn finance_exists(
        &self,
        corp_code: &str,
        bsns_year: &str,
        reprt_code: &str,
        fs_div: &str,
    ) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM collect_dart_finance
                WHERE corp_code = $1 AND bsns_year = $2 AND reprt_code = $3 AND fs_div = $4
            )
            "#,
        )
        .bind(corp_code)
        .bind(bsns_year)
        .bind(reprt_code)
        .bind(fs_div)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    #[instrument(skip(self, items), fields(count = items.len()))]
    pub async fn insert_dart_finance_items(&self, items: &[DartFinanceItem]) -> Result<u64> {
        let mut inserted = 0;
        for chunk in items.chunks(CHUNK_SIZE) {
            let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO collect_dart_finance (rcept_no, corp_code, bsns_year, reprt_code, \
                 fs_div, fs_nm, sj_div, sj_nm, account_id, account_nm, account_detail, \
                 thstrm_nm, thstrm_amount, frmtrm_nm, frmtrm_amount, bfefrmtrm_nm, \
                 bfefrmtrm_amount, ord, currency) ",
            );
            qb.push_values(chunk, |mut b, item| {
                b.push_bind(&item.rcept_no)
                    .push_bind(&item.corp_code)
                    .push_bind(&item.bsns_year)
                    .push_bind(&item.reprt_code)
                    .push_bind(&item.fs_div)
                    .push_bind(&item.fs_nm)
                    .push_bind(&item.sj_div)
                    .push_bind(&item.sj_nm)
                    .push_bind(&item.account_id)
                    .push_bind(&item.account_nm)
                    .push_bind(&item.account_detail)
                    .push_bind(&item.thstrm_nm)
                    .push_bind(&item.thstrm_amount)
                    .push_bind(&item.frmtrm_nm)
                    .push_bind(&item.frmtrm_amount)
                    .push_bind(&item.bfefrmtrm_nm)
                    .push_bind(&item.bfefrmtrm_amount)
                    .push_bind(&item.ord)
                    .push_bind(&item.currency);
            });
            qb.push(" ON CONFLICT DO NOTHING");

            inserted += qb.build().execute(&self.pool).await?.rows_affected();
        }

        debug!(inserted, "재무제표 라인 저장");
        Ok(inserted)
    }

    /// 공시 목록 저장. 이미 있는 접수번호는 건너뜁니다.
    #[instrument(skip(self, notices), fields(count = notices.len()))]
    pub async fn insert_dart_notices(&self, notices: &[DartNotice]) -> Result<u64> {
        let mut inserted = 0;
        for chunk in notices.chunks(CHUNK_SIZE) {
            let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO collect_dart_notice (rcept_no, corp_cls, corp_name, corp_code, \
                 stock_code, report_nm, flr_nm, rcept_dt, rm) ",
            );
            qb.push_values(chunk, |mut b, n| {
                b.push_bind(&n.rcept_no)
                    .push_bind(&n.corp_cls)
                    .push_bind(&n.corp_name)
                    .push_bind(&n.corp_code)
                    .push_bind(&n.stock_code)
                    .push_bind(&n.report_nm)
                    .push_bind(&n.flr_nm)
                    .push_bind(&n.rcept_dt)
                    .push_bind(&n.rm);
            });
            qb.push(" ON CONFLICT (rcept_no) DO NOTHING");

            inserted += qb.build().execute(&self.pool).await?.rows_affected();
        }

        Ok(inserted)
    }

    /// 한 회사의 저장된 재무제표 라인 (저장 순서).
    pub async fn dart_finance_rows(&self, corp_code: &str) -> Result<Vec<DartFinanceItem>> {
        let rows = sqlx::query_as::<_, DartFinanceItem>(
            r#"
            SELECT rcept_no, corp_code, bsns_year, reprt_code, fs_div, fs_nm, sj_div, sj_nm,
                   account_id, account_nm, account_detail, thstrm_nm, thstrm_amount,
                   frmtrm_nm, frmtrm_amount, bfefrmtrm_nm, bfefrmtrm_amount, ord, currency
            FROM collect_dart_finance
            WHERE corp_code = $1
            ORDER BY id
            "#,
        )
        .bind(corp_code)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// 회사 id가 확인된 기업개황의 (회사 id, 고유번호) 목록.
    pub async fn dart_infos_by_company(&self, company_id: Option<i64>) -> Result<Vec<(i64, String)>> {
        let rows: Vec<(i64, String)> = sqlx::query_as(
            r#"
            SELECT company_id, corp_code
            FROM collect_dart
            WHERE company_id IS NOT NULL
              AND ($1::bigint IS NULL OR company_id = $1)
            ORDER BY company_id
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// 재무 요약 저장/갱신.
    ///
    /// 같은 (회사, 연도, 재무제표구분)이 여러 번 있으면 뒤의 값이 남습니다.
    #[instrument(skip(self, records), fields(count = records.len()))]
    pub async fn upsert_company_finance(&self, records: &[CompanyFinance]) -> Result<u64> {
        let mut index: HashMap<(i64, &str, &str), usize> = HashMap::new();
        let mut unique: Vec<&CompanyFinance> = Vec::new();
        for record in records {
            let key = (
                record.company_id,
                record.acct_dt.as_str(),
                record.financial_decide_code.as_str(),
            );
            match index.get(&key) {
                Some(&pos) => unique[pos] = record,
                None => {
                    index.insert(key, unique.len());
                    unique.push(record);
                }
            }
        }

        let mut affected = 0;
        for chunk in unique.chunks(CHUNK_SIZE) {
            let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO company_finance (company_id, acct_dt, financial_decide_code, \
                 financial_decide_desc, biz_num, corporation_num, illu_id, sales, sales_cost, \
                 operating_profit, net_profit, capital_amount, capital_total, debt_total, \
                 assets_total, comprehensive_income, tangible_asset, intangible_asset, \
                 current_asset, non_current_asset, current_liabilities, inventories_asset, \
                 accounts_payable, trade_receivable, short_term_loan, admin_expenses, \
                 debt_ratio, net_worth, quick_asset, net_working_capital) ",
            );
            qb.push_values(chunk.iter().copied(), |mut b, r| {
                b.push_bind(r.company_id)
                    .push_bind(&r.acct_dt)
                    .push_bind(&r.financial_decide_code)
                    .push_bind(&r.financial_decide_desc)
                    .push_bind(&r.biz_num)
                    .push_bind(&r.corporation_num)
                    .push_bind(&r.illu_id)
                    .push_bind(r.sales)
                    .push_bind(r.sales_cost)
                    .push_bind(r.operating_profit)
                    .push_bind(r.net_profit)
                    .push_bind(r.capital_amount)
                    .push_bind(r.capital_total)
                    .push_bind(r.debt_total)
                    .push_bind(r.assets_total)
                    .push_bind(r.comprehensive_income)
                    .push_bind(r.tangible_asset)
                    .push_bind(r.intangible_asset)
                    .push_bind(r.current_asset)
                    .push_bind(r.non_current_asset)
                    .push_bind(r.current_liabilities)
                    .push_bind(r.inventories_asset)
                    .push_bind(r.accounts_payable)
                    .push_bind(r.trade_receivable)
                    .push_bind(r.short_term_loan)
                    .push_bind(r.admin_expenses)
                    .push_bind(r.debt_ratio)
                    .push_bind(r.net_worth)
                    .push_bind(r.quick_asset)
                    .push_bind(r.net_working_capital);
            });
            qb.push(
                " ON CONFLICT (company_id, acct_dt, financial_decide_code) DO UPDATE SET \
                 financial_decide_desc = EXCLUDED.financial_decide_desc, \
                 biz_num = EXCLUDED.biz_num, corporation_num = EXCLUDED.corporation_num, \
                 illu_id = EXCLUDED.illu_id, sales = EXCLUDED.sales, \
                 sales_cost = EXCLUDED.sales_cost, operating_profit = EXCLUDED.operating_profit, \
                 net_profit = EXCLUDED.net_profit, capital_amount = EXCLUDED.capital_amount, \
                 capital_total = EXCLUDED.capital_total, debt_total = EXCLUDED.debt_total, \
                 assets_total = EXCLUDED.assets_total, \
                 comprehensive_income = EXCLUDED.comprehensive_income, \
                 tangible_asset = EXCLUDED.tangible_asset, \
                 intangible_asset = EXCLUDED.intangible_asset, \
                 current_asset = EXCLUDED.current_asset, \
                 non_current_asset = EXCLUDED.non_current_asset, \
                 current_liabilities = EXCLUDED.current_liabilities, \
                 inventories_asset = EXCLUDED.inventories_asset, \
                 accounts_payable = EXCLUDED.accounts_payable, \
                 trade_receivable = EXCLUDED.trade_receivable, \
                 short_term_loan = EXCLUDED.short_term_loan, \
                 admin_expenses = EXCLUDED.admin_expenses, debt_ratio = EXCLUDED.debt_ratio, \
                 net_worth = EXCLUDED.net_worth, quick_asset = EXCLUDED.quick_asset, \
                 net_working_capital = EXCLUDED.net_working_capital, update_date = NOW()",
            );

            affected += qb.build().execute(&self.pool).await?.rows_affected();
        }

        Ok(affected)
    }

    // ==================== 벤처기업 ====================

    /// 벤처기업 상세정보를 다섯 테이블에 한 트랜잭션으로 저장합니다.
    #[instrument(skip(self, details), fields(count = details.len()))]
    pub async fn insert_venture_details(&self, details: &[VentureDetail]) -> Result<VentureTableCounts> {
        let mut counts = VentureTableCounts::default();
        if details.is_empty() {
            return Ok(counts);
        }

        let mut tx = self.pool.begin().await?;

        for detail in details {
            let company = &detail.company;

            counts.info += sqlx::query(
                r#"
                INSERT INTO collect_vntr_info (vnia_sn, company_id, company_nm, representative_nm,
                    corp_no, indsty_cd, indsty_nm, main_prod, biz_no, tel_no, address)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                ON CONFLICT (vnia_sn) DO UPDATE SET
                    company_id = COALESCE(EXCLUDED.company_id, collect_vntr_info.company_id),
                    company_nm = EXCLUDED.company_nm,
                    representative_nm = EXCLUDED.representative_nm,
                    corp_no = EXCLUDED.corp_no,
                    indsty_cd = COALESCE(EXCLUDED.indsty_cd, collect_vntr_info.indsty_cd),
                    indsty_nm = EXCLUDED.indsty_nm,
                    main_prod = EXCLUDED.main_prod,
                    biz_no = EXCLUDED.biz_no,
                    tel_no = EXCLUDED.tel_no,
                    address = EXCLUDED.address,
                    update_date = NOW()
                "#,
            )
            .bind(&company.vnia_sn)
            .bind(company.company_id)
            .bind(&company.company_nm)
            .bind(&company.representative_nm)
            .bind(&company.corp_no)
            .bind(&company.indsty_cd)
            .bind(&company.indsty_nm)
            .bind(&company.main_prod)
            .bind(&company.biz_no)
            .bind(&company.tel_no)
            .bind(&company.address)
            .execute(&mut *tx)
            .await?
            .rows_affected();

            for statement in detail.balance_sheets.iter().chain(&detail.income_statements) {
                let table = match statement.kind {
                    StatementKind::BalanceSheet => "collect_vntr_finance_balance",
                    StatementKind::IncomeStatement => "collect_vntr_finance_income",
                };
                let sql = format!(
                    "INSERT INTO {table} (vnia_sn, biz_no, year, items) VALUES ($1, $2, $3, $4) \
                     ON CONFLICT (vnia_sn, year) DO UPDATE SET \
                     biz_no = EXCLUDED.biz_no, items = EXCLUDED.items, update_date = NOW()"
                );
                let affected = sqlx::query(&sql)
                    .bind(&company.vnia_sn)
                    .bind(&company.biz_no)
                    .bind(&statement.year)
                    .bind(Json(&statement.items))
                    .execute(&mut *tx)
                    .await?
                    .rows_affected();

                match statement.kind {
                    StatementKind::BalanceSheet => counts.finance_balance += affected,
                    StatementKind::IncomeStatement => counts.finance_income += affected,
                }
            }

            for investment in &detail.investments {
                counts.investment += sqlx::query(
                    r#"
                    INSERT INTO collect_vntr_investment_info
                        (vnia_sn, biz_no, invest_date, invest_amount, change_amount)
                    VALUES ($1, $2, $3, $4, $5)
                    ON CONFLICT (vnia_sn, invest_date, invest_amount, change_amount) DO NOTHING
                    "#,
                )
                .bind(&company.vnia_sn)
                .bind(&company.biz_no)
                .bind(&investment.invest_date)
                .bind(&investment.invest_amount)
                .bind(&investment.change_amount)
                .execute(&mut *tx)
                .await?
                .rows_affected();
            }

            for certificate in &detail.certificates {
                counts.certificate += sqlx::query(
                    r#"
                    INSERT INTO collect_vntr_certificate (vnia_sn, biz_no, certificate_no,
                        certificate_type, announcement_date, validity_period,
                        certificate_number, certificate_date, changes)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                    ON CONFLICT (vnia_sn, certificate_no, certificate_number) DO UPDATE SET
                        biz_no = EXCLUDED.biz_no,
                        certificate_type = EXCLUDED.certificate_type,
                        announcement_date = EXCLUDED.announcement_date,
                        validity_period = EXCLUDED.validity_period,
                        certificate_date = EXCLUDED.certificate_date,
                        changes = EXCLUDED.changes,
                        update_date = NOW()
                    "#,
                )
                .bind(&company.vnia_sn)
                .bind(&company.biz_no)
                .bind(&certificate.certificate_no)
                .bind(&certificate.certificate_type)
                .bind(&certificate.announcement_date)
                .bind(&certificate.validity_period)
                .bind(&certificate.certificate_number)
                .bind(&certificate.certificate_date)
                .bind(&certificate.changes)
                .execute(&mut *tx)
                .await?
                .rows_affected();
            }
        }

        tx.commit().await?;

        info!(
            details = details.len(),
            info = counts.info,
            balance = counts.finance_balance,
            income = counts.finance_income,
            investment = counts.investment,
            certificate = counts.certificate,
            "벤처기업 상세정보 저장"
        );
        Ok(counts)
    }

    // ==================== 뉴스 ====================

    #[instrument(skip(self, articles), fields(count = articles.len()))]
    pub async fn insert_news_articles(&self, articles: &[NewsArticle]) -> Result<u64> {
        let mut inserted = 0;
        for chunk in articles.chunks(CHUNK_SIZE) {
            let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO news_article (url, url_md5, title, content, create_date, kind, \
                 image_url, portal, media, category) ",
            );
            qb.push_values(chunk, |mut b, a| {
                b.push_bind(&a.url)
                    .push_bind(&a.url_md5)
                    .push_bind(&a.title)
                    .push_bind(&a.content)
                    .push_bind(a.create_date)
                    .push_bind(&a.kind)
                    .push_bind(&a.image_url)
                    .push_bind(&a.portal)
                    .push_bind(&a.media)
                    .push_bind(&a.category);
            });
            qb.push(" ON CONFLICT (url_md5) DO NOTHING");

            inserted += qb.build().execute(&self.pool).await?.rows_affected();
        }

        Ok(inserted)
    }

    pub async fn news_url_exists(&self, url_md5: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM news_article WHERE url_md5 = $1)")
                .bind(url_md5)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    pub async fn insert_session_log(&self, log: &ScrapSessionLog) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO scrap_session_log (portal, start_time, end_time,
                total_records_processed, success_count, fail_count, dup_count)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&log.portal)
        .bind(log.start_time)
        .bind(log.end_time)
        .bind(log.total_records_processed)
        .bind(log.success_count)
        .bind(log.fail_count)
        .bind(log.dup_count)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn insert_error_logs(&self, logs: &[ScrapErrorLog]) -> Result<u64> {
        let mut inserted = 0;
        for chunk in logs.chunks(CHUNK_SIZE) {
            let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO scrap_error_log (portal, url, error_message, error_time) ",
            );
            qb.push_values(chunk, |mut b, log| {
                b.push_bind(&log.portal)
                    .push_bind(&log.url)
                    .push_bind(&log.error_message)
                    .push_bind(log.error_time);
            });

            inserted += qb.build().execute(&self.pool).await?.rows_affected();
        }

        Ok(inserted)
    }

    /// 하루 동안의 포털별 성공/실패 건수 (세션 로그 합계).
    pub async fn daily_news_statistics(&self, date: NaiveDate) -> Result<Vec<PortalDailyStats>> {
        let stats = sqlx::query_as::<_, PortalDailyStats>(
            r#"
            SELECT portal,
                   SUM(success_count)::BIGINT AS success,
                   SUM(fail_count)::BIGINT AS fail
            FROM scrap_session_log
            WHERE start_time::date = $1
            GROUP BY portal
            ORDER BY portal
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(stats)
    }
}
