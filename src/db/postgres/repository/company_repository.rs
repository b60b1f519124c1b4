use crate::db::postgres::connection::PostgresConnection;
use crate::db::postgres::models::company_info::CompanyInfo;
use async_trait::async_trait;
use sqlx::{Error as SqlxError, Postgres, QueryBuilder};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Rows per multi-row INSERT; keeps bind parameters far below the Postgres limit.
const INSERT_BATCH_SIZE: usize = 1000;

pub const CREATE_COMPANY_INFOS: &str = "
    CREATE TABLE IF NOT EXISTS company_infos (
        id BIGSERIAL PRIMARY KEY,
        display_name TEXT NOT NULL DEFAULT '',
        company TEXT NOT NULL,
        sector TEXT NOT NULL DEFAULT '',
        company_name TEXT NOT NULL DEFAULT '',
        symbol TEXT NOT NULL UNIQUE,
        nse_id TEXT NOT NULL DEFAULT '',
        bse_id TEXT NOT NULL DEFAULT '',
        market_cap DOUBLE PRECISION NOT NULL DEFAULT 0,
        main_sector_details TEXT NOT NULL DEFAULT '',
        sub_sector_details TEXT NOT NULL DEFAULT '',
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )";

const SELECT_COLUMNS: &str = "id, display_name, company, sector, company_name, symbol, \
     nse_id, bse_id, market_cap, main_sector_details, sub_sector_details";

#[async_trait]
pub trait TraitCompanyRepository {
    /// Replaces the whole catalog in one transaction. Returns the rows inserted;
    /// a repeated symbol keeps its first occurrence.
    async fn replace_all(&self, companies: &[CompanyInfo]) -> Result<u64, SqlxError>;

    /// Inserts the company or overwrites the row holding the same symbol.
    async fn upsert(&self, company: &CompanyInfo) -> Result<u64, SqlxError>;

    /// Case-insensitive match on lookup key, NSE id or symbol.
    async fn find_by_key(&self, key: &str) -> Result<Option<CompanyInfo>, SqlxError>;

    async fn count(&self) -> Result<i64, SqlxError>;
}

pub struct StructCompanyRepository {
    connection: Arc<PostgresConnection>,
}

impl StructCompanyRepository {
    pub fn new(connection: Arc<PostgresConnection>) -> Self {
        Self { connection }
    }

    pub async fn ensure_schema(&self) -> Result<(), SqlxError> {
        sqlx::query(CREATE_COMPANY_INFOS)
            .execute(self.connection.get_pool())
            .await?;

        info!("company_infos table is ready");
        Ok(())
    }
}

#[async_trait]
impl TraitCompanyRepository for StructCompanyRepository {
    async fn replace_all(&self, companies: &[CompanyInfo]) -> Result<u64, SqlxError> {
        let pool = self.connection.get_pool();
        let insertable: Vec<&CompanyInfo> =
            companies.iter().filter(|c| c.is_insertable()).collect();

        debug!(
            "Replacing company catalog with {} records ({} rejected)",
            insertable.len(),
            companies.len() - insertable.len()
        );

        let mut tx = pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM company_infos")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        debug!("Deleted {} existing catalog rows", deleted);

        let mut inserted = 0;
        for batch in insertable.chunks(INSERT_BATCH_SIZE) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO company_infos (display_name, company, sector, company_name, symbol, \
                 nse_id, bse_id, market_cap, main_sector_details, sub_sector_details) ",
            );
            builder.push_values(batch.iter(), |mut row, company| {
                row.push_bind(company.display_name.clone())
                    .push_bind(company.company.clone())
                    .push_bind(company.sector.clone())
                    .push_bind(company.company_name.clone())
                    .push_bind(company.symbol.clone())
                    .push_bind(company.nse_id.clone())
                    .push_bind(company.bse_id.clone())
                    .push_bind(company.market_cap)
                    .push_bind(company.main_sector_details.clone())
                    .push_bind(company.sub_sector_details.clone());
            });
            builder.push(" ON CONFLICT (symbol) DO NOTHING");

            match builder.build().execute(&mut *tx).await {
                Ok(result) => inserted += result.rows_affected(),
                Err(e) => {
                    error!("Error inserting company batch: {}", e);
                    return Err(e);
                }
            }
        }

        tx.commit().await?;

        info!("Company catalog replaced: {} rows inserted", inserted);
        Ok(inserted)
    }

    async fn upsert(&self, company: &CompanyInfo) -> Result<u64, SqlxError> {
        let pool = self.connection.get_pool();

        debug!("Upserting company with symbol: {}", company.symbol);

        let result = sqlx::query(
            "INSERT INTO company_infos (display_name, company, sector, company_name, symbol,
                 nse_id, bse_id, market_cap, main_sector_details, sub_sector_details)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             ON CONFLICT (symbol)
             DO UPDATE SET display_name = EXCLUDED.display_name,
                 company = EXCLUDED.company,
                 sector = EXCLUDED.sector,
                 company_name = EXCLUDED.company_name,
                 nse_id = EXCLUDED.nse_id,
                 bse_id = EXCLUDED.bse_id,
                 market_cap = EXCLUDED.market_cap,
                 main_sector_details = EXCLUDED.main_sector_details,
                 sub_sector_details = EXCLUDED.sub_sector_details,
                 updated_at = NOW()",
        )
        .bind(&company.display_name)
        .bind(&company.company)
        .bind(&company.sector)
        .bind(&company.company_name)
        .bind(&company.symbol)
        .bind(&company.nse_id)
        .bind(&company.bse_id)
        .bind(company.market_cap)
        .bind(&company.main_sector_details)
        .bind(&company.sub_sector_details)
        .execute(pool)
        .await;

        match &result {
            Ok(pg_result) => debug!(
                "Upserted company {}, rows affected: {}",
                company.symbol,
                pg_result.rows_affected()
            ),
            Err(e) => error!("Error upserting company {}: {}", company.symbol, e),
        }

        result.map(|pg_result| pg_result.rows_affected())
    }

    async fn find_by_key(&self, key: &str) -> Result<Option<CompanyInfo>, SqlxError> {
        let pool = self.connection.get_pool();

        debug!("Fetching company by key: {}", key);

        let query = format!(
            "SELECT {} FROM company_infos
             WHERE company = LOWER($1) OR UPPER(nse_id) = UPPER($1) OR UPPER(symbol) = UPPER($1)
             ORDER BY id
             LIMIT 1",
            SELECT_COLUMNS
        );

        let result = sqlx::query_as::<_, CompanyInfo>(&query)
            .bind(key)
            .fetch_optional(pool)
            .await;

        match &result {
            Ok(Some(_)) => debug!("Found company for key: {}", key),
            Ok(None) => debug!("No company found for key: {}", key),
            Err(e) => error!("Error fetching company for key {}: {}", key, e),
        }

        result
    }

    async fn count(&self) -> Result<i64, SqlxError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM company_infos")
            .fetch_one(self.connection.get_pool())
            .await
    }
}
