use super::errors::ScrapeError;
use super::html::parse_number;
use super::transport::HttpTransport;
use crate::db::postgres::models::company_info::CompanyInfo;
use crate::db::postgres::repository::company_repository::TraitCompanyRepository;
use crate::utils::template;
use serde::{Deserialize, Deserializer};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{Instrument, Span, debug, error, info};

/// Body of the company details feed: `{ "data": { ... } }`.
#[derive(Debug, Deserialize)]
struct CompanyDetailsResponse {
    data: CompanyDetails,
}

#[derive(Debug, Default, Deserialize)]
struct CompanyDetails {
    #[serde(rename = "BSEID", default)]
    bse_id: Option<String>,
    #[serde(rename = "MKTCAP", default, deserialize_with = "de_market_cap")]
    market_cap: f64,
    #[serde(rename = "NSEID", default)]
    nse_id: Option<String>,
    #[serde(rename = "main_sector", default)]
    main_sector: Option<String>,
    #[serde(rename = "newSubsector", default)]
    sub_sector: Option<String>,
}

// the feed sends market cap as a number, a numeric string or null
fn de_market_cap<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(number)) => number.as_f64().unwrap_or(0.0),
        Some(serde_json::Value::String(text)) => parse_number(&text).unwrap_or(0.0),
        _ => 0.0,
    })
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichmentSummary {
    pub processed: usize,
    pub updated: usize,
    pub skipped: usize,
}

/// Walks the catalog one company at a time, pausing before every request,
/// and writes the secondary identifiers back with an upsert.
pub struct EnrichmentWorker {
    repository: Arc<dyn TraitCompanyRepository + Send + Sync>,
    transport: Arc<dyn HttpTransport>,
    details_url: String,
    pacing: Duration,
}

impl EnrichmentWorker {
    pub fn new(
        repository: Arc<dyn TraitCompanyRepository + Send + Sync>,
        transport: Arc<dyn HttpTransport>,
        details_url: String,
        pacing: Duration,
    ) -> Self {
        Self {
            repository,
            transport,
            details_url,
            pacing,
        }
    }

    /// Detaches the worker. Callers normally drop the handle; it exists so a
    /// test can wait for completion.
    pub fn spawn(self, companies: Vec<CompanyInfo>) -> JoinHandle<EnrichmentSummary> {
        let span = Span::current();
        tokio::spawn(async move { self.run(companies).await }.instrument(span))
    }

    pub async fn run(&self, companies: Vec<CompanyInfo>) -> EnrichmentSummary {
        info!("Collecting additional info for {} companies", companies.len());
        let mut summary = EnrichmentSummary::default();

        for mut company in companies {
            tokio::time::sleep(self.pacing).await;
            summary.processed += 1;

            match self.enrich(&mut company).await {
                Ok(()) => {
                    summary.updated += 1;
                    debug!("Done collecting additional info for {}", company.company);
                }
                Err(e) => {
                    summary.skipped += 1;
                    error!(
                        "Failed to collect additional info for {}: {}",
                        company.symbol, e
                    );
                }
            }
        }

        info!(
            "Done collecting additional info for companies: {} updated, {} skipped",
            summary.updated, summary.skipped
        );
        summary
    }

    async fn enrich(&self, company: &mut CompanyInfo) -> Result<(), ScrapeError> {
        let url = template::render(&self.details_url, &[("symbol", company.symbol.as_str())]);
        let body = self.transport.get(&url, &[]).await?;
        let response: CompanyDetailsResponse = serde_json::from_slice(&body)?;

        apply_details(company, response.data);
        self.repository.upsert(company).await?;

        Ok(())
    }
}

fn apply_details(company: &mut CompanyInfo, details: CompanyDetails) {
    company.bse_id = details.bse_id.unwrap_or_default();
    company.nse_id = details.nse_id.unwrap_or_default();
    company.market_cap = details.market_cap;
    company.main_sector_details = details.main_sector.unwrap_or_default();
    company.sub_sector_details = details.sub_sector.unwrap_or_default();
}
