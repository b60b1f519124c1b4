use super::crawler;
use super::dividends;
use super::downstream::Downstream;
use super::enrichment::{EnrichmentSummary, EnrichmentWorker};
use super::errors::ScrapeError;
use super::historical;
use super::technicals::{
    self, StockMovingAverages, StockPivotLevels, StockPrice, StockTechnicals,
};
use super::transport::HttpTransport;
use super::Endpoints;
use crate::db::postgres::models::company_info::CompanyInfo;
use crate::db::postgres::repository::company_repository::TraitCompanyRepository;
use crate::env_config::models::app_config::ScraperConfig;
use crate::utils::template;
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{Instrument, Span, error, info, info_span, warn};
use uuid::Uuid;

/// Runs the collection flows. Every step of a flow runs in order and any
/// failure ends the flow; nothing is retried.
///
/// Flows that write to the catalog or the sink run on their own task, so a
/// caller that stops waiting does not stop the flow halfway.
#[derive(Clone)]
pub struct MoneycontrolService {
    repository: Arc<dyn TraitCompanyRepository + Send + Sync>,
    transport: Arc<dyn HttpTransport>,
    scraper: Arc<ScraperConfig>,
    endpoints: Arc<Endpoints>,
    downstream: Downstream,
}

impl MoneycontrolService {
    pub fn new(
        repository: Arc<dyn TraitCompanyRepository + Send + Sync>,
        transport: Arc<dyn HttpTransport>,
        scraper: ScraperConfig,
        endpoints: Endpoints,
    ) -> Self {
        let endpoints = Arc::new(endpoints);
        let downstream = Downstream::new(transport.clone(), endpoints.clone());

        Self {
            repository,
            transport,
            scraper: Arc::new(scraper),
            endpoints,
            downstream,
        }
    }

    /// Crawl, replace the catalog, then enrich in the background. Returns as
    /// soon as the catalog is stored.
    pub async fn capture_symbols(&self) -> Result<usize, ScrapeError> {
        let service = self.clone();
        detached(async move {
            let (captured, _enrichment) = service.start_symbol_collection().await?;
            Ok::<_, ScrapeError>(captured)
        })
        .await
    }

    pub(crate) async fn start_symbol_collection(
        &self,
    ) -> Result<(usize, JoinHandle<EnrichmentSummary>), ScrapeError> {
        let span = info_span!("symbol_collection", run_id = %Uuid::new_v4());

        async {
            let discovered = crawler::crawl(
                self.transport.as_ref(),
                &self.endpoints.symbol_url,
                &self.scraper,
            )
            .await;

            // an empty crawl means the source was unreachable, keep the old catalog
            if discovered.is_empty() {
                error!("No symbols discovered, catalog left untouched");
                return Err(ScrapeError::upstream(
                    &self.endpoints.symbol_url,
                    "no companies discovered on any listing page",
                ));
            }

            let companies = crawler::dedupe_by_symbol(discovered);
            let captured = match self.repository.replace_all(&companies).await {
                Ok(inserted) => inserted as usize,
                Err(e) => {
                    error!("Error while saving Symbols: {}", e);
                    return Err(ScrapeError::from(e));
                }
            };
            info!("Captured {} Symbols", captured);

            let worker = EnrichmentWorker::new(
                self.repository.clone(),
                self.transport.clone(),
                self.endpoints.comp_details_url.clone(),
                Duration::from_secs(self.scraper.pacing_seconds),
            );
            let enrichment = worker.spawn(companies);

            Ok::<_, ScrapeError>((captured, enrichment))
        }
        .instrument(span)
        .await
    }

    /// Resolve, fetch the dividend table, authenticate, forward. Returns the
    /// number of records relayed.
    pub async fn scrape_dividend_history(&self, key: &str) -> Result<usize, ScrapeError> {
        let service = self.clone();
        let key = key.to_string();
        detached(async move { service.dividend_history(&key).await }).await
    }

    async fn dividend_history(&self, key: &str) -> Result<usize, ScrapeError> {
        let span = info_span!("dividend_history", company = %key);

        async {
            let company = self.resolve_company(key).await?;

            let url = template::render(
                &self.endpoints.dividend_url,
                &[
                    ("company_name", company.company_name.as_str()),
                    ("symbol", company.symbol.as_str()),
                ],
            );
            let body = self.transport.get(&url, &[]).await.map_err(|e| {
                error!("Error while scraping dividend data for {}: {}", key, e);
                e
            })?;
            let records = dividends::parse_dividend_table(&body, &self.scraper, &company.symbol)?;
            info!("Scraped {} dividend records for {}", records.len(), company.symbol);

            let token = self.downstream.authenticate().await?;
            let payload = serde_json::to_vec(&records)?;
            self.downstream
                .forward(
                    &token,
                    &self.endpoints.sink_dividend_endpoint,
                    exchange_key(&company),
                    "application/json",
                    payload,
                )
                .await?;

            Ok::<_, ScrapeError>(records.len())
        }
        .instrument(span)
        .await
    }

    /// Resolve, fetch the raw price history, authenticate, then relay it on a
    /// detached task without waiting for the sink.
    pub async fn capture_historical_data(&self, ticker: &str) -> Result<(), ScrapeError> {
        let service = self.clone();
        let ticker = ticker.to_string();
        detached(async move { service.start_historical_relay(&ticker).await.map(|_| ()) }).await
    }

    pub(crate) async fn start_historical_relay(
        &self,
        ticker: &str,
    ) -> Result<JoinHandle<Result<(), ScrapeError>>, ScrapeError> {
        let span = info_span!("historical_data", company = %ticker);

        async {
            let company = self.resolve_company(ticker).await?;
            let key = exchange_key(&company).to_string();

            let url = historical::source_url(
                &self.endpoints.historical_data_url,
                &key,
                Utc::now().timestamp(),
            );
            let payload = historical::fetch_series(self.transport.as_ref(), &url).await?;
            let token = self.downstream.authenticate().await?;

            Ok::<_, ScrapeError>(historical::relay_detached(
                self.downstream.clone(),
                token,
                self.endpoints.sink_historical_data_endpoint.clone(),
                key,
                payload,
            ))
        }
        .instrument(span)
        .await
    }

    /// Both exchange quotes from the daily technical-analysis page.
    pub async fn stock_price(&self, key: &str) -> Result<StockPrice, ScrapeError> {
        let body = self.technical_page(key).await?;
        technicals::parse_price(&body, &self.scraper.technical)
    }

    pub async fn technical_indicators(&self, key: &str) -> Result<StockTechnicals, ScrapeError> {
        let body = self.technical_page(key).await?;
        technicals::parse_indicators(&body, &self.scraper.technical.indicator_rows)
    }

    pub async fn moving_averages(&self, key: &str) -> Result<StockMovingAverages, ScrapeError> {
        let body = self.technical_page(key).await?;
        technicals::parse_moving_averages(&body, &self.scraper.technical.moving_average_rows)
    }

    pub async fn pivot_levels(&self, key: &str) -> Result<StockPivotLevels, ScrapeError> {
        let body = self.technical_page(key).await?;
        technicals::parse_pivot_levels(&body, &self.scraper.technical.pivot_rows)
    }

    async fn technical_page(&self, key: &str) -> Result<Vec<u8>, ScrapeError> {
        let span = info_span!("technical_analysis", company = %key);

        async {
            let company = self.resolve_company(key).await?;
            let url = template::render(
                &self.endpoints.technical_url,
                &[
                    ("company_name", company.company_name.as_str()),
                    ("symbol", company.symbol.as_str()),
                ],
            );

            self.transport.get(&url, &[]).await.map_err(|e| {
                error!("Error while scraping technical analysis for {}: {}", key, e);
                e
            })
        }
        .instrument(span)
        .await
    }

    pub async fn resolve_company(&self, key: &str) -> Result<CompanyInfo, ScrapeError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(ScrapeError::CompanyNotFound(key.to_string()));
        }

        match self.repository.find_by_key(key).await? {
            Some(company) => Ok(company),
            None => {
                error!("Error fetching provided company {}", key);
                Err(ScrapeError::CompanyNotFound(key.to_string()))
            }
        }
    }
}

/// Runs `flow` on its own task and waits for it. Dropping the returned future
/// only stops the waiting.
async fn detached<T, F>(flow: F) -> Result<T, ScrapeError>
where
    T: Send + 'static,
    F: Future<Output = Result<T, ScrapeError>> + Send + 'static,
{
    tokio::spawn(flow.instrument(Span::current())).await?
}

/// NSE id once enrichment has run, the source symbol before that.
fn exchange_key(company: &CompanyInfo) -> &str {
    if company.nse_id.is_empty() {
        warn!(
            "No NSE id stored for {}, falling back to symbol",
            company.symbol
        );
        &company.symbol
    } else {
        &company.nse_id
    }
}
