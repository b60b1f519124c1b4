//! In-process fakes for the repository and HTTP seams.

use crate::db::postgres::models::company_info::CompanyInfo;
use crate::db::postgres::repository::company_repository::TraitCompanyRepository;
use crate::services::moneycontrol::Endpoints;
use crate::services::moneycontrol::errors::ScrapeError;
use crate::services::moneycontrol::transport::HttpTransport;
use async_trait::async_trait;
use sqlx::Error as SqlxError;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

pub fn test_endpoints() -> Endpoints {
    Endpoints {
        symbol_url: "https://mc.test/list/".to_string(),
        dividend_url: "https://mc.test/dividends/{company_name}/{symbol}".to_string(),
        comp_details_url: "https://price.test/details/{symbol}".to_string(),
        historical_data_url: "https://price.test/history?symbol={nse_id}&to={timestamp}"
            .to_string(),
        technical_url: "https://mc.test/technical-analysis/{company_name}/{symbol}/daily".to_string(),
        sink_base_url: "https://sink.test".to_string(),
        sink_api_key: "sink-key".to_string(),
        sink_auth_endpoint: "/auth".to_string(),
        sink_historical_data_endpoint: "/historical/{key}".to_string(),
        sink_dividend_endpoint: "/dividends/{key}".to_string(),
    }
}

/// Catalog kept in memory with the same rules as the Postgres table.
#[derive(Default)]
pub struct InMemoryCompanyRepository {
    rows: Mutex<Vec<CompanyInfo>>,
    next_id: Mutex<i64>,
    failing_writes: bool,
}

impl InMemoryCompanyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_writes(mut self) -> Self {
        self.failing_writes = true;
        self
    }

    pub fn all(&self) -> Vec<CompanyInfo> {
        self.rows.lock().unwrap().clone()
    }

    fn check_writable(&self) -> Result<(), SqlxError> {
        if self.failing_writes {
            return Err(SqlxError::Protocol("writes disabled".to_string()));
        }
        Ok(())
    }

    fn assign_id(&self) -> i64 {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        *next_id
    }
}

#[async_trait]
impl TraitCompanyRepository for InMemoryCompanyRepository {
    async fn replace_all(&self, companies: &[CompanyInfo]) -> Result<u64, SqlxError> {
        self.check_writable()?;

        let mut stored: Vec<CompanyInfo> = Vec::new();
        for company in companies.iter().filter(|c| c.is_insertable()) {
            if stored.iter().any(|s| s.symbol == company.symbol) {
                continue;
            }
            let mut row = company.clone();
            row.id = self.assign_id();
            stored.push(row);
        }

        let inserted = stored.len() as u64;
        *self.rows.lock().unwrap() = stored;
        Ok(inserted)
    }

    async fn upsert(&self, company: &CompanyInfo) -> Result<u64, SqlxError> {
        self.check_writable()?;

        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|row| row.symbol == company.symbol) {
            Some(row) => {
                let id = row.id;
                *row = company.clone();
                row.id = id;
            }
            None => {
                let mut row = company.clone();
                row.id = self.assign_id();
                rows.push(row);
            }
        }
        Ok(1)
    }

    async fn find_by_key(&self, key: &str) -> Result<Option<CompanyInfo>, SqlxError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|row| {
                row.company == key.to_lowercase()
                    || row.nse_id.eq_ignore_ascii_case(key)
                    || row.symbol.eq_ignore_ascii_case(key)
            })
            .cloned())
    }

    async fn count(&self) -> Result<i64, SqlxError> {
        Ok(self.rows.lock().unwrap().len() as i64)
    }
}

#[derive(Debug, Clone)]
pub struct RecordedGet {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct RecordedPost {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Canned responses keyed by URL. Anything unregistered answers 404; POSTs
/// succeed unless a post failure is set.
#[derive(Default)]
pub struct ScriptedTransport {
    pages: HashMap<String, Result<Vec<u8>, String>>,
    prefixes: Vec<(String, Vec<u8>)>,
    post_failure: Option<String>,
    delay: Duration,
    gets: Mutex<Vec<RecordedGet>>,
    posts: Mutex<Vec<RecordedPost>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, body: Vec<u8>) -> Self {
        self.pages.insert(url.to_string(), Ok(body));
        self
    }

    /// Answers every URL starting with `prefix`.
    pub fn with_prefix(mut self, prefix: &str, body: Vec<u8>) -> Self {
        self.prefixes.push((prefix.to_string(), body));
        self
    }

    pub fn with_failure(mut self, url: &str, reason: &str) -> Self {
        self.pages.insert(url.to_string(), Err(reason.to_string()));
        self
    }

    pub fn with_post_failure(mut self, reason: &str) -> Self {
        self.post_failure = Some(reason.to_string());
        self
    }

    /// Every GET waits this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn get_count(&self, url: &str) -> usize {
        self.gets.lock().unwrap().iter().filter(|g| g.url == url).count()
    }

    pub fn gets(&self) -> Vec<RecordedGet> {
        self.gets.lock().unwrap().clone()
    }

    pub fn posts(&self) -> Vec<RecordedPost> {
        self.posts.lock().unwrap().clone()
    }
}

fn owned(headers: &[(&str, &str)]) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<Vec<u8>, ScrapeError> {
        self.gets.lock().unwrap().push(RecordedGet {
            url: url.to_string(),
            headers: owned(headers),
        });

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if let Some(page) = self.pages.get(url) {
            return page.clone().map_err(|reason| ScrapeError::upstream(url, reason));
        }

        self.prefixes
            .iter()
            .find(|(prefix, _)| url.starts_with(prefix.as_str()))
            .map(|(_, body)| body.clone())
            .ok_or_else(|| ScrapeError::upstream(url, "status 404 Not Found"))
    }

    async fn post(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<(), ScrapeError> {
        self.posts.lock().unwrap().push(RecordedPost {
            url: url.to_string(),
            headers: owned(headers),
            content_type: content_type.to_string(),
            body,
        });

        match &self.post_failure {
            Some(reason) => Err(ScrapeError::upstream(url, reason)),
            None => Ok(()),
        }
    }
}
