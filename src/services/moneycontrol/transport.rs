use super::errors::ScrapeError;
use crate::env_config::models::app_config::HttpConfig;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::{debug, error};

/// Outbound HTTP as the pipeline sees it. Every non-2xx answer is an error.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// GET `url` and return the raw body.
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<Vec<u8>, ScrapeError>;

    /// POST `body` to `url`; the response body is discarded.
    async fn post(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<(), ScrapeError>;
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<Vec<u8>, ScrapeError> {
        debug!("GET {}", url);

        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await.map_err(|err| {
            error!("failed to fetch {}, error({})", url, err);
            ScrapeError::upstream(url, err)
        })?;

        let status = response.status();
        if !status.is_success() {
            error!("unexpected status {} from {}", status, url);
            return Err(ScrapeError::upstream(url, format!("status {}", status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| ScrapeError::upstream(url, err))?;

        Ok(body.to_vec())
    }

    async fn post(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<(), ScrapeError> {
        debug!("POST {} ({} bytes)", url, body.len());

        let mut request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, content_type)
            .body(body);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await.map_err(|err| {
            error!("failed to post to {}, error({})", url, err);
            ScrapeError::upstream(url, err)
        })?;

        let status = response.status();
        if !status.is_success() {
            error!("unexpected status {} from {}", status, url);
            return Err(ScrapeError::upstream(url, format!("status {}", status)));
        }

        Ok(())
    }
}
