use thiserror::Error;

/// Failures of the collection pipeline. Field-level extraction problems are
/// not represented here: they degrade to zero values and are only logged.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// A fetched page could not be read as HTML, or a configured selector is invalid.
    #[error("document parse error: {0}")]
    DocumentParse(String),

    /// The key matched nothing in the catalog.
    #[error("company not found: {0}")]
    CompanyNotFound(String),

    /// Transport failure or non-2xx answer from the source site or the sink.
    #[error("upstream fetch failed for {url}: {reason}")]
    UpstreamFetch { url: String, reason: String },

    /// No bearer token could be obtained from the downstream sink.
    #[error("downstream authentication failed: {0}")]
    Auth(String),

    /// The downstream sink refused or never received a relayed payload.
    #[error("forward to downstream failed: {0}")]
    Forward(String),

    #[error("failed to decode payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// A flow task panicked or was aborted before finishing.
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ScrapeError {
    pub fn upstream(url: &str, reason: impl ToString) -> Self {
        ScrapeError::UpstreamFetch {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ScrapeError::CompanyNotFound(_))
    }
}
