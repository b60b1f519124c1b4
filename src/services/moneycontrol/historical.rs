use super::downstream::{Downstream, DownstreamToken};
use super::errors::ScrapeError;
use super::transport::HttpTransport;
use crate::utils::template;
use tokio::task::JoinHandle;
use tracing::{Instrument, Span, error, info};

/// Price history URL for one exchange id. The feed wants a fresh timestamp on
/// every call.
pub fn source_url(template: &str, nse_id: &str, timestamp: i64) -> String {
    template::render(
        template,
        &[("nse_id", nse_id), ("timestamp", &timestamp.to_string())],
    )
}

/// Raw price history, not inspected.
pub async fn fetch_series(transport: &dyn HttpTransport, url: &str) -> Result<Vec<u8>, ScrapeError> {
    let payload = transport.get(url, &[]).await?;
    info!("Fetched {} bytes of price history from {}", payload.len(), url);
    Ok(payload)
}

/// Sends the payload on a detached task. The outcome is only logged; the
/// handle is for tests.
pub fn relay_detached(
    downstream: Downstream,
    token: DownstreamToken,
    endpoint_template: String,
    key: String,
    payload: Vec<u8>,
) -> JoinHandle<Result<(), ScrapeError>> {
    tokio::spawn(
        async move {
            let result = downstream
                .forward(&token, &endpoint_template, &key, "application/json", payload)
                .await;

            match &result {
                Ok(()) => info!("Historical daily data relayed for {}", key),
                Err(e) => error!("Historical daily data relay failed for {}: {}", key, e),
            }

            result
        }
        .instrument(Span::current()),
    )
}
