use super::errors::ScrapeError;
use super::transport::HttpTransport;
use super::Endpoints;
use crate::utils::template;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Bearer credential from the sink. Fetched per relay, never reused.
#[derive(Clone, PartialEq)]
pub struct DownstreamToken(String);

impl DownstreamToken {
    fn authorization(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for DownstreamToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DownstreamToken(***)")
    }
}

/// Client for the MoneyBS sink: token acquisition and authenticated POSTs.
#[derive(Clone)]
pub struct Downstream {
    transport: Arc<dyn HttpTransport>,
    endpoints: Arc<Endpoints>,
}

impl Downstream {
    pub fn new(transport: Arc<dyn HttpTransport>, endpoints: Arc<Endpoints>) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    /// GET the auth endpoint with the static API key; the body text is the token.
    pub async fn authenticate(&self) -> Result<DownstreamToken, ScrapeError> {
        let url = format!(
            "{}{}",
            self.endpoints.sink_base_url, self.endpoints.sink_auth_endpoint
        );
        debug!("Requesting downstream token from {}", url);

        let body = self
            .transport
            .get(&url, &[("x-api-key", self.endpoints.sink_api_key.as_str())])
            .await
            .map_err(|e| {
                error!("Error while generating token for MoneyBS: {}", e);
                ScrapeError::Auth(e.to_string())
            })?;

        let token = String::from_utf8_lossy(&body).trim().to_string();
        if token.is_empty() {
            error!("MoneyBS returned an empty token");
            return Err(ScrapeError::Auth("empty token".to_string()));
        }

        Ok(DownstreamToken(token))
    }

    /// POST `payload` to `sink_base_url + endpoint_template` with `{key}` filled in.
    pub async fn forward(
        &self,
        token: &DownstreamToken,
        endpoint_template: &str,
        key: &str,
        content_type: &str,
        payload: Vec<u8>,
    ) -> Result<(), ScrapeError> {
        let url = format!(
            "{}{}",
            self.endpoints.sink_base_url,
            template::render(endpoint_template, &[("key", key)])
        );
        let authorization = token.authorization();

        self.transport
            .post(
                &url,
                &[("Authorization", authorization.as_str())],
                content_type,
                payload,
            )
            .await
            .map_err(|e| {
                error!("Error forwarding payload for {} to MoneyBS: {}", key, e);
                ScrapeError::Forward(e.to_string())
            })?;

        info!("Forwarded payload for {} to {}", key, url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ScriptedTransport, test_endpoints};

    #[tokio::test]
    async fn test_authenticate_uses_api_key_and_body_as_token() {
        let endpoints = test_endpoints();
        let auth_url = format!("{}{}", endpoints.sink_base_url, endpoints.sink_auth_endpoint);
        let transport = Arc::new(ScriptedTransport::new().with_page(&auth_url, b"tok-123\n".to_vec()));
        let downstream = Downstream::new(transport.clone(), Arc::new(endpoints));

        let token = downstream.authenticate().await.unwrap();

        assert_eq!(token, DownstreamToken("tok-123".to_string()));
        let gets = transport.gets();
        assert_eq!(gets.len(), 1);
        assert_eq!(
            gets[0].headers,
            vec![("x-api-key".to_string(), "sink-key".to_string())]
        );
    }

    #[tokio::test]
    async fn test_authenticate_failure_is_auth_error() {
        let transport = Arc::new(ScriptedTransport::new());
        let downstream = Downstream::new(transport, Arc::new(test_endpoints()));

        let err = downstream.authenticate().await.unwrap_err();
        assert!(matches!(err, ScrapeError::Auth(_)));
    }

    #[tokio::test]
    async fn test_empty_token_is_auth_error() {
        let endpoints = test_endpoints();
        let auth_url = format!("{}{}", endpoints.sink_base_url, endpoints.sink_auth_endpoint);
        let transport = Arc::new(ScriptedTransport::new().with_page(&auth_url, b"  ".to_vec()));
        let downstream = Downstream::new(transport, Arc::new(endpoints));

        let err = downstream.authenticate().await.unwrap_err();
        assert!(matches!(err, ScrapeError::Auth(_)));
    }

    #[tokio::test]
    async fn test_forward_attaches_bearer_and_fills_key() {
        let transport = Arc::new(ScriptedTransport::new());
        let downstream = Downstream::new(transport.clone(), Arc::new(test_endpoints()));
        let token = DownstreamToken("tok".to_string());

        downstream
            .forward(&token, "/dividends/{key}", "RELIANCE", "application/json", b"[]".to_vec())
            .await
            .unwrap();

        let posts = transport.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].url, "https://sink.test/dividends/RELIANCE");
        assert_eq!(
            posts[0].headers,
            vec![("Authorization".to_string(), "Bearer tok".to_string())]
        );
        assert_eq!(posts[0].body, b"[]".to_vec());
    }

    #[tokio::test]
    async fn test_rejected_forward_is_forward_error() {
        let transport = Arc::new(ScriptedTransport::new().with_post_failure("status 401"));
        let downstream = Downstream::new(transport, Arc::new(test_endpoints()));
        let token = DownstreamToken("tok".to_string());

        let err = downstream
            .forward(&token, "/dividends/{key}", "RELIANCE", "application/json", Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Forward(_)));
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let token = DownstreamToken("secret".to_string());
        assert_eq!(format!("{:?}", token), "DownstreamToken(***)");
    }
}
