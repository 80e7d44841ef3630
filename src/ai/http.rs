use async_trait::async_trait;
use std::time::Duration;

use super::ExtractError;

/// JSON-over-HTTP seam so the model client can be tested without a network.
#[async_trait]
pub(crate) trait HttpTransport: Send + Sync + std::fmt::Debug {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, ExtractError>;
}

#[derive(Debug, Clone)]
pub(crate) struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub(crate) fn with_timeout(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, ExtractError> {
        let mut request = self.client.post(url);
        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request
            .json(body)
            .send()
            .await
            .map_err(|e| ExtractError::transport(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ExtractError::transport(format!("HTTP {status}: {error_body}")));
        }

        response
            .json()
            .await
            .map_err(|e| ExtractError::transport(format!("unreadable response body: {e}")))
    }
}
