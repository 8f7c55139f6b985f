use crate::CollectError;
use reqwest::Client as HttpClient;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Reads the current reading from the source API.
#[derive(Debug, Clone)]
pub struct SourceClient {
    http_client: HttpClient,
    url: Url,
    timeout: Duration,
}

impl SourceClient {
    pub fn new(http_client: HttpClient, url: Url, timeout: Duration) -> Self {
        Self {
            http_client,
            url,
            timeout,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// One GET, no retries. The timeout covers the whole exchange, body included.
    pub async fn fetch(&self) -> Result<Value, CollectError> {
        let response = self
            .http_client
            .get(self.url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CollectError::Status { status });
        }

        response.json::<Value>().await.map_err(|e| {
            if e.is_timeout() {
                CollectError::Unreachable(e)
            } else {
                CollectError::Transport(e)
            }
        })
    }
}

fn classify_send_error(e: reqwest::Error) -> CollectError {
    if e.is_connect() || e.is_timeout() || e.is_request() {
        CollectError::Unreachable(e)
    } else {
        CollectError::Transport(e)
    }
}
