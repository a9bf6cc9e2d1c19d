//! reqwest-backed HTTP transport.

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};

use crate::infrastructure::ports::{Headers, Transport, TransportResult};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct ReqwestTransport {
    client: Client,
    timeout: RwLock<Duration>,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout: RwLock::new(timeout),
        }
    }

    async fn execute(&self, request: RequestBuilder, headers: &Headers) -> TransportResult {
        let request = headers
            .iter()
            .fold(request, |request, (name, value)| request.header(name, value))
            .timeout(self.timeout());

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return TransportResult::failed(format!("request timed out: {e}"));
            }
            Err(e) => return TransportResult::failed(e.to_string()),
        };

        let status = response.status().as_u16();
        let response_headers: Headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();

        match response.text().await {
            Ok(body) => TransportResult::from_response(status, body, response_headers),
            Err(e) => TransportResult::failed(format!("failed to read response body: {e}")),
        }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post(&self, url: &str, headers: &Headers, body: &str) -> TransportResult {
        let request = self.client.post(url).body(body.to_string());
        self.execute(request, headers).await
    }

    async fn get(&self, url: &str, headers: &Headers) -> TransportResult {
        let request = self.client.get(url);
        self.execute(request, headers).await
    }

    fn set_timeout(&self, timeout: Duration) {
        *self.timeout.write().unwrap_or_else(PoisonError::into_inner) = timeout;
    }

    fn timeout(&self) -> Duration {
        *self.timeout.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_adjustable() {
        let transport = ReqwestTransport::default();
        assert_eq!(transport.timeout(), DEFAULT_TIMEOUT);
        transport.set_timeout(Duration::from_secs(5));
        assert_eq!(transport.timeout(), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn connection_failure_is_a_failed_result() {
        let transport = ReqwestTransport::new(Duration::from_secs(2));
        let result = transport
            .post("http://127.0.0.1:9/chat/completions", &Headers::new(), "{}")
            .await;
        assert!(!result.success);
        assert_eq!(result.status, 0);
        assert!(result.error.is_some());
    }
}
