//! External service port: the HTTP transport under the API client.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;

/// Header name to value. Ordered so requests are built deterministically.
pub type Headers = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one HTTP exchange.
///
/// Transport failures never surface as `Err`: they come back with
/// `success == false`, `status == 0` and an error message, so every
/// queued request resolves to exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransportResult {
    pub status: u16,
    pub body: String,
    pub headers: Headers,
    pub success: bool,
    pub error: Option<String>,
}

impl TransportResult {
    /// Wrap a completed response. Success means a 2xx status.
    pub fn from_response(status: u16, body: impl Into<String>, headers: Headers) -> Self {
        let body = body.into();
        let success = (200..300).contains(&status);
        let error = (!success).then(|| format!("HTTP {status}: {body}"));
        Self {
            status,
            body,
            headers,
            success,
            error,
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::from_response(200, body, Headers::new())
    }

    /// A request that never produced a response.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: 0,
            body: String::new(),
            headers: Headers::new(),
            success: false,
            error: Some(message.into()),
        }
    }

    pub fn error_message(&self) -> &str {
        self.error.as_deref().unwrap_or("unknown error")
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, url: &str, headers: &Headers, body: &str) -> TransportResult;

    async fn get(&self, url: &str, headers: &Headers) -> TransportResult;

    /// Applies to requests started after the call.
    fn set_timeout(&self, timeout: Duration);

    fn timeout(&self) -> Duration;
}
