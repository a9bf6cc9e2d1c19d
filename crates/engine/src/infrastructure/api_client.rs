//! Queued client for an OpenAI-compatible chat API.
//!
//! Every queued request is answered exactly once through a oneshot channel.
//! The queue is drained one request per [`ApiClient::drain_one`] call, gated
//! by the fixed-window [`RateLimiter`] which only advances on
//! [`ApiClient::tick`].

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::task::{Context, Poll};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::infrastructure::ports::{Headers, HttpMethod, Transport, TransportResult};
use crate::infrastructure::rate_limiter::RateLimiter;

/// Default provider base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub const CHAT_COMPLETIONS_ENDPOINT: &str = "/chat/completions";
pub const IMAGE_GENERATIONS_ENDPOINT: &str = "/images/generations";

const AUTHORIZATION: &str = "Authorization";
const CONTENT_TYPE: &str = "Content-Type";
const APPLICATION_JSON: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Model and sampling parameters for one call site.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatOptions {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ChatOptions {
    pub fn new(model: impl Into<String>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            temperature,
            max_tokens,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ImageGenerationBody<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'a str,
    n: u32,
}

pub fn build_chat_completion_body(messages: &[ChatMessage], options: &ChatOptions) -> String {
    encode_body(&ChatCompletionBody {
        model: &options.model,
        messages,
        temperature: options.temperature,
        max_tokens: options.max_tokens,
    })
}

pub fn build_image_generation_body(prompt: &str, model: &str, size: &str, n: u32) -> String {
    encode_body(&ImageGenerationBody {
        model,
        prompt,
        size,
        n,
    })
}

fn encode_body<T: Serialize>(body: &T) -> String {
    serde_json::to_string(body).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to encode request body");
        "{}".to_string()
    })
}

/// A request waiting in the queue together with the channel that answers it.
struct QueuedRequest {
    endpoint: String,
    method: HttpMethod,
    headers: Headers,
    body: String,
    reply: oneshot::Sender<TransportResult>,
}

/// Resolves to the [`TransportResult`] of a queued request.
///
/// If the request is discarded before it is sent (see
/// [`ApiClient::clear_queue`]) this resolves to a failed result instead.
#[must_use = "a queued request is still sent, but its result is lost"]
pub struct PendingResponse {
    reply: oneshot::Receiver<TransportResult>,
}

impl Future for PendingResponse {
    type Output = TransportResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.reply).poll(cx).map(|result| {
            result.unwrap_or_else(|_| TransportResult::failed("request dropped before it was sent"))
        })
    }
}

/// Connection parameters that the host may change at runtime.
#[derive(Debug, Clone)]
struct Credentials {
    api_key: String,
    base_url: String,
}

/// Snapshot of the rate window, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateState {
    pub requests_in_window: u32,
    pub elapsed: Duration,
    pub capacity: u32,
}

pub struct ApiClient {
    transport: Arc<dyn Transport>,
    credentials: RwLock<Credentials>,
    queue: Mutex<VecDeque<QueuedRequest>>,
    rate: Mutex<RateLimiter>,
    draining: AtomicBool,
}

/// Clears the single-flight flag even if the drain future is dropped mid-flight.
struct DrainGuard<'a>(&'a AtomicBool);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, api_key: impl Into<String>) -> Self {
        Self::with_rate_limit(transport, api_key, RateLimiter::default())
    }

    pub fn with_rate_limit(
        transport: Arc<dyn Transport>,
        api_key: impl Into<String>,
        limiter: RateLimiter,
    ) -> Self {
        Self {
            transport,
            credentials: RwLock::new(Credentials {
                api_key: api_key.into(),
                base_url: DEFAULT_BASE_URL.to_string(),
            }),
            queue: Mutex::new(VecDeque::new()),
            rate: Mutex::new(limiter),
            draining: AtomicBool::new(false),
        }
    }

    pub fn set_api_key(&self, api_key: impl Into<String>) {
        self.credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .api_key = api_key.into();
    }

    /// Trailing slashes are trimmed so endpoints can be appended directly.
    pub fn set_base_url(&self, base_url: &str) {
        self.credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .base_url = base_url.trim_end_matches('/').to_string();
    }

    pub fn base_url(&self) -> String {
        self.credentials().base_url
    }

    pub fn set_timeout(&self, timeout: Duration) {
        self.transport.set_timeout(timeout);
    }

    fn credentials(&self) -> Credentials {
        self.credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn lock_queue(&self) -> MutexGuard<'_, VecDeque<QueuedRequest>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_rate(&self) -> MutexGuard<'_, RateLimiter> {
        self.rate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Queue
    // =========================================================================

    /// Append a request to the back of the queue.
    ///
    /// The request is queued when this returns, so queue order is call order
    /// regardless of when the returned future is first polled.
    pub fn enqueue(&self, endpoint: &str, method: HttpMethod, body: String) -> PendingResponse {
        self.enqueue_with_headers(endpoint, method, Headers::new(), body)
    }

    pub fn enqueue_with_headers(
        &self,
        endpoint: &str,
        method: HttpMethod,
        headers: Headers,
        body: String,
    ) -> PendingResponse {
        let (reply, receiver) = oneshot::channel();
        let mut queue = self.lock_queue();
        queue.push_back(QueuedRequest {
            endpoint: endpoint.to_string(),
            method,
            headers,
            body,
            reply,
        });
        tracing::debug!(endpoint, %method, pending = queue.len(), "Request queued");
        PendingResponse { reply: receiver }
    }

    pub fn has_pending_requests(&self) -> bool {
        !self.lock_queue().is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.lock_queue().len()
    }

    /// Drop every queued request. Their futures resolve to a failed result.
    pub fn clear_queue(&self) {
        let dropped = std::mem::take(&mut *self.lock_queue());
        if !dropped.is_empty() {
            tracing::info!(count = dropped.len(), "Cleared request queue");
        }
    }

    // =========================================================================
    // Rate window
    // =========================================================================

    pub fn tick(&self, elapsed: Duration) {
        if self.lock_rate().advance(elapsed) {
            tracing::trace!("Rate window reset");
        }
    }

    pub fn can_make_request(&self) -> bool {
        self.lock_rate().can_make_request()
    }

    pub fn rate_state(&self) -> RateState {
        let rate = self.lock_rate();
        RateState {
            requests_in_window: rate.requests_in_window(),
            elapsed: rate.elapsed(),
            capacity: rate.capacity(),
        }
    }

    /// Send the oldest queued request, if allowed.
    ///
    /// Returns `false` without touching the queue when another drain is in
    /// flight, the queue is empty, or the rate window is exhausted.
    pub async fn drain_one(&self) -> bool {
        if self
            .draining
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        let _guard = DrainGuard(&self.draining);

        if !self.can_make_request() {
            return false;
        }
        let Some(request) = self.lock_queue().pop_front() else {
            return false;
        };

        let result = self
            .send(&request.endpoint, request.method, &request.headers, &request.body)
            .await;
        self.lock_rate().record_request();

        if request.reply.send(result).is_err() {
            tracing::debug!(endpoint = %request.endpoint, "Response receiver dropped");
        }
        true
    }

    // =========================================================================
    // Immediate path
    // =========================================================================

    /// Perform a request right away, skipping the queue and the rate window.
    pub async fn send_immediately(
        &self,
        endpoint: &str,
        method: HttpMethod,
        body: &str,
    ) -> TransportResult {
        self.send(endpoint, method, &Headers::new(), body).await
    }

    async fn send(
        &self,
        endpoint: &str,
        method: HttpMethod,
        extra_headers: &Headers,
        body: &str,
    ) -> TransportResult {
        let credentials = self.credentials();
        let headers = build_headers(extra_headers, &credentials.api_key);
        let url = format!("{}{}", credentials.base_url, endpoint);

        let result = match method {
            HttpMethod::Post => self.transport.post(&url, &headers, body).await,
            HttpMethod::Get => self.transport.get(&url, &headers).await,
        };

        if result.success {
            tracing::debug!(%method, endpoint, status = result.status, "Request completed");
        } else {
            tracing::warn!(
                %method,
                endpoint,
                status = result.status,
                error = result.error_message(),
                "Request failed"
            );
        }
        result
    }

    // =========================================================================
    // Provider helpers
    // =========================================================================

    pub fn chat_completion(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> PendingResponse {
        let body = build_chat_completion_body(messages, options);
        self.enqueue(CHAT_COMPLETIONS_ENDPOINT, HttpMethod::Post, body)
    }

    pub async fn chat_completion_immediately(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> TransportResult {
        let body = build_chat_completion_body(messages, options);
        self.send_immediately(CHAT_COMPLETIONS_ENDPOINT, HttpMethod::Post, &body)
            .await
    }

    pub fn image_generation(
        &self,
        prompt: &str,
        model: &str,
        size: &str,
        n: u32,
    ) -> PendingResponse {
        let body = build_image_generation_body(prompt, model, size, n);
        self.enqueue(IMAGE_GENERATIONS_ENDPOINT, HttpMethod::Post, body)
    }
}

/// Caller headers first, then auth and content type, which always win.
fn build_headers(extra: &Headers, api_key: &str) -> Headers {
    let mut headers: Headers = extra
        .iter()
        .filter(|(name, _)| {
            !name.eq_ignore_ascii_case(AUTHORIZATION) && !name.eq_ignore_ascii_case(CONTENT_TYPE)
        })
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    headers.insert(AUTHORIZATION.to_string(), format!("Bearer {api_key}"));
    headers.insert(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string());
    headers
}
