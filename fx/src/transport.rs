//! HTTP transport seam between the upstream client and the network.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::{excerpt, FxError, FxResult};
use crate::resilience::Outcome;

/// Raw upstream response: status plus body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }
}

impl Outcome for HttpResponse {
    fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn failure(&self) -> FxError {
        FxError::UpstreamResponse {
            status: self.status,
            excerpt: excerpt(&self.body),
        }
    }
}

/// Something that can perform a GET and hand back status and body.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issue `GET url`. Only failures to obtain a response are errors;
    /// non-2xx statuses come back as `Ok`.
    async fn get(&self, url: &str) -> FxResult<HttpResponse>;
}

/// Production transport backed by `reqwest`.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client with the given per-request timeout.
    pub fn new(request_timeout: Duration) -> FxResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| FxError::Transport(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> FxResult<HttpResponse> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FxError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| FxError::Transport(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}

/// Scripted transport for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockTransport {
    script: parking_lot::Mutex<std::collections::VecDeque<FxResult<HttpResponse>>>,
    fallback: parking_lot::Mutex<Option<HttpResponse>>,
    requests: parking_lot::Mutex<Vec<String>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockTransport {
    /// Create a transport with an empty script.
    pub fn new() -> Self {
        Self {
            script: parking_lot::Mutex::new(std::collections::VecDeque::new()),
            fallback: parking_lot::Mutex::new(None),
            requests: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// Queue one response.
    pub fn push(&self, response: HttpResponse) {
        self.script.lock().push_back(Ok(response));
    }

    /// Queue one transport failure.
    pub fn push_error(&self, error: FxError) {
        self.script.lock().push_back(Err(error));
    }

    /// Response returned once the script is exhausted.
    pub fn set_fallback(&self, response: HttpResponse) {
        *self.fallback.lock() = Some(response);
    }

    /// Number of requests performed.
    pub fn hits(&self) -> usize {
        self.requests.lock().len()
    }

    /// Every URL requested, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl HttpTransport for MockTransport {
    async fn get(&self, url: &str) -> FxResult<HttpResponse> {
        self.requests.lock().push(url.to_string());
        if let Some(next) = self.script.lock().pop_front() {
            return next;
        }
        self.fallback
            .lock()
            .clone()
            .ok_or_else(|| FxError::Transport(format!("no scripted response for {}", url)))
    }
}
