//! JSON-RPC transport abstraction and its HTTP implementation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chain_eth::hexstr::fragment;
use reqwest::{StatusCode, Url};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::TransportError;

/// Default per-request deadline for [`HttpTransport`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A JSON-RPC 2.0 endpoint.
///
/// One call to [`Transport::send`] is one request; implementations never
/// retry, so the caller decides what to do with a failure.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `method` with positional `params` and returns the `result` member.
    async fn send(&self, method: &str, params: Vec<Value>) -> Result<Value, TransportError>;
}

/// Connection settings for [`HttpTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub url: String,
    pub timeout: Duration,
}

impl TransportConfig {
    pub fn new(url: impl Into<String>) -> Self {
        TransportConfig {
            url: url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// JSON-RPC over HTTP POST.
///
/// Holds a `reqwest::Client`, so connection pooling is whatever reqwest
/// provides. Cheap to share by reference across concurrent tasks.
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: Url,
    next_id: AtomicU64,
}

impl HttpTransport {
    pub fn new(url: &str) -> Result<Self, TransportError> {
        Self::with_config(&TransportConfig::new(url))
    }

    pub fn with_config(config: &TransportConfig) -> Result<Self, TransportError> {
        let url = Url::parse(&config.url).map_err(|e| TransportError::InvalidEndpoint {
            url: config.url.clone(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(TransportError::InvalidEndpoint {
                url: config.url.clone(),
                reason: format!("unsupported scheme {:?}", url.scheme()),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(TransportError::Build)?;

        Ok(HttpTransport {
            client,
            url,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, method: &str, params: Vec<Value>) -> Result<Value, TransportError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        debug!(method, id, url = %self.url, "sending JSON-RPC request");

        let response = self
            .client
            .post(self.url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| request_error(method, e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| request_error(method, e))?;

        if status != StatusCode::OK {
            warn!(method, id, status = status.as_u16(), "JSON-RPC request rejected");
            return Err(TransportError::Status {
                method: method.to_string(),
                status: status.as_u16(),
                body: fragment(&body),
            });
        }

        let result = parse_response(method, &body);
        if let Err(e) = &result {
            warn!(method, id, error = %e, "JSON-RPC request failed");
        }
        result
    }
}

fn request_error(method: &str, source: reqwest::Error) -> TransportError {
    if source.is_timeout() {
        TransportError::Timeout {
            method: method.to_string(),
        }
    } else {
        TransportError::Http {
            method: method.to_string(),
            source,
        }
    }
}

/// Extracts `result` from a JSON-RPC response body, or the node's error.
pub fn parse_response(method: &str, body: &str) -> Result<Value, TransportError> {
    let mut response: Value =
        serde_json::from_str(body).map_err(|source| TransportError::InvalidJson {
            method: method.to_string(),
            fragment: fragment(body),
            source,
        })?;

    if let Some(error) = response.get("error").filter(|e| !e.is_null()) {
        return Err(TransportError::Rpc {
            method: method.to_string(),
            // -32603 is the JSON-RPC "internal error" code.
            code: error.get("code").and_then(Value::as_i64).unwrap_or(-32603),
            message: error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string(),
        });
    }

    match response.get_mut("result") {
        Some(result) => Ok(result.take()),
        None => Err(TransportError::MissingResult {
            method: method.to_string(),
        }),
    }
}
