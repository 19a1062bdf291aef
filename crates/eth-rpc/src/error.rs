use thiserror::Error;

/// JSON-RPC transport errors.
///
/// Every variant that follows a request names the RPC method, so a failure
/// can be traced back to the call that produced it.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid RPC endpoint {url}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("failed to build HTTP client")]
    Build(#[source] reqwest::Error),

    #[error("{method} timed out")]
    Timeout { method: String },

    #[error("HTTP request for {method} failed")]
    Http {
        method: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} returned HTTP {status}: {body}")]
    Status {
        method: String,
        status: u16,
        body: String,
    },

    #[error("{method} returned malformed JSON: {fragment}")]
    InvalidJson {
        method: String,
        fragment: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{method} failed with RPC error {code}: {message}")]
    Rpc {
        method: String,
        code: i64,
        message: String,
    },

    #[error("{method} response has neither result nor error")]
    MissingResult { method: String },

    #[error("{method} returned an unexpected result shape")]
    UnexpectedResult {
        method: String,
        #[source]
        source: serde_json::Error,
    },
}

impl TransportError {
    /// The RPC method the failed request was for, when there was one.
    pub fn method(&self) -> Option<&str> {
        match self {
            TransportError::InvalidEndpoint { .. } | TransportError::Build(_) => None,
            TransportError::Timeout { method }
            | TransportError::Http { method, .. }
            | TransportError::Status { method, .. }
            | TransportError::InvalidJson { method, .. }
            | TransportError::Rpc { method, .. }
            | TransportError::MissingResult { method }
            | TransportError::UnexpectedResult { method, .. } => Some(method),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout { .. })
    }
}
