//! Ethereum JSON-RPC client plumbing.
//!
//! - [`Transport`]: one request, one response, no retries
//! - [`HttpTransport`]: the `reqwest`-backed implementation with a deadline
//! - [`methods`]: typed `eth_getLogs` / `eth_getBalance` / `eth_call` helpers

pub mod error;
pub mod methods;
pub mod transport;
pub mod types;

pub use error::TransportError;
pub use transport::{HttpTransport, Transport, TransportConfig, DEFAULT_TIMEOUT};
pub use types::{BlockTag, CallRequest, LogEntry, LogFilter};
