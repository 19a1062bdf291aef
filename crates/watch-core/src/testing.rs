//! In-memory transport with canned responses, for flow tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use eth_rpc::{Transport, TransportError};
use serde_json::Value;

#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<String, VecDeque<Result<Value, TransportError>>>>,
    calls: Mutex<Vec<(String, Vec<Value>)>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful result for the next call to `method`.
    pub fn respond(self, method: &str, result: Value) -> Self {
        self.push(method, Ok(result));
        self
    }

    /// Queues a failure for the next call to `method`.
    pub fn fail(self, method: &str, error: TransportError) -> Self {
        self.push(method, Err(error));
        self
    }

    fn push(&self, method: &str, response: Result<Value, TransportError>) {
        self.responses
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_default()
            .push_back(response);
    }

    pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, method: &str, params: Vec<Value>) -> Result<Value, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), params));

        self.responses
            .lock()
            .unwrap()
            .get_mut(method)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(TransportError::MissingResult {
                    method: method.to_string(),
                })
            })
    }
}
