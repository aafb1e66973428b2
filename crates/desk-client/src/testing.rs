//! Scripted transport double for tests.
//!
//! Mirrors the shape of the production transport: responses are queued per
//! call, a default outcome covers everything else, and every assembled
//! request is recorded for assertions.

use crate::http::{HttpRequest, HttpResponse, HttpTransport, TransportError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Outcome the mock returns for one call.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// A full response (status, content type, body).
    Response(HttpResponse),
    /// Network-level failure: no response received.
    NetworkError(String),
}

impl MockOutcome {
    /// A JSON response.
    pub fn json(status: u16, body: &Value) -> Self {
        MockOutcome::Response(HttpResponse {
            status,
            content_type: Some("application/json".to_string()),
            body: body.to_string(),
        })
    }

    /// A response with an arbitrary content type.
    pub fn text(status: u16, content_type: Option<&str>, body: &str) -> Self {
        MockOutcome::Response(HttpResponse {
            status,
            content_type: content_type.map(String::from),
            body: body.to_string(),
        })
    }
}

/// In-memory transport with a scripted response queue and a request log.
pub struct MockTransport {
    queue: Mutex<VecDeque<MockOutcome>>,
    default: Mutex<MockOutcome>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    /// Create a transport whose default outcome is `200 {}`.
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            default: Mutex::new(MockOutcome::json(200, &Value::Object(Default::default()))),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue an outcome for the next unscripted call.
    pub fn queue(&self, outcome: MockOutcome) {
        self.queue.lock().unwrap().push_back(outcome);
    }

    /// Queue a JSON response.
    pub fn queue_json(&self, status: u16, body: Value) {
        self.queue(MockOutcome::json(status, &body));
    }

    /// Queue a network-level failure.
    pub fn queue_network_error(&self, message: &str) {
        self.queue(MockOutcome::NetworkError(message.to_string()));
    }

    /// Set the outcome used when the queue is empty.
    pub fn set_default(&self, outcome: MockOutcome) {
        *self.default.lock().unwrap() = outcome;
    }

    /// All requests seen so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests seen so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// The most recent request, if any.
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// Clear the request log.
    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);

        let outcome = {
            let mut queue = self.queue.lock().unwrap();
            queue
                .pop_front()
                .unwrap_or_else(|| self.default.lock().unwrap().clone())
        };

        match outcome {
            MockOutcome::Response(response) => Ok(response),
            MockOutcome::NetworkError(message) => Err(TransportError::Connect(message)),
        }
    }
}
