//! HTTP transport seam.
//!
//! The executor talks to the network through `HttpTransport`, so the retry
//! and classification logic is testable against a scripted in-memory double
//! (see [`crate::testing`]).

use crate::{ApiError, Payload};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use thiserror::Error;
use url::Url;

/// A fully assembled request, ready for the wire.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Look up a header value by (case-insensitive) name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A raw response as seen by the classifier.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

/// Transport-level failure: no usable response was received.
#[derive(Error, Debug, Clone)]
pub enum TransportError {
    /// Connection could not be established or was dropped
    #[error("Connection failed: {0}")]
    Connect(String),

    /// The request timed out
    #[error("Operation timed out")]
    Timeout,
}

impl From<TransportError> for ApiError {
    fn from(error: TransportError) -> Self {
        ApiError::Network(error.to_string())
    }
}

/// Performs a single network exchange. No retries, no classification.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Production transport backed by a `reqwest::Client`.
///
/// The client is expected to carry the shared cookie jar so the session
/// cookie rides along on every request.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self.client.request(request.method, request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout
            } else {
                TransportError::Connect(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}

/// Classify a raw response into a payload or a typed failure.
///
/// Success range bodies with a JSON content type parse into structured data;
/// everything else is returned as text. Non-success statuses raise
/// `ApiError::Status` carrying whatever body could be parsed. A success
/// response that claims JSON but does not parse is a decode error, never a
/// panic.
pub(crate) fn classify(response: HttpResponse) -> Result<Payload, ApiError> {
    let success = (200..300).contains(&response.status);
    let claims_json = response
        .content_type
        .as_deref()
        .map(|ct| ct.contains("application/json"))
        .unwrap_or(false);

    let payload = if claims_json {
        match serde_json::from_str(&response.body) {
            Ok(value) => Payload::Json(value),
            Err(e) if success => return Err(ApiError::Decode(e.to_string())),
            // Broken JSON on an error response: keep the raw text so the
            // status failure still surfaces with whatever the server sent.
            Err(_) => Payload::Text(response.body),
        }
    } else {
        Payload::Text(response.body)
    };

    if success {
        Ok(payload)
    } else {
        Err(ApiError::Status {
            status: response.status,
            payload,
        })
    }
}
