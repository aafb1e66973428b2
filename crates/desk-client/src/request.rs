//! Request descriptors.

use reqwest::Method;
use serde_json::Value;

/// Request body variants.
///
/// Structured values are serialized to JSON and force the JSON content type;
/// raw payloads (file uploads, multipart bodies) pass through untouched and
/// never get a content type they did not ask for.
#[derive(Debug, Clone)]
pub enum RequestBody {
    /// Structured value, serialized as JSON.
    Json(Value),
    /// Opaque bytes with an optional caller-supplied content type.
    Raw {
        content_type: Option<String>,
        data: Vec<u8>,
    },
}

/// Per-call request options.
///
/// A value object constructed per call; `retries` of `None` defers to the
/// client's retry policy default.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<RequestBody>,
    pub headers: Vec<(String, String)>,
    pub retries: Option<u32>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            body: None,
            headers: Vec::new(),
            retries: None,
        }
    }
}

impl RequestOptions {
    /// A plain GET.
    pub fn get() -> Self {
        Self::default()
    }

    /// POST with a JSON body.
    pub fn post(body: Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(RequestBody::Json(body)),
            ..Self::default()
        }
    }

    /// POST with no body (auth endpoints, lifecycle actions).
    pub fn post_empty() -> Self {
        Self {
            method: Method::POST,
            ..Self::default()
        }
    }

    /// POST with an opaque payload (uploads). The content type, if any, is
    /// the caller's.
    pub fn post_raw(content_type: Option<&str>, data: Vec<u8>) -> Self {
        Self {
            method: Method::POST,
            body: Some(RequestBody::Raw {
                content_type: content_type.map(String::from),
                data,
            }),
            ..Self::default()
        }
    }

    /// PATCH with a JSON body (partial update).
    pub fn patch(body: Value) -> Self {
        Self {
            method: Method::PATCH,
            body: Some(RequestBody::Json(body)),
            ..Self::default()
        }
    }

    /// PUT with a JSON body.
    pub fn put(body: Value) -> Self {
        Self {
            method: Method::PUT,
            body: Some(RequestBody::Json(body)),
            ..Self::default()
        }
    }

    /// DELETE with no body.
    pub fn delete() -> Self {
        Self {
            method: Method::DELETE,
            ..Self::default()
        }
    }

    /// Add a header.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Override the number of extra attempts for this call.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }
}
