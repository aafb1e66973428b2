//! API error taxonomy and response payloads.

use serde_json::Value;
use thiserror::Error;

/// A classified response body.
///
/// JSON bodies are parsed into structured data; everything else is carried
/// as raw text. Domain entities stay untyped and are passed through.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Parsed JSON body.
    Json(Value),
    /// Raw text body (non-JSON content type).
    Text(String),
}

impl Payload {
    /// Borrow the JSON value, if this payload is JSON.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            Payload::Text(_) => None,
        }
    }

    /// Consume into the JSON value, if this payload is JSON.
    pub fn into_json(self) -> Option<Value> {
        match self {
            Payload::Json(value) => Some(value),
            Payload::Text(_) => None,
        }
    }

    /// Look up a string field on a JSON object payload.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.as_json()?.get(key)?.as_str()
    }
}

/// API error type.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The server answered with a non-success status code. The parsed body
    /// is attached so callers can extract field-level validation messages.
    #[error("API request failed with HTTP {status}")]
    Status {
        /// Transport-level status code.
        status: u16,
        /// Parsed response body.
        payload: Payload,
    },

    /// No response was received (connection refused, DNS failure, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// The response claimed JSON but the body did not parse.
    #[error("Response decode error: {0}")]
    Decode(String),

    /// Request body serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parse error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// The HTTP status code, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The parsed response payload, when a response was received.
    pub fn payload(&self) -> Option<&Payload> {
        match self {
            ApiError::Status { payload, .. } => Some(payload),
            _ => None,
        }
    }

    /// Returns true if this error is transient and the request can be retried.
    ///
    /// Transient errors are those with no status code at all (network-level
    /// failure) and server errors (5xx). Client errors (4xx) are terminal.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Network(_) => true,
            ApiError::Status { status, .. } => *status >= 500,
            ApiError::Http(e) => {
                if e.is_connect() || e.is_timeout() {
                    return true;
                }
                if let Some(status) = e.status() {
                    return status.is_server_error();
                }
                false
            }
            _ => false,
        }
    }

    /// Extract the most specific user-facing message available.
    ///
    /// Priority order: server `detail` field, server `error` field, server
    /// `message` field, transport-level message, then the given fallback.
    pub fn user_message(&self, fallback: &str) -> String {
        if let Some(payload) = self.payload() {
            for key in ["detail", "error", "message"] {
                if let Some(text) = payload.str_field(key) {
                    return text.to_string();
                }
            }
            return fallback.to_string();
        }

        match self {
            ApiError::Network(message) => message.clone(),
            ApiError::Http(e) => e.to_string(),
            _ => fallback.to_string(),
        }
    }
}

/// Result type alias using ApiError.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn network_error_is_transient() {
        assert!(ApiError::Network("connection refused".to_string()).is_transient());
    }

    #[test]
    fn server_error_is_transient() {
        let error = ApiError::Status {
            status: 503,
            payload: Payload::Text("unavailable".to_string()),
        };
        assert!(error.is_transient());
    }

    #[test]
    fn client_error_is_terminal() {
        let error = ApiError::Status {
            status: 404,
            payload: Payload::Text("not found".to_string()),
        };
        assert!(!error.is_transient());
    }

    #[test]
    fn decode_error_is_terminal() {
        assert!(!ApiError::Decode("unexpected eof".to_string()).is_transient());
    }

    #[test]
    fn user_message_prefers_detail() {
        let error = ApiError::Status {
            status: 401,
            payload: Payload::Json(json!({
                "detail": "Invalid credentials",
                "error": "auth_failed",
            })),
        };
        assert_eq!(error.user_message("fallback"), "Invalid credentials");
    }

    #[test]
    fn user_message_falls_through_fields() {
        let error = ApiError::Status {
            status: 400,
            payload: Payload::Json(json!({"message": "Title is required"})),
        };
        assert_eq!(error.user_message("fallback"), "Title is required");
    }

    #[test]
    fn user_message_uses_transport_message_without_payload() {
        let error = ApiError::Network("connection refused".to_string());
        assert_eq!(error.user_message("fallback"), "connection refused");
    }

    #[test]
    fn user_message_falls_back_on_opaque_payload() {
        let error = ApiError::Status {
            status: 500,
            payload: Payload::Text("<html>oops</html>".to_string()),
        };
        assert_eq!(error.user_message("fallback"), "fallback");
    }
}
