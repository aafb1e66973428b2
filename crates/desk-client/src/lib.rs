//! Request executor for the desk client.
//!
//! This crate is the single chokepoint for all HTTP calls against the ITSM
//! REST API. It owns URL construction, body encoding, header assembly
//! (including the CSRF double-submit header), response classification into
//! typed payloads and errors, and the retry policy for transient failures.
//!
//! Layering: session state calls into this crate, never the other way around.

mod client;
mod error;
mod http;
mod request;
mod retry;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

#[cfg(test)]
mod tests;

pub use client::ApiClient;
pub use error::{ApiError, ApiResult, Payload};
pub use http::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError};
pub use request::{RequestBody, RequestOptions};
pub use retry::RetryPolicy;
