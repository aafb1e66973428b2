//! The API client: URL construction, header assembly, and the retry loop.

use crate::http::{classify, HttpRequest, HttpTransport, ReqwestTransport};
use crate::{ApiResult, Payload, RequestBody, RequestOptions, RetryPolicy};
use desk_transport::{csrf_token, requires_csrf, CookieSource, JarCookies, CSRF_HEADER};
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

/// HTTP client for the ITSM REST API.
///
/// One instance is shared by the whole application; construct it explicitly
/// and pass it down rather than reaching for a global.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    cookies: Arc<dyn CookieSource>,
    /// Base URL with any trailing slash normalized away.
    base_url: String,
    retry: RetryPolicy,
}

impl ApiClient {
    /// Create a client against the given API base URL.
    ///
    /// Builds a `reqwest` client with a shared cookie jar: the server-managed
    /// session cookie is stored and replayed by the jar, opaque to
    /// application code. Only the CSRF cookie is ever read back out.
    pub fn new(base_url: &str) -> ApiResult<Self> {
        let origin: Url = Url::parse(base_url)?;
        let jar = Arc::new(reqwest::cookie::Jar::default());
        let http = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .build()?;
        let cookies = JarCookies::new(jar, origin);

        Ok(Self {
            transport: Arc::new(ReqwestTransport::new(http)),
            cookies: Arc::new(cookies),
            base_url: normalize_base_url(base_url),
            retry: RetryPolicy::default(),
        })
    }

    /// Create a client over an explicit transport and cookie source.
    ///
    /// This is the constructor tests use with the mock transport and the
    /// in-memory cookie map.
    pub fn with_transport(
        base_url: &str,
        transport: Arc<dyn HttpTransport>,
        cookies: Arc<dyn CookieSource>,
    ) -> ApiResult<Self> {
        Url::parse(base_url)?;
        Ok(Self {
            transport,
            cookies,
            base_url: normalize_base_url(base_url),
            retry: RetryPolicy::default(),
        })
    }

    /// Replace the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The normalized base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The cookie source requests read the CSRF token from.
    pub fn cookies(&self) -> Arc<dyn CookieSource> {
        self.cookies.clone()
    }

    /// Build the absolute URL for a call.
    ///
    /// Absolute URLs pass through unchanged; relative paths are joined to the
    /// base URL, tolerating a missing leading slash.
    fn build_url(&self, path: &str) -> ApiResult<Url> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Ok(Url::parse(path)?);
        }
        if path.is_empty() {
            return Ok(Url::parse(&self.base_url)?);
        }
        let separator = if path.starts_with('/') { "" } else { "/" };
        Ok(Url::parse(&format!(
            "{}{}{}",
            self.base_url, separator, path
        ))?)
    }

    /// Execute a request against the API.
    ///
    /// This is the single chokepoint every other component calls through.
    /// Transient failures (network errors, 5xx) are retried up to the
    /// configured number of extra attempts with a fixed backoff; the last
    /// failure is re-raised once attempts are exhausted.
    pub async fn execute(&self, path: &str, options: RequestOptions) -> ApiResult<Payload> {
        let url = self.build_url(path)?;
        let retries = options.retries.unwrap_or(self.retry.max_retries);
        let request = self.assemble(url, &options)?;
        let request_id = Uuid::new_v4();

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            debug!(
                request_id = %request_id,
                method = %request.method,
                url = %request.url,
                attempt,
                "API request"
            );

            let outcome = match self.transport.send(request.clone()).await {
                Ok(response) => {
                    debug!(request_id = %request_id, status = response.status, "API response");
                    classify(response)
                }
                Err(e) => Err(e.into()),
            };

            match outcome {
                Ok(payload) => return Ok(payload),
                Err(error) => {
                    let exhausted = attempt > retries;
                    if exhausted || !self.retry.should_retry(&request.method, &error) {
                        debug!(
                            request_id = %request_id,
                            attempt,
                            error = %error,
                            "API request failed"
                        );
                        return Err(error);
                    }
                    warn!(
                        request_id = %request_id,
                        attempt,
                        error = %error,
                        "Transient API failure, retrying"
                    );
                    tokio::time::sleep(self.retry.backoff()).await;
                }
            }
        }
    }

    /// Assemble the wire request: headers, body encoding, CSRF.
    fn assemble(&self, url: Url, options: &RequestOptions) -> ApiResult<HttpRequest> {
        let mut headers: Vec<(String, String)> =
            vec![("Accept".to_string(), "application/json".to_string())];
        for (name, value) in &options.headers {
            set_header(&mut headers, name, value.clone());
        }

        // A structured body always goes out as JSON; a raw body keeps
        // whatever content type the caller gave it.
        let body = match &options.body {
            Some(RequestBody::Json(value)) => {
                set_header(&mut headers, "Content-Type", "application/json".to_string());
                Some(serde_json::to_vec(value)?)
            }
            Some(RequestBody::Raw { content_type, data }) => {
                if let Some(ct) = content_type {
                    set_header(&mut headers, "Content-Type", ct.clone());
                }
                Some(data.clone())
            }
            None => None,
        };

        if requires_csrf(&options.method) {
            if let Some(token) = csrf_token(self.cookies.as_ref()) {
                set_header(&mut headers, CSRF_HEADER, token);
            }
        }

        Ok(HttpRequest {
            method: options.method.clone(),
            url,
            headers,
            body,
        })
    }

    /// Convenience GET returning the parsed payload.
    pub async fn get(&self, path: &str) -> ApiResult<Payload> {
        self.execute(path, RequestOptions::get()).await
    }

    /// Convenience POST with a JSON body.
    pub async fn post(&self, path: &str, body: serde_json::Value) -> ApiResult<Payload> {
        self.execute(path, RequestOptions::post(body)).await
    }

    /// Convenience PATCH with a JSON body.
    pub async fn patch(&self, path: &str, body: serde_json::Value) -> ApiResult<Payload> {
        self.execute(path, RequestOptions::patch(body)).await
    }

    /// Convenience DELETE.
    pub async fn delete(&self, path: &str) -> ApiResult<Payload> {
        self.execute(path, RequestOptions::delete()).await
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Insert or replace a header, keeping one value per name.
fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: String) {
    headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
    headers.push((name.to_string(), value));
}
