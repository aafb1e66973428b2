//! Cookie access abstraction.
//!
//! `CookieSource` is the seam between CSRF extraction and the real cookie jar,
//! so request-building logic is testable with an in-memory map.

use reqwest::cookie::CookieStore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use url::Url;

/// Read access to the ambient cookie store.
///
/// Implementations never fail: a cookie is either present or it is not.
pub trait CookieSource: Send + Sync {
    /// Return the raw (still percent-encoded) value of the named cookie.
    fn cookie(&self, name: &str) -> Option<String>;
}

/// Cookie source backed by a shared `reqwest` cookie jar.
///
/// The jar is also installed as the HTTP client's cookie provider, so the
/// session cookie set by the server is carried on every request without the
/// application ever touching it.
#[derive(Clone)]
pub struct JarCookies {
    jar: Arc<reqwest::cookie::Jar>,
    origin: Url,
}

impl JarCookies {
    /// Create a cookie source reading cookies scoped to the given API origin.
    pub fn new(jar: Arc<reqwest::cookie::Jar>, origin: Url) -> Self {
        Self { jar, origin }
    }

    /// The underlying jar, for installing into a `reqwest::Client`.
    pub fn jar(&self) -> Arc<reqwest::cookie::Jar> {
        self.jar.clone()
    }
}

impl CookieSource for JarCookies {
    fn cookie(&self, name: &str) -> Option<String> {
        let header = self.jar.cookies(&self.origin)?;
        let header = header.to_str().ok()?;

        for pair in header.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let key = parts.next()?.trim();
            if key == name {
                return parts.next().map(|v| v.trim().to_string());
            }
        }
        None
    }
}

impl std::fmt::Debug for JarCookies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JarCookies")
            .field("origin", &self.origin.as_str())
            .finish_non_exhaustive()
    }
}

/// In-memory cookie map used as a test double.
#[derive(Debug, Default)]
pub struct MemoryCookies {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryCookies {
    /// Create an empty cookie map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a cookie value.
    pub fn set(&self, name: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(name.to_string(), value.to_string());
    }

    /// Remove a cookie.
    pub fn remove(&self, name: &str) {
        self.values.lock().unwrap().remove(name);
    }

    /// Remove all cookies.
    pub fn clear(&self) {
        self.values.lock().unwrap().clear();
    }
}

impl CookieSource for MemoryCookies {
    fn cookie(&self, name: &str) -> Option<String> {
        self.values.lock().unwrap().get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_cookies_set_and_get() {
        let cookies = MemoryCookies::new();
        assert_eq!(cookies.cookie("csrftoken"), None);

        cookies.set("csrftoken", "abc123");
        assert_eq!(cookies.cookie("csrftoken"), Some("abc123".to_string()));

        cookies.remove("csrftoken");
        assert_eq!(cookies.cookie("csrftoken"), None);
    }

    #[test]
    fn jar_cookies_reads_named_cookie() {
        let jar = Arc::new(reqwest::cookie::Jar::default());
        let origin: Url = "https://desk.example.com".parse().unwrap();
        jar.add_cookie_str("csrftoken=tok-1; Path=/", &origin);
        jar.add_cookie_str("sessionid=opaque; Path=/", &origin);

        let source = JarCookies::new(jar, origin);
        assert_eq!(source.cookie("csrftoken"), Some("tok-1".to_string()));
        assert_eq!(source.cookie("sessionid"), Some("opaque".to_string()));
        assert_eq!(source.cookie("missing"), None);
    }
}
