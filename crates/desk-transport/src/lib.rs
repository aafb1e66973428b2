//! Credential transport for the desk client.
//!
//! The session credential is an opaque, server-managed cookie that application
//! code never reads; it rides along in the HTTP client's cookie jar. The only
//! cookie this crate reads back out is the non-secret CSRF double-submit value,
//! which must be echoed as a header on state-changing requests.

mod cookies;
mod csrf;

pub use cookies::{CookieSource, JarCookies, MemoryCookies};
pub use csrf::{csrf_token, requires_csrf, CSRF_COOKIE_NAME, CSRF_HEADER};
