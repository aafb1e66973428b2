//! CSRF double-submit token handling.

use crate::CookieSource;
use reqwest::Method;

/// Cookie name the server uses for the CSRF double-submit value.
pub const CSRF_COOKIE_NAME: &str = "csrftoken";

/// Header the server expects the CSRF value echoed on.
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Read the CSRF token from the cookie store.
///
/// Returns the percent-decoded value, or `None` when the cookie is absent.
/// A malformed value degrades to `None` rather than failing; a missing token
/// is not an error here (the server rejects the request if it required one).
pub fn csrf_token(cookies: &dyn CookieSource) -> Option<String> {
    let raw = cookies.cookie(CSRF_COOKIE_NAME)?;
    match urlencoding::decode(&raw) {
        Ok(decoded) => Some(decoded.into_owned()),
        Err(_) => {
            tracing::debug!("Ignoring malformed CSRF cookie value");
            None
        }
    }
}

/// True for methods that must carry the CSRF header.
pub fn requires_csrf(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}
