//! Cookie helpers.

use axum::http::header::{InvalidHeaderValue, COOKIE};
use axum::http::{HeaderMap, HeaderValue};

/// Carries the signed identity token.
pub const TOKEN_COOKIE: &str = "token";

/// Carries the password reset workflow session id.
pub const RESET_COOKIE: &str = "reset_session";

/// Value of cookie `name`, across all `Cookie` headers.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value for an HTTP-only cookie scoped to `/`.
pub fn set_cookie(name: &str, value: &str, max_age_secs: i64, secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
        name, value, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// `Set-Cookie` value expiring cookie `name` immediately.
pub fn clear_cookie(name: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    HeaderValue::from_str(&format!(
        "{}=; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Path=/; HttpOnly; SameSite=Lax",
        name
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; token=abc.def.ghi"));
        headers.append(COOKIE, HeaderValue::from_static("reset_session=42"));

        assert_eq!(read_cookie(&headers, TOKEN_COOKIE).as_deref(), Some("abc.def.ghi"));
        assert_eq!(read_cookie(&headers, RESET_COOKIE).as_deref(), Some("42"));
        assert!(read_cookie(&headers, "missing").is_none());
    }

    #[test]
    fn test_set_and_clear() {
        let value = set_cookie(TOKEN_COOKIE, "abc", 7200, true).unwrap();
        let value = value.to_str().unwrap();
        assert!(value.starts_with("token=abc;"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("Max-Age=7200"));
        assert!(value.ends_with("; Secure"));

        let cleared = clear_cookie(TOKEN_COOKIE).unwrap();
        assert!(cleared.to_str().unwrap().starts_with("token=; Max-Age=0"));
    }
}
