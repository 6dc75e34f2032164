// ABOUTME: Secure cookie construction and parsing for the user_id session cookie
// ABOUTME: HttpOnly, SameSite=Lax (the OAuth callback is a cross-site redirect), Secure in production
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use http::{header, HeaderMap, HeaderValue};
use tracing::warn;

/// Session cookie name
pub const USER_ID_COOKIE: &str = "user_id";

/// Session lifetime: 30 days
pub const SESSION_MAX_AGE_SECS: i64 = 30 * 24 * 60 * 60;

/// Builder for a `Set-Cookie` header value
#[derive(Debug, Clone)]
pub struct SecureCookieConfig {
    name: String,
    value: String,
    max_age_secs: i64,
    http_only: bool,
    secure: bool,
}

impl SecureCookieConfig {
    /// `HttpOnly`, `SameSite=Lax` cookie on `/`
    #[must_use]
    pub const fn new(name: String, value: String, max_age_secs: i64) -> Self {
        Self {
            name,
            value,
            max_age_secs,
            http_only: true,
            secure: false,
        }
    }

    /// Restrict to HTTPS
    #[must_use]
    pub const fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Render the header value
    #[must_use]
    pub fn build(&self) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; Max-Age={}; SameSite=Lax",
            self.name, self.value, self.max_age_secs
        );
        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    fn append_to(&self, headers: &mut HeaderMap) {
        match HeaderValue::from_str(&self.build()) {
            Ok(value) => {
                headers.append(header::SET_COOKIE, value);
            }
            Err(e) => warn!(cookie = %self.name, error = %e, "Invalid cookie value"),
        }
    }
}

/// Set the session cookie
pub fn set_user_cookie(headers: &mut HeaderMap, user_id: &str, secure: bool) {
    SecureCookieConfig::new(
        USER_ID_COOKIE.to_owned(),
        user_id.to_owned(),
        SESSION_MAX_AGE_SECS,
    )
    .secure(secure)
    .append_to(headers);
}

/// Expire the session cookie
pub fn clear_user_cookie(headers: &mut HeaderMap, secure: bool) {
    SecureCookieConfig::new(USER_ID_COOKIE.to_owned(), String::new(), 0)
        .secure(secure)
        .append_to(headers);
}

/// Value of cookie `name` from the request `Cookie` headers
#[must_use]
pub fn get_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_cookie_attributes() {
        let mut headers = HeaderMap::new();
        set_user_cookie(&mut headers, "abc", true);
        let cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("user_id=abc"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=Lax"));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let mut headers = HeaderMap::new();
        clear_user_cookie(&mut headers, false);
        let cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.contains("Max-Age=0"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn test_get_cookie_value() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; user_id=1234; other=x"),
        );
        assert_eq!(get_cookie_value(&headers, "user_id").as_deref(), Some("1234"));
        assert_eq!(get_cookie_value(&headers, "missing"), None);
    }
}
