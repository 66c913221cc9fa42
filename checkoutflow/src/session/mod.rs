//! Mutable checkout session state.
//!
//! A [`Session`] carries the cookie jar and the identifiers learned from
//! responses. It is owned by one pipeline run at a time; every step reads
//! it to build request headers and writes back what the response set.

mod cookies;

pub use cookies::{
    extract_cookies_from_curl, format_cookies_toml, load_cookie_file, missing_important_cookies,
    parse_cookie_file, parse_cookie_pairs, parse_set_cookie, SetCookie, IMPORTANT_COOKIES,
};

use crate::errors::ConfigError;
use crate::models::CartSummary;
use std::collections::BTreeMap;

/// Response headers that carry anti-forgery tokens to echo back.
const TOKEN_HEADERS: [&str; 2] = ["x-csrf-token", "x-xsrf-token"];

/// Cookie jar plus identifiers learned during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    cookies: BTreeMap<String, String>,
    tokens: BTreeMap<String, String>,
    cart_id: Option<String>,
    guest_id: Option<String>,
}

impl Session {
    /// Creates an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session from existing cookies.
    #[must_use]
    pub fn with_cookies(cookies: BTreeMap<String, String>) -> Self {
        Self {
            cookies,
            ..Self::default()
        }
    }

    /// Creates a session from a `Cookie:` header value.
    #[must_use]
    pub fn from_cookie_header(header: &str) -> Self {
        Self::with_cookies(parse_cookie_pairs(header))
    }

    /// All cookies.
    #[must_use]
    pub fn cookies(&self) -> &BTreeMap<String, String> {
        &self.cookies
    }

    /// A single cookie value.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Sets or replaces a cookie.
    pub fn set_cookie(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.cookies.insert(name.into(), value.into());
    }

    /// Removes a cookie.
    pub fn remove_cookie(&mut self, name: &str) -> Option<String> {
        self.cookies.remove(name)
    }

    /// Renders the jar as a `Cookie` header value, or `None` when empty.
    #[must_use]
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Names from `required` that are absent or empty.
    #[must_use]
    pub fn missing_cookies(&self, required: &[String]) -> Vec<String> {
        required
            .iter()
            .filter(|name| self.cookie(name).map_or(true, |v| v.trim().is_empty()))
            .cloned()
            .collect()
    }

    /// Fails if any cookie in `required` is absent or empty.
    pub fn ensure_cookies(&self, required: &[String]) -> Result<(), ConfigError> {
        let missing = self.missing_cookies(required);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingCookies(missing))
        }
    }

    /// Applies `Set-Cookie` and token headers from a response.
    ///
    /// Header names are matched case-insensitively. Returns the number of
    /// cookies added, replaced, or removed.
    pub fn absorb_response_headers(&mut self, headers: &[(String, String)]) -> usize {
        let mut changed = 0;
        for (name, value) in headers {
            let name = name.to_ascii_lowercase();
            if name == "set-cookie" {
                let Some(cookie) = parse_set_cookie(value) else {
                    continue;
                };
                if cookie.removes {
                    if self.cookies.remove(&cookie.name).is_some() {
                        changed += 1;
                    }
                } else if self.cookie(&cookie.name) != Some(cookie.value.as_str()) {
                    self.cookies.insert(cookie.name, cookie.value);
                    changed += 1;
                }
            } else if TOKEN_HEADERS.contains(&name.as_str()) && !value.trim().is_empty() {
                self.tokens.insert(name, value.trim().to_string());
            }
        }
        changed
    }

    /// Tokens to echo back as request headers.
    #[must_use]
    pub fn tokens(&self) -> &BTreeMap<String, String> {
        &self.tokens
    }

    /// Records identifiers from a refreshed cart.
    pub fn record_cart(&mut self, cart: &CartSummary) {
        if let Some(ref id) = cart.cart_id {
            self.cart_id = Some(id.clone());
        }
        if let Some(ref id) = cart.guest_id {
            self.guest_id = Some(id.clone());
        }
    }

    /// Cart identifier, once known.
    #[must_use]
    pub fn cart_id(&self) -> Option<&str> {
        self.cart_id.as_deref()
    }

    /// Guest user identifier, once known.
    #[must_use]
    pub fn guest_id(&self) -> Option<&str> {
        self.guest_id.as_deref()
    }
}
