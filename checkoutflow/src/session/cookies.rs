//! Cookie parsing helpers.
//!
//! Cookies come from three places: a `Cookie:` header copied out of a
//! browser, a curl command exported from the browser's network panel, and
//! `Set-Cookie` headers on responses.

use crate::errors::{CheckoutError, ConfigError};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

/// Cookies worth checking for when importing a browser session.
pub const IMPORTANT_COOKIES: [&str; 8] = [
    "ZGWID",
    "JSESSIONID",
    "datadome",
    "_abck",
    "bm_sz",
    "cart-guid",
    "ak_bmsc",
    "bm_sv",
];

static CURL_COOKIE_FLAG: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"(?:^|\s)(?:-b|--cookie)\s+(?:'([^']*)'|"([^"]*)")"#).ok()
});

static CURL_COOKIE_HEADER: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:-H|--header)\s+(?:'cookie:\s*([^']*)'|"cookie:\s*([^"]*)")"#).ok()
});

/// A parsed `Set-Cookie` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
    /// True when the header expires the cookie.
    pub removes: bool,
}

/// Parses `a=1; b=2` into name/value pairs. Malformed entries are skipped.
#[must_use]
pub fn parse_cookie_pairs(header: &str) -> BTreeMap<String, String> {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Parses a `Set-Cookie` header value.
///
/// An empty value, `Max-Age` of zero or less, or an `Expires` date in the
/// past marks the cookie for removal.
#[must_use]
pub fn parse_set_cookie(header: &str) -> Option<SetCookie> {
    let mut parts = header.split(';');
    let (name, value) = parts.next()?.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let value = value.trim().trim_matches('"').to_string();

    let mut removes = value.is_empty();
    for attribute in parts {
        let Some((key, attr_value)) = attribute.split_once('=') else {
            continue;
        };
        let attr_value = attr_value.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "max-age" => {
                if attr_value.parse::<i64>().is_ok_and(|age| age <= 0) {
                    removes = true;
                }
            }
            "expires" => {
                if chrono::DateTime::parse_from_rfc2822(attr_value)
                    .is_ok_and(|at| at < chrono::Utc::now())
                {
                    removes = true;
                }
            }
            _ => {}
        }
    }

    Some(SetCookie {
        name: name.to_string(),
        value,
        removes,
    })
}

/// Pulls the cookies out of a curl command.
///
/// Both `-b '...'` and `-H 'cookie: ...'` forms are recognized; later
/// occurrences override earlier ones.
#[must_use]
pub fn extract_cookies_from_curl(command: &str) -> BTreeMap<String, String> {
    let mut cookies = BTreeMap::new();
    for pattern in [&*CURL_COOKIE_FLAG, &*CURL_COOKIE_HEADER].into_iter().flatten() {
        for captures in pattern.captures_iter(command) {
            if let Some(raw) = captures.get(1).or_else(|| captures.get(2)) {
                cookies.extend(parse_cookie_pairs(raw.as_str()));
            }
        }
    }
    cookies
}

/// Parses cookie file contents.
///
/// Accepts a curl command, or lines that are each a `Cookie:` header, a
/// `name=value; name=value` list, or a TOML style `name = "value"` entry.
/// Blank lines, `#` comments, and `[section]` headers are ignored.
pub fn parse_cookie_file(contents: &str) -> Result<BTreeMap<String, String>, ConfigError> {
    if contents.trim_start().starts_with("curl ") {
        let cookies = extract_cookies_from_curl(contents);
        if cookies.is_empty() {
            return Err(ConfigError::invalid(
                "cookies",
                "curl command carries no cookies",
            ));
        }
        return Ok(cookies);
    }

    let mut cookies = BTreeMap::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
            continue;
        }
        let line = strip_header_name(line);
        if line.contains(';') || !line.contains(" = ") {
            cookies.extend(parse_cookie_pairs(line));
        } else if let Some((name, value)) = line.split_once('=') {
            cookies.insert(
                name.trim().to_string(),
                value.trim().trim_matches('"').to_string(),
            );
        }
    }
    Ok(cookies)
}

fn strip_header_name(line: &str) -> &str {
    match line.split_once(':') {
        Some((name, rest)) if name.trim().eq_ignore_ascii_case("cookie") => rest.trim(),
        _ => line,
    }
}

/// Reads and parses a cookie file.
pub fn load_cookie_file(path: &Path) -> Result<BTreeMap<String, String>, CheckoutError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(parse_cookie_file(&contents)?)
}

/// Returns the [`IMPORTANT_COOKIES`] absent from `cookies`, in list order.
#[must_use]
pub fn missing_important_cookies(cookies: &BTreeMap<String, String>) -> Vec<&'static str> {
    IMPORTANT_COOKIES
        .into_iter()
        .filter(|name| !cookies.contains_key(*name))
        .collect()
}

/// Renders cookies as a `[cookies]` TOML table.
pub fn format_cookies_toml(cookies: &BTreeMap<String, String>) -> Result<String, CheckoutError> {
    let mut table = BTreeMap::new();
    table.insert("cookies", cookies);
    toml::to_string(&table).map_err(|e| ConfigError::invalid("cookies", e.to_string()).into())
}
