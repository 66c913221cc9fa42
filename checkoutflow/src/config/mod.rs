//! Run configuration loaded from TOML.
//!
//! A configuration file carries everything a run needs: retailer
//! connection settings, pipeline flags, the cookie jar, and the buyer's
//! contact, address, and card records.
//!
//! ```toml
//! [retailer]
//! base_url = "https://www.footlocker.com"
//!
//! [pipeline]
//! strict_cart_refresh = false
//!
//! [cookies]
//! JSESSIONID = "..."
//! ZGWID = "..."
//!
//! [contact]
//! first_name = "kazmi"
//! # ...
//! ```

use crate::encryption::EncryptionMode;
use crate::errors::{CheckoutError, ConfigError};
use crate::models::{BrowserInfo, ContactInfo, OrderOptions, PaymentInfo, ShippingAddress};
use crate::pipeline::{CheckoutInputs, PipelineOptions};
use crate::session::{load_cookie_file, Session};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Browser user agent sent by default.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36";

fn default_base_url() -> String {
    "https://www.footlocker.com".to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.9".to_string()
}

fn default_api_lang() -> String {
    "en-US".to_string()
}

fn default_timeout() -> f64 {
    30.0
}

/// Largest accepted request timeout, in seconds.
pub const MAX_TIMEOUT_SECONDS: f64 = 3600.0;

/// Cookies a run requires unless configured otherwise.
pub const DEFAULT_REQUIRED_COOKIES: [&str; 2] = ["JSESSIONID", "ZGWID"];

pub(crate) fn default_required_cookies() -> Vec<String> {
    DEFAULT_REQUIRED_COOKIES.iter().map(ToString::to_string).collect()
}

fn default_log_file() -> PathBuf {
    PathBuf::from("checkout.log")
}

/// Request paths, relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    /// Contact info submission.
    pub user_info: String,
    /// Address verification.
    pub address_verification: String,
    /// Shipping address on the cart.
    pub shipping_address: String,
    /// Cart refresh.
    pub updated_cart: String,
    /// Order placement.
    pub place_order: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            user_info: "/zgw/carts/co-cart-aggregation-service/site/fl/cart/userInfo".to_string(),
            address_verification: "/zgw/address-verification/v0/address/verification"
                .to_string(),
            shipping_address: "/zgw/carts-experience/carts-experience-service/site/fl/cart/address"
                .to_string(),
            updated_cart:
                "/zgw/carts-experience/carts-experience-service/site/fl/cart/getUpdatedCart"
                    .to_string(),
            place_order: "/zgw/carts/co-cart-aggregation-service/site/fl/cart/placeOrder"
                .to_string(),
        }
    }
}

impl Endpoints {
    fn entries(&self) -> [(&'static str, &str); 5] {
        [
            ("endpoints.user_info", &self.user_info),
            ("endpoints.address_verification", &self.address_verification),
            ("endpoints.shipping_address", &self.shipping_address),
            ("endpoints.updated_cart", &self.updated_cart),
            ("endpoints.place_order", &self.place_order),
        ]
    }
}

/// Retailer connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetailerConfig {
    /// Scheme and host, without trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// User agent header.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Accept-Language header.
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
    /// `x-api-lang` header.
    #[serde(default = "default_api_lang")]
    pub api_lang: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,
    /// Key for the address verification service.
    #[serde(default)]
    pub address_verification_key: Option<String>,
    /// Fixed device id; generated per run when absent.
    #[serde(default)]
    pub device_id: Option<String>,
    /// Additional static headers.
    #[serde(default)]
    pub extra_headers: BTreeMap<String, String>,
    /// Request paths.
    #[serde(default)]
    pub endpoints: Endpoints,
}

impl Default for RetailerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            api_lang: default_api_lang(),
            timeout_seconds: default_timeout(),
            address_verification_key: None,
            device_id: None,
            extra_headers: BTreeMap::new(),
            endpoints: Endpoints::default(),
        }
    }
}

impl RetailerConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the address verification key.
    #[must_use]
    pub fn with_address_verification_key(mut self, key: impl Into<String>) -> Self {
        self.address_verification_key = Some(key.into());
        self
    }

    /// Pins the device id.
    #[must_use]
    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    /// Adds a static header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(name.into(), value.into());
        self
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base())
    }

    /// Returns the timeout as a Duration.
    ///
    /// Values above [`MAX_TIMEOUT_SECONDS`] are capped; values that are not
    /// a valid duration fall back to the default.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_seconds.min(MAX_TIMEOUT_SECONDS))
            .unwrap_or_else(|_| Duration::from_secs_f64(default_timeout()))
    }

    /// Checks ranges and formats.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.base();
        let host = base
            .strip_prefix("https://")
            .or_else(|| base.strip_prefix("http://"));
        if host.map_or(true, str::is_empty) {
            return Err(ConfigError::invalid(
                "retailer.base_url",
                "must be an http(s) URL",
            ));
        }
        if !(self.timeout_seconds > 0.0 && self.timeout_seconds <= MAX_TIMEOUT_SECONDS) {
            return Err(ConfigError::invalid(
                "retailer.timeout_seconds",
                format!("must be positive and at most {MAX_TIMEOUT_SECONDS}"),
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::invalid("retailer.user_agent", "must not be empty"));
        }
        for (field, path) in self.endpoints.entries() {
            if !path.starts_with('/') {
                return Err(ConfigError::invalid(field, "must start with '/'"));
            }
        }
        Ok(())
    }
}

/// Pipeline flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Fail the run when the refreshed cart has no shipping address.
    #[serde(default)]
    pub strict_cart_refresh: bool,
    /// Cookies that must be present before the first request.
    #[serde(default = "default_required_cookies")]
    pub required_cookies: Vec<String>,
    /// Extra cookie file merged over `[cookies]`.
    #[serde(default)]
    pub cookie_file: Option<PathBuf>,
    /// Step log file.
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
    /// Payment encryptor used by configured runs.
    #[serde(default)]
    pub encryption: EncryptionMode,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            strict_cart_refresh: false,
            required_cookies: default_required_cookies(),
            cookie_file: None,
            log_file: default_log_file(),
            encryption: EncryptionMode::default(),
        }
    }
}

/// A complete run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// Retailer connection settings.
    #[serde(default)]
    pub retailer: RetailerConfig,
    /// Pipeline flags.
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Cookie jar.
    #[serde(default)]
    pub cookies: BTreeMap<String, String>,
    /// Buyer contact details.
    pub contact: ContactInfo,
    /// Shipping address.
    pub address: ShippingAddress,
    /// Card details.
    pub payment: PaymentInfo,
    /// Order flags.
    #[serde(default)]
    pub order: OrderOptions,
    /// Browser fingerprint.
    #[serde(default)]
    pub browser: BrowserInfo,
}

impl CheckoutConfig {
    /// Creates a configuration with default settings for the given records.
    #[must_use]
    pub fn new(contact: ContactInfo, address: ShippingAddress, payment: PaymentInfo) -> Self {
        Self {
            retailer: RetailerConfig::default(),
            pipeline: PipelineConfig::default(),
            cookies: BTreeMap::new(),
            contact,
            address,
            payment,
            order: OrderOptions::default(),
            browser: BrowserInfo::default(),
        }
    }

    /// Loads and validates a configuration file.
    ///
    /// A relative `pipeline.cookie_file` is resolved against the file's
    /// directory and merged into `cookies`.
    pub fn load(path: &Path) -> Result<Self, CheckoutError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;
        if let Some(cookie_file) = config.pipeline.cookie_file.clone() {
            let cookie_path = match path.parent() {
                Some(dir) if cookie_file.is_relative() => dir.join(cookie_file),
                _ => cookie_file,
            };
            config.merge_cookie_file(&cookie_path)?;
        }
        Ok(config)
    }

    /// Parses and validates TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, CheckoutError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Renders the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String, CheckoutError> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::invalid("config", e.to_string()).into())
    }

    /// Checks ranges and formats.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.retailer.validate()?;
        if self.pipeline.required_cookies.iter().any(|c| c.trim().is_empty()) {
            return Err(ConfigError::invalid(
                "pipeline.required_cookies",
                "cookie names must not be empty",
            ));
        }
        Ok(())
    }

    /// Merges cookies from a file over the configured ones.
    pub fn merge_cookie_file(&mut self, path: &Path) -> Result<usize, CheckoutError> {
        let cookies = load_cookie_file(path)?;
        let count = cookies.len();
        self.cookies.extend(cookies);
        Ok(count)
    }

    /// Enables strict cart refresh.
    #[must_use]
    pub fn with_strict_cart_refresh(mut self, strict: bool) -> Self {
        self.pipeline.strict_cart_refresh = strict;
        self
    }

    /// Replaces the retailer settings.
    #[must_use]
    pub fn with_retailer(mut self, retailer: RetailerConfig) -> Self {
        self.retailer = retailer;
        self
    }

    /// Adds a cookie.
    #[must_use]
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    /// A fresh session seeded with the configured cookies.
    #[must_use]
    pub fn session(&self) -> Session {
        Session::with_cookies(self.cookies.clone())
    }

    /// Pipeline options derived from this configuration.
    #[must_use]
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            strict_cart_refresh: self.pipeline.strict_cart_refresh,
            required_cookies: self.pipeline.required_cookies.clone(),
        }
    }

    /// The buyer records for a run.
    #[must_use]
    pub fn inputs(&self) -> CheckoutInputs {
        CheckoutInputs {
            contact: self.contact.clone(),
            address: self.address.clone(),
            payment: self.payment.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MINIMAL: &str = r#"
        [cookies]
        JSESSIONID = "j"
        ZGWID = "z"

        [contact]
        first_name = "kazmi"
        last_name = "shb"
        email = "domgyrgpt@gmail.com"
        phone = "9452060458"

        [address]
        address1 = "1 Morris Rd"
        city = "South Hill"
        state = "VA"
        zip_code = "23970-5627"

        [payment]
        card_number = "4111111111111111"
        expiry_month = "12"
        expiry_year = "2030"
        cvv = "123"
    "#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = CheckoutConfig::from_toml_str(MINIMAL).unwrap();

        assert_eq!(config.retailer.base_url, "https://www.footlocker.com");
        assert_eq!(config.retailer.timeout(), Duration::from_secs(30));
        assert_eq!(config.pipeline.required_cookies, vec!["JSESSIONID", "ZGWID"]);
        assert!(!config.pipeline.strict_cart_refresh);
        assert_eq!(config.pipeline.encryption, EncryptionMode::Placeholder);
        assert_eq!(config.order.checkout_type, "NORMAL");
        assert_eq!(config.browser.screen_width, 1920);
        assert_eq!(config.session().cookie("ZGWID"), Some("z"));
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = CheckoutConfig::from_toml_str(MINIMAL)
            .unwrap()
            .with_strict_cart_refresh(true);
        let rendered = config.to_toml_string().unwrap();
        let reparsed = CheckoutConfig::from_toml_str(&rendered).unwrap();

        assert_eq!(reparsed, config);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let bad_url = format!("[retailer]\nbase_url = \"ftp://x\"\n{MINIMAL}");
        assert!(matches!(
            CheckoutConfig::from_toml_str(&bad_url),
            Err(CheckoutError::Config(ConfigError::InvalidValue { .. }))
        ));

        let bad_timeout = format!("[retailer]\ntimeout_seconds = 0\n{MINIMAL}");
        assert!(CheckoutConfig::from_toml_str(&bad_timeout).is_err());

        let huge_timeout = format!("[retailer]\ntimeout_seconds = 1e20\n{MINIMAL}");
        assert!(matches!(
            CheckoutConfig::from_toml_str(&huge_timeout),
            Err(CheckoutError::Config(ConfigError::InvalidValue { ref field, .. }))
                if field == "retailer.timeout_seconds"
        ));

        let bad_path = format!("[retailer.endpoints]\nplace_order = \"placeOrder\"\n{MINIMAL}");
        assert!(CheckoutConfig::from_toml_str(&bad_path).is_err());
    }

    #[test]
    fn test_timeout_never_panics() {
        assert_eq!(RetailerConfig::new().timeout(), Duration::from_secs(30));
        assert_eq!(
            RetailerConfig::new().with_timeout(1e20).timeout(),
            Duration::from_secs(3600)
        );
        assert_eq!(
            RetailerConfig::new().with_timeout(f64::NAN).timeout(),
            Duration::from_secs(3600)
        );
        assert_eq!(
            RetailerConfig::new().with_timeout(-1.0).timeout(),
            Duration::from_secs(30)
        );
        assert!(RetailerConfig::new().with_timeout(1e20).validate().is_err());
    }

    #[test]
    fn test_invalid_record_fails_parse() {
        let broken = MINIMAL.replace("domgyrgpt@gmail.com", "broken");
        assert!(matches!(
            CheckoutConfig::from_toml_str(&broken),
            Err(CheckoutError::Toml(_))
        ));
    }

    #[test]
    fn test_load_merges_relative_cookie_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cookies.txt"), "ZGWID=fresh; datadome=d").unwrap();
        let config_path = dir.path().join("checkout.toml");
        std::fs::write(
            &config_path,
            format!("[pipeline]\ncookie_file = \"cookies.txt\"\n{MINIMAL}"),
        )
        .unwrap();

        let config = CheckoutConfig::load(&config_path).unwrap();
        assert_eq!(config.cookies.get("ZGWID").map(String::as_str), Some("fresh"));
        assert_eq!(config.cookies.get("datadome").map(String::as_str), Some("d"));
        assert_eq!(config.cookies.get("JSESSIONID").map(String::as_str), Some("j"));
    }

    #[test]
    fn test_url_joins_base_and_path() {
        let retailer = RetailerConfig::new().with_base_url("http://127.0.0.1:8080/");
        assert_eq!(
            retailer.url(&retailer.endpoints.place_order),
            "http://127.0.0.1:8080/zgw/carts/co-cart-aggregation-service/site/fl/cart/placeOrder"
        );
    }
}
