//! Order placement payloads and confirmation parsing.

use super::EncryptedPaymentBlock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_screen_width() -> u32 {
    1920
}

fn default_screen_height() -> u32 {
    1080
}

fn default_color_depth() -> u32 {
    24
}

fn default_time_zone_offset() -> i32 {
    300
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_user_agent() -> String {
    crate::config::DEFAULT_USER_AGENT.to_string()
}

fn default_checkout_type() -> String {
    "NORMAL".to_string()
}

fn default_preferred_language() -> String {
    "en".to_string()
}

/// Browser fingerprint fields sent with the payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserInfo {
    /// Screen width in pixels.
    #[serde(default = "default_screen_width", alias = "screen_width")]
    pub screen_width: u32,
    /// Screen height in pixels.
    #[serde(default = "default_screen_height", alias = "screen_height")]
    pub screen_height: u32,
    /// Color depth.
    #[serde(default = "default_color_depth", alias = "color_depth")]
    pub color_depth: u32,
    /// User agent string.
    #[serde(default = "default_user_agent", alias = "user_agent")]
    pub user_agent: String,
    /// Minutes offset from UTC.
    #[serde(default = "default_time_zone_offset", alias = "time_zone_offset")]
    pub time_zone_offset: i32,
    /// Browser language.
    #[serde(default = "default_language")]
    pub language: String,
    /// Whether Java is enabled.
    #[serde(default, alias = "java_enabled")]
    pub java_enabled: bool,
}

impl Default for BrowserInfo {
    fn default() -> Self {
        Self {
            screen_width: default_screen_width(),
            screen_height: default_screen_height(),
            color_depth: default_color_depth(),
            user_agent: default_user_agent(),
            time_zone_offset: default_time_zone_offset(),
            language: default_language(),
            java_enabled: false,
        }
    }
}

impl BrowserInfo {
    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Order-level flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderOptions {
    /// Store the card for later use.
    #[serde(default)]
    pub save_payment: bool,
    /// Mark the order as no-charge.
    #[serde(default)]
    pub is_no_charge_order: bool,
    /// Checkout type.
    #[serde(default = "default_checkout_type")]
    pub checkout_type: String,
    /// Marketing opt-in.
    #[serde(default)]
    pub opt_in: bool,
    /// Preferred language for order communication.
    #[serde(default = "default_preferred_language")]
    pub preferred_language: String,
}

impl Default for OrderOptions {
    fn default() -> Self {
        Self {
            save_payment: false,
            is_no_charge_order: false,
            checkout_type: default_checkout_type(),
            opt_in: false,
            preferred_language: default_preferred_language(),
        }
    }
}

/// Encrypted card block plus the save flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CcPaymentInfo {
    /// The encrypted fields.
    #[serde(flatten)]
    pub block: EncryptedPaymentBlock,
    /// Store the card for later use.
    pub save_payment: bool,
}

/// The `payment` object of the order request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    /// Card details.
    pub cc_payment_info: CcPaymentInfo,
    /// Browser fingerprint.
    pub browser_info: BrowserInfo,
    /// Device identifier.
    pub device_id: String,
}

/// Body of the place-order request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderPayload {
    /// Payment details.
    pub payment: PaymentPayload,
    /// No-charge flag.
    pub is_no_charge_order: bool,
    /// Checkout type.
    pub checkout_type: String,
    /// Marketing opt-in.
    pub opt_in: bool,
    /// Preferred language.
    pub preferred_language: String,
}

impl PlaceOrderPayload {
    /// Assembles the order body.
    #[must_use]
    pub fn new(
        block: EncryptedPaymentBlock,
        options: &OrderOptions,
        browser: &BrowserInfo,
        device_id: impl Into<String>,
    ) -> Self {
        Self {
            payment: PaymentPayload {
                cc_payment_info: CcPaymentInfo {
                    block,
                    save_payment: options.save_payment,
                },
                browser_info: browser.clone(),
                device_id: device_id.into(),
            },
            is_no_charge_order: options.is_no_charge_order,
            checkout_type: options.checkout_type.clone(),
            opt_in: options.opt_in,
            preferred_language: options.preferred_language.clone(),
        }
    }
}

/// Keys that may carry the order identifier.
const ORDER_ID_KEYS: [&str; 3] = ["orderNumber", "orderId", "code"];

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    /// Order identifier assigned by the retailer.
    pub order_id: String,
    /// Full response body.
    pub body: Value,
}

impl OrderConfirmation {
    /// Extracts the order identifier from a response body.
    ///
    /// Looks for `orderNumber`, `orderId`, or `code` at the top level and
    /// then under `order`. String and numeric values are accepted.
    #[must_use]
    pub fn from_body(body: &Value) -> Option<Self> {
        let order_id = find_order_id(body).or_else(|| body.get("order").and_then(find_order_id))?;
        Some(Self {
            order_id,
            body: body.clone(),
        })
    }
}

fn find_order_id(object: &Value) -> Option<String> {
    ORDER_ID_KEYS.iter().find_map(|key| match object.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn block() -> EncryptedPaymentBlock {
        EncryptedPaymentBlock {
            encrypted_card_number: "n".to_string(),
            encrypted_expiry_month: "m".to_string(),
            encrypted_expiry_year: "y".to_string(),
            encrypted_security_code: "c".to_string(),
        }
    }

    #[test]
    fn test_payload_wire_shape() {
        let browser = BrowserInfo::default().with_user_agent("UA");
        let payload =
            PlaceOrderPayload::new(block(), &OrderOptions::default(), &browser, "device-1");

        assert_eq!(
            serde_json::to_value(payload).unwrap(),
            json!({
                "payment": {
                    "ccPaymentInfo": {
                        "encryptedCardNumber": "n",
                        "encryptedExpiryMonth": "m",
                        "encryptedExpiryYear": "y",
                        "encryptedSecurityCode": "c",
                        "savePayment": false
                    },
                    "browserInfo": {
                        "screenWidth": 1920,
                        "screenHeight": 1080,
                        "colorDepth": 24,
                        "userAgent": "UA",
                        "timeZoneOffset": 300,
                        "language": "en-US",
                        "javaEnabled": false
                    },
                    "deviceId": "device-1"
                },
                "isNoChargeOrder": false,
                "checkoutType": "NORMAL",
                "optIn": false,
                "preferredLanguage": "en"
            })
        );
    }

    #[test]
    fn test_browser_info_accepts_snake_case_config() {
        let browser: BrowserInfo = toml::from_str("screen_width = 1280\nlanguage = \"de-DE\"").unwrap();
        assert_eq!(browser.screen_width, 1280);
        assert_eq!(browser.screen_height, 1080);
        assert_eq!(browser.language, "de-DE");
    }

    #[test]
    fn test_order_id_at_top_level() {
        let confirmation = OrderConfirmation::from_body(&json!({"orderNumber": "P123"})).unwrap();
        assert_eq!(confirmation.order_id, "P123");
    }

    #[test]
    fn test_order_id_nested_and_numeric() {
        let body = json!({"order": {"code": 987654}});
        assert_eq!(OrderConfirmation::from_body(&body).unwrap().order_id, "987654");
    }

    #[test]
    fn test_missing_order_id() {
        assert!(OrderConfirmation::from_body(&json!({"status": "ok"})).is_none());
        assert!(OrderConfirmation::from_body(&json!({"orderId": "  "})).is_none());
        assert!(OrderConfirmation::from_body(&json!([])).is_none());
    }
}
