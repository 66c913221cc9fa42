//! Typed records for checkout inputs and wire payloads.
//!
//! Input records ([`ContactInfo`], [`ShippingAddress`], [`PaymentInfo`]) are
//! validated when constructed, whether built in code or deserialized from
//! configuration. Wire payloads mirror the retailer's JSON shapes and use
//! `camelCase` field names.

mod address;
mod cart;
mod contact;
mod order;
mod payment;

pub use address::{
    AddressVerificationResponse, CartAddress, Country, Region, ShippingAddress,
    ShippingAddressPayload, VerifiedAddress,
};
pub use cart::CartSummary;
pub use contact::{ContactInfo, ContactPayload};
pub use order::{
    BrowserInfo, CcPaymentInfo, OrderConfirmation, OrderOptions, PaymentPayload,
    PlaceOrderPayload,
};
pub use payment::{CardField, EncryptedPaymentBlock, PaymentInfo};

use crate::errors::ValidationError;

/// Trims `value` and rejects it if empty.
pub(crate) fn require(field: &str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

/// Keeps only ASCII digits.
pub(crate) fn digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Normalizes a two-letter ISO country code.
pub(crate) fn country_code(field: &str, value: &str) -> Result<String, ValidationError> {
    let code = require(field, value)?.to_ascii_uppercase();
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::new(field, "must be a two-letter country code"));
    }
    Ok(code)
}

pub(crate) fn default_country() -> String {
    "US".to_string()
}
