//! Canned inputs and wired-up clients for tests.
#![allow(clippy::expect_used)]

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{MockReply, MockTransport};
use crate::config::{CheckoutConfig, RetailerConfig};
use crate::encryption::PlaceholderEncryptor;
use crate::models::{ContactInfo, PaymentInfo, ShippingAddress};
use crate::pipeline::{CheckoutInputs, CheckoutPipeline, PipelineOptions};
use crate::session::Session;
use crate::steps::CheckoutClient;

/// Device id pinned by [`sample_retailer`].
pub const SAMPLE_DEVICE_ID: &str = "fe80a1b2c3d4-1111-2222-3333-444455556666";

/// Order id returned by [`happy_path_transport`].
pub const SAMPLE_ORDER_ID: &str = "P1234567890";

/// Contact details used across tests.
#[must_use]
pub fn sample_contact() -> ContactInfo {
    ContactInfo::new("kazmi", "shb", "domgyrgpt@gmail.com", "9452060458")
        .expect("sample contact is valid")
}

/// Shipping address used across tests.
#[must_use]
pub fn sample_address() -> ShippingAddress {
    ShippingAddress::new("1 Morris Rd", "South Hill", "VA", "23970-5627")
        .expect("sample address is valid")
}

/// Test card.
#[must_use]
pub fn sample_payment() -> PaymentInfo {
    PaymentInfo::new("4111111111111111", "12", "2030", "123").expect("sample card is valid")
}

/// The default required cookies with dummy values.
#[must_use]
pub fn sample_cookies() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("JSESSIONID".to_string(), "session-1".to_string()),
        ("ZGWID".to_string(), "zgw-1".to_string()),
    ])
}

/// A session holding [`sample_cookies`].
#[must_use]
pub fn sample_session() -> Session {
    Session::with_cookies(sample_cookies())
}

/// The sample buyer records.
#[must_use]
pub fn sample_inputs() -> CheckoutInputs {
    CheckoutInputs {
        contact: sample_contact(),
        address: sample_address(),
        payment: sample_payment(),
    }
}

/// Default retailer settings with a pinned device id.
#[must_use]
pub fn sample_retailer() -> RetailerConfig {
    RetailerConfig::new().with_device_id(SAMPLE_DEVICE_ID)
}

/// A client over `transport` using placeholder encryption.
#[must_use]
pub fn test_client(transport: Arc<MockTransport>) -> CheckoutClient {
    CheckoutClient::new(
        transport,
        Arc::new(PlaceholderEncryptor::new()),
        sample_retailer(),
    )
}

/// A pipeline over `transport` with default options.
#[must_use]
pub fn test_pipeline(transport: Arc<MockTransport>) -> CheckoutPipeline {
    CheckoutPipeline::new(test_client(transport), PipelineOptions::default())
}

/// A transport on which every step succeeds.
///
/// Verification returns no suggestion, the cart has a shipping address,
/// and the order is confirmed as [`SAMPLE_ORDER_ID`].
#[must_use]
pub fn happy_path_transport() -> MockTransport {
    with_happy_path(MockTransport::new())
}

/// Appends the [`happy_path_transport`] routes after the ones already on
/// `transport`, so earlier routes take precedence.
#[must_use]
pub fn with_happy_path(transport: MockTransport) -> MockTransport {
    let endpoints = sample_retailer().endpoints;
    transport
        .route(endpoints.user_info, MockReply::json(200, serde_json::json!({})))
        .route(
            endpoints.address_verification,
            MockReply::json(200, serde_json::json!({"decision": "Accepted"})),
        )
        .route(endpoints.shipping_address, MockReply::json(200, serde_json::json!({})))
        .route(
            endpoints.updated_cart,
            MockReply::json(
                200,
                serde_json::json!({
                    "cartId": "cart-1",
                    "user": {"id": "guest-1"},
                    "totalUnitCount": 1,
                    "shippingAddress": {"line1": "1 Morris Rd"}
                }),
            ),
        )
        .route(
            endpoints.place_order,
            MockReply::json(200, serde_json::json!({"orderNumber": SAMPLE_ORDER_ID})),
        )
}

/// A run configuration for the sample buyer with the sample cookies.
#[must_use]
pub fn sample_config() -> CheckoutConfig {
    let mut config = CheckoutConfig::new(sample_contact(), sample_address(), sample_payment())
        .with_retailer(sample_retailer());
    config.cookies = sample_cookies();
    config
}
