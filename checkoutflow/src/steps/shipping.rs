//! Step 3: set the shipping address on the cart.

use super::{settle, to_body, CheckoutClient};
use crate::core::{StepId, StepResult};
use crate::errors::StepFailure;
use crate::models::{CartAddress, ContactInfo, ShippingAddressPayload, VerifiedAddress};
use crate::session::Session;
use crate::transport::HttpRequest;
use chrono::Utc;

impl CheckoutClient {
    /// Sets `verified` as the cart's shipping address, using the contact's
    /// name, phone, and email.
    pub async fn set_shipping_address(
        &self,
        session: &mut Session,
        contact: &ContactInfo,
        verified: &VerifiedAddress,
    ) -> StepResult {
        let step = StepId::SetShippingAddress;
        let started_at = Utc::now();

        let outcome = async {
            let payload = ShippingAddressPayload {
                shipping_address: CartAddress::new(contact, verified),
            };
            let body = to_body(step, &payload)?;
            let url = self.retailer.url(&self.retailer.endpoints.shipping_address);
            let response = self
                .exchange(step, session, HttpRequest::post_json(url, body))
                .await?;
            Ok::<_, StepFailure>((Some(response.status), response.json_value(), ()))
        }
        .await;

        settle(step, started_at, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FailureKind;
    use crate::testing::fixtures::{sample_address, sample_contact, sample_session, test_client};
    use crate::testing::{MockReply, MockTransport};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_payload_combines_contact_and_address() {
        let transport = Arc::new(
            MockTransport::new().route("/cart/address", MockReply::json(200, json!({}))),
        );
        let client = test_client(transport.clone());
        let verified = VerifiedAddress::from(&sample_address());

        let result = client
            .set_shipping_address(&mut sample_session(), &sample_contact(), &verified)
            .await;

        assert!(result.is_success());
        let body = transport.requests()[0].body.clone().unwrap();
        assert_eq!(
            body,
            json!({
                "shippingAddress": {
                    "firstName": "kazmi",
                    "lastName": "shb",
                    "line1": "1 Morris Rd",
                    "line2": "",
                    "town": "South Hill",
                    "region": {"isocodeShort": "VA"},
                    "postalCode": "23970-5627",
                    "country": {"isocode": "US"},
                    "phone": "9452060458",
                    "email": "domgyrgpt@gmail.com",
                    "shippingAddress": true
                }
            })
        );
    }

    #[tokio::test]
    async fn test_conflict_fails() {
        let transport = Arc::new(
            MockTransport::new().route("/cart/address", MockReply::text(409, "{\"errors\":[]}")),
        );
        let result = test_client(transport)
            .set_shipping_address(
                &mut sample_session(),
                &sample_contact(),
                &VerifiedAddress::from(&sample_address()),
            )
            .await;

        assert_eq!(
            result.failure().map(|f| (f.kind, f.http_status)),
            Some((FailureKind::HttpStatusFailure, Some(409)))
        );
    }
}
