//! Step 4: refresh the cart.

use super::{settle, CheckoutClient};
use crate::core::{StepId, StepResult};
use crate::errors::StepFailure;
use crate::models::CartSummary;
use crate::session::Session;
use crate::transport::HttpRequest;
use chrono::Utc;

/// Warning attached when the refreshed cart has no shipping address.
pub const MISSING_SHIPPING_WARNING: &str = "refreshed cart has no shipping address";

impl CheckoutClient {
    /// Fetches the updated cart and records its ids in the session.
    ///
    /// A cart without a shipping address is a soft failure: the result is
    /// marked [`SoftFail`](crate::core::StepStatus::SoftFail) and still
    /// carries the summary. Whether that stops the run is up to the caller.
    pub async fn refresh_cart(&self, session: &mut Session) -> StepResult<CartSummary> {
        let step = StepId::RefreshCart;
        let started_at = Utc::now();

        let outcome = async {
            let url = self.retailer.url(&self.retailer.endpoints.updated_cart);
            let response = self.exchange(step, session, HttpRequest::get(url)).await?;

            let body = response
                .json_value()
                .filter(serde_json::Value::is_object)
                .ok_or_else(|| {
                    StepFailure::invalid_response(step, "cart response is not a JSON object")
                        .with_http_status(response.status)
                        .with_snippet(&response.body)
                })?;
            let cart = CartSummary::from_body(&body);
            session.record_cart(&cart);
            Ok::<_, StepFailure>((Some(response.status), Some(body), cart))
        }
        .await;

        let mut result = settle(step, started_at, outcome);
        if result
            .value()
            .is_some_and(|cart| !cart.has_shipping_address)
        {
            tracing::warn!(step = step.index(), name = step.name(), "{}", MISSING_SHIPPING_WARNING);
            result.record = result.record.soften(MISSING_SHIPPING_WARNING);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StepStatus;
    use crate::errors::FailureKind;
    use crate::testing::fixtures::{sample_session, test_client};
    use crate::testing::{MockReply, MockTransport};
    use serde_json::json;
    use std::sync::Arc;

    const PATH: &str = "/cart/getUpdatedCart";

    #[tokio::test]
    async fn test_records_cart_ids() {
        let transport = Arc::new(MockTransport::new().route(
            PATH,
            MockReply::json(
                200,
                json!({
                    "cartId": "cart-1",
                    "user": {"id": "guest-1"},
                    "totalUnitCount": 1,
                    "shippingAddress": {"line1": "1 Morris Rd"}
                }),
            ),
        ));
        let mut session = sample_session();

        let result = test_client(transport.clone()).refresh_cart(&mut session).await;

        assert_eq!(result.record.status, StepStatus::Ok);
        assert_eq!(session.cart_id(), Some("cart-1"));
        assert_eq!(session.guest_id(), Some("guest-1"));
        assert_eq!(transport.requests()[0].method, crate::transport::HttpMethod::Get);
    }

    #[tokio::test]
    async fn test_missing_shipping_is_soft_failure() {
        let transport = Arc::new(
            MockTransport::new().route(PATH, MockReply::json(200, json!({"cartId": "cart-1"}))),
        );
        let result = test_client(transport).refresh_cart(&mut sample_session()).await;

        assert_eq!(result.record.status, StepStatus::SoftFail);
        assert!(result.is_success());
        assert_eq!(result.record.warning.as_deref(), Some(MISSING_SHIPPING_WARNING));
        assert!(result.value().is_some());
    }

    #[tokio::test]
    async fn test_non_object_body_is_invalid_response() {
        let transport = Arc::new(MockTransport::new().route(PATH, MockReply::text(200, "[]")));
        let result = test_client(transport).refresh_cart(&mut sample_session()).await;

        assert_eq!(
            result.failure().map(|f| f.kind),
            Some(FailureKind::InvalidResponse)
        );
    }

    #[tokio::test]
    async fn test_timeout_is_network_failure() {
        let transport = Arc::new(MockTransport::new().route(PATH, MockReply::timeout()));
        let result = test_client(transport).refresh_cart(&mut sample_session()).await;

        let failure = result.failure().unwrap();
        assert_eq!(failure.kind, FailureKind::NetworkFailure);
        assert_eq!(failure.step, Some(StepId::RefreshCart));
    }
}
