//! Step 6: place the order.

use super::{settle, to_body, CheckoutClient};
use crate::core::{StepId, StepResult};
use crate::errors::StepFailure;
use crate::models::{EncryptedPaymentBlock, OrderConfirmation, PlaceOrderPayload};
use crate::session::Session;
use crate::transport::HttpRequest;
use chrono::Utc;

impl CheckoutClient {
    /// The order request body for `block`.
    #[must_use]
    pub fn order_payload(&self, block: &EncryptedPaymentBlock) -> PlaceOrderPayload {
        PlaceOrderPayload::new(block.clone(), &self.order, &self.browser, &self.device_id)
    }

    /// Places the order.
    ///
    /// Succeeds only on a 2xx response whose body carries an order id.
    pub async fn place_order(
        &self,
        session: &mut Session,
        block: &EncryptedPaymentBlock,
    ) -> StepResult<OrderConfirmation> {
        let step = StepId::PlaceOrder;
        let started_at = Utc::now();

        let outcome = async {
            let body = to_body(step, &self.order_payload(block))?;
            let url = self.retailer.url(&self.retailer.endpoints.place_order);
            let response = self
                .exchange(step, session, HttpRequest::post_json(url, body))
                .await?;

            let missing_id = || {
                StepFailure::invalid_response(step, "response carries no order identifier")
                    .with_http_status(response.status)
                    .with_snippet(&response.body)
            };
            let parsed = response.json_value().ok_or_else(missing_id)?;
            let confirmation = OrderConfirmation::from_body(&parsed).ok_or_else(missing_id)?;
            tracing::info!(order_id = %confirmation.order_id, "order placed");
            Ok::<_, StepFailure>((Some(response.status), Some(parsed), confirmation))
        }
        .await;

        settle(step, started_at, outcome)
    }
}
