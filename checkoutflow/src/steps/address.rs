//! Step 2: address verification.

use super::{settle, to_body, CheckoutClient};
use crate::core::{StepId, StepResult};
use crate::errors::StepFailure;
use crate::models::{AddressVerificationResponse, ShippingAddress, VerifiedAddress};
use crate::session::Session;
use crate::transport::HttpRequest;
use chrono::Utc;
use tracing::info;

impl CheckoutClient {
    /// Verifies the shipping address.
    ///
    /// The first suggested address, if any, replaces the caller's address.
    /// A `Rejected` decision fails the step. A blank body or no suggestion
    /// keeps the caller's address.
    pub async fn verify_address(
        &self,
        session: &mut Session,
        address: &ShippingAddress,
    ) -> StepResult<VerifiedAddress> {
        let step = StepId::VerifyAddress;
        let started_at = Utc::now();

        let outcome = async {
            let body = to_body(step, &VerifiedAddress::verification_request(address))?;
            let url = self.retailer.url(&self.retailer.endpoints.address_verification);
            let mut request = HttpRequest::post_json(url, body);
            if let Some(ref key) = self.retailer.address_verification_key {
                request = request.with_header("x-functions-key", key.clone());
            }

            let response = self.exchange(step, session, request).await?;
            let caller = VerifiedAddress::from(address);
            if response.body.trim().is_empty() {
                return Ok((Some(response.status), None, caller));
            }

            let verification: AddressVerificationResponse = response.json().map_err(|e| {
                StepFailure::invalid_response(step, format!("unparsable verification response: {e}"))
                    .with_http_status(response.status)
                    .with_snippet(&response.body)
            })?;

            if verification.is_rejected() {
                return Err(StepFailure::validation(
                    step,
                    format!("address rejected by verification: {}", address.one_line()),
                )
                .with_http_status(response.status)
                .with_snippet(&response.body));
            }

            let verified = match verification.suggestion() {
                Some(suggestion) => {
                    if !suggestion.same_location(&caller) {
                        info!(
                            from = %address.one_line(),
                            to = %format!("{}, {}, {} {}", suggestion.line1, suggestion.town, suggestion.region.isocode_short, suggestion.postal_code),
                            "address normalized by verification"
                        );
                    }
                    suggestion.clone()
                }
                None => caller,
            };
            Ok::<_, StepFailure>((Some(response.status), response.json_value(), verified))
        }
        .await;

        settle(step, started_at, outcome)
    }
}
