//! Step 1: submit contact details.

use super::{settle, to_body, CheckoutClient};
use crate::core::{StepId, StepResult};
use crate::errors::StepFailure;
use crate::models::{ContactInfo, ContactPayload};
use crate::session::Session;
use crate::transport::HttpRequest;
use chrono::Utc;

impl CheckoutClient {
    /// Posts the buyer's contact details to the cart.
    ///
    /// Succeeds on any 2xx status.
    pub async fn submit_contact_info(
        &self,
        session: &mut Session,
        contact: &ContactInfo,
    ) -> StepResult {
        let step = StepId::SubmitContactInfo;
        let started_at = Utc::now();

        let outcome = async {
            let body = to_body(step, &ContactPayload::from(contact))?;
            let url = self.retailer.url(&self.retailer.endpoints.user_info);
            let response = self
                .exchange(step, session, HttpRequest::post_json(url, body))
                .await?;
            Ok::<_, StepFailure>((Some(response.status), response.json_value(), ()))
        }
        .await;

        settle(step, started_at, outcome)
    }
}
