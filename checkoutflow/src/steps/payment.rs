//! Step 5: build the encrypted payment block.

use super::{settle, CheckoutClient};
use crate::core::{StepId, StepResult};
use crate::errors::{CheckoutError, StepFailure};
use crate::models::{EncryptedPaymentBlock, PaymentInfo};
use chrono::Utc;

impl CheckoutClient {
    /// Encrypts the card through the injected encryptor. No request is sent
    /// and the session is not touched.
    pub fn prepare_payment(&self, payment: &PaymentInfo) -> StepResult<EncryptedPaymentBlock> {
        let step = StepId::PreparePayment;
        let started_at = Utc::now();

        let outcome = match self.encryptor.encrypt(payment) {
            Ok(block) if block.is_complete() => Ok((None, None, block)),
            Ok(_) => Err(StepFailure::encryption("encryptor returned an empty field")),
            Err(CheckoutError::EncryptionUnavailable(reason)) => {
                Err(StepFailure::encryption(reason))
            }
            Err(e) => Err(StepFailure::encryption(e.to_string())),
        };

        settle(step, started_at, outcome)
    }
}
