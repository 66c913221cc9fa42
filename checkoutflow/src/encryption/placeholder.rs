//! Deterministic placeholder ciphertext.

use super::PaymentEncryptor;
use crate::errors::CheckoutError;
use crate::models::{CardField, EncryptedPaymentBlock, PaymentInfo};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Version prefix of the card network's client-side encryption format.
pub const PLACEHOLDER_PREFIX: &str = "adyenjs_0_1_25$";

/// Fixed key-info segment that follows the prefix.
pub const PLACEHOLDER_BODY: &str = "MEEwEAYHKoZIzj0CAQYFK4EEACIDYgAE";

/// Returns well-formed but meaningless encrypted fields.
///
/// The output depends only on the field, never on the card data, so the
/// same block is produced for every card. The remote will reject it.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderEncryptor {
    prefix: String,
}

impl PlaceholderEncryptor {
    /// Creates an encryptor with the default prefix.
    #[must_use]
    pub fn new() -> Self {
        Self {
            prefix: PLACEHOLDER_PREFIX.to_string(),
        }
    }

    /// Overrides the version prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// The placeholder value for one field.
    #[must_use]
    pub fn field_value(&self, field: CardField) -> String {
        let prefix = if self.prefix.is_empty() {
            PLACEHOLDER_PREFIX
        } else {
            &self.prefix
        };
        let tail = STANDARD.encode(format!("placeholder:{}", field.encrypted_name()));
        format!("{prefix}{PLACEHOLDER_BODY}{tail}")
    }
}

impl PaymentEncryptor for PlaceholderEncryptor {
    fn encrypt(&self, payment: &PaymentInfo) -> Result<EncryptedPaymentBlock, CheckoutError> {
        tracing::warn!(
            card = %format!("**** {}", payment.last_four()),
            "using placeholder payment encryption; the order will not be accepted"
        );
        EncryptedPaymentBlock::try_build(|field| Ok(self.field_value(field)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::sample_payment;

    #[test]
    fn test_fields_carry_prefix_and_body() {
        let block = PlaceholderEncryptor::new().encrypt(&sample_payment()).unwrap();

        for field in CardField::ALL {
            let value = block.get(field);
            assert!(value.starts_with(PLACEHOLDER_PREFIX));
            assert!(value[PLACEHOLDER_PREFIX.len()..].starts_with(PLACEHOLDER_BODY));
        }
        assert!(block.is_complete());
    }

    #[test]
    fn test_output_ignores_card_data() {
        let encryptor = PlaceholderEncryptor::new();
        let other = PaymentInfo::new("5555555555554444", "01", "2031", "9999").unwrap();

        assert_eq!(
            encryptor.encrypt(&sample_payment()).unwrap(),
            encryptor.encrypt(&other).unwrap()
        );
    }

    #[test]
    fn test_fields_differ_from_each_other() {
        let encryptor = PlaceholderEncryptor::new();
        assert_ne!(
            encryptor.field_value(CardField::Number),
            encryptor.field_value(CardField::SecurityCode)
        );
    }

    #[test]
    fn test_custom_prefix() {
        let value = PlaceholderEncryptor::new()
            .with_prefix("test$")
            .field_value(CardField::ExpiryMonth);
        assert!(value.starts_with("test$"));
    }
}
