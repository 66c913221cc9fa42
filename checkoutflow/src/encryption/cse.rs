//! Delegation to an external client-side encryption library.

use super::PaymentEncryptor;
use crate::errors::CheckoutError;
use crate::models::{CardField, EncryptedPaymentBlock, PaymentInfo};
use chrono::{SecondsFormat, Utc};
use std::sync::Arc;

/// The card network's client-side encryption library.
///
/// Implementations wrap whatever actually performs the encryption (a
/// bundled script engine, a native library, a sidecar). Errors are plain
/// messages.
#[cfg_attr(test, mockall::automock)]
pub trait CseClient: Send + Sync {
    /// Encrypts one card field with `public_key`.
    ///
    /// `generation_time` is the RFC 3339 timestamp embedded in the
    /// ciphertext.
    fn encrypt_field(
        &self,
        public_key: &str,
        field: CardField,
        value: &str,
        generation_time: &str,
    ) -> Result<String, String>;
}

/// Encrypts each card field through a [`CseClient`].
#[derive(Clone)]
pub struct CseEncryptor {
    client: Arc<dyn CseClient>,
    public_key: String,
}

impl CseEncryptor {
    /// Creates an encryptor for `public_key`.
    pub fn new(client: Arc<dyn CseClient>, public_key: impl Into<String>) -> Self {
        Self {
            client,
            public_key: public_key.into(),
        }
    }
}

impl std::fmt::Debug for CseEncryptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CseEncryptor")
            .field("public_key_len", &self.public_key.len())
            .finish_non_exhaustive()
    }
}

impl PaymentEncryptor for CseEncryptor {
    fn encrypt(&self, payment: &PaymentInfo) -> Result<EncryptedPaymentBlock, CheckoutError> {
        if self.public_key.trim().is_empty() {
            return Err(CheckoutError::encryption_unavailable(
                "no public key for client-side encryption",
            ));
        }
        let generation_time = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        let block = EncryptedPaymentBlock::try_build(|field| {
            self.client
                .encrypt_field(
                    &self.public_key,
                    field,
                    payment.field(field),
                    &generation_time,
                )
                .map_err(|e| {
                    CheckoutError::encryption_unavailable(format!(
                        "{} failed: {e}",
                        field.encrypted_name()
                    ))
                })
        })?;

        if !block.is_complete() {
            return Err(CheckoutError::encryption_unavailable(
                "client returned an empty field",
            ));
        }
        Ok(block)
    }
}
