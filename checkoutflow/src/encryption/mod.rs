//! Payment encryption boundary.
//!
//! Card fields are never sent in the clear. A [`PaymentEncryptor`] turns
//! [`PaymentInfo`] into an [`EncryptedPaymentBlock`]. Nothing here does
//! real cryptography:
//!
//! - [`PlaceholderEncryptor`] produces fixed, well-formed strings for tests
//!   and dry runs.
//! - [`CseEncryptor`] hands each field to an external [`CseClient`] (the
//!   card network's client-side encryption library) with its public key.
//! - [`UnavailableEncryptor`] always fails.

mod cse;
mod device;
mod placeholder;

pub use cse::{CseClient, CseEncryptor};
pub use device::{generate_device_id, is_device_id};
pub use placeholder::{PlaceholderEncryptor, PLACEHOLDER_BODY, PLACEHOLDER_PREFIX};

#[cfg(test)]
pub use cse::MockCseClient;

use crate::errors::CheckoutError;
use crate::models::{EncryptedPaymentBlock, PaymentInfo};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Produces the encrypted payment block for an order.
///
/// Implementations must not perform network I/O.
#[cfg_attr(test, mockall::automock)]
pub trait PaymentEncryptor: Send + Sync {
    /// Encrypts the four card fields.
    fn encrypt(&self, payment: &PaymentInfo) -> Result<EncryptedPaymentBlock, CheckoutError>;
}

/// An encryptor that always reports encryption as unavailable.
#[derive(Debug, Clone, Default)]
pub struct UnavailableEncryptor {
    reason: Option<String>,
}

impl UnavailableEncryptor {
    /// Creates an encryptor that fails with `reason`.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
        }
    }
}

impl PaymentEncryptor for UnavailableEncryptor {
    fn encrypt(&self, _payment: &PaymentInfo) -> Result<EncryptedPaymentBlock, CheckoutError> {
        Err(CheckoutError::encryption_unavailable(
            self.reason
                .as_deref()
                .unwrap_or("no payment encryption capability configured"),
        ))
    }
}

/// Which encryptor a configured run uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncryptionMode {
    /// Fixed placeholder ciphertext.
    #[default]
    Placeholder,
    /// No encryption; payment preparation fails.
    Unavailable,
}

impl EncryptionMode {
    /// Builds the encryptor for this mode.
    #[must_use]
    pub fn encryptor(self) -> Arc<dyn PaymentEncryptor> {
        match self {
            Self::Placeholder => Arc::new(PlaceholderEncryptor::new()),
            Self::Unavailable => Arc::new(UnavailableEncryptor::default()),
        }
    }
}
