//! Card data and the encrypted payment block.

use super::{digits, require};
use crate::errors::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Card details, validated at construction.
///
/// `Debug` masks the card number and omits the security code.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPaymentInfo")]
pub struct PaymentInfo {
    card_number: String,
    expiry_month: String,
    expiry_year: String,
    security_code: String,
    holder_name: String,
}

#[derive(Deserialize)]
struct RawPaymentInfo {
    card_number: String,
    expiry_month: String,
    expiry_year: String,
    #[serde(alias = "cvv", alias = "cvc")]
    security_code: String,
    #[serde(default)]
    holder_name: String,
}

impl TryFrom<RawPaymentInfo> for PaymentInfo {
    type Error = ValidationError;

    fn try_from(raw: RawPaymentInfo) -> Result<Self, Self::Error> {
        let card_number = digits(&require("card_number", &raw.card_number)?);
        if !(12..=19).contains(&card_number.len()) {
            return Err(ValidationError::new("card_number", "must have 12 to 19 digits"));
        }

        let month: u8 = require("expiry_month", &raw.expiry_month)?
            .parse()
            .map_err(|_| ValidationError::new("expiry_month", "must be a number"))?;
        if !(1..=12).contains(&month) {
            return Err(ValidationError::new("expiry_month", "must be between 1 and 12"));
        }

        let year = require("expiry_year", &raw.expiry_year)?;
        if year.len() != 4 || digits(&year).len() != 4 {
            return Err(ValidationError::new("expiry_year", "must be a four-digit year"));
        }

        let security_code = require("security_code", &raw.security_code)?;
        if !(3..=4).contains(&security_code.len()) || digits(&security_code) != security_code {
            return Err(ValidationError::new("security_code", "must be 3 or 4 digits"));
        }

        Ok(Self {
            card_number,
            expiry_month: format!("{month:02}"),
            expiry_year: year,
            security_code,
            holder_name: raw.holder_name.trim().to_string(),
        })
    }
}

impl PaymentInfo {
    /// Creates validated card details.
    pub fn new(
        card_number: impl Into<String>,
        expiry_month: impl Into<String>,
        expiry_year: impl Into<String>,
        security_code: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::try_from(RawPaymentInfo {
            card_number: card_number.into(),
            expiry_month: expiry_month.into(),
            expiry_year: expiry_year.into(),
            security_code: security_code.into(),
            holder_name: String::new(),
        })
    }

    /// Sets the card holder name.
    #[must_use]
    pub fn with_holder_name(mut self, name: impl Into<String>) -> Self {
        self.holder_name = name.into().trim().to_string();
        self
    }

    /// Card number, digits only.
    #[must_use]
    pub fn card_number(&self) -> &str {
        &self.card_number
    }

    /// Two-digit expiry month.
    #[must_use]
    pub fn expiry_month(&self) -> &str {
        &self.expiry_month
    }

    /// Four-digit expiry year.
    #[must_use]
    pub fn expiry_year(&self) -> &str {
        &self.expiry_year
    }

    /// Security code.
    #[must_use]
    pub fn security_code(&self) -> &str {
        &self.security_code
    }

    /// Card holder name, possibly empty.
    #[must_use]
    pub fn holder_name(&self) -> &str {
        &self.holder_name
    }

    /// Last four digits of the card number.
    #[must_use]
    pub fn last_four(&self) -> &str {
        &self.card_number[self.card_number.len() - 4..]
    }

    /// The plaintext value of a card field.
    #[must_use]
    pub fn field(&self, field: CardField) -> &str {
        match field {
            CardField::Number => &self.card_number,
            CardField::ExpiryMonth => &self.expiry_month,
            CardField::ExpiryYear => &self.expiry_year,
            CardField::SecurityCode => &self.security_code,
        }
    }
}

impl fmt::Debug for PaymentInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentInfo")
            .field("card_number", &format!("**** {}", self.last_four()))
            .field("expiry_month", &self.expiry_month)
            .field("expiry_year", &self.expiry_year)
            .field("holder_name", &self.holder_name)
            .finish_non_exhaustive()
    }
}

/// The four card fields that are encrypted client-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardField {
    /// Card number.
    Number,
    /// Expiry month.
    ExpiryMonth,
    /// Expiry year.
    ExpiryYear,
    /// Security code.
    SecurityCode,
}

impl CardField {
    /// All fields in wire order.
    pub const ALL: [Self; 4] = [
        Self::Number,
        Self::ExpiryMonth,
        Self::ExpiryYear,
        Self::SecurityCode,
    ];

    /// Name of the encrypted field on the wire.
    #[must_use]
    pub const fn encrypted_name(self) -> &'static str {
        match self {
            Self::Number => "encryptedCardNumber",
            Self::ExpiryMonth => "encryptedExpiryMonth",
            Self::ExpiryYear => "encryptedExpiryYear",
            Self::SecurityCode => "encryptedSecurityCode",
        }
    }
}

/// The encrypted card fields sent with the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedPaymentBlock {
    /// Encrypted card number.
    pub encrypted_card_number: String,
    /// Encrypted expiry month.
    pub encrypted_expiry_month: String,
    /// Encrypted expiry year.
    pub encrypted_expiry_year: String,
    /// Encrypted security code.
    pub encrypted_security_code: String,
}

impl EncryptedPaymentBlock {
    /// Builds a block by producing each field with `encrypt`.
    pub fn try_build<E>(
        mut encrypt: impl FnMut(CardField) -> Result<String, E>,
    ) -> Result<Self, E> {
        Ok(Self {
            encrypted_card_number: encrypt(CardField::Number)?,
            encrypted_expiry_month: encrypt(CardField::ExpiryMonth)?,
            encrypted_expiry_year: encrypt(CardField::ExpiryYear)?,
            encrypted_security_code: encrypt(CardField::SecurityCode)?,
        })
    }

    /// The value of one encrypted field.
    #[must_use]
    pub fn get(&self, field: CardField) -> &str {
        match field {
            CardField::Number => &self.encrypted_card_number,
            CardField::ExpiryMonth => &self.encrypted_expiry_month,
            CardField::ExpiryYear => &self.encrypted_expiry_year,
            CardField::SecurityCode => &self.encrypted_security_code,
        }
    }

    /// Returns true if every field is non-empty.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        CardField::ALL.iter().all(|field| !self.get(*field).is_empty())
    }
}
