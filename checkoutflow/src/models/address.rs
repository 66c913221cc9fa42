//! Shipping addresses in caller and retailer shapes.

use super::{country_code, default_country, require, ContactInfo};
use crate::errors::ValidationError;
use serde::{Deserialize, Serialize};

/// Caller-supplied shipping address, validated at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawShippingAddress")]
pub struct ShippingAddress {
    address1: String,
    address2: String,
    city: String,
    state: String,
    zip_code: String,
    country: String,
}

#[derive(Deserialize)]
struct RawShippingAddress {
    address1: String,
    #[serde(default)]
    address2: String,
    city: String,
    state: String,
    zip_code: String,
    #[serde(default = "default_country")]
    country: String,
}

impl TryFrom<RawShippingAddress> for ShippingAddress {
    type Error = ValidationError;

    fn try_from(raw: RawShippingAddress) -> Result<Self, Self::Error> {
        Ok(Self {
            address1: require("address1", &raw.address1)?,
            address2: raw.address2.trim().to_string(),
            city: require("city", &raw.city)?,
            state: require("state", &raw.state)?.to_ascii_uppercase(),
            zip_code: require("zip_code", &raw.zip_code)?,
            country: country_code("country", &raw.country)?,
        })
    }
}

impl ShippingAddress {
    /// Creates a validated US address.
    pub fn new(
        address1: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        zip_code: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::try_from(RawShippingAddress {
            address1: address1.into(),
            address2: String::new(),
            city: city.into(),
            state: state.into(),
            zip_code: zip_code.into(),
            country: default_country(),
        })
    }

    /// Sets the second address line.
    #[must_use]
    pub fn with_address2(mut self, address2: impl Into<String>) -> Self {
        self.address2 = address2.into().trim().to_string();
        self
    }

    /// Sets the country code.
    pub fn with_country(mut self, code: &str) -> Result<Self, ValidationError> {
        self.country = country_code("country", code)?;
        Ok(self)
    }

    /// First address line.
    #[must_use]
    pub fn address1(&self) -> &str {
        &self.address1
    }

    /// Second address line, possibly empty.
    #[must_use]
    pub fn address2(&self) -> &str {
        &self.address2
    }

    /// City.
    #[must_use]
    pub fn city(&self) -> &str {
        &self.city
    }

    /// State or region code.
    #[must_use]
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Postal code.
    #[must_use]
    pub fn zip_code(&self) -> &str {
        &self.zip_code
    }

    /// Country code.
    #[must_use]
    pub fn country(&self) -> &str {
        &self.country
    }

    /// Single-line rendering for logs and CLI output.
    #[must_use]
    pub fn one_line(&self) -> String {
        format!(
            "{}, {}, {} {}",
            self.address1, self.city, self.state, self.zip_code
        )
    }
}

/// Region reference in the retailer's address shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    /// Short ISO region code, e.g. `VA`.
    #[serde(default)]
    pub isocode_short: String,
}

/// Country reference in the retailer's address shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    /// ISO country code.
    pub isocode: String,
    /// Display name; only sent to the verification service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Default for Country {
    fn default() -> Self {
        Self {
            isocode: default_country(),
            name: None,
        }
    }
}

/// An address in the retailer's shape.
///
/// This is both the verification request body and the shape of the
/// verification service's suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedAddress {
    /// Country.
    #[serde(default)]
    pub country: Country,
    /// Region.
    #[serde(default)]
    pub region: Region,
    /// First address line.
    pub line1: String,
    /// Second address line.
    #[serde(default)]
    pub line2: String,
    /// Postal code.
    pub postal_code: String,
    /// City.
    pub town: String,
}

impl From<&ShippingAddress> for VerifiedAddress {
    fn from(address: &ShippingAddress) -> Self {
        Self {
            country: Country {
                isocode: address.country.clone(),
                name: None,
            },
            region: Region {
                isocode_short: address.state.clone(),
            },
            line1: address.address1.clone(),
            line2: address.address2.clone(),
            postal_code: address.zip_code.clone(),
            town: address.city.clone(),
        }
    }
}

impl VerifiedAddress {
    /// The verification request body for `address`.
    #[must_use]
    pub fn verification_request(address: &ShippingAddress) -> Self {
        let mut request = Self::from(address);
        request.country.name = Some(address.country.clone());
        request
    }

    /// Returns true if `self` and `other` describe the same place.
    #[must_use]
    pub fn same_location(&self, other: &Self) -> bool {
        self.line1.eq_ignore_ascii_case(&other.line1)
            && self.line2.eq_ignore_ascii_case(&other.line2)
            && self.town.eq_ignore_ascii_case(&other.town)
            && self.postal_code == other.postal_code
            && self
                .region
                .isocode_short
                .eq_ignore_ascii_case(&other.region.isocode_short)
            && self.country.isocode.eq_ignore_ascii_case(&other.country.isocode)
    }
}

/// Response of the address verification service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressVerificationResponse {
    /// `Accepted`, `Rejected`, or a review state.
    #[serde(default)]
    pub decision: Option<String>,
    /// Standardized alternatives, best first.
    #[serde(default)]
    pub suggested_addresses: Vec<VerifiedAddress>,
}

impl AddressVerificationResponse {
    /// Returns true if the service rejected the address outright.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        self.decision
            .as_deref()
            .is_some_and(|d| d.eq_ignore_ascii_case("rejected"))
    }

    /// The suggestion that replaces the caller's address, if any.
    #[must_use]
    pub fn suggestion(&self) -> Option<&VerifiedAddress> {
        self.suggested_addresses.first()
    }
}

/// The cart's shipping address entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartAddress {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// First address line.
    pub line1: String,
    /// Second address line.
    pub line2: String,
    /// City.
    pub town: String,
    /// Region.
    pub region: Region,
    /// Postal code.
    pub postal_code: String,
    /// Country (code only).
    pub country: Country,
    /// Phone.
    pub phone: String,
    /// Email.
    pub email: String,
    /// Marks the entry as the shipping address.
    pub shipping_address: bool,
}

impl CartAddress {
    /// Combines contact details with a verified address.
    #[must_use]
    pub fn new(contact: &ContactInfo, address: &VerifiedAddress) -> Self {
        Self {
            first_name: contact.first_name().to_string(),
            last_name: contact.last_name().to_string(),
            line1: address.line1.clone(),
            line2: address.line2.clone(),
            town: address.town.clone(),
            region: address.region.clone(),
            postal_code: address.postal_code.clone(),
            country: Country {
                isocode: address.country.isocode.clone(),
                name: None,
            },
            phone: contact.phone().to_string(),
            email: contact.email().to_string(),
            shipping_address: true,
        }
    }
}

/// Body of the set-shipping-address request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddressPayload {
    /// The address entry.
    pub shipping_address: CartAddress,
}
