//! Contact details.

use super::{country_code, default_country, digits, require};
use crate::errors::ValidationError;
use serde::{Deserialize, Serialize};

/// Buyer contact details, validated at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawContactInfo")]
pub struct ContactInfo {
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    phone_country: String,
}

#[derive(Deserialize)]
struct RawContactInfo {
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    #[serde(default = "default_country")]
    phone_country: String,
}

impl TryFrom<RawContactInfo> for ContactInfo {
    type Error = ValidationError;

    fn try_from(raw: RawContactInfo) -> Result<Self, Self::Error> {
        let email = require("email", &raw.email)?;
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
            _ => return Err(ValidationError::new("email", "must look like name@domain.tld")),
        }

        let phone = require("phone", &raw.phone)?;
        if digits(&phone).len() < 10 {
            return Err(ValidationError::new("phone", "must contain at least 10 digits"));
        }

        Ok(Self {
            first_name: require("first_name", &raw.first_name)?,
            last_name: require("last_name", &raw.last_name)?,
            email,
            phone,
            phone_country: country_code("phone_country", &raw.phone_country)?,
        })
    }
}

impl ContactInfo {
    /// Creates validated contact details with a US phone number.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::try_from(RawContactInfo {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            phone: phone.into(),
            phone_country: default_country(),
        })
    }

    /// Sets the phone country code.
    pub fn with_phone_country(mut self, code: &str) -> Result<Self, ValidationError> {
        self.phone_country = country_code("phone_country", code)?;
        Ok(self)
    }

    /// First name.
    #[must_use]
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    /// Last name.
    #[must_use]
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// Email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Phone number as supplied.
    #[must_use]
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// Phone country code.
    #[must_use]
    pub fn phone_country(&self) -> &str {
        &self.phone_country
    }

    /// "First Last".
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Body of the contact info request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPayload {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email.
    pub email: String,
    /// Phone.
    pub phone: String,
    /// Phone country.
    pub phone_country: String,
    /// Always false; the PayPal prompt is not used.
    pub pay_pal_alert: bool,
}

impl From<&ContactInfo> for ContactPayload {
    fn from(contact: &ContactInfo) -> Self {
        Self {
            first_name: contact.first_name.clone(),
            last_name: contact.last_name.clone(),
            email: contact.email.clone(),
            phone: contact.phone.clone(),
            phone_country: contact.phone_country.clone(),
            pay_pal_alert: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn contact() -> ContactInfo {
        ContactInfo::new("kazmi", "shb", "domgyrgpt@gmail.com", "9452060458").unwrap()
    }

    #[test]
    fn test_valid_contact() {
        let contact = contact();
        assert_eq!(contact.full_name(), "kazmi shb");
        assert_eq!(contact.phone_country(), "US");
    }

    #[test]
    fn test_rejects_bad_email() {
        let err = ContactInfo::new("a", "b", "not-an-email", "9452060458").unwrap_err();
        assert_eq!(err.field, "email");
    }

    #[test]
    fn test_rejects_short_phone() {
        let err = ContactInfo::new("a", "b", "a@b.com", "12345").unwrap_err();
        assert_eq!(err.field, "phone");
    }

    #[test]
    fn test_rejects_blank_name() {
        let err = ContactInfo::new(" ", "b", "a@b.com", "9452060458").unwrap_err();
        assert_eq!(err.field, "first_name");
    }

    #[test]
    fn test_deserialize_runs_validation() {
        let ok: ContactInfo = toml::from_str(
            r#"
            first_name = "kazmi"
            last_name = "shb"
            email = "domgyrgpt@gmail.com"
            phone = "9452060458"
            "#,
        )
        .unwrap();
        assert_eq!(ok, contact());

        let bad = toml::from_str::<ContactInfo>(
            r#"
            first_name = "kazmi"
            last_name = "shb"
            email = "nope"
            phone = "9452060458"
            "#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_payload_wire_shape() {
        let payload = serde_json::to_value(ContactPayload::from(&contact())).unwrap();
        assert_eq!(
            payload,
            serde_json::json!({
                "firstName": "kazmi",
                "lastName": "shb",
                "email": "domgyrgpt@gmail.com",
                "phone": "9452060458",
                "phoneCountry": "US",
                "payPalAlert": false
            })
        );
    }
}
