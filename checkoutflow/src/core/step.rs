//! The fixed, ordered set of checkout steps.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the six checkout steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    /// Step 1: submit contact details.
    SubmitContactInfo,
    /// Step 2: verify the shipping address.
    VerifyAddress,
    /// Step 3: set the verified address on the cart.
    SetShippingAddress,
    /// Step 4: refresh the cart and check shipping was applied.
    RefreshCart,
    /// Step 5: build the encrypted payment block (local only).
    PreparePayment,
    /// Step 6: place the order.
    PlaceOrder,
}

impl StepId {
    /// All steps in execution order.
    pub const ALL: [Self; 6] = [
        Self::SubmitContactInfo,
        Self::VerifyAddress,
        Self::SetShippingAddress,
        Self::RefreshCart,
        Self::PreparePayment,
        Self::PlaceOrder,
    ];

    /// 1-based position in the pipeline.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::SubmitContactInfo => 1,
            Self::VerifyAddress => 2,
            Self::SetShippingAddress => 3,
            Self::RefreshCart => 4,
            Self::PreparePayment => 5,
            Self::PlaceOrder => 6,
        }
    }

    /// Looks up a step by its 1-based position.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index.checked_sub(1)?).copied()
    }

    /// Stable snake_case name used in logs and events.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SubmitContactInfo => "submit_contact_info",
            Self::VerifyAddress => "verify_address",
            Self::SetShippingAddress => "set_shipping_address",
            Self::RefreshCart => "refresh_cart",
            Self::PreparePayment => "prepare_payment",
            Self::PlaceOrder => "place_order",
        }
    }

    /// Short description for CLI listings.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::SubmitContactInfo => "Submit contact information",
            Self::VerifyAddress => "Verify shipping address",
            Self::SetShippingAddress => "Set shipping address on cart",
            Self::RefreshCart => "Refresh cart with shipping",
            Self::PreparePayment => "Prepare encrypted payment block",
            Self::PlaceOrder => "Place order",
        }
    }

    /// Whether the step issues an HTTP request.
    #[must_use]
    pub const fn contacts_remote(self) -> bool {
        !matches!(self, Self::PreparePayment)
    }

    /// The step that follows this one, if any.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StepId {
    type Err = String;

    /// Accepts either the 1-based index or the step name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(index) = s.parse::<usize>() {
            return Self::from_index(index)
                .ok_or_else(|| format!("step index must be between 1 and 6, got {index}"));
        }
        Self::ALL
            .iter()
            .copied()
            .find(|step| step.name() == s)
            .ok_or_else(|| format!("unknown step '{s}'"))
    }
}
