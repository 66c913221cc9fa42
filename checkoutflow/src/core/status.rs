//! Step status enum.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The outcome status of a single checkout step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Step completed successfully.
    Ok,
    /// Step completed but a non-fatal check did not hold.
    SoftFail,
    /// Step failed; the pipeline stops here.
    Fail,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::SoftFail => write!(f, "soft_fail"),
            Self::Fail => write!(f, "fail"),
        }
    }
}

impl StepStatus {
    /// Returns true if the pipeline may continue past this status.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Ok | Self::SoftFail)
    }

    /// Returns true if the status indicates failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Fail)
    }
}
