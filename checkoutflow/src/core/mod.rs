//! Core domain model types for checkoutflow.
//!
//! This module contains the fundamental types used throughout the crate:
//! - The fixed set of checkout steps
//! - Step status enum
//! - Step records and typed step results

mod result;
mod status;
mod step;

pub use result::{StepRecord, StepResult};
pub use status::StepStatus;
pub use step::StepId;
