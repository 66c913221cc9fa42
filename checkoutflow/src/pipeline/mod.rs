//! Pipeline execution.
//!
//! This module provides:
//! - The sequential checkout runner
//! - Single-step runs with locally built prerequisites
//! - The run outcome and its summary

mod outcome;
mod runner;

#[cfg(test)]
mod integration_tests;

pub use outcome::PipelineOutcome;
pub use runner::{CheckoutInputs, CheckoutPipeline, PipelineOptions};
