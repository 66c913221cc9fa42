//! Testing utilities for checkout runs.
//!
//! This module provides:
//! - A scripted HTTP transport
//! - Sample buyer records and wired-up clients
//! - Assertions for step results and outcomes

mod assertions;
pub mod fixtures;
mod mocks;

pub use assertions::{
    assert_outcome_failed_at, assert_outcome_succeeded, assert_step_failed,
    assert_step_status, assert_step_succeeded,
};
pub use mocks::{MockReply, MockTransport};
