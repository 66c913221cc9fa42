//! Assertions for step results and pipeline outcomes.

use crate::core::{StepId, StepResult, StepStatus};
use crate::errors::FailureKind;
use crate::pipeline::PipelineOutcome;

/// Asserts that the step result allows the run to continue.
pub fn assert_step_succeeded<T>(result: &StepResult<T>) {
    assert!(
        result.is_success(),
        "Expected {} to succeed, got failure: {:?}",
        result.step().name(),
        result.failure()
    );
}

/// Asserts that the step failed with `kind`.
pub fn assert_step_failed<T>(result: &StepResult<T>, kind: FailureKind) {
    let failure = result.failure();
    assert_eq!(
        failure.map(|f| f.kind),
        Some(kind),
        "Expected {} to fail with {:?}, got {:?}",
        result.step().name(),
        kind,
        failure
    );
}

/// Asserts that the step result has the expected status.
pub fn assert_step_status<T>(result: &StepResult<T>, expected: StepStatus) {
    assert_eq!(
        result.record.status, expected,
        "Expected status {:?} for {}, got {:?}",
        expected,
        result.step().name(),
        result.record.status
    );
}

/// Asserts that every step ran and none failed.
pub fn assert_outcome_succeeded(outcome: &PipelineOutcome) {
    assert!(
        outcome.is_success(),
        "Expected run to succeed, got: {:?}",
        outcome.failure
    );
    assert_eq!(outcome.steps_run(), StepId::ALL.to_vec());
}

/// Asserts that the run stopped at `step` with `kind`, running nothing after it.
pub fn assert_outcome_failed_at(outcome: &PipelineOutcome, step: StepId, kind: FailureKind) {
    let failure = outcome
        .failure
        .as_ref()
        .unwrap_or_else(|| panic!("Expected run to fail at {}, but it succeeded", step.name()));
    assert_eq!(
        (failure.step, failure.kind),
        (Some(step), kind),
        "Unexpected failure: {failure}"
    );
    assert_eq!(
        outcome.steps_run().last(),
        Some(&step),
        "Expected {} to be the last step run, got {:?}",
        step.name(),
        outcome.steps_run()
    );
}
