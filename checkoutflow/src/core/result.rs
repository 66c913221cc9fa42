//! Step records and typed step results.

use super::{StepId, StepStatus};
use crate::errors::StepFailure;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What happened when a step ran.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// The step.
    pub step: StepId,
    /// Step status.
    pub status: StepStatus,
    /// HTTP status of the response, if one was received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    /// Parsed response body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
    /// Failure details when the step failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<StepFailure>,
    /// Warning for soft failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// When the step started.
    pub started_at: DateTime<Utc>,
    /// When the step ended.
    pub ended_at: DateTime<Utc>,
}

impl StepRecord {
    /// Creates a successful record.
    #[must_use]
    pub fn succeeded(
        step: StepId,
        started_at: DateTime<Utc>,
        http_status: Option<u16>,
        body: Option<serde_json::Value>,
    ) -> Self {
        Self {
            step,
            status: StepStatus::Ok,
            http_status,
            body,
            failure: None,
            warning: None,
            started_at,
            ended_at: Utc::now(),
        }
    }

    /// Creates a failed record.
    #[must_use]
    pub fn failed(step: StepId, started_at: DateTime<Utc>, failure: StepFailure) -> Self {
        Self {
            step,
            status: StepStatus::Fail,
            http_status: failure.http_status,
            body: None,
            failure: Some(failure),
            warning: None,
            started_at,
            ended_at: Utc::now(),
        }
    }

    /// Downgrades a successful record to a soft failure.
    #[must_use]
    pub fn soften(mut self, warning: impl Into<String>) -> Self {
        self.status = StepStatus::SoftFail;
        self.warning = Some(warning.into());
        self
    }

    /// Turns the record into a hard failure.
    #[must_use]
    pub fn harden(mut self, failure: StepFailure) -> Self {
        self.status = StepStatus::Fail;
        self.failure = Some(failure);
        self
    }

    /// Returns the duration in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> f64 {
        (self.ended_at - self.started_at).num_milliseconds() as f64
    }

    /// Returns true if the pipeline may continue past this record.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns true if the step failed.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.status.is_failure()
    }
}

/// A step record plus the typed value the step produced.
#[derive(Debug, Clone)]
pub struct StepResult<T = ()> {
    /// The record.
    pub record: StepRecord,
    /// The produced value, present on success and soft failure.
    pub value: Option<T>,
}

impl<T> StepResult<T> {
    /// Creates a result carrying a value.
    #[must_use]
    pub fn ok(record: StepRecord, value: T) -> Self {
        Self {
            record,
            value: Some(value),
        }
    }

    /// Creates a failed result.
    #[must_use]
    pub fn failed(step: StepId, started_at: DateTime<Utc>, failure: StepFailure) -> Self {
        Self {
            record: StepRecord::failed(step, started_at, failure),
            value: None,
        }
    }

    /// The step this result belongs to.
    #[must_use]
    pub fn step(&self) -> StepId {
        self.record.step
    }

    /// Returns true if the pipeline may continue past this result.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.record.is_success()
    }

    /// Failure details, if the step failed.
    #[must_use]
    pub fn failure(&self) -> Option<&StepFailure> {
        self.record.failure.as_ref()
    }

    /// The produced value.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Splits into record and value.
    #[must_use]
    pub fn into_parts(self) -> (StepRecord, Option<T>) {
        (self.record, self.value)
    }
}
