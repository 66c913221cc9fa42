//! Step and pipeline events.
//!
//! The pipeline reports progress through an [`EventSink`] it owns. Each
//! event is a dotted type name plus a JSON object built from
//! [`EventData`]. Sinks decide what to do with them: log through
//! `tracing`, append to the on-disk step log, or collect for tests.

mod file;
mod sink;

pub use file::FileEventSink;
pub use sink::{CollectingEventSink, EventSink, FanoutEventSink, LoggingEventSink, NoOpEventSink};

use crate::core::StepId;
use crate::errors::StepFailure;
use serde::{Deserialize, Serialize};
use tracing::Level;
use uuid::Uuid;

/// A step is about to run.
pub const STEP_STARTED: &str = "step.started";
/// A step succeeded.
pub const STEP_SUCCEEDED: &str = "step.succeeded";
/// A step completed with a warning and the run continues.
pub const STEP_SOFT_FAILED: &str = "step.soft_failed";
/// A step failed and the run stops.
pub const STEP_FAILED: &str = "step.failed";
/// Every step succeeded.
pub const PIPELINE_SUCCEEDED: &str = "pipeline.succeeded";
/// The run stopped on a failure.
pub const PIPELINE_FAILED: &str = "pipeline.failed";

/// Human-readable message for an event type, as written to the step log.
#[must_use]
pub fn event_message(event_type: &str) -> Option<&'static str> {
    match event_type {
        STEP_STARTED => Some("step started"),
        STEP_SUCCEEDED => Some("step succeeded"),
        STEP_SOFT_FAILED => Some("step soft-failed"),
        STEP_FAILED => Some("step failed"),
        PIPELINE_SUCCEEDED => Some("pipeline succeeded"),
        PIPELINE_FAILED => Some("pipeline failed"),
        _ => None,
    }
}

/// Log level for an event type.
#[must_use]
pub fn event_level(event_type: &str) -> Level {
    match event_type {
        STEP_STARTED => Level::DEBUG,
        STEP_SOFT_FAILED => Level::WARN,
        STEP_FAILED | PIPELINE_FAILED => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Payload carried by every pipeline event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventData {
    /// Run identifier.
    pub run_id: String,
    /// 1-based step index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<usize>,
    /// Step name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// HTTP status, when a response was received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    /// Failure kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Failure reason or warning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Leading part of the response body behind a failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    /// Order identifier on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

impl EventData {
    /// Creates data for a run.
    #[must_use]
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id: run_id.to_string(),
            ..Self::default()
        }
    }

    /// Sets the step.
    #[must_use]
    pub fn with_step(mut self, step: StepId) -> Self {
        self.step = Some(step.index());
        self.name = Some(step.name().to_string());
        self
    }

    /// Sets the HTTP status.
    #[must_use]
    pub fn with_http_status(mut self, status: Option<u16>) -> Self {
        self.http_status = status;
        self
    }

    /// Sets the reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Copies step, status, kind, reason and snippet from a failure.
    #[must_use]
    pub fn with_failure(mut self, failure: &StepFailure) -> Self {
        if let Some(step) = failure.step {
            self = self.with_step(step);
        }
        self.http_status = failure.http_status.or(self.http_status);
        self.kind = Some(failure.kind.to_string());
        self.reason = Some(failure.reason.clone());
        self.snippet.clone_from(&failure.snippet);
        self
    }

    /// Sets the order id.
    #[must_use]
    pub fn with_order_id(mut self, order_id: impl Into<String>) -> Self {
        self.order_id = Some(order_id.into());
        self
    }

    /// Converts to the JSON value passed to sinks.
    #[must_use]
    pub fn into_value(self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Reads data back from an event payload.
    #[must_use]
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}
