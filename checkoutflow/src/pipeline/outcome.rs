//! Result of a pipeline run.

use crate::core::{StepId, StepRecord, StepStatus};
use crate::errors::{FailureKind, StepFailure};
use crate::models::OrderConfirmation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a run did: the step records in order, the failure that stopped
/// it, and the order confirmation when one was placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutcome {
    /// Run identifier.
    pub run_id: Uuid,
    /// Records of every step that ran, in execution order.
    pub records: Vec<StepRecord>,
    /// The failure that stopped the run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<StepFailure>,
    /// Confirmation of a placed order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderConfirmation>,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Total duration in milliseconds.
    pub duration_ms: f64,
}

impl PipelineOutcome {
    /// Returns true if no step failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Returns true if the run was refused before any step ran.
    #[must_use]
    pub fn is_configuration_failure(&self) -> bool {
        self.failure
            .as_ref()
            .is_some_and(|f| f.kind == FailureKind::ConfigurationInvalid)
    }

    /// The step that failed, if any.
    #[must_use]
    pub fn failed_step(&self) -> Option<StepId> {
        self.failure.as_ref().and_then(|f| f.step)
    }

    /// The record for `step`, if it ran.
    #[must_use]
    pub fn record(&self, step: StepId) -> Option<&StepRecord> {
        self.records.iter().find(|r| r.step == step)
    }

    /// Steps that ran, in order.
    #[must_use]
    pub fn steps_run(&self) -> Vec<StepId> {
        self.records.iter().map(|r| r.step).collect()
    }

    /// The placed order's id.
    #[must_use]
    pub fn order_id(&self) -> Option<&str> {
        self.order.as_ref().map(|o| o.order_id.as_str())
    }

    /// One line per step plus a final verdict, for terminal output.
    #[must_use]
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .records
            .iter()
            .map(|record| {
                let status = match record.status {
                    StepStatus::Ok => "ok",
                    StepStatus::SoftFail => "warn",
                    StepStatus::Fail => "FAIL",
                };
                let mut line = format!(
                    "[{}] {:<22} {status}",
                    record.step.index(),
                    record.step.name()
                );
                if let Some(code) = record.http_status {
                    line.push_str(&format!(" (HTTP {code})"));
                }
                if let Some(ref warning) = record.warning {
                    line.push_str(&format!(" - {warning}"));
                }
                line
            })
            .collect();

        lines.push(match (&self.failure, &self.order) {
            (Some(failure), _) => format!("FAILED: {failure}"),
            (None, Some(order)) => format!("SUCCESS: order {}", order.order_id),
            (None, None) => "SUCCESS".to_string(),
        });
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ConfigError;

    fn outcome(records: Vec<StepRecord>, failure: Option<StepFailure>) -> PipelineOutcome {
        PipelineOutcome {
            run_id: Uuid::new_v4(),
            records,
            failure,
            order: None,
            started_at: Utc::now(),
            duration_ms: 1.0,
        }
    }

    #[test]
    fn test_failed_outcome_summary() {
        let failure = StepFailure::http_status(StepId::VerifyAddress, 500, "oops");
        let records = vec![
            StepRecord::succeeded(StepId::SubmitContactInfo, Utc::now(), Some(200), None),
            StepRecord::failed(StepId::VerifyAddress, Utc::now(), failure.clone()),
        ];
        let outcome = outcome(records, Some(failure));

        assert!(!outcome.is_success());
        assert_eq!(outcome.failed_step(), Some(StepId::VerifyAddress));
        assert_eq!(
            outcome.steps_run(),
            vec![StepId::SubmitContactInfo, StepId::VerifyAddress]
        );

        let lines = outcome.summary_lines();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("[1] submit_contact_info"));
        assert!(lines[0].ends_with("ok (HTTP 200)"));
        assert!(lines[1].contains("FAIL (HTTP 500)"));
        assert!(lines[2].starts_with("FAILED: step 2 (verify_address)"));
    }

    #[test]
    fn test_configuration_failure() {
        let failure = StepFailure::configuration(&ConfigError::MissingCookies(vec!["ZGWID".into()]));
        let outcome = outcome(Vec::new(), Some(failure));

        assert!(outcome.is_configuration_failure());
        assert_eq!(outcome.failed_step(), None);
        assert!(outcome.steps_run().is_empty());
    }

    #[test]
    fn test_success_summary_names_order() {
        let mut outcome = outcome(Vec::new(), None);
        outcome.order = Some(OrderConfirmation {
            order_id: "P1".to_string(),
            body: serde_json::json!({"orderNumber": "P1"}),
        });

        assert!(outcome.is_success());
        assert_eq!(outcome.order_id(), Some("P1"));
        assert_eq!(outcome.summary_lines(), vec!["SUCCESS: order P1".to_string()]);
    }
}
