//! Error types for the checkout pipeline.
//!
//! Library calls that can fail outright (loading configuration, parsing
//! cookie files, talking to the transport) return [`CheckoutError`]. Step
//! failures are different: they are never raised, they are carried as a
//! structured [`StepFailure`] inside step and pipeline outcomes.

use crate::core::StepId;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum number of characters of a response body kept for diagnostics.
pub const SNIPPET_LIMIT: usize = 300;

/// The main error type for checkoutflow operations.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Configuration is missing or malformed.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// The HTTP transport failed.
    #[error("{0}")]
    Transport(#[from] TransportError),

    /// An input record failed validation.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// No payment encryption capability could produce a block.
    #[error("Encryption unavailable: {0}")]
    EncryptionUnavailable(String),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error.
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CheckoutError {
    /// Creates an encryption unavailable error.
    #[must_use]
    pub fn encryption_unavailable(reason: impl Into<String>) -> Self {
        Self::EncryptionUnavailable(reason.into())
    }
}

/// Errors raised while building or checking configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Required cookies are absent or empty.
    #[error("Missing required cookies: {}", .0.join(", "))]
    MissingCookies(Vec<String>),

    /// A configuration value is out of range or malformed.
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue {
        /// The offending field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ConfigError {
    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Errors produced by an [`HttpTransport`](crate::transport::HttpTransport).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request did not complete before the configured timeout.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The connection could not be established.
    #[error("Connection failed: {0}")]
    Connect(String),

    /// Any other request failure (TLS, body encoding, client setup).
    #[error("Request failed: {0}")]
    Request(String),
}

impl TransportError {
    /// Returns true for timeouts.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// Error raised when an input record fails validation at construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {field}: {reason}")]
pub struct ValidationError {
    /// The field that failed.
    pub field: String,
    /// Why it failed.
    pub reason: String,
}

impl ValidationError {
    /// Creates a new validation error.
    #[must_use]
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Classification of a failed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Configuration was invalid; no request was issued.
    ConfigurationInvalid,
    /// Connection failure or timeout.
    NetworkFailure,
    /// The remote answered with a non-2xx status.
    HttpStatusFailure,
    /// The remote rejected the submitted data.
    ValidationFailure,
    /// The payment block could not be produced.
    EncryptionUnavailable,
    /// A 2xx response whose body could not be used.
    InvalidResponse,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigurationInvalid => write!(f, "configuration invalid"),
            Self::NetworkFailure => write!(f, "network failure"),
            Self::HttpStatusFailure => write!(f, "http status failure"),
            Self::ValidationFailure => write!(f, "validation failure"),
            Self::EncryptionUnavailable => write!(f, "encryption unavailable"),
            Self::InvalidResponse => write!(f, "invalid response"),
        }
    }
}

/// A structured step failure.
///
/// `step` is `None` only for configuration failures detected before the
/// first step runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFailure {
    /// The step that failed.
    pub step: Option<StepId>,
    /// Failure classification.
    pub kind: FailureKind,
    /// HTTP status, when a response was received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    /// Human-readable reason.
    pub reason: String,
    /// Leading part of the response body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

impl StepFailure {
    /// Creates a new failure.
    #[must_use]
    pub fn new(step: Option<StepId>, kind: FailureKind, reason: impl Into<String>) -> Self {
        Self {
            step,
            kind,
            http_status: None,
            reason: reason.into(),
            snippet: None,
        }
    }

    /// Configuration failure detected before any request.
    #[must_use]
    pub fn configuration(error: &ConfigError) -> Self {
        Self::new(None, FailureKind::ConfigurationInvalid, error.to_string())
    }

    /// Transport failure while talking to the remote.
    #[must_use]
    pub fn network(step: StepId, error: &TransportError) -> Self {
        Self::new(Some(step), FailureKind::NetworkFailure, error.to_string())
    }

    /// Non-2xx response.
    #[must_use]
    pub fn http_status(step: StepId, status: u16, body: &str) -> Self {
        Self::new(
            Some(step),
            FailureKind::HttpStatusFailure,
            format!("unexpected HTTP status {status}"),
        )
        .with_http_status(status)
        .with_snippet(body)
    }

    /// Remote rejected the submitted data.
    #[must_use]
    pub fn validation(step: StepId, reason: impl Into<String>) -> Self {
        Self::new(Some(step), FailureKind::ValidationFailure, reason)
    }

    /// Payment block could not be produced.
    #[must_use]
    pub fn encryption(reason: impl Into<String>) -> Self {
        Self::new(
            Some(StepId::PreparePayment),
            FailureKind::EncryptionUnavailable,
            reason,
        )
    }

    /// 2xx response with an unusable body.
    #[must_use]
    pub fn invalid_response(step: StepId, reason: impl Into<String>) -> Self {
        Self::new(Some(step), FailureKind::InvalidResponse, reason)
    }

    /// Sets the HTTP status.
    #[must_use]
    pub fn with_http_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    /// Sets the response snippet, truncated to [`SNIPPET_LIMIT`] characters.
    #[must_use]
    pub fn with_snippet(mut self, body: &str) -> Self {
        let trimmed = body.trim();
        self.snippet = if trimmed.is_empty() {
            None
        } else {
            Some(snippet(trimmed))
        };
        self
    }
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.step {
            Some(step) => write!(
                f,
                "step {} ({}) failed: {}: {}",
                step.index(),
                step.name(),
                self.kind,
                self.reason
            ),
            None => write!(f, "{}: {}", self.kind, self.reason),
        }
    }
}

impl std::error::Error for StepFailure {}

/// Returns the first [`SNIPPET_LIMIT`] characters of `body`.
#[must_use]
pub fn snippet(body: &str) -> String {
    body.chars().take(SNIPPET_LIMIT).collect()
}
