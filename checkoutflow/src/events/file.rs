//! Append-only step log on disk.

use super::{event_level, event_message, EventData, EventSink, STEP_STARTED};
use crate::errors::CheckoutError;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes one line per step outcome to a log file.
///
/// Lines look like
/// `2025-07-01T12:00:00.000Z INFO step succeeded run=<id> step=1 name=submit_contact_info http_status=200`.
/// `step.started` and unknown event types are not written.
#[derive(Debug)]
pub struct FileEventSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileEventSink {
    /// Opens `path` for appending, creating it and its parent directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CheckoutError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// The log file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Renders an event as a log line, or `None` if it is not logged.
    #[must_use]
    pub fn format_line(
        at: DateTime<Utc>,
        event_type: &str,
        data: Option<&serde_json::Value>,
    ) -> Option<String> {
        if event_type == STEP_STARTED {
            return None;
        }
        let message = event_message(event_type)?;
        let fields = data.and_then(EventData::from_value).unwrap_or_default();

        let mut line = format!(
            "{} {} {}",
            at.to_rfc3339_opts(SecondsFormat::Millis, true),
            event_level(event_type),
            message
        );
        line.push_str(&format!(" run={}", fields.run_id));
        if let Some(step) = fields.step {
            line.push_str(&format!(" step={step}"));
        }
        if let Some(ref name) = fields.name {
            line.push_str(&format!(" name={name}"));
        }
        if let Some(status) = fields.http_status {
            line.push_str(&format!(" http_status={status}"));
        }
        if let Some(ref kind) = fields.kind {
            line.push_str(&format!(" kind=\"{kind}\""));
        }
        if let Some(ref reason) = fields.reason {
            line.push_str(&format!(" reason={reason:?}"));
        }
        if let Some(ref snippet) = fields.snippet {
            line.push_str(&format!(" snippet={snippet:?}"));
        }
        if let Some(ref order_id) = fields.order_id {
            line.push_str(&format!(" order_id={order_id}"));
        }
        Some(line)
    }

    fn write_event(&self, event_type: &str, data: Option<&serde_json::Value>) {
        let Some(line) = Self::format_line(Utc::now(), event_type, data) else {
            return;
        };
        let mut file = self.file.lock();
        if let Err(e) = writeln!(file, "{line}").and_then(|()| file.flush()) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to write step log");
        }
    }
}

#[async_trait]
impl EventSink for FileEventSink {
    async fn emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        self.write_event(event_type, data.as_ref());
    }

    fn try_emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        self.write_event(event_type, data.as_ref());
    }
}
