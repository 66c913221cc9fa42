//! Event sink trait and implementations.

use super::{event_level, EventData};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info, warn, Level};

/// Trait for event sinks that can receive events.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Emits an event asynchronously.
    ///
    /// # Arguments
    ///
    /// * `event_type` - The type of event (e.g., "step.succeeded")
    /// * `data` - Optional event data
    async fn emit(&self, event_type: &str, data: Option<serde_json::Value>);

    /// Emits an event without awaiting.
    ///
    /// Never fails; sink errors are logged and suppressed.
    fn try_emit(&self, event_type: &str, data: Option<serde_json::Value>);
}

/// A no-op event sink that discards all events.
///
/// Used as the default when no sink is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event_type: &str, _data: Option<serde_json::Value>) {}

    fn try_emit(&self, _event_type: &str, _data: Option<serde_json::Value>) {}
}

/// An event sink that logs events using the tracing framework.
///
/// Each event is logged at the level its type implies (failures at
/// `ERROR`, soft failures at `WARN`), never below the sink's minimum.
#[derive(Debug, Clone)]
pub struct LoggingEventSink {
    minimum: Level,
}

impl Default for LoggingEventSink {
    fn default() -> Self {
        Self {
            minimum: Level::DEBUG,
        }
    }
}

impl LoggingEventSink {
    /// Creates a logging sink that raises events to at least `minimum`.
    #[must_use]
    pub fn new(minimum: Level) -> Self {
        Self { minimum }
    }

    /// Creates an info-level logging sink.
    #[must_use]
    pub fn info() -> Self {
        Self::new(Level::INFO)
    }

    fn log_event(&self, event_type: &str, data: Option<&serde_json::Value>) {
        // tracing orders levels by verbosity, so ERROR < INFO.
        let level = event_level(event_type).min(self.minimum);
        let fields = data.and_then(EventData::from_value).unwrap_or_default();
        let step = fields.step.unwrap_or_default();
        let name = fields.name.as_deref().unwrap_or("-");
        let reason = fields.reason.as_deref().unwrap_or("");

        match level {
            Level::ERROR => error!(
                event_type = %event_type,
                run_id = %fields.run_id,
                step,
                name,
                http_status = ?fields.http_status,
                reason,
                snippet = ?fields.snippet,
                "Event: {}", event_type
            ),
            Level::WARN => warn!(
                event_type = %event_type,
                run_id = %fields.run_id,
                step,
                name,
                reason,
                "Event: {}", event_type
            ),
            Level::INFO => info!(
                event_type = %event_type,
                run_id = %fields.run_id,
                step,
                name,
                "Event: {}", event_type
            ),
            _ => debug!(
                event_type = %event_type,
                event_data = ?data,
                "Event: {}", event_type
            ),
        }
    }
}

#[async_trait]
impl EventSink for LoggingEventSink {
    async fn emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        self.log_event(event_type, data.as_ref());
    }

    fn try_emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        self.log_event(event_type, data.as_ref());
    }
}

/// A collecting event sink for testing purposes.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: parking_lot::RwLock<Vec<(String, Option<serde_json::Value>)>>,
}

impl CollectingEventSink {
    /// Creates a new collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    #[must_use]
    pub fn events(&self) -> Vec<(String, Option<serde_json::Value>)> {
        self.events.read().clone()
    }

    /// Returns the collected event types in order.
    #[must_use]
    pub fn event_types(&self) -> Vec<String> {
        self.events.read().iter().map(|(t, _)| t.clone()).collect()
    }

    /// Returns the number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if no events have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Returns events matching a type prefix.
    #[must_use]
    pub fn events_of_type(&self, type_prefix: &str) -> Vec<(String, Option<serde_json::Value>)> {
        self.events
            .read()
            .iter()
            .filter(|(t, _)| t.starts_with(type_prefix))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EventSink for CollectingEventSink {
    async fn emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        self.events.write().push((event_type.to_string(), data));
    }

    fn try_emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        self.events.write().push((event_type.to_string(), data));
    }
}

/// Forwards every event to each inner sink in order.
#[derive(Default, Clone)]
pub struct FanoutEventSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanoutEventSink {
    /// Creates an empty fanout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Number of inner sinks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Returns true if there are no inner sinks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl std::fmt::Debug for FanoutEventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutEventSink")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

#[async_trait]
impl EventSink for FanoutEventSink {
    async fn emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        for sink in &self.sinks {
            sink.emit(event_type, data.clone()).await;
        }
    }

    fn try_emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        for sink in &self.sinks {
            sink.try_emit(event_type, data.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{STEP_FAILED, STEP_STARTED, STEP_SUCCEEDED};

    #[tokio::test]
    async fn test_noop_sink() {
        let sink = NoOpEventSink;
        sink.emit(STEP_STARTED, None).await;
        sink.try_emit(STEP_STARTED, Some(serde_json::json!({"x": 1})));
    }

    #[tokio::test]
    async fn test_logging_sink_accepts_any_payload() {
        let sink = LoggingEventSink::info();
        sink.emit(STEP_FAILED, Some(serde_json::json!({"run_id": "r", "step": 2})))
            .await;
        sink.emit("custom", Some(serde_json::json!([1, 2]))).await;
        sink.try_emit(STEP_SUCCEEDED, None);
    }

    #[tokio::test]
    async fn test_collecting_sink() {
        let sink = CollectingEventSink::new();
        assert!(sink.is_empty());

        sink.emit(STEP_STARTED, None).await;
        sink.try_emit(STEP_SUCCEEDED, Some(serde_json::json!({"step": 1})));

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.event_types(), vec![STEP_STARTED, STEP_SUCCEEDED]);
        assert_eq!(sink.events_of_type("step.").len(), 2);
        assert!(sink.events_of_type("pipeline.").is_empty());
    }

    #[test]
    fn test_fanout_reaches_every_sink() {
        let first = Arc::new(CollectingEventSink::new());
        let second = Arc::new(CollectingEventSink::new());
        let fanout = FanoutEventSink::new()
            .with_sink(first.clone())
            .with_sink(second.clone());

        tokio_test::block_on(fanout.emit(STEP_SUCCEEDED, None));
        fanout.try_emit(STEP_FAILED, None);

        assert_eq!(fanout.len(), 2);
        assert_eq!(first.len(), 2);
        assert_eq!(second.event_types(), vec![STEP_SUCCEEDED, STEP_FAILED]);
    }
}
