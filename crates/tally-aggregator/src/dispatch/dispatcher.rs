use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use tally_core::counters::Delta;
use tally_core::error::{Result, TallyError};
use tally_core::protocol::Envelope;

/// Metrics label shared by every unregistered event type.
pub const UNKNOWN_EVENT_LABEL: &str = "unknown";

/// Result of handling one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// One delta was merged into the counters document.
    Applied(Delta),
    /// The event does not affect any counter (e.g. a record update).
    Skipped,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Applied(_) => "applied",
            Outcome::Skipped => "skipped",
        }
    }
}

/// Handler for one event type. Each invocation is independent and reentrant.
#[async_trait]
pub trait EventHandler: Send + Sync {
    fn event_type(&self) -> &'static str;
    async fn handle(&self, env: Envelope) -> Result<Outcome>;
}

/// Registry and dispatcher keyed by event type.
#[derive(Default)]
pub struct Dispatcher {
    handlers: DashMap<&'static str, Arc<dyn EventHandler>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            handlers: DashMap::new(),
        }
    }

    pub fn register(&self, handler: Arc<dyn EventHandler>) {
        self.handlers.insert(handler.event_type(), handler);
    }

    pub fn registered_types(&self) -> Vec<&'static str> {
        let mut types: Vec<&'static str> = self.handlers.iter().map(|e| *e.key()).collect();
        types.sort_unstable();
        types
    }

    /// Metrics label for a caller-supplied event type: the registered type, or
    /// `"unknown"`, so label cardinality is bounded by the handler set.
    pub fn label_for(&self, event_type: &str) -> &'static str {
        self.handlers
            .get(event_type)
            .map(|e| *e.key())
            .unwrap_or(UNKNOWN_EVENT_LABEL)
    }

    pub async fn dispatch(&self, env: Envelope) -> Result<Outcome> {
        let ty = env.event_type.as_str();
        let handler = self
            .handlers
            .get(ty)
            .ok_or_else(|| TallyError::UnknownEvent(ty.to_string()))?
            .value()
            .clone();
        handler.handle(env).await
    }
}
