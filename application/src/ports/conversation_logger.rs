//! Port for structured conversation logging.
//!
//! Defines the [`ConversationLogger`] trait for recording conversation events
//! (system milestones, agent responses, tool usage) to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the
//! discussion transcript in a machine-readable format (JSONL). The
//! orchestrator never calls a logger directly; it appends to an
//! [`EventQueue`](crate::use_cases::run_discussion::EventQueue) that a
//! separate task drains into the logger.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    System,
    AgentResponse,
    ToolUsage,
}

impl EventKind {
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::System => "system",
            EventKind::AgentResponse => "agent_response",
            EventKind::ToolUsage => "tool_usage",
        }
    }
}

/// A structured conversation event for logging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationEvent {
    pub kind: EventKind,
    /// Event-specific data
    pub payload: Value,
    /// Routing data such as conversation id, round and agent
    pub metadata: Value,
}

impl ConversationEvent {
    pub fn new(kind: EventKind, payload: Value) -> Self {
        Self {
            kind,
            payload,
            metadata: Value::Null,
        }
    }

    pub fn system(payload: Value) -> Self {
        Self::new(EventKind::System, payload)
    }

    pub fn agent_response(payload: Value) -> Self {
        Self::new(EventKind::AgentResponse, payload)
    }

    pub fn tool_usage(payload: Value) -> Self {
        Self::new(EventKind::ToolUsage, payload)
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Port for logging conversation events to a structured log.
///
/// The `log` method is synchronous and non-fallible: logging failures are
/// swallowed by the adapter.
pub trait ConversationLogger: Send + Sync {
    /// Record a conversation event.
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
