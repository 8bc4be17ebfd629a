//! Coordination-server event contract.
//!
//! The wire unit is an envelope `{"event": <name>, "data": <payload>}` with
//! snake_case event names and camelCase payload fields. Framing (how an
//! envelope becomes bytes) is owned by the transport adapter; this module
//! owns only the field-level contract.
//!
//! Inbound events are parsed into a closed enum and dispatched through a
//! single `match` in the session. Unknown event names parse to `None` and
//! malformed payloads surface as errors, both of which the session drops
//! without crashing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::message::BroadcastMessage;

/// Raw wire envelope before the payload is interpreted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Event name, e.g. `task_assigned`
    pub event: String,
    /// Event payload; shape depends on the event name
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }
}

/// Events this agent emits to the coordination server.
///
/// All emissions are fire-and-forget: at-least-once, no acknowledgment
/// awaited. Serializes directly to the wire envelope shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum OutboundEvent {
    /// Sent at most once per physical connection
    RegisterAgent(Registration),
    /// One per phase transition plus a terminal one
    UpdateTaskProgress(ProgressUpdate),
    /// Free-text broadcast to peer agents
    AgentMessage(BroadcastMessage),
}

/// Registration payload announcing this agent to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub agent_id: String,
    pub name: String,
    pub capabilities: Vec<String>,
}

/// Fractional progress report for an in-flight task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub task_id: String,
    /// 0-100; 0 is reserved for the failure report
    pub progress: u8,
    pub agent_id: String,
    pub status: String,
}

/// Events the coordination server delivers to this agent.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// Registration acknowledgment; payload carries nothing we act on
    AgentRegistered,
    /// A task was routed to some agent (not necessarily this one)
    TaskAssigned(TaskAssignment),
    /// A peer (or our own echo) spoke on the broadcast channel
    AgentMessage(BroadcastMessage),
    /// Informational: a task entered the server's queue
    TaskCreated(TaskNotice),
}

/// Payload of `task_assigned`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAssignment {
    /// Target agent; assignments addressed elsewhere are ignored
    pub agent_id: String,
    pub task: TaskPayload,
}

/// Task fields as delivered on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub required_capabilities: Vec<String>,
}

/// Payload of `task_created`; logged, never acted on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskNotice {
    #[serde(default)]
    pub task: TaskNoticeBody,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskNoticeBody {
    #[serde(default)]
    pub description: Option<String>,
}

impl InboundEvent {
    /// Interpret an envelope.
    ///
    /// Returns `Ok(None)` for event names this agent does not consume and
    /// `Err` when a known event carries a malformed payload. Both cases are
    /// dropped by the caller.
    pub fn parse(envelope: &Envelope) -> Result<Option<Self>, serde_json::Error> {
        let event = match envelope.event.as_str() {
            "agent_registered" => Self::AgentRegistered,
            "task_assigned" => {
                Self::TaskAssigned(serde_json::from_value(envelope.data.clone())?)
            }
            "agent_message" => {
                Self::AgentMessage(serde_json::from_value(envelope.data.clone())?)
            }
            "task_created" => {
                Self::TaskCreated(serde_json::from_value(envelope.data.clone())?)
            }
            _ => return Ok(None),
        };
        Ok(Some(event))
    }
}
