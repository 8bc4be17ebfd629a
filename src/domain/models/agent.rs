//! Agent identity model.
//!
//! An identity is created once at process start from configuration and is
//! never mutated afterwards. Everything that personalises the agent (its
//! broadcast lines, its reasoning persona, its fallback texts) reads from it.

use serde::{Deserialize, Serialize};

/// Immutable identity of a single worker agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentIdentity {
    /// Unique identifier, used to filter task assignments
    pub agent_id: String,
    /// Human-readable name, used as the broadcast sender
    pub display_name: String,
    /// Capabilities advertised to the coordination server (never empty)
    pub capabilities: Vec<String>,
    /// Persona string woven into the reasoning system prompt
    pub persona: String,
    /// Cosmetic marker for log lines; no behavioral effect
    pub emblem: String,
}

impl AgentIdentity {
    /// First advertised capability.
    ///
    /// Capabilities are validated non-empty at configuration load, so this
    /// never falls back in practice.
    pub fn primary_capability(&self) -> &str {
        self.capabilities.first().map_or("general", String::as_str)
    }

    /// System prompt sent with every reasoning request.
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}. {} Be concise and practical.",
            self.display_name, self.persona
        )
    }
}
