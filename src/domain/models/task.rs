//! Task domain model.
//!
//! A task is delivered by the coordination server through a `task_assigned`
//! event, driven through a fixed four-phase pipeline exactly once, and then
//! discarded. Nothing about a task is persisted across process restarts.

use serde::{Deserialize, Serialize};

use super::event::TaskAssignment;

/// A single unit of work assigned to this agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Opaque identifier assigned by the task creator
    pub id: String,
    /// What the task asks for
    pub description: String,
    /// Capabilities the creator asked for; informational to the agent
    pub required_capabilities: Vec<String>,
    /// Agent this task was routed to
    pub assigned_agent_id: String,
}

impl From<TaskAssignment> for Task {
    fn from(assignment: TaskAssignment) -> Self {
        Self {
            id: assignment.task.id,
            description: assignment.task.description,
            required_capabilities: assignment.task.required_capabilities,
            assigned_agent_id: assignment.agent_id,
        }
    }
}

/// Terminal outcome of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// All four phases ran; progress reached 100
    Completed,
    /// The pipeline aborted; progress 0 was reported
    Failed,
    /// Stop was observed between phases; nothing further was emitted
    Abandoned,
}

/// One step of the fixed execution pipeline.
///
/// The percentages are fixed by design: four phases, a quarter each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskPhase {
    Analysis,
    Planning,
    Implementation,
    Completion,
}

impl TaskPhase {
    /// Pipeline order.
    pub const ALL: [Self; 4] = [
        Self::Analysis,
        Self::Planning,
        Self::Implementation,
        Self::Completion,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Analysis => "analysis",
            Self::Planning => "planning",
            Self::Implementation => "implementation",
            Self::Completion => "completion",
        }
    }

    /// Progress reported to the coordination server when this phase finishes.
    pub fn progress_percent(self) -> u8 {
        match self {
            Self::Analysis => 25,
            Self::Planning => 50,
            Self::Implementation => 75,
            Self::Completion => 100,
        }
    }

    /// Status text for the progress update.
    pub fn status_line(self) -> &'static str {
        match self {
            Self::Analysis => "Analysis complete",
            Self::Planning => "Planning complete",
            Self::Implementation => "Implementation in progress",
            Self::Completion => "Task completed",
        }
    }

    /// Reasoning prompt for this phase of the task.
    ///
    /// `capability` is the agent's primary capability; only the analysis
    /// phase frames the prompt with it.
    pub fn prompt(self, description: &str, capability: &str) -> String {
        match self {
            Self::Analysis => format!(
                "Task: \"{description}\"\n\nAs a {capability} expert, provide a 1-sentence analysis of this task."
            ),
            Self::Planning => {
                format!("For task \"{description}\", provide a brief 1-sentence work plan.")
            }
            Self::Implementation => {
                format!("Briefly describe what you would implement for: \"{description}\"")
            }
            Self::Completion => {
                format!("Summarize what you completed for task: \"{description}\" (1 sentence)")
            }
        }
    }

    /// Output budget for the reasoning call in this phase.
    pub fn max_tokens(self) -> u32 {
        match self {
            Self::Implementation => 120,
            _ => 100,
        }
    }
}
