//! Broadcast message model.
//!
//! Messages are ephemeral free text exchanged between peer agents. They are
//! truncated before transmission and never persisted or queued.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A single line on the shared broadcast channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastMessage {
    /// Display name of the sending agent
    pub sender: String,
    pub message: String,
    /// ISO-8601, second precision
    pub timestamp: String,
}

impl BroadcastMessage {
    /// Build a message stamped with the current time.
    pub fn now(sender: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            message: message.into(),
            timestamp: Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
        }
    }
}

/// Cap `text` at `max_len` characters, marking the cut with an ellipsis.
///
/// Counts characters rather than bytes so multi-byte text never splits.
pub fn truncate_with_ellipsis(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_len.saturating_sub(3)).collect();
    format!("{kept}...")
}
