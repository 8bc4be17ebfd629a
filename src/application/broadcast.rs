//! Peer broadcast channel.
//!
//! Agents exchange free-text status lines over a shared channel owned by
//! the coordination server. Outbound messages are truncated and logged at
//! transmit time; inbound messages from ourselves are echoes the server
//! reflected back and are discarded so no line is rendered twice.

use std::sync::Arc;

use tracing::{debug, info};

use crate::application::session::EventSender;
use crate::domain::models::{
    truncate_with_ellipsis, AgentIdentity, BroadcastMessage, OutboundEvent,
};

/// Send/receive side of the shared agent conversation.
pub struct BroadcastChannel {
    identity: Arc<AgentIdentity>,
    events: EventSender,
    max_len: usize,
}

impl BroadcastChannel {
    pub fn new(identity: Arc<AgentIdentity>, events: EventSender, max_len: usize) -> Self {
        Self {
            identity,
            events,
            max_len,
        }
    }

    /// Publish a status line to peer agents.
    ///
    /// Blank input is a no-op. The text is truncated before transmission
    /// and logged locally right away, tagged as sent by self, so the
    /// sender never waits for the server round trip to see its own line.
    pub fn publish(&self, text: &str) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return;
        }

        let message = BroadcastMessage::now(
            self.identity.display_name.clone(),
            truncate_with_ellipsis(trimmed, self.max_len),
        );

        info!(
            sender = %message.sender,
            timestamp = %message.timestamp,
            "{} broadcast: {}",
            self.identity.emblem,
            message.message
        );
        self.events.emit(OutboundEvent::AgentMessage(message));
    }

    /// Handle a message arriving from the broadcast channel.
    ///
    /// Our own messages come back as echoes and are dropped without
    /// logging; the transmit-time log already recorded them.
    pub fn on_receive(&self, message: &BroadcastMessage) {
        if message.sender == self.identity.display_name {
            debug!("suppressing echo of our own broadcast");
            return;
        }
        if message.message.trim().is_empty() {
            return;
        }

        info!(
            sender = %message.sender,
            timestamp = %message.timestamp,
            "{} heard {}: {}",
            self.identity.emblem,
            message.sender,
            message.message
        );
    }
}
