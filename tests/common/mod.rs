//! Shared test doubles: a stubbed reasoning backend and an in-memory
//! coordination transport.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use drone::application::{event_channel, BroadcastChannel, RateLimitedGateway, TaskPhaseExecutor};
use drone::domain::models::{
    AgentIdentity, Envelope, OutboundEvent, TaskAssignment, TaskPayload,
};
use drone::domain::ports::{
    CompletionRequest, CoordinationTransport, ReasoningClient, ReasoningError, TransportError,
};

/// How the stubbed reasoning backend answers every call.
#[derive(Debug, Clone)]
pub enum StubMode {
    /// Always return this text
    Fixed(String),
    /// Return the text after a delay, to hold a task in flight
    Slow(Duration, String),
    /// Always HTTP 429
    RateLimited,
    /// Always time out
    Timeout,
}

/// Scripted `ReasoningClient` that records every request it sees.
pub struct StubReasoning {
    mode: StubMode,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl StubReasoning {
    pub fn new(mode: StubMode) -> Arc<Self> {
        Arc::new(Self {
            mode,
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ReasoningClient for StubReasoning {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ReasoningError> {
        self.requests.lock().await.push(request);
        match &self.mode {
            StubMode::Fixed(text) => Ok(text.clone()),
            StubMode::Slow(delay, text) => {
                tokio::time::sleep(*delay).await;
                Ok(text.clone())
            }
            StubMode::RateLimited => Err(ReasoningError::RateLimited),
            StubMode::Timeout => Err(ReasoningError::Timeout),
        }
    }
}

/// An executor wired to a stub backend with pacing and rate limiting
/// zeroed out, plus the receiving end of its outbound events.
pub struct TestAgent {
    pub executor: Arc<TaskPhaseExecutor>,
    pub events: mpsc::UnboundedReceiver<OutboundEvent>,
    pub stop: CancellationToken,
    pub stub: Arc<StubReasoning>,
}

pub fn test_agent(agent_id: &str, name: &str, capability: &str, mode: StubMode) -> TestAgent {
    let identity = Arc::new(AgentIdentity {
        agent_id: agent_id.to_string(),
        display_name: name.to_string(),
        capabilities: vec![capability.to_string()],
        persona: "Test persona".to_string(),
        emblem: "🤖".to_string(),
    });
    let stub = StubReasoning::new(mode);
    let stop = CancellationToken::new();
    let (events_tx, events_rx) = event_channel();

    let gateway = Arc::new(RateLimitedGateway::new(
        Arc::clone(&stub) as Arc<dyn ReasoningClient>,
        Arc::clone(&identity),
        Duration::ZERO,
    ));
    let broadcast = Arc::new(BroadcastChannel::new(
        Arc::clone(&identity),
        events_tx.clone(),
        240,
    ));
    let executor = Arc::new(TaskPhaseExecutor::new(
        identity,
        gateway,
        broadcast,
        events_tx,
        Duration::ZERO,
        stop.clone(),
    ));

    TestAgent {
        executor,
        events: events_rx,
        stop,
        stub,
    }
}

/// Build a `task_assigned` payload.
pub fn assignment(agent_id: &str, task_id: &str, description: &str) -> TaskAssignment {
    TaskAssignment {
        agent_id: agent_id.to_string(),
        task: TaskPayload {
            id: task_id.to_string(),
            description: description.to_string(),
            required_capabilities: vec![],
        },
    }
}

/// Drain everything currently buffered on an event receiver.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<OutboundEvent>) -> Vec<OutboundEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Progress values and statuses, in emission order.
pub fn progress_of(events: &[OutboundEvent]) -> Vec<(u8, String)> {
    events
        .iter()
        .filter_map(|event| match event {
            OutboundEvent::UpdateTaskProgress(update) => {
                Some((update.progress, update.status.clone()))
            }
            _ => None,
        })
        .collect()
}

/// Broadcast message texts, in emission order.
pub fn broadcasts_of(events: &[OutboundEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            OutboundEvent::AgentMessage(message) => Some(message.message.clone()),
            _ => None,
        })
        .collect()
}

/// In-memory transport: inbound envelopes come from a channel the test
/// feeds, outbound events are forwarded to a channel the test inspects.
pub struct ChannelTransport {
    inbound: mpsc::UnboundedReceiver<Envelope>,
    sent: mpsc::UnboundedSender<OutboundEvent>,
    connected: bool,
}

pub fn channel_transport() -> (
    ChannelTransport,
    mpsc::UnboundedSender<Envelope>,
    mpsc::UnboundedReceiver<OutboundEvent>,
) {
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let (sent_tx, sent_rx) = mpsc::unbounded_channel();
    (
        ChannelTransport {
            inbound: inbound_rx,
            sent: sent_tx,
            connected: false,
        },
        inbound_tx,
        sent_rx,
    )
}

#[async_trait]
impl CoordinationTransport for ChannelTransport {
    async fn connect(&mut self) -> Result<(), TransportError> {
        self.connected = true;
        Ok(())
    }

    async fn send(&mut self, event: &OutboundEvent) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        // The test may have dropped the receiver; that's fine
        let _ = self.sent.send(event.clone());
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<Envelope>, TransportError> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        Ok(self.inbound.recv().await)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.connected = false;
        Ok(())
    }
}
