//! Agent runtime: the composition root.
//!
//! Wires identity, gateway, broadcast channel, executor, and session
//! together, and owns the graceful-stop signal. No business logic lives
//! here beyond wiring.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::application::broadcast::BroadcastChannel;
use crate::application::executor::TaskPhaseExecutor;
use crate::application::gateway::RateLimitedGateway;
use crate::application::session::{event_channel, ConnectionSession};
use crate::domain::models::Config;
use crate::domain::ports::{CoordinationTransport, ReasoningClient};

/// One autonomous worker agent process.
pub struct AgentRuntime<T: CoordinationTransport> {
    session: ConnectionSession<T>,
    executor: Arc<TaskPhaseExecutor>,
    stop: CancellationToken,
}

impl<T: CoordinationTransport> AgentRuntime<T> {
    /// Wire up all components from configuration plus the two adapters.
    pub fn new(config: &Config, reasoning: Arc<dyn ReasoningClient>, transport: T) -> Self {
        let identity = Arc::new(config.agent.identity());
        let stop = CancellationToken::new();
        let (events, outbound_rx) = event_channel();

        let gateway = Arc::new(RateLimitedGateway::new(
            reasoning,
            Arc::clone(&identity),
            Duration::from_millis(config.reasoning.min_interval_ms),
        ));
        let broadcast = Arc::new(BroadcastChannel::new(
            Arc::clone(&identity),
            events.clone(),
            config.broadcast.max_message_len,
        ));
        let executor = Arc::new(TaskPhaseExecutor::new(
            Arc::clone(&identity),
            gateway,
            Arc::clone(&broadcast),
            events,
            Duration::from_millis(config.execution.phase_delay_ms),
            stop.clone(),
        ));
        let session = ConnectionSession::new(
            transport,
            identity,
            Arc::clone(&executor),
            broadcast,
            outbound_rx,
            stop.clone(),
        );

        Self {
            session,
            executor,
            stop,
        }
    }

    /// Token that stops the runtime when cancelled (e.g. from a ctrl-c
    /// handler).
    pub fn stop_token(&self) -> CancellationToken {
        self.stop.clone()
    }

    /// Tasks completed so far in this process.
    pub fn tasks_completed(&self) -> u64 {
        self.executor.tasks_completed()
    }

    /// Run the session until stop or disconnect, then tear down.
    pub async fn run(mut self) -> Result<u64> {
        let result = self
            .session
            .run()
            .await
            .context("coordination session terminated");

        let completed = self.executor.tasks_completed();
        info!(tasks_completed = completed, "agent stopped");
        result.map(|()| completed)
    }
}
