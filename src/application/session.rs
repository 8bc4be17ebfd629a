//! Connection session with the coordination server.
//!
//! Owns the single logical connection: connect, idempotent registration,
//! the event pump, and best-effort disconnect. Inbound envelopes are
//! interpreted into `InboundEvent` and dispatched through one `match`;
//! malformed payloads and unknown event names are logged and dropped.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::application::broadcast::BroadcastChannel;
use crate::application::executor::TaskPhaseExecutor;
use crate::domain::models::{
    truncate_with_ellipsis, AgentIdentity, Envelope, InboundEvent, OutboundEvent, Registration,
};
use crate::domain::ports::{CoordinationTransport, TransportError};

/// Fire-and-forget sender for outbound events.
///
/// Components emit through this handle; the session run loop drains the
/// channel into the transport. Emitting after the session has gone away is
/// silently dropped, which keeps post-stop emissions harmless.
#[derive(Clone)]
pub struct EventSender(mpsc::UnboundedSender<OutboundEvent>);

impl EventSender {
    pub fn emit(&self, event: OutboundEvent) {
        if self.0.send(event).is_err() {
            debug!("session is gone, dropping outbound event");
        }
    }
}

/// Create the outbound event channel shared by the session and the
/// components that emit through it.
pub fn event_channel() -> (EventSender, mpsc::UnboundedReceiver<OutboundEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender(tx), rx)
}

/// Connection lifecycle of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    /// Transport is open; registration not yet acknowledged
    Unregistered,
    Registered,
}

/// Guard ensuring the registration request goes out at most once per
/// physical connection, no matter which event path triggers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RegistrationState {
    Unregistered,
    Registering,
    Registered,
}

/// The logical connection to the coordination server.
pub struct ConnectionSession<T: CoordinationTransport> {
    transport: T,
    identity: Arc<AgentIdentity>,
    executor: Arc<TaskPhaseExecutor>,
    broadcast: Arc<BroadcastChannel>,
    outbound_rx: mpsc::UnboundedReceiver<OutboundEvent>,
    stop: CancellationToken,
    state: SessionState,
    registration: RegistrationState,
}

/// What the select loop decided to do next.
enum Step {
    Stop,
    Outbound(Option<OutboundEvent>),
    Inbound(Result<Option<Envelope>, TransportError>),
}

impl<T: CoordinationTransport> ConnectionSession<T> {
    pub fn new(
        transport: T,
        identity: Arc<AgentIdentity>,
        executor: Arc<TaskPhaseExecutor>,
        broadcast: Arc<BroadcastChannel>,
        outbound_rx: mpsc::UnboundedReceiver<OutboundEvent>,
        stop: CancellationToken,
    ) -> Self {
        Self {
            transport,
            identity,
            executor,
            broadcast,
            outbound_rx,
            stop,
            state: SessionState::Disconnected,
            registration: RegistrationState::Unregistered,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Connect, register, and pump events until stop or disconnect.
    ///
    /// A connection failure is non-fatal to the process: the session logs
    /// it, returns to `Disconnected`, and hands the error up as the stop
    /// condition. There is no automatic reconnect; the caller decides
    /// whether to invoke `run` again.
    pub async fn run(&mut self) -> Result<(), TransportError> {
        self.state = SessionState::Connecting;
        if let Err(err) = self.transport.connect().await {
            error!(error = %err, "failed to connect to coordination server");
            self.state = SessionState::Disconnected;
            return Err(err);
        }
        self.state = SessionState::Unregistered;
        info!(
            agent_id = %self.identity.agent_id,
            "{} {} connected to coordination server",
            self.identity.emblem,
            self.identity.display_name
        );

        // Registration is triggered from the connect path; the ack path in
        // dispatch() goes through the same guard.
        if let Err(err) = self.ensure_registered().await {
            error!(error = %err, "failed to send registration");
            self.shutdown().await;
            return Err(err);
        }

        let result = self.pump().await;
        self.shutdown().await;
        result
    }

    /// Stop the session from outside the run loop.
    pub fn stop(&self) {
        self.stop.cancel();
    }

    async fn pump(&mut self) -> Result<(), TransportError> {
        loop {
            let step = tokio::select! {
                () = self.stop.cancelled() => Step::Stop,
                outbound = self.outbound_rx.recv() => Step::Outbound(outbound),
                inbound = self.transport.recv() => Step::Inbound(inbound),
            };

            match step {
                Step::Stop => {
                    info!("stop requested, closing session");
                    return Ok(());
                }
                Step::Outbound(Some(event)) => {
                    // Fire-and-forget: a failed emission is logged, never retried
                    if let Err(err) = self.transport.send(&event).await {
                        warn!(error = %err, "failed to emit event");
                    }
                }
                Step::Outbound(None) => {
                    // All senders dropped; nothing left to forward
                    debug!("outbound channel closed");
                    return Ok(());
                }
                Step::Inbound(Ok(Some(envelope))) => self.dispatch(envelope).await,
                Step::Inbound(Ok(None)) => {
                    info!("coordination server closed the connection");
                    return Ok(());
                }
                Step::Inbound(Err(err)) => {
                    error!(error = %err, "transport failure");
                    return Err(err);
                }
            }
        }
    }

    /// Interpret and route one inbound envelope.
    async fn dispatch(&mut self, envelope: Envelope) {
        let event = match InboundEvent::parse(&envelope) {
            Ok(Some(event)) => event,
            Ok(None) => {
                debug!(event = %envelope.event, "ignoring unknown event");
                return;
            }
            Err(err) => {
                // Protocol violation: drop the event, never crash
                warn!(event = %envelope.event, error = %err, "dropping malformed event payload");
                return;
            }
        };

        match event {
            InboundEvent::AgentRegistered => {
                if self.registration != RegistrationState::Registered {
                    info!(
                        agent_id = %self.identity.agent_id,
                        "{} registered with capabilities: {}",
                        self.identity.display_name,
                        self.identity.capabilities.join(", ")
                    );
                }
                self.registration = RegistrationState::Registered;
                self.state = SessionState::Registered;
            }
            InboundEvent::TaskAssigned(assignment) => {
                // Run the pipeline off the pump so broadcasts and progress
                // updates keep flowing while phases execute.
                let executor = Arc::clone(&self.executor);
                tokio::spawn(async move {
                    executor.handle_assignment(assignment).await;
                });
            }
            InboundEvent::AgentMessage(message) => self.broadcast.on_receive(&message),
            InboundEvent::TaskCreated(notice) => {
                let description = notice.task.description.unwrap_or_default();
                info!(
                    "{} sees new task: {}",
                    self.identity.display_name,
                    truncate_with_ellipsis(&description, 60)
                );
            }
        }
    }

    /// Send `register_agent`, guarded so it happens at most once per
    /// physical connection even when both the connect path and the ack
    /// path reach here.
    async fn ensure_registered(&mut self) -> Result<(), TransportError> {
        if self.registration != RegistrationState::Unregistered {
            return Ok(());
        }
        self.registration = RegistrationState::Registering;

        self.transport
            .send(&OutboundEvent::RegisterAgent(Registration {
                agent_id: self.identity.agent_id.clone(),
                name: self.identity.display_name.clone(),
                capabilities: self.identity.capabilities.clone(),
            }))
            .await
    }

    /// Best-effort disconnect; accepted in any state.
    async fn shutdown(&mut self) {
        if let Err(err) = self.transport.close().await {
            debug!(error = %err, "error while closing transport");
        }
        self.state = SessionState::Disconnected;
        self.registration = RegistrationState::Unregistered;
    }
}
