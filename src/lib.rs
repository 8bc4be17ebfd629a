//! Drone - Autonomous Worker Agent
//!
//! Drone is a worker agent that connects to a swarm coordination server,
//! receives task assignments, and executes each task through a fixed
//! four-phase pipeline (analysis, planning, implementation, completion)
//! backed by an external reasoning service. Along the way it reports
//! fractional progress to the server and narrates its work to peer agents
//! over a shared broadcast channel.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture:
//!
//! - **Domain Layer** (`domain`): pure models and the ports
//!   (`ReasoningClient`, `CoordinationTransport`) the core depends on
//! - **Application Layer** (`application`): rate-limited gateway, broadcast
//!   channel, connection session, phase executor, and the runtime that
//!   wires them together
//! - **Infrastructure Layer** (`infrastructure`): OpenRouter HTTP adapter,
//!   TCP JSON-lines transport, figment-based configuration loading
//!
//! The coordination server and the reasoning backend are external
//! collaborators; this crate implements neither.

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use application::{
    event_channel, AgentRuntime, BroadcastChannel, ConnectionSession, EventSender,
    MinIntervalLimiter, RateLimitedGateway, SessionState, TaskPhaseExecutor,
};
pub use domain::models::{
    AgentIdentity, BroadcastMessage, Config, Envelope, InboundEvent, OutboundEvent,
    ProgressUpdate, Registration, Task, TaskAssignment, TaskOutcome, TaskPhase,
};
pub use domain::ports::{
    CompletionRequest, CoordinationTransport, ReasoningClient, ReasoningError, TransportError,
};
pub use infrastructure::{
    ConfigError, ConfigLoader, OpenRouterClient, OpenRouterConfig, TcpJsonTransport,
};
