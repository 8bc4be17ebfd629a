//! Domain models: pure data types with no I/O.

pub mod agent;
pub mod config;
pub mod event;
pub mod message;
pub mod task;

pub use agent::AgentIdentity;
pub use config::{
    AgentConfig, BroadcastConfig, Config, ExecutionConfig, LoggingConfig, ReasoningConfig,
    ServerConfig,
};
pub use event::{
    Envelope, InboundEvent, OutboundEvent, ProgressUpdate, Registration, TaskAssignment,
    TaskNotice, TaskPayload,
};
pub use message::{truncate_with_ellipsis, BroadcastMessage};
pub use task::{Task, TaskOutcome, TaskPhase};
