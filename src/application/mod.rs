//! Application layer: the agent's core components, wired together by the
//! runtime. Everything here talks to the outside world only through the
//! domain ports.

pub mod broadcast;
pub mod executor;
pub mod gateway;
pub mod limiter;
pub mod runtime;
pub mod session;

pub use broadcast::BroadcastChannel;
pub use executor::TaskPhaseExecutor;
pub use gateway::RateLimitedGateway;
pub use limiter::MinIntervalLimiter;
pub use runtime::AgentRuntime;
pub use session::{event_channel, ConnectionSession, EventSender, SessionState};
