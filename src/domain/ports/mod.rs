//! Ports: traits at the seams between the application core and the
//! outside world. Infrastructure adapters implement them; tests stub them.

pub mod reasoning;
pub mod transport;

pub use reasoning::{CompletionRequest, ReasoningClient, ReasoningError};
pub use transport::{CoordinationTransport, TransportError};
