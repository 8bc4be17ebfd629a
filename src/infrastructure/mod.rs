//! Infrastructure layer: adapters for the external collaborators and the
//! configuration loader.

pub mod config;
pub mod openrouter;
pub mod transport;

pub use config::{ConfigError, ConfigLoader};
pub use openrouter::{OpenRouterClient, OpenRouterConfig};
pub use transport::TcpJsonTransport;
