//! Port for the coordination-server transport.
//!
//! The session owns exactly one transport. Wire framing belongs to the
//! adapter; the session only sees envelopes going out and coming in.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::{Envelope, OutboundEvent};

/// Failures at the transport boundary.
///
/// All of these are non-fatal to the process: the session logs them and
/// returns to the disconnected state.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Operation attempted before `connect` succeeded
    #[error("transport is not connected")]
    NotConnected,

    /// Could not reach the coordination server
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// An outbound event could not be encoded
    #[error("encode error: {0}")]
    Encode(String),
}

/// A logical connection to the coordination server.
#[async_trait]
pub trait CoordinationTransport: Send {
    /// Open the underlying connection.
    async fn connect(&mut self) -> Result<(), TransportError>;

    /// Emit one event; fire-and-forget from the caller's perspective.
    async fn send(&mut self, event: &OutboundEvent) -> Result<(), TransportError>;

    /// Receive the next envelope. `Ok(None)` means the server closed the
    /// connection cleanly.
    async fn recv(&mut self) -> Result<Option<Envelope>, TransportError>;

    /// Best-effort disconnect.
    async fn close(&mut self) -> Result<(), TransportError>;
}
