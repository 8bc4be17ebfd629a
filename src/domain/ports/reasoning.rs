//! Port for the external reasoning service.
//!
//! The application layer depends on this trait, never on a concrete HTTP
//! client, so executor and gateway tests can stub the backend.

use async_trait::async_trait;
use thiserror::Error;

/// One completion request to the reasoning service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// System/persona prompt
    pub system: String,
    /// User prompt for this call
    pub prompt: String,
    /// Output length bound
    pub max_tokens: u32,
}

/// Failures surfaced by a reasoning adapter.
///
/// The gateway never propagates these; each variant maps to a fixed
/// fallback text so the phase pipeline degrades instead of aborting.
#[derive(Debug, Error)]
pub enum ReasoningError {
    /// The request exceeded the client timeout
    #[error("request timed out")]
    Timeout,

    /// HTTP 429 from the service
    #[error("rate limited upstream")]
    RateLimited,

    /// HTTP 404: the model or endpoint is unavailable
    #[error("model or endpoint unavailable")]
    ModelUnavailable,

    /// Any other non-2xx status
    #[error("service error ({status}): {body}")]
    Status { status: u16, body: String },

    /// Connection-level failure (refused, DNS, TLS, ...)
    #[error("network error: {0}")]
    Network(String),

    /// The service answered 2xx but the body was not usable
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl ReasoningError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            429 => Self::RateLimited,
            404 => Self::ModelUnavailable,
            _ => Self::Status { status, body },
        }
    }
}

/// Client for a text-completion backend.
#[async_trait]
pub trait ReasoningClient: Send + Sync {
    /// Generate text for one prompt.
    async fn complete(&self, request: CompletionRequest) -> Result<String, ReasoningError>;
}
