//! Rate-limited reasoning gateway.
//!
//! Wraps a `ReasoningClient` with the minimum-interval limiter and a
//! degrade-gracefully policy: every failure of the underlying service maps
//! to a fixed fallback text, so the public contract is total. Task
//! execution continues with lower-quality output rather than aborting.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::application::limiter::MinIntervalLimiter;
use crate::domain::models::{truncate_with_ellipsis, AgentIdentity};
use crate::domain::ports::{CompletionRequest, ReasoningClient, ReasoningError};

/// Gateway to the external reasoning service.
pub struct RateLimitedGateway {
    client: Arc<dyn ReasoningClient>,
    identity: Arc<AgentIdentity>,
    limiter: MinIntervalLimiter,
}

impl RateLimitedGateway {
    pub fn new(
        client: Arc<dyn ReasoningClient>,
        identity: Arc<AgentIdentity>,
        min_interval: Duration,
    ) -> Self {
        Self {
            client,
            identity,
            limiter: MinIntervalLimiter::new(min_interval),
        }
    }

    /// Generate text for one prompt.
    ///
    /// Never fails: a degraded backend yields one of the fixed fallback
    /// strings instead of an error.
    #[instrument(skip(self, prompt), fields(agent = %self.identity.display_name, max_tokens))]
    pub async fn complete(&self, prompt: &str, max_tokens: u32) -> String {
        let request = CompletionRequest {
            system: self.identity.system_prompt(),
            prompt: prompt.to_string(),
            max_tokens,
        };

        let result = self.limiter.throttle(self.client.complete(request)).await;

        match result {
            Ok(text) => {
                debug!(chars = text.len(), "reasoning call succeeded");
                text.trim().to_string()
            }
            Err(err) => self.fallback(&err),
        }
    }

    /// Map a reasoning failure to its fallback text.
    fn fallback(&self, err: &ReasoningError) -> String {
        let name = &self.identity.display_name;
        match err {
            ReasoningError::Timeout => {
                warn!(agent = %name, "reasoning call timed out, using fallback");
                format!("[{name} processing with local expertise]")
            }
            ReasoningError::RateLimited => {
                warn!(agent = %name, "reasoning service rate limited, using fallback");
                format!("[{name} processing - rate limited but working on task]")
            }
            ReasoningError::ModelUnavailable => {
                warn!(agent = %name, "model unavailable, using capability-based fallback");
                format!(
                    "[{name} using built-in {} expertise]",
                    self.identity.primary_capability()
                )
            }
            ReasoningError::Status { status, .. } => {
                warn!(agent = %name, status, "reasoning service error, using fallback");
                format!("[{name} working with offline capabilities]")
            }
            ReasoningError::Network(detail) | ReasoningError::MalformedResponse(detail) => {
                warn!(
                    agent = %name,
                    error = %truncate_with_ellipsis(detail, 50),
                    "reasoning call failed, using fallback"
                );
                format!(
                    "[{name} working with {} capabilities]",
                    self.identity.primary_capability()
                )
            }
        }
    }
}
