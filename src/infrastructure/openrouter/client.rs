//! HTTP client for the OpenRouter chat-completions API.
//!
//! Thin reqwest adapter behind the `ReasoningClient` port. Classification
//! of HTTP failures into `ReasoningError` happens here; the degrade-to-
//! fallback policy lives in the gateway, not in this client.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client as ReqwestClient};
use tracing::{debug, info, instrument};

use crate::domain::models::ReasoningConfig;
use crate::domain::ports::{CompletionRequest, ReasoningClient, ReasoningError};

use super::types::{ChatMessage, ChatRequest, ChatResponse};

/// Configuration for the OpenRouter client.
#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    /// Bearer token for authentication
    pub api_key: String,
    /// Base URL, e.g. `https://openrouter.ai/api/v1`
    pub base_url: String,
    /// Model identifier passed on every request
    pub model: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Sampling temperature
    pub temperature: f32,
}

impl OpenRouterConfig {
    /// Build from the loaded application config plus the resolved API key.
    pub fn from_config(config: &ReasoningConfig, api_key: String) -> Self {
        Self {
            api_key,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            temperature: config.temperature,
        }
    }
}

/// Reqwest-backed `ReasoningClient`.
pub struct OpenRouterClient {
    http_client: ReqwestClient,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OpenRouterClient {
    /// Create a new client with connection pooling and a fixed timeout.
    pub fn new(config: OpenRouterConfig) -> Result<Self> {
        // Scrub the API key from logs
        let api_key_scrubbed = if config.api_key.len() > 8 {
            format!("{}...[REDACTED]", &config.api_key[..8])
        } else {
            "[REDACTED]".to_string()
        };
        info!(
            base_url = %config.base_url,
            model = %config.model,
            timeout_secs = config.timeout.as_secs(),
            api_key = %api_key_scrubbed,
            "initializing reasoning client"
        );

        let mut headers = header::HeaderMap::new();
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .context("API key contains invalid header characters")?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let http_client = ReqwestClient::builder()
            .pool_max_idle_per_host(10)
            .timeout(config.timeout)
            .tcp_nodelay(true)
            .default_headers(headers)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http_client,
            base_url: config.base_url,
            model: config.model,
            temperature: config.temperature,
        })
    }

    async fn execute(&self, request: &ChatRequest) -> Result<String, ReasoningError> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(model = %request.model, max_tokens = request.max_tokens, "POST {url}");

        let response = self
            .http_client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_string());
            return Err(ReasoningError::from_status(status.as_u16(), body));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|err| ReasoningError::MalformedResponse(err.to_string()))?;

        parsed
            .first_text()
            .map(str::to_string)
            .ok_or_else(|| ReasoningError::MalformedResponse("response has no choices".to_string()))
    }
}

/// Map reqwest transport failures onto the port error taxonomy.
fn classify_reqwest_error(err: reqwest::Error) -> ReasoningError {
    if err.is_timeout() {
        return ReasoningError::Timeout;
    }
    if let Some(status) = err.status() {
        return ReasoningError::from_status(status.as_u16(), err.to_string());
    }
    if err.is_decode() {
        return ReasoningError::MalformedResponse(err.to_string());
    }
    ReasoningError::Network(err.to_string())
}

#[async_trait]
impl ReasoningClient for OpenRouterClient {
    #[instrument(skip(self, request), fields(model = %self.model, max_tokens = request.max_tokens))]
    async fn complete(&self, request: CompletionRequest) -> Result<String, ReasoningError> {
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(request.system),
                ChatMessage::user(request.prompt),
            ],
            max_tokens: request.max_tokens,
            temperature: self.temperature,
        };

        self.execute(&body).await
    }
}
