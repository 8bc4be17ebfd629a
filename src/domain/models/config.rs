//! Configuration model.
//!
//! Loaded by `infrastructure::config::ConfigLoader` with hierarchical
//! merging (defaults, YAML file, `DRONE_*` environment variables).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::agent::AgentIdentity;

/// Top-level configuration for one agent process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Who this agent is
    #[serde(default)]
    pub agent: AgentConfig,

    /// Coordination server endpoint
    #[serde(default)]
    pub server: ServerConfig,

    /// Reasoning service client settings
    #[serde(default)]
    pub reasoning: ReasoningConfig,

    /// Task pipeline pacing
    #[serde(default)]
    pub execution: ExecutionConfig,

    /// Broadcast channel settings
    #[serde(default)]
    pub broadcast: BroadcastConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Agent identity configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AgentConfig {
    /// Unique agent id; defaults to a fresh `agent-<uuid>`
    #[serde(default = "default_agent_id")]
    pub id: String,

    /// Display name used on the broadcast channel
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Advertised capabilities; must be non-empty
    #[serde(default = "default_capabilities")]
    pub capabilities: Vec<String>,

    /// Persona woven into the reasoning system prompt
    #[serde(default = "default_persona")]
    pub persona: String,

    /// Cosmetic marker for log lines
    #[serde(default = "default_emblem")]
    pub emblem: String,
}

fn default_agent_id() -> String {
    format!("agent-{}", Uuid::new_v4().simple())
}

fn default_agent_name() -> String {
    "Drone".to_string()
}

fn default_capabilities() -> Vec<String> {
    vec!["general".to_string()]
}

fn default_persona() -> String {
    "Pragmatic generalist who gets tasks done".to_string()
}

fn default_emblem() -> String {
    "🤖".to_string()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            id: default_agent_id(),
            name: default_agent_name(),
            capabilities: default_capabilities(),
            persona: default_persona(),
            emblem: default_emblem(),
        }
    }
}

impl AgentConfig {
    /// Freeze this configuration into the process-lifetime identity.
    pub fn identity(&self) -> AgentIdentity {
        AgentIdentity {
            agent_id: self.id.clone(),
            display_name: self.name.clone(),
            capabilities: self.capabilities.clone(),
            persona: self.persona.clone(),
            emblem: self.emblem.clone(),
        }
    }
}

/// Coordination server endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ServerConfig {
    /// `host:port` of the coordination server
    #[serde(default = "default_server_addr")]
    pub addr: String,
}

fn default_server_addr() -> String {
    "localhost:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
        }
    }
}

/// Reasoning service client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReasoningConfig {
    /// API key; falls back to the `OPENROUTER_API_KEY` environment variable
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the chat-completions API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier passed through to the service
    #[serde(default = "default_model")]
    pub model: String,

    /// Minimum spacing between reasoning calls, in milliseconds
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,

    /// Per-request timeout, distinct from the call spacing
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_model() -> String {
    "mistralai/mistral-7b-instruct:free".to_string()
}

const fn default_min_interval_ms() -> u64 {
    3000
}

const fn default_timeout_secs() -> u64 {
    10
}

const fn default_temperature() -> f32 {
    0.7
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            min_interval_ms: default_min_interval_ms(),
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
        }
    }
}

impl ReasoningConfig {
    /// Resolve the API key from config or environment.
    ///
    /// A missing key is the one fatal startup condition in this system.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| std::env::var("OPENROUTER_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
    }
}

/// Task pipeline pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExecutionConfig {
    /// Delay between phases in milliseconds; zero disables pacing
    #[serde(default = "default_phase_delay_ms")]
    pub phase_delay_ms: u64,
}

const fn default_phase_delay_ms() -> u64 {
    2000
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            phase_delay_ms: default_phase_delay_ms(),
        }
    }
}

/// Broadcast channel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BroadcastConfig {
    /// Maximum message length in characters before truncation
    #[serde(default = "default_max_message_len")]
    pub max_message_len: usize,
}

const fn default_max_message_len() -> usize {
    240
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            max_message_len: default_max_message_len(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}
