//! Configuration loading and validation.
//!
//! Hierarchical merging via figment, lowest to highest precedence:
//! programmatic defaults, `drone.yaml` in the working directory, then
//! `DRONE_*` environment variables (`__` separates nesting, e.g.
//! `DRONE_REASONING__MODEL`).

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::Config;

/// Validation failures for a loaded configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("agent id cannot be empty")]
    EmptyAgentId,

    #[error("agent name cannot be empty")]
    EmptyAgentName,

    #[error("agent must advertise at least one capability")]
    NoCapabilities,

    #[error("server addr cannot be empty")]
    EmptyServerAddr,

    #[error("invalid min_interval_ms: {0}. Must be positive")]
    InvalidMinInterval(u64),

    #[error("invalid timeout_secs: {0}. Must be at least 1")]
    InvalidTimeout(u64),

    #[error("invalid max_message_len: {0}. Must be at least 8")]
    InvalidMaxMessageLen(usize),

    #[error("invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),
}

/// Configuration loader with hierarchical merging.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the default locations.
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file("drone.yaml"))
            .merge(Env::prefixed("DRONE_").split("__"))
            .extract()
            .context("failed to extract configuration")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file (environment still wins).
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("DRONE_").split("__"))
            .extract()
            .context(format!(
                "failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate a loaded configuration.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.agent.id.trim().is_empty() {
            return Err(ConfigError::EmptyAgentId);
        }
        if config.agent.name.trim().is_empty() {
            return Err(ConfigError::EmptyAgentName);
        }
        if config.agent.capabilities.is_empty()
            || config.agent.capabilities.iter().all(|c| c.trim().is_empty())
        {
            return Err(ConfigError::NoCapabilities);
        }

        if config.server.addr.trim().is_empty() {
            return Err(ConfigError::EmptyServerAddr);
        }

        if config.reasoning.min_interval_ms == 0 {
            return Err(ConfigError::InvalidMinInterval(
                config.reasoning.min_interval_ms,
            ));
        }
        if config.reasoning.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(config.reasoning.timeout_secs));
        }

        if config.broadcast.max_message_len < 8 {
            return Err(ConfigError::InvalidMaxMessageLen(
                config.broadcast.max_message_len,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }
        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(ConfigLoader::validate(&config).is_ok());
        assert_eq!(config.reasoning.min_interval_ms, 3000);
        assert_eq!(config.broadcast.max_message_len, 240);
    }

    #[test]
    fn rejects_empty_capabilities() {
        let mut config = Config::default();
        config.agent.capabilities = vec![];
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::NoCapabilities)
        ));
    }

    #[test]
    fn rejects_zero_min_interval() {
        let mut config = Config::default();
        config.reasoning.min_interval_ms = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMinInterval(0))
        ));
    }

    #[test]
    fn rejects_unknown_log_level() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogLevel(_))
        ));
    }

    #[test]
    fn loads_yaml_file_over_defaults() {
        let mut file = tempfile::NamedTempFile::with_suffix(".yaml").unwrap();
        writeln!(
            file,
            "agent:\n  id: designer\n  name: Alex\n  capabilities: [design, frontend]\nreasoning:\n  min_interval_ms: 500"
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(file.path()).unwrap();
        assert_eq!(config.agent.id, "designer");
        assert_eq!(config.agent.name, "Alex");
        assert_eq!(config.reasoning.min_interval_ms, 500);
        // Untouched sections keep their defaults
        assert_eq!(config.execution.phase_delay_ms, 2000);
    }

    #[test]
    fn environment_overrides_file() {
        let mut file = tempfile::NamedTempFile::with_suffix(".yaml").unwrap();
        writeln!(file, "server:\n  addr: localhost:8080").unwrap();

        temp_env::with_var("DRONE_SERVER__ADDR", Some("queen:9090"), || {
            let config = ConfigLoader::load_from_file(file.path()).unwrap();
            assert_eq!(config.server.addr, "queen:9090");
        });
    }

    #[test]
    fn api_key_resolution_prefers_config_over_env() {
        temp_env::with_var("OPENROUTER_API_KEY", Some("from-env"), || {
            let mut config = Config::default();
            assert_eq!(
                config.reasoning.resolve_api_key(),
                Some("from-env".to_string())
            );

            config.reasoning.api_key = Some("from-config".to_string());
            assert_eq!(
                config.reasoning.resolve_api_key(),
                Some("from-config".to_string())
            );
        });
    }

    #[test]
    fn missing_api_key_resolves_to_none() {
        temp_env::with_var("OPENROUTER_API_KEY", None::<&str>, || {
            let config = Config::default();
            assert_eq!(config.reasoning.resolve_api_key(), None);
        });
    }
}
