//! Command-line interface.

use std::path::PathBuf;

use clap::Parser;

use crate::domain::models::Config;

/// Autonomous worker agent for swarm coordination servers.
#[derive(Debug, Parser)]
#[command(name = "drone", version, about)]
pub struct Cli {
    /// Path to a YAML config file (default: ./drone.yaml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Coordination server address (host:port)
    #[arg(long)]
    pub server: Option<String>,

    /// Override the agent id
    #[arg(long)]
    pub agent_id: Option<String>,

    /// Override the agent display name
    #[arg(long)]
    pub name: Option<String>,

    /// Override advertised capabilities (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub capabilities: Option<Vec<String>>,

    /// Override the reasoning model
    #[arg(long)]
    pub model: Option<String>,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(server) = &self.server {
            config.server.addr = server.clone();
        }
        if let Some(agent_id) = &self.agent_id {
            config.agent.id = agent_id.clone();
        }
        if let Some(name) = &self.name {
            config.agent.name = name.clone();
        }
        if let Some(capabilities) = &self.capabilities {
            config.agent.capabilities = capabilities.clone();
        }
        if let Some(model) = &self.model {
            config.reasoning.model = model.clone();
        }
    }
}
