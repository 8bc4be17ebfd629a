//! Drone entry point.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use drone::cli::Cli;
use drone::infrastructure::{ConfigLoader, OpenRouterClient, OpenRouterConfig, TcpJsonTransport};
use drone::AgentRuntime;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    cli.apply_overrides(&mut config);

    init_tracing(&config.logging.level, &config.logging.format);

    // Missing reasoning credentials are the one fatal startup condition
    let Some(api_key) = config.reasoning.resolve_api_key() else {
        bail!("no reasoning API key configured; set OPENROUTER_API_KEY or reasoning.api_key");
    };

    let reasoning = OpenRouterClient::new(OpenRouterConfig::from_config(&config.reasoning, api_key))
        .context("failed to initialize reasoning client")?;
    let transport = TcpJsonTransport::new(config.server.addr.clone());

    let runtime = AgentRuntime::new(&config, Arc::new(reasoning), transport);

    let stop = runtime.stop_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, stopping agent");
            stop.cancel();
        }
    });

    info!(
        agent = %config.agent.name,
        server = %config.server.addr,
        "{} starting agent",
        config.agent.emblem
    );
    let completed = runtime.run().await?;
    info!(tasks_completed = completed, "goodbye");
    Ok(())
}

fn init_tracing(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    if format == "json" {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
