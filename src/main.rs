use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use vault_discovery::config::AppConfig;

mod cli;
mod commands;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    let mut config = AppConfig::from_env()?;
    if let Some(url) = cli.rpc_url {
        config.chain = config.chain.with_rpc_url(url);
    }
    if let Some(url) = cli.indexer_url {
        config.indexer_url = Some(url);
    }
    let services = config.build()?;

    match cli.command {
        cli::Command::Discover { user, json } => commands::discover::run(&services, &user, json).await,
        cli::Command::Watch { user, interval } => {
            let interval = interval.map(Duration::from_secs).unwrap_or(config.poll_interval);
            commands::watch::run(&services, &user, interval.max(Duration::from_secs(1))).await
        }
        cli::Command::Check { vault, user } => commands::check::run(&services, &vault, &user).await,
        cli::Command::Tokens { vault, json } => commands::tokens::run(&services, &vault, json).await,
        cli::Command::Serve { host, port } => vault_discovery::api::serve(&host, port, services).await,
    }
}
