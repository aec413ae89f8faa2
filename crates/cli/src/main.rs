//! Herald CLI
//!
//! Runs a single push from a TOML configuration file and reports every result.

mod commands;
mod config;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use herald_adm::AdmPushService;
use herald_provider::PushServiceRegistry;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::HeraldConfig;

/// Herald CLI — push notifications through device messaging gateways.
#[derive(Parser, Debug)]
#[command(name = "herald", version, about)]
struct Cli {
    /// Output format.
    #[arg(long, default_value = "text", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Push one notification to every configured destination.
    Push(commands::push::PushArgs),
    /// List the registered push service types.
    Services,
}

/// Build the registry of every push service this binary supports.
fn build_registry(config: &HeraldConfig) -> anyhow::Result<PushServiceRegistry> {
    let mut registry = PushServiceRegistry::new();
    let adm = AdmPushService::new(
        config.adm.to_adm_config(),
        config.executor.to_executor_config(),
    )?;
    registry.register(Arc::new(adm));
    Ok(registry)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Push(args) => {
            let config = HeraldConfig::load(&args.config)?;
            let registry = build_registry(&config)?;
            commands::push::run(&registry, &config, &args, &cli.format).await
        }
        Command::Services => {
            let registry = build_registry(&HeraldConfig::default())?;
            commands::services::run(&registry, &cli.format)
        }
    }
}
