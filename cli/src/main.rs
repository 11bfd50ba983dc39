// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # fsmon
//!
//! The `fsmon` binary runs the telemetry collector that filesystem clients
//! report to, and doubles as an admin tool for a running collector.
//!
//! ## Commands
//!
//! - `fsmon serve` - Run the collector HTTP service
//! - `fsmon instances list|get|terminate` - Inspect registered client sessions
//! - `fsmon transfers list` - Inspect reported file transfers
//! - `fsmon cleanup [--days N]` - Purge records
//! - `fsmon config show|validate|generate` - Configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use fsmon::commands::{self, ConfigCommand, InstanceCommand, TransferCommand};
use fsmon::server;
use fsmon_core::domain::config::MonitorConfig;

/// fsmon - filesystem client telemetry collector
#[derive(Parser)]
#[command(name = "fsmon")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "FSMON_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Collector URL used by the admin commands
    #[arg(
        long,
        global = true,
        env = "FSMON_URL",
        default_value = "http://127.0.0.1:12021"
    )]
    url: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "FSMON_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the collector service
    #[command(name = "serve")]
    Serve {
        /// Listen port (overrides configuration)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Registered client instances
    #[command(name = "instances")]
    Instances {
        #[command(subcommand)]
        command: InstanceCommand,
    },

    /// Reported file transfers
    #[command(name = "transfers")]
    Transfers {
        #[command(subcommand)]
        command: TransferCommand,
    },

    /// Purge collector records
    #[command(name = "cleanup")]
    Cleanup {
        /// Only remove instances created more than this many days ago
        #[arg(long)]
        days: Option<i64>,
    },

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Missing .env is not an error
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Serve { port } => {
            let mut config = MonitorConfig::load_or_default(cli.config)
                .context("Failed to load configuration")?;
            if let Some(port) = port {
                config.service_port = port;
            }
            info!("Starting fsmon collector");
            server::start_server(config).await
        }
        Commands::Instances { command } => commands::instance::handle_command(command, &cli.url).await,
        Commands::Transfers { command } => commands::transfer::handle_command(command, &cli.url).await,
        Commands::Cleanup { days } => commands::cleanup::execute(days, &cli.url).await,
        Commands::Config { command } => commands::config::handle_command(command, cli.config).await,
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}
