//! mdengine - build market data from the command line
//!
//! See the `service_cli` library for the configuration format.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use service_cli::{commands, OutputFormat};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Market data build engine CLI
#[derive(Parser)]
#[command(name = "mdengine")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the market data of every configured calculation
    Run {
        /// Configuration file path (TOML format)
        #[arg(short, long, env = "MDENGINE_CONFIG", default_value = "mdengine.toml")]
        config: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Validate a configuration and print the build plan
    Check {
        /// Configuration file path (TOML format)
        #[arg(short, long, env = "MDENGINE_CONFIG", default_value = "mdengine.toml")]
        config: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run { config, format } => commands::run::run(&config, format)?,
        Commands::Check { config } => commands::check::run(&config)?,
    }
    Ok(())
}
