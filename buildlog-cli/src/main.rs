//! Buildlog CLI
//!
//! Command-line interface for querying and driving the buildlog collector.

mod commands;
mod config;
mod id_resolver;
mod types;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;

#[derive(Parser)]
#[command(name = "buildlog")]
#[command(about = "CI build log collector CLI", long_about = None)]
struct Cli {
    /// Collector URL
    #[arg(
        long,
        env = "BUILDLOG_COLLECTOR_URL",
        default_value = "http://localhost:8080"
    )]
    collector_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config {
        collector_url: cli.collector_url,
    };

    handle_command(cli.command, &config).await
}
