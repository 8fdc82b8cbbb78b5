//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod build;
mod collect;
mod output;
mod pipeline;
mod view;

pub use build::BuildCommands;
pub use pipeline::PipelineCommands;
pub use view::ViewCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Collect a build, as the CI webhook would
    Collect {
        /// Jenkins job name
        job: String,

        /// Build number
        number: i32,

        /// Explicit status (SUCCESS, FAILURE, UNSTABLE, ...); inferred when omitted
        #[arg(long)]
        status: Option<String>,

        /// Webhook token, when the collector requires one
        #[arg(long, env = "BUILDLOG_WEBHOOK_TOKEN")]
        token: Option<String>,
    },
    /// Build queries
    Build {
        #[command(subcommand)]
        command: BuildCommands,
    },
    /// Pipeline queries
    Pipeline {
        #[command(subcommand)]
        command: PipelineCommands,
    },
    /// Event bus views and relay counters
    View {
        #[command(subcommand)]
        command: ViewCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Collect {
            job,
            number,
            status,
            token,
        } => collect::collect_build(config, job, number, status, token).await,
        Commands::Build { command } => build::handle_build_command(command, config).await,
        Commands::Pipeline { command } => pipeline::handle_pipeline_command(command, config).await,
        Commands::View { command } => view::handle_view_command(command, config).await,
    }
}
