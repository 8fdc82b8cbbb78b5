//! View command handlers

use anyhow::Result;
use buildlog_core::dto::view::ViewName;
use clap::Subcommand;
use colored::*;

use crate::config::Config;

/// View subcommands
#[derive(Subcommand)]
pub enum ViewCommands {
    /// Publish a named view to the event bus
    Publish {
        /// last_build, last_build_important, last_pipeline, last_pipeline_summary,
        /// all_pipelines, all_pipelines_summary, all_builds or all_builds_no_logs
        view: String,
    },
    /// Show relay counters
    Stats,
}

/// Handle view commands
pub async fn handle_view_command(command: ViewCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        ViewCommands::Publish { view } => {
            let view: ViewName = view.parse()?;
            let outcome = client.publish_view(view).await?;

            if outcome.published {
                println!("{} Published view {}", "✓".green(), view.to_string().cyan());
            } else {
                println!(
                    "{} View {} not published: {}",
                    "✗".red(),
                    view.to_string().cyan(),
                    outcome.error.unwrap_or_default()
                );
            }
        }
        ViewCommands::Stats => {
            let stats = client.relay_stats().await?;

            println!("{}", "Relay Stats:".bold());
            println!("  Batches sent:     {}", stats.batches_sent.to_string().green());
            println!("  Batches failed:   {}", stats.batches_failed.to_string().red());
            println!("  Events published: {}", stats.events_published.to_string().green());
            println!("  Events failed:    {}", stats.events_failed.to_string().red());
        }
    }

    Ok(())
}
