//! Build command handlers

use anyhow::{Result, anyhow};
use buildlog_client::CollectorClient;
use clap::Subcommand;
use colored::*;

use super::output::{print_build_details, print_build_summary, print_log_lines};
use crate::config::Config;
use crate::id_resolver::resolve_build_id;
use crate::types::IdOrPrefix;

/// Build subcommands
#[derive(Subcommand)]
pub enum BuildCommands {
    /// List all builds, newest first
    List {
        /// Include log lines
        #[arg(long)]
        logs: bool,
    },
    /// Show the most recently collected build
    Last {
        /// full, no_logs, important or last
        #[arg(long)]
        shape: Option<String>,

        /// Number of final lines to show (implies --shape last)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Show the last build's ERROR and WARN lines
    Important,
    /// Get build details
    Get {
        /// Build ID or unambiguous prefix
        id: String,

        /// full, no_logs, important or last
        #[arg(long)]
        shape: Option<String>,

        /// Number of final lines to show (implies --shape last)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Print every log line of a build
    Logs {
        /// Build ID or unambiguous prefix
        id: String,
    },
    /// Print the ERROR lines of a build
    Errors {
        /// Build ID or unambiguous prefix
        id: String,
    },
}

/// Handle build commands
pub async fn handle_build_command(command: BuildCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        BuildCommands::List { logs } => list_builds(&client, logs).await,
        BuildCommands::Last { shape, limit } => last_build(&client, shape, limit).await,
        BuildCommands::Important => last_build_important(&client).await,
        BuildCommands::Get { id, shape, limit } => get_build(&client, &id, shape, limit).await,
        BuildCommands::Logs { id } => build_logs(&client, &id, false).await,
        BuildCommands::Errors { id } => build_logs(&client, &id, true).await,
    }
}

async fn list_builds(client: &CollectorClient, with_logs: bool) -> Result<()> {
    let shape = if with_logs { "full" } else { "no_logs" };
    let builds = client.all_builds(Some(shape)).await?;

    if builds.is_empty() {
        println!("{}", "No builds found.".yellow());
        return Ok(());
    }

    println!("{}", format!("Found {} build(s):", builds.len()).bold());
    println!();
    for build in &builds {
        if with_logs {
            print_build_details(build);
            println!();
        } else {
            print_build_summary(build);
        }
    }

    Ok(())
}

async fn last_build(
    client: &CollectorClient,
    shape: Option<String>,
    limit: Option<usize>,
) -> Result<()> {
    match client.last_build(shape.as_deref(), limit).await? {
        Some(build) => print_build_details(&build),
        None => println!("{}", "No builds collected yet.".yellow()),
    }

    Ok(())
}

async fn last_build_important(client: &CollectorClient) -> Result<()> {
    let Some(view) = client.last_build_important().await? else {
        println!("{}", "No builds collected yet.".yellow());
        return Ok(());
    };

    println!(
        "{} {} ({} build(s) total)",
        "Pipeline:".bold(),
        view.pipeline.name.cyan(),
        view.pipeline.total_builds
    );
    println!();
    print_build_details(&view.build);

    Ok(())
}

async fn get_build(
    client: &CollectorClient,
    id: &str,
    shape: Option<String>,
    limit: Option<usize>,
) -> Result<()> {
    let uuid = resolve_build_id(client, &IdOrPrefix::parse(id)).await?;

    let build = client
        .get_build(uuid, shape.as_deref(), limit)
        .await?
        .ok_or_else(|| anyhow!("Build {} not found", uuid))?;

    print_build_details(&build);

    Ok(())
}

async fn build_logs(client: &CollectorClient, id: &str, errors_only: bool) -> Result<()> {
    let uuid = resolve_build_id(client, &IdOrPrefix::parse(id)).await?;

    let logs = if errors_only {
        client.build_errors(uuid).await?
    } else {
        client.build_logs(uuid).await?
    }
    .ok_or_else(|| anyhow!("Build {} not found", uuid))?;

    if logs.is_empty() {
        println!("{}", "No matching log lines.".yellow());
    } else {
        println!("{}", format!("Logs for build {}:", uuid).bold());
        print_log_lines(&logs);
    }

    Ok(())
}
