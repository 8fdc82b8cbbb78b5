//! Pipeline command handlers

use anyhow::{Result, anyhow};
use buildlog_client::CollectorClient;
use clap::Subcommand;
use colored::*;

use super::output::{print_build_summary, print_pipeline};
use crate::config::Config;
use crate::id_resolver::resolve_pipeline_id;
use crate::types::IdOrPrefix;

/// Pipeline subcommands
#[derive(Subcommand)]
pub enum PipelineCommands {
    /// List all pipelines
    List {
        /// Include each pipeline's builds
        #[arg(long)]
        builds: bool,
    },
    /// Get pipeline details by ID, prefix or name
    Get {
        /// Pipeline ID or unambiguous prefix
        id: Option<String>,

        /// Look the pipeline up by name instead
        #[arg(long, conflicts_with = "id")]
        name: Option<String>,
    },
    /// List builds of a pipeline
    Builds {
        /// Pipeline ID or unambiguous prefix
        id: String,
    },
    /// Show the most recently created pipeline
    Last {
        /// Omit log lines from its builds
        #[arg(long)]
        summary: bool,
    },
}

/// Handle pipeline commands
pub async fn handle_pipeline_command(command: PipelineCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        PipelineCommands::List { builds } => list_pipelines(&client, builds).await,
        PipelineCommands::Get { id, name } => get_pipeline(&client, id, name).await,
        PipelineCommands::Builds { id } => list_pipeline_builds(&client, &id).await,
        PipelineCommands::Last { summary } => last_pipeline(&client, summary).await,
    }
}

async fn list_pipelines(client: &CollectorClient, with_builds: bool) -> Result<()> {
    let pipelines = if with_builds {
        client.all_pipelines(Some("no_logs")).await?
    } else {
        client.list_pipelines().await?
    };

    if pipelines.is_empty() {
        println!("{}", "No pipelines found.".yellow());
        return Ok(());
    }

    println!("{}", format!("Found {} pipeline(s):", pipelines.len()).bold());
    println!();
    for pipeline in &pipelines {
        print_pipeline(pipeline);
    }

    Ok(())
}

async fn get_pipeline(
    client: &CollectorClient,
    id: Option<String>,
    name: Option<String>,
) -> Result<()> {
    let pipeline = match (id, name) {
        (_, Some(name)) => client
            .find_pipeline(&name)
            .await?
            .ok_or_else(|| anyhow!("Pipeline '{}' not found", name))?,
        (Some(id), None) => {
            let uuid = resolve_pipeline_id(client, &IdOrPrefix::parse(&id)).await?;
            client
                .get_pipeline(uuid)
                .await?
                .ok_or_else(|| anyhow!("Pipeline {} not found", uuid))?
        }
        (None, None) => return Err(anyhow!("Pass a pipeline ID or --name")),
    };

    print_pipeline(&pipeline);

    Ok(())
}

async fn list_pipeline_builds(client: &CollectorClient, id: &str) -> Result<()> {
    let uuid = resolve_pipeline_id(client, &IdOrPrefix::parse(id)).await?;

    let builds = client
        .pipeline_builds(uuid)
        .await?
        .ok_or_else(|| anyhow!("Pipeline {} not found", uuid))?;

    if builds.is_empty() {
        println!("{}", format!("No builds found for pipeline {}.", uuid).yellow());
        return Ok(());
    }

    println!(
        "{}",
        format!("Found {} build(s) for pipeline {}:", builds.len(), uuid).bold()
    );
    println!();
    for build in &builds {
        print_build_summary(build);
    }

    Ok(())
}

async fn last_pipeline(client: &CollectorClient, summary: bool) -> Result<()> {
    let shape = if summary { "no_logs" } else { "full" };

    match client.last_pipeline(Some(shape)).await? {
        Some(pipeline) => print_pipeline(&pipeline),
        None => println!("{}", "No pipelines recorded yet.".yellow()),
    }

    Ok(())
}
