//! Collect command handler

use anyhow::{Context, Result};
use buildlog_core::dto::build::CollectTrigger;
use colored::*;

use super::output::print_build_details;
use crate::config::Config;

/// Trigger collection of one build and show what was stored
pub async fn collect_build(
    config: &Config,
    job: String,
    number: i32,
    status: Option<String>,
    token: Option<String>,
) -> Result<()> {
    let client = config.client();
    let trigger = CollectTrigger {
        job_name: job,
        build_number: number,
        build_status: status,
        token,
    };

    println!(
        "{}",
        format!("Collecting {} #{}...", trigger.job_name, trigger.build_number).dimmed()
    );

    let build = client
        .trigger_collect(&trigger)
        .await
        .context("Collection failed")?;

    println!("{} Build stored", "✓".green());
    println!();
    print_build_details(&build);

    Ok(())
}
