//! Terminal rendering shared by the command handlers

use buildlog_core::domain::build::BuildStatus;
use buildlog_core::domain::log::LogLevel;
use buildlog_core::dto::build::{BuildProjection, LogLineView};
use buildlog_core::dto::pipeline::PipelineProjection;
use colored::*;

/// Colorize build status for display
pub fn colorize_status(status: BuildStatus) -> ColoredString {
    let status_str = status.as_str();
    match status {
        BuildStatus::Success => status_str.green(),
        BuildStatus::Failure => status_str.red(),
        BuildStatus::Unstable => status_str.yellow(),
        BuildStatus::Running => status_str.cyan(),
        BuildStatus::Unknown => status_str.dimmed(),
    }
}

/// Print a log line
pub fn print_log_line(line: &LogLineView) {
    let level_str = format!("{:<5}", line.level.as_str());
    let level_colored = match line.level {
        LogLevel::Debug => level_str.dimmed(),
        LogLevel::Info => level_str.cyan(),
        LogLevel::Warn => level_str.yellow(),
        LogLevel::Error => level_str.red(),
    };

    println!(
        "{} [{}] {}",
        format!("{:>5}", line.line_no).dimmed(),
        level_colored,
        line.message
    );
    if let Some(trace) = &line.stack_trace {
        println!("{}", trace.dimmed());
    }
}

pub fn print_log_lines(lines: &[LogLineView]) {
    println!("{}", "─".repeat(80).dimmed());
    for line in lines {
        print_log_line(line);
    }
    println!("{}", "─".repeat(80).dimmed());
}

/// One-entry summary of a build
pub fn print_build_summary(build: &BuildProjection) {
    println!(
        "  {} {} #{} {}",
        "▸".cyan(),
        build.pipeline_name.bold(),
        build.build_number,
        build.id.to_string().dimmed()
    );
    println!("    Status:  {}", colorize_status(build.status));
    println!("    Lines:   {}", build.log_count);
    println!(
        "    Created: {}",
        build
            .created_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );
    println!();
}

/// Detailed build information, followed by its lines when present
pub fn print_build_details(build: &BuildProjection) {
    println!("{}", "Build Details:".bold());
    println!("  ID:           {}", build.id.to_string().cyan());
    println!("  Pipeline:     {} ({})", build.pipeline_name, build.pipeline_id.to_string().dimmed());
    println!("  Number:       #{}", build.build_number);
    println!("  Status:       {}", colorize_status(build.status));
    println!("  Created:      {}", build.created_at.format("%Y-%m-%d %H:%M:%S"));

    if let Some(started) = build.start_time {
        println!("  Started:      {}", started.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(ended) = build.end_time {
        println!("  Ended:        {}", ended.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(duration) = build.duration {
        println!("  Duration:     {}s", duration);
    }
    if let Some(triggered_by) = &build.triggered_by {
        println!("  Triggered by: {}", triggered_by);
    }
    println!("  Lines:        {}", build.log_count);

    if let Some(logs) = &build.logs {
        println!();
        if logs.is_empty() {
            println!("{}", "No log lines.".yellow());
        } else {
            print_log_lines(logs);
        }
    }
}

/// One-entry summary of a pipeline, with its builds when carried
pub fn print_pipeline(pipeline: &PipelineProjection) {
    println!(
        "  {} {} {}",
        "▸".cyan(),
        pipeline.name.bold(),
        pipeline.id.to_string().dimmed()
    );
    println!("    Builds:  {}", pipeline.build_count);
    if let Some(url) = &pipeline.source_url {
        println!("    Source:  {}", url.dimmed());
    }
    println!(
        "    Created: {}",
        pipeline
            .created_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );
    for build in pipeline.builds.iter().flatten() {
        println!(
            "      #{} {} ({} lines)",
            build.build_number,
            colorize_status(build.status),
            build.log_count
        );
    }
    println!();
}
