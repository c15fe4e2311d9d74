// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Manifest application command

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use fsconverge_core::application::{Converger, Manifest, OutcomeStatus, ResourceOutcome, RunReport};
use fsconverge_core::infrastructure::HandlebarsRenderer;

#[derive(Args)]
pub struct ApplyArgs {
    /// Path to the resource manifest YAML file
    #[arg(value_name = "MANIFEST")]
    pub manifest: PathBuf,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,

    /// Fail rendering when a template references an undefined variable
    #[arg(long)]
    pub strict_templates: bool,
}

pub fn handle_command(args: ApplyArgs, config_override: Option<PathBuf>) -> Result<RunReport> {
    let config = super::load_config(config_override)?;

    let manifest = Manifest::from_yaml_file(&args.manifest)
        .with_context(|| format!("Failed to load manifest {:?}", args.manifest))?;

    let (context, _) = super::host_context(&config);
    let renderer = if args.strict_templates {
        HandlebarsRenderer::strict()
    } else {
        HandlebarsRenderer::new()
    };
    let converger =
        Converger::new(context, Arc::new(renderer)).with_path_limit(config.limits.max_path_len);

    info!(
        manifest = %args.manifest.display(),
        resources = manifest.resources.len(),
        "Applying manifest"
    );
    let report = converger.converge_all(&manifest.resources);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for outcome in &report.outcomes {
            println!("{}", outcome_line(outcome));
        }
        println!();
        println!("{}", summary_line(&report).bold());
    }

    Ok(report)
}

fn outcome_line(outcome: &ResourceOutcome) -> String {
    let target = format!("{} {}[{}]", outcome.action, outcome.kind, outcome.path);
    match outcome.status {
        OutcomeStatus::Changed => format!("{} {}", "✓ changed  ".green(), target),
        OutcomeStatus::Unchanged => format!("{} {}", "· unchanged".dimmed(), target),
        OutcomeStatus::Failed => format!(
            "{} {}: {}",
            "✗ failed   ".red(),
            target,
            outcome.error.as_deref().unwrap_or("unknown error")
        ),
    }
}

pub(crate) fn summary_line(report: &RunReport) -> String {
    format!(
        "{} resources: {} changed, {} unchanged, {} failed",
        report.outcomes.len(),
        report.count(OutcomeStatus::Changed),
        report.count(OutcomeStatus::Unchanged),
        report.count(OutcomeStatus::Failed)
    )
}
