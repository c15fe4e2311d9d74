// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # fsconverge CLI
//!
//! The `fsconverge` binary converges files, directories and templated files
//! on the local host to the state declared in a YAML manifest.
//!
//! ## Commands
//!
//! - `fsconverge apply <MANIFEST>` - Converge every declared resource
//! - `fsconverge inspect <PATH>` - Show the observed state of one object
//! - `fsconverge label status|default` - SELinux support and default labels
//! - `fsconverge config show|validate|generate` - Configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use fsconverge_cli::commands::{self, ApplyArgs, ConfigCommand, InspectArgs, LabelCommand};

/// fsconverge - Declarative filesystem convergence
#[derive(Parser)]
#[command(name = "fsconverge")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery; a missing file is an error)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "FSCONVERGE_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Converge the resources declared in a manifest
    #[command(name = "apply")]
    Apply(ApplyArgs),

    /// Show the observed state of a path
    #[command(name = "inspect")]
    Inspect(InspectArgs),

    /// Security label helpers
    #[command(name = "label")]
    Label {
        #[command(subcommand)]
        command: LabelCommand,
    },

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    match cli.command {
        Some(Commands::Apply(args)) => {
            let report = commands::apply::handle_command(args, cli.config)?;
            if report.has_failures() {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Commands::Inspect(args)) => commands::inspect::handle_command(args, cli.config),
        Some(Commands::Label { command }) => commands::label::handle_command(command, cli.config),
        Some(Commands::Config { command }) => commands::config::handle_command(command, cli.config),
        None => {
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}
