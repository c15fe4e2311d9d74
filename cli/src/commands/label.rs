// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Security label commands
//!
//! Commands: status, default

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use fsconverge_core::domain::attributes::{FileMode, ObjectKind};
use fsconverge_core::domain::path::ResourcePath;
use fsconverge_core::domain::security_label::SecurityContextResolver;

#[derive(Subcommand)]
pub enum LabelCommand {
    /// Show whether SELinux label management is active
    Status,

    /// Look up the policy default label for a path
    Default {
        #[arg(value_name = "PATH")]
        path: String,

        /// Look up the label a directory would receive
        #[arg(long)]
        directory: bool,

        /// Permission bits to include in the lookup (octal)
        #[arg(long, value_name = "MODE")]
        mode: Option<String>,
    },
}

pub fn handle_command(command: LabelCommand, config_override: Option<PathBuf>) -> Result<()> {
    match command {
        LabelCommand::Status => status(config_override),
        LabelCommand::Default {
            path,
            directory,
            mode,
        } => default_label(config_override, &path, directory, mode.as_deref()),
    }
}

fn status(config_override: Option<PathBuf>) -> Result<()> {
    let config = super::load_config(config_override)?;
    let (_, resolver) = super::host_context(&config);

    println!("{}", "Security labels:".bold());
    if !resolver.is_supported() {
        println!("  Status: {}", "not supported".yellow());
        println!("  Mode:   {:?}", config.mac.mode);
        return Ok(());
    }

    println!("  Status:   {}", "supported".green());
    println!("  Policy:   {}", resolver.policy_type().unwrap_or("(unknown)"));
    if let Some(dir) = resolver.policy_files_dir() {
        println!("  Contexts: {}", dir.display());
    }
    let enforcing = match resolver.enforcing() {
        Some(true) => "enforcing".to_string(),
        Some(false) => "permissive".to_string(),
        None => "(unknown)".dimmed().to_string(),
    };
    println!("  State:    {}", enforcing);

    Ok(())
}

fn default_label(
    config_override: Option<PathBuf>,
    raw_path: &str,
    directory: bool,
    mode: Option<&str>,
) -> Result<()> {
    let config = super::load_config(config_override)?;
    let path = ResourcePath::parse_with_limit(raw_path, config.limits.max_path_len)
        .with_context(|| format!("Invalid path {:?}", raw_path))?;
    let lookup_mode = lookup_mode(directory, mode)?;

    let (_, resolver) = super::host_context(&config);
    if !resolver.is_supported() {
        anyhow::bail!("SELinux is not active on this host");
    }

    let default = resolver
        .get_default_label(path.as_path(), lookup_mode)
        .unwrap_or_else(|| "(no default label)".dimmed().to_string());
    println!("{}", path.as_str().bold());
    println!("  Default: {}", default);
    if path.as_path().symlink_metadata().is_ok() {
        let current = resolver
            .get_label(path.as_path())
            .unwrap_or_else(|| "(unreadable)".dimmed().to_string());
        println!("  Current: {}", current);
    }
    Ok(())
}

fn lookup_mode(directory: bool, mode: Option<&str>) -> Result<u32> {
    let kind = if directory {
        ObjectKind::Directory
    } else {
        ObjectKind::File
    };
    let permissions = match mode {
        Some(raw) => FileMode::from_octal(raw)
            .map_err(|e| anyhow::anyhow!(e))?
            .bits(),
        None => 0,
    };
    Ok(kind.type_bits() | permissions)
}
