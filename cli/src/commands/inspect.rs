// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Inspect command: print the observed state of one path

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use fsconverge_core::application::Converger;
use fsconverge_core::domain::path::ResourcePath;
use fsconverge_core::domain::resource::{
    CurrentState, DirectoryResource, FileResource, Resource, TemplateResource,
};
use fsconverge_core::domain::template::TemplateSource;
use fsconverge_core::infrastructure::host_fs::user_name;
use fsconverge_core::infrastructure::HandlebarsRenderer;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum InspectKind {
    File,
    Directory,
    Template,
}

#[derive(Args)]
pub struct InspectArgs {
    /// Path to inspect
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Kind of object expected at the path
    #[arg(long, value_enum, default_value = "file")]
    pub kind: InspectKind,

    /// Print the snapshot as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn handle_command(args: InspectArgs, config_override: Option<PathBuf>) -> Result<()> {
    let config = super::load_config(config_override)?;
    let path = ResourcePath::parse_with_limit(&args.path, config.limits.max_path_len)
        .with_context(|| format!("Invalid path {:?}", args.path))?;

    let (context, _) = super::host_context(&config);
    let converger = Converger::new(context, Arc::new(HandlebarsRenderer::new()));
    let current = converger.load_current_resource(&probe_resource(path, args.kind));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&current)?);
    } else {
        print_state(&current);
    }

    Ok(())
}

/// Resource with nothing declared, used only for inspection.
fn probe_resource(path: ResourcePath, kind: InspectKind) -> Resource {
    match kind {
        InspectKind::File => Resource::File(FileResource::new(path)),
        InspectKind::Directory => Resource::Directory(DirectoryResource::new(path)),
        InspectKind::Template => Resource::Template(TemplateResource::new(
            path,
            TemplateSource::inline("", serde_json::Value::Null),
        )),
    }
}

fn print_state(current: &CurrentState) {
    println!("{}", current.path.as_str().bold());

    if current.is_absent() {
        println!("  {}", "absent".yellow());
        return;
    }

    let unknown = || "(unknown)".dimmed().to_string();

    println!(
        "  Kind:     {}",
        current.kind.map(|k| k.to_string()).unwrap_or_else(unknown)
    );
    println!(
        "  Owner:    {}",
        current
            .owner
            .map(|uid| match user_name(uid) {
                Some(name) => format!("{} ({})", name, uid),
                None => uid.to_string(),
            })
            .unwrap_or_else(unknown)
    );
    println!(
        "  Group:    {}",
        current.group.map(|gid| gid.to_string()).unwrap_or_else(unknown)
    );
    println!(
        "  Mode:     {}",
        current.mode.map(|m| m.to_string()).unwrap_or_else(unknown)
    );
    if let Some(checksum) = &current.checksum {
        println!("  SHA-256:  {}", checksum);
    }
    println!(
        "  Label:    {}",
        current
            .security_label
            .clone()
            .unwrap_or_else(|| "(none)".dimmed().to_string())
    );
}
