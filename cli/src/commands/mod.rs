// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the fsconverge CLI

pub mod apply;
pub mod config;
pub mod inspect;
pub mod label;

pub use self::apply::ApplyArgs;
pub use self::config::ConfigCommand;
pub use self::inspect::InspectArgs;
pub use self::label::LabelCommand;

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use fsconverge_core::application::ProviderContext;
use fsconverge_core::domain::config::ConvergeConfig;
use fsconverge_core::infrastructure::{LocalHostFilesystem, SelinuxResolver};

/// Load and validate configuration for a command run.
pub(crate) fn load_config(config_override: Option<PathBuf>) -> Result<ConvergeConfig> {
    let config = ConvergeConfig::load_or_default(config_override)
        .context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

/// Local host collaborators; MAC support is probed here, once per run.
pub(crate) fn host_context(config: &ConvergeConfig) -> (ProviderContext, Arc<SelinuxResolver>) {
    let resolver = Arc::new(SelinuxResolver::probe(&config.mac));
    let context = ProviderContext::new(Arc::new(LocalHostFilesystem::new()), resolver.clone());
    (context, resolver)
}
