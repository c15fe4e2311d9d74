// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod access_control;
pub mod attributes;
pub mod converger;
pub mod directory_provider;
pub mod error;
pub mod file_provider;
pub mod labels;
pub mod provider;
pub mod template_provider;

// Re-export the entry points for convenience
pub use converger::{
    Converger, Manifest, OutcomeStatus, ResourceDeclaration, ResourceOutcome, RunReport,
};
pub use directory_provider::DirectoryProvider;
pub use error::ConvergeError;
pub use file_provider::FileProvider;
pub use provider::{ConvergenceProvider, ProviderContext};
pub use template_provider::TemplateProvider;
