// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Template source and the rendering seam used by the template provider.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Where a template's text comes from, plus the variables it is rendered with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSource {
    /// Inline template text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Template file on the local host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<PathBuf>,

    /// Variables exposed to the template
    #[serde(default)]
    pub variables: serde_json::Value,
}

impl TemplateSource {
    pub fn inline(source: impl Into<String>, variables: serde_json::Value) -> Self {
        Self {
            source: Some(source.into()),
            source_file: None,
            variables,
        }
    }

    pub fn file(source_file: impl Into<PathBuf>, variables: serde_json::Value) -> Self {
        Self {
            source: None,
            source_file: Some(source_file.into()),
            variables,
        }
    }
}

/// Renders a template to the bytes that should land on disk.
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, template: &TemplateSource) -> Result<Vec<u8>, RenderError>;
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Template must set exactly one of `source` or `source_file`")]
    AmbiguousSource,

    #[error("Failed to read template file {path}: {reason}")]
    SourceUnreadable { path: String, reason: String },

    #[error("Template rendering failed: {0}")]
    Render(String),
}
