// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Template Engine
//!
//! Renders template resources with Handlebars.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Transform a template source plus variables into file content
//! - **Integration:** `TemplateResource.template` → template provider
//!
//! Output is written to files, not served as HTML, so escaping is disabled:
//! `{{value}}` renders the raw string.

use handlebars::{no_escape, Handlebars};

use crate::domain::template::{RenderError, TemplateRenderer, TemplateSource};

/// Handlebars-backed [`TemplateRenderer`].
pub struct HandlebarsRenderer {
    handlebars: Handlebars<'static>,
}

impl HandlebarsRenderer {
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(no_escape);
        Self { handlebars }
    }

    /// Fail on variables missing from the context instead of rendering "".
    pub fn strict() -> Self {
        let mut renderer = Self::new();
        renderer.handlebars.set_strict_mode(true);
        renderer
    }

    fn load_source(template: &TemplateSource) -> Result<String, RenderError> {
        match (&template.source, &template.source_file) {
            (Some(source), None) => Ok(source.clone()),
            (None, Some(path)) => {
                std::fs::read_to_string(path).map_err(|e| RenderError::SourceUnreadable {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })
            }
            _ => Err(RenderError::AmbiguousSource),
        }
    }
}

impl Default for HandlebarsRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer for HandlebarsRenderer {
    fn render(&self, template: &TemplateSource) -> Result<Vec<u8>, RenderError> {
        let source = Self::load_source(template)?;
        let rendered = self
            .handlebars
            .render_template(&source, &template.variables)
            .map_err(|e| RenderError::Render(e.to_string()))?;
        Ok(rendered.into_bytes())
    }
}
