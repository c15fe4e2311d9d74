// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Template Convergence Provider
//!
//! Inspection adds a content checksum to the file snapshot. Rendering is
//! delegated to a [`TemplateRenderer`] and the rendered bytes plus access
//! attributes go through an [`AccessControlApplier`]; label convergence runs
//! afterwards and its write is OR-ed into the result.

use std::sync::Arc;

use crate::application::access_control::{AccessControlApplier, FileAccessControl};
use crate::application::error::ConvergeError;
use crate::application::labels::LabelConverger;
use crate::application::provider::{
    ensure_enclosing_directory, ensure_kind, inspect, ConvergenceProvider, ProviderContext,
};
use crate::domain::attributes::ObjectKind;
use crate::domain::resource::{ConvergenceResult, CurrentState, TemplateResource};
use crate::domain::template::TemplateRenderer;

pub struct TemplateProvider {
    context: ProviderContext,
    renderer: Arc<dyn TemplateRenderer>,
    access_control: Arc<dyn AccessControlApplier>,
    labels: LabelConverger,
}

impl TemplateProvider {
    pub fn new(context: ProviderContext, renderer: Arc<dyn TemplateRenderer>) -> Self {
        let access_control = Arc::new(FileAccessControl::new(context.host.clone()));
        Self::with_access_control(context, renderer, access_control)
    }

    pub fn with_access_control(
        context: ProviderContext,
        renderer: Arc<dyn TemplateRenderer>,
        access_control: Arc<dyn AccessControlApplier>,
    ) -> Self {
        Self {
            labels: context.labels(),
            context,
            renderer,
            access_control,
        }
    }
}

impl ConvergenceProvider for TemplateProvider {
    type Desired = TemplateResource;

    fn load_current_resource(&self, desired: &TemplateResource) -> CurrentState {
        inspect(
            self.context.host.as_ref(),
            &self.labels,
            &desired.path,
            ObjectKind::File,
            true,
        )
    }

    fn apply_create_action(
        &self,
        desired: &TemplateResource,
    ) -> Result<ConvergenceResult, ConvergeError> {
        ensure_enclosing_directory(self.context.host.as_ref(), &desired.path)?;
        let current = self.load_current_resource(desired);
        ensure_kind(&current, ObjectKind::File)?;

        let rendered = self.renderer.render(&desired.template)?;
        let modified =
            self.access_control
                .set_all(&desired.path, &rendered, &desired.attributes, &current)?;
        let relabeled = self.labels.converge(desired, &current, current.is_absent());

        Ok(ConvergenceResult::new(modified || relabeled))
    }

    fn apply_delete_action(
        &self,
        desired: &TemplateResource,
    ) -> Result<ConvergenceResult, ConvergeError> {
        let current = self.load_current_resource(desired);
        if current.is_absent() {
            return Ok(ConvergenceResult::unchanged());
        }
        ensure_kind(&current, ObjectKind::File)?;

        self.context.host.remove_file(desired.path.as_path())?;
        tracing::info!(path = %desired.path, "Deleted templated file");
        Ok(ConvergenceResult::new(true))
    }
}
