// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! File Convergence Provider
//!
//! `Absent → Inspect → {Create | Rewrite} → Attributes → Label`
//!
//! - Create writes the declared content verbatim (empty when none declared).
//! - An existing file is rewritten whenever non-empty content is declared;
//!   the pass only counts as a change when the bytes on disk differed.
//! - Owner, group and mode are written whenever declared.
//! - The enclosing directory must already exist.

use tracing::info;

use crate::application::attributes::AttributeApplier;
use crate::application::error::ConvergeError;
use crate::application::labels::LabelConverger;
use crate::application::provider::{
    ensure_enclosing_directory, ensure_kind, inspect, ConvergenceProvider, ProviderContext,
};
use crate::domain::attributes::ObjectKind;
use crate::domain::checksum::sha256_hex;
use crate::domain::resource::{ConvergenceResult, CurrentState, FileResource};

pub struct FileProvider {
    context: ProviderContext,
    attributes: AttributeApplier,
    labels: LabelConverger,
}

impl FileProvider {
    pub fn new(context: ProviderContext) -> Self {
        Self {
            attributes: context.attributes(),
            labels: context.labels(),
            context,
        }
    }
}

impl ConvergenceProvider for FileProvider {
    type Desired = FileResource;

    fn load_current_resource(&self, desired: &FileResource) -> CurrentState {
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
        desired: &FileResource,
    ) -> Result<ConvergenceResult, ConvergeError> {
        let host = self.context.host.as_ref();
        let path = &desired.path;

        ensure_enclosing_directory(host, path)?;
        let current = self.load_current_resource(desired);
        ensure_kind(&current, ObjectKind::File)?;

        let mut updated = false;
        let created = current.is_absent();

        if created {
            let content = desired.content.as_deref().unwrap_or_default();
            host.write(path.as_path(), content)?;
            info!(path = %path, bytes = content.len(), "Created file");
            updated = true;
        } else if let Some(content) = desired.content.as_deref().filter(|c| !c.is_empty()) {
            host.write(path.as_path(), content)?;
            if current.checksum.as_deref() != Some(sha256_hex(content).as_str()) {
                info!(path = %path, bytes = content.len(), "Updated file content");
                updated = true;
            }
        }

        updated |= self
            .attributes
            .apply_declared(path, &desired.attributes, &current)?;
        updated |= self.labels.converge(desired, &current, created);

        Ok(ConvergenceResult::new(updated))
    }

    fn apply_delete_action(
        &self,
        desired: &FileResource,
    ) -> Result<ConvergenceResult, ConvergeError> {
        let current = self.load_current_resource(desired);
        if current.is_absent() {
            return Ok(ConvergenceResult::unchanged());
        }
        ensure_kind(&current, ObjectKind::File)?;

        self.context.host.remove_file(desired.path.as_path())?;
        info!(path = %desired.path, "Deleted file");
        Ok(ConvergenceResult::new(true))
    }
}
