// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Directory Convergence Provider
//!
//! Same shape as the file provider without content. Creation is single-level
//! unless `recursive` is set, in which case every missing parent is created.
//! The snapshot mode only carries permission bits.

use tracing::info;

use crate::application::attributes::AttributeApplier;
use crate::application::error::ConvergeError;
use crate::application::labels::LabelConverger;
use crate::application::provider::{ensure_kind, inspect, ConvergenceProvider, ProviderContext};
use crate::domain::attributes::ObjectKind;
use crate::domain::host::HostError;
use crate::domain::resource::{ConvergenceResult, CurrentState, DirectoryResource};

pub struct DirectoryProvider {
    context: ProviderContext,
    attributes: AttributeApplier,
    labels: LabelConverger,
}

impl DirectoryProvider {
    pub fn new(context: ProviderContext) -> Self {
        Self {
            attributes: context.attributes(),
            labels: context.labels(),
            context,
        }
    }

    fn create(&self, desired: &DirectoryResource) -> Result<(), ConvergeError> {
        let host = self.context.host.as_ref();
        let path = &desired.path;

        if desired.recursive {
            host.create_dir_all(path.as_path())?;
        } else {
            host.create_dir(path.as_path()).map_err(|e| match (e, path.parent()) {
                (HostError::NotFound(_), Some(parent)) => ConvergeError::MissingParentDirectory {
                    path: path.to_string(),
                    parent: parent.to_path_buf(),
                },
                (e, _) => ConvergeError::Host(e),
            })?;
        }

        info!(path = %path, recursive = desired.recursive, "Created directory");
        Ok(())
    }
}

impl ConvergenceProvider for DirectoryProvider {
    type Desired = DirectoryResource;

    fn load_current_resource(&self, desired: &DirectoryResource) -> CurrentState {
        inspect(
            self.context.host.as_ref(),
            &self.labels,
            &desired.path,
            ObjectKind::Directory,
            false,
        )
    }

    fn apply_create_action(
        &self,
        desired: &DirectoryResource,
    ) -> Result<ConvergenceResult, ConvergeError> {
        let current = self.load_current_resource(desired);
        ensure_kind(&current, ObjectKind::Directory)?;

        let mut updated = false;
        let created = current.is_absent();

        if created {
            self.create(desired)?;
            updated = true;
        }

        updated |= self
            .attributes
            .apply_declared(&desired.path, &desired.attributes, &current)?;
        updated |= self.labels.converge(desired, &current, created);

        Ok(ConvergenceResult::new(updated))
    }

    fn apply_delete_action(
        &self,
        desired: &DirectoryResource,
    ) -> Result<ConvergenceResult, ConvergeError> {
        let current = self.load_current_resource(desired);
        if current.is_absent() {
            return Ok(ConvergenceResult::unchanged());
        }
        ensure_kind(&current, ObjectKind::Directory)?;

        let host = self.context.host.as_ref();
        if desired.recursive {
            host.remove_dir_all(desired.path.as_path())?;
        } else {
            host.remove_dir(desired.path.as_path())?;
        }

        info!(path = %desired.path, recursive = desired.recursive, "Deleted directory");
        Ok(ConvergenceResult::new(true))
    }
}
