// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! "Apply all controls" step used by the template provider.
//!
//! Content is checksum-gated and owner/group/mode are compared before being
//! written, so an already-converged object sees no writes at all.

use std::sync::Arc;
use tracing::info;

use crate::application::attributes::AttributeApplier;
use crate::application::error::ConvergeError;
use crate::domain::attributes::AccessAttributes;
use crate::domain::checksum::sha256_hex;
use crate::domain::host::HostFilesystem;
use crate::domain::path::ResourcePath;
use crate::domain::resource::CurrentState;

/// Writes rendered content and access attributes, reporting modification.
pub trait AccessControlApplier: Send + Sync {
    fn set_all(
        &self,
        path: &ResourcePath,
        rendered: &[u8],
        declared: &AccessAttributes,
        current: &CurrentState,
    ) -> Result<bool, ConvergeError>;
}

pub struct FileAccessControl {
    host: Arc<dyn HostFilesystem>,
    attributes: AttributeApplier,
}

impl FileAccessControl {
    pub fn new(host: Arc<dyn HostFilesystem>) -> Self {
        Self {
            attributes: AttributeApplier::new(host.clone()),
            host,
        }
    }
}

impl AccessControlApplier for FileAccessControl {
    fn set_all(
        &self,
        path: &ResourcePath,
        rendered: &[u8],
        declared: &AccessAttributes,
        current: &CurrentState,
    ) -> Result<bool, ConvergeError> {
        let mut modified = false;

        let checksum = sha256_hex(rendered);
        if current.checksum.as_deref() != Some(checksum.as_str()) {
            self.host.write(path.as_path(), rendered)?;
            info!(
                path = %path,
                from = current.checksum.as_deref().unwrap_or("none"),
                to = %checksum,
                "Rendered template content"
            );
            modified = true;
        }

        modified |= self.attributes.apply_differing(path, declared, current)?;
        Ok(modified)
    }
}
