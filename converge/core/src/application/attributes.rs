// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Attribute Application Service
//!
//! Shared owner/group/mode capability composed into every provider.
//!
//! Two write policies exist side by side:
//! - [`WritePolicy::Always`]: file and directory providers write each declared
//!   attribute on every pass, whatever the snapshot says.
//! - [`WritePolicy::WhenDiffering`]: the access-control applier used for
//!   templates skips attributes that already match.
//!
//! Either way an attribute only counts as a change when the snapshot value
//! differed (or was unknown).

use std::sync::Arc;
use tracing::{debug, info};

use crate::application::error::ConvergeError;
use crate::domain::attributes::{AccessAttributes, Identity};
use crate::domain::host::HostFilesystem;
use crate::domain::path::ResourcePath;
use crate::domain::resource::CurrentState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePolicy {
    Always,
    WhenDiffering,
}

pub struct AttributeApplier {
    host: Arc<dyn HostFilesystem>,
}

impl AttributeApplier {
    pub fn new(host: Arc<dyn HostFilesystem>) -> Self {
        Self { host }
    }

    /// Write every declared attribute. Returns whether any value changed.
    pub fn apply_declared(
        &self,
        path: &ResourcePath,
        declared: &AccessAttributes,
        current: &CurrentState,
    ) -> Result<bool, ConvergeError> {
        self.apply(path, declared, current, WritePolicy::Always)
    }

    /// Write only declared attributes that differ from the snapshot.
    pub fn apply_differing(
        &self,
        path: &ResourcePath,
        declared: &AccessAttributes,
        current: &CurrentState,
    ) -> Result<bool, ConvergeError> {
        self.apply(path, declared, current, WritePolicy::WhenDiffering)
    }

    pub fn apply(
        &self,
        path: &ResourcePath,
        declared: &AccessAttributes,
        current: &CurrentState,
        policy: WritePolicy,
    ) -> Result<bool, ConvergeError> {
        let mut changed = false;

        if let Some(owner) = &declared.owner {
            let uid = self.resolve_user(owner)?;
            let differs = current.owner != Some(uid);
            if differs || policy == WritePolicy::Always {
                self.host.chown(path.as_path(), Some(uid), None)?;
            }
            if differs {
                info!(path = %path, owner = %owner, uid, "Set owner");
                changed = true;
            }
        }

        if let Some(group) = &declared.group {
            let gid = self.resolve_group(group)?;
            let differs = current.group != Some(gid);
            if differs || policy == WritePolicy::Always {
                self.host.chown(path.as_path(), None, Some(gid))?;
            }
            if differs {
                info!(path = %path, group = %group, gid, "Set group");
                changed = true;
            }
        }

        if let Some(mode) = declared.mode {
            let differs = current.mode != Some(mode);
            if differs || policy == WritePolicy::Always {
                self.host.chmod(path.as_path(), mode.bits())?;
            }
            if differs {
                info!(path = %path, mode = %mode, "Set mode");
                changed = true;
            }
        }

        if !changed && !declared.is_empty() {
            debug!(path = %path, "Owner, group and mode already converged");
        }

        Ok(changed)
    }

    fn resolve_user(&self, identity: &Identity) -> Result<u32, ConvergeError> {
        match identity {
            Identity::Id(uid) => Ok(*uid),
            Identity::Name(name) => Ok(self.host.resolve_user(name)?),
        }
    }

    fn resolve_group(&self, identity: &Identity) -> Result<u32, ConvergeError> {
        match identity {
            Identity::Id(gid) => Ok(*gid),
            Identity::Name(name) => Ok(self.host.resolve_group(name)?),
        }
    }
}
