// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Convergence Provider Contract
//!
//! Every resource kind exposes the same two-step contract: inspect the live
//! object into a [`CurrentState`], then apply exactly the changes needed to
//! reach the desired state. Providers are built by composition over a shared
//! [`ProviderContext`] (host filesystem plus security context resolver), not
//! by extending one another.
//!
//! Each pass is synchronous and stateless: nothing survives between passes
//! except the object on disk.

use std::sync::Arc;
use tracing::debug;

use crate::application::attributes::AttributeApplier;
use crate::application::error::ConvergeError;
use crate::application::labels::LabelConverger;
use crate::domain::attributes::{FileMode, ObjectKind};
use crate::domain::checksum::sha256_hex;
use crate::domain::host::HostFilesystem;
use crate::domain::path::ResourcePath;
use crate::domain::resource::{ConvergenceResult, CurrentState, DesiredObject};
use crate::domain::security_label::SecurityContextResolver;

/// Inspect-then-apply contract implemented by each resource kind.
pub trait ConvergenceProvider {
    type Desired: DesiredObject;

    /// Build a fresh snapshot of the object at the desired path.
    fn load_current_resource(&self, desired: &Self::Desired) -> CurrentState;

    /// Create the object if missing and converge its attributes and label.
    fn apply_create_action(&self, desired: &Self::Desired)
        -> Result<ConvergenceResult, ConvergeError>;

    /// Remove the object if present.
    fn apply_delete_action(&self, desired: &Self::Desired)
        -> Result<ConvergenceResult, ConvergeError>;
}

/// Host collaborators shared by every provider.
#[derive(Clone)]
pub struct ProviderContext {
    pub host: Arc<dyn HostFilesystem>,
    pub resolver: Arc<dyn SecurityContextResolver>,
}

impl ProviderContext {
    pub fn new(host: Arc<dyn HostFilesystem>, resolver: Arc<dyn SecurityContextResolver>) -> Self {
        Self { host, resolver }
    }

    pub(crate) fn attributes(&self) -> AttributeApplier {
        AttributeApplier::new(self.host.clone())
    }

    pub(crate) fn labels(&self) -> LabelConverger {
        LabelConverger::new(self.resolver.clone())
    }
}

/// Snapshot `path`, expecting an object of kind `expected`.
///
/// A missing object yields an absent snapshot. An object that cannot be
/// stat'ed, has another type, or cannot be read yields a present snapshot
/// without attributes.
pub(crate) fn inspect(
    host: &dyn HostFilesystem,
    labels: &LabelConverger,
    path: &ResourcePath,
    expected: ObjectKind,
    with_checksum: bool,
) -> CurrentState {
    let stat = match host.stat(path.as_path()) {
        Ok(stat) => stat,
        Err(e) if e.is_not_found() => {
            debug!(path = %path, "Object absent");
            return CurrentState::absent(path.clone());
        }
        Err(e) => {
            debug!(path = %path, error = %e, "Object present but cannot be inspected");
            return CurrentState::unreadable(path.clone(), None);
        }
    };

    if stat.kind != expected {
        debug!(
            path = %path,
            expected = %expected,
            found = %stat.kind,
            "Object has unexpected type"
        );
        return CurrentState::unreadable(path.clone(), Some(stat.kind));
    }

    if !host.is_readable(path.as_path()) {
        debug!(path = %path, "Object present but not readable");
        return CurrentState::unreadable(path.clone(), Some(stat.kind));
    }

    let mut current = CurrentState {
        exists: true,
        kind: Some(stat.kind),
        owner: Some(stat.uid),
        group: Some(stat.gid),
        mode: Some(FileMode::new(stat.mode)),
        ..CurrentState::absent(path.clone())
    };

    if with_checksum {
        current.checksum = match host.read(path.as_path()) {
            Ok(content) => Some(sha256_hex(&content)),
            Err(e) => {
                debug!(path = %path, error = %e, "Could not checksum content");
                None
            }
        };
    }

    current.security_label = labels.inspect(&current);
    current
}

/// Fail when something of another type already occupies the path.
pub(crate) fn ensure_kind(
    current: &CurrentState,
    expected: ObjectKind,
) -> Result<(), ConvergeError> {
    match current.kind {
        Some(found) if current.exists && found != expected => Err(ConvergeError::KindMismatch {
            path: current.path.to_string(),
            expected,
            found,
        }),
        _ => Ok(()),
    }
}

/// Fail when the directory that should hold `path` is missing.
pub(crate) fn ensure_enclosing_directory(
    host: &dyn HostFilesystem,
    path: &ResourcePath,
) -> Result<(), ConvergeError> {
    match path.parent() {
        Some(parent) if !host.is_dir(parent) => Err(ConvergeError::MissingParentDirectory {
            path: path.to_string(),
            parent: parent.to_path_buf(),
        }),
        _ => Ok(()),
    }
}
