// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Fatal per-resource convergence errors.
//!
//! Only structural failures surface here. Missing MAC support, failed label
//! calls and unreadable objects are absorbed by the providers.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::attributes::ObjectKind;
use crate::domain::host::HostError;
use crate::domain::path::PathError;
use crate::domain::template::RenderError;

#[derive(Debug, Error)]
pub enum ConvergeError {
    #[error(transparent)]
    InvalidPath(#[from] PathError),

    #[error("Enclosing directory {parent} does not exist for {path}")]
    MissingParentDirectory { path: String, parent: PathBuf },

    #[error("{path} exists as a {found}, expected a {expected}")]
    KindMismatch {
        path: String,
        expected: ObjectKind,
        found: ObjectKind,
    },

    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("Template error: {0}")]
    Render(#[from] RenderError),
}
