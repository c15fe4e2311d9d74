// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Resource Path Value Object
//!
//! Normalizes declared paths to forward-slash separators and rejects paths
//! that no filesystem call could act on. Normalization happens once, when the
//! `ResourcePath` is built, so the desired and current state of a resource
//! always carry the identical path string. Deserialization only normalizes;
//! validation runs per resource when it is converged, so one bad path in a
//! manifest cannot reject its neighbours.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Implements path normalization and validation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Default maximum path length (PATH_MAX on Linux)
pub const DEFAULT_MAX_PATH_LEN: usize = 4096;

/// Path validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("Invalid path: path is empty")]
    Empty,

    #[error("Invalid path: contains null byte: {0:?}")]
    NulByte(String),

    #[error("Path too long: {len} bytes (max {max})")]
    TooLong { len: usize, max: usize },
}

/// Replace foreign `\` separators with `/`.
pub fn normalize_separators(raw: &str) -> String {
    raw.replace('\\', "/")
}

/// Normalized filesystem path of a managed resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ResourcePath(String);

impl ResourcePath {
    /// Normalize and validate with the default length limit.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        Self::parse_with_limit(raw, DEFAULT_MAX_PATH_LEN)
    }

    /// Normalize and validate a raw declared path.
    ///
    /// # Errors
    /// * `PathError::Empty` - nothing left after normalization
    /// * `PathError::NulByte` - the path cannot be passed to a syscall
    /// * `PathError::TooLong` - exceeds `max_len` bytes
    pub fn parse_with_limit(raw: &str, max_len: usize) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(PathError::Empty);
        }

        if raw.contains('\0') {
            tracing::warn!(path = %raw.escape_debug(), "Rejecting path containing null byte");
            return Err(PathError::NulByte(raw.to_string()));
        }

        if raw.len() > max_len {
            return Err(PathError::TooLong {
                len: raw.len(),
                max: max_len,
            });
        }

        Ok(Self::normalized(raw))
    }

    fn normalized(raw: &str) -> Self {
        if raw.is_empty() {
            return Self(String::new());
        }

        let normalized = normalize_separators(raw);

        // Trailing slashes confuse parent lookups; keep the root itself intact.
        let trimmed = normalized.trim_end_matches('/');
        if trimmed.is_empty() {
            Self("/".to_string())
        } else {
            Self(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    /// Enclosing directory, `None` for the root or a bare relative name.
    pub fn parent(&self) -> Option<&Path> {
        self.as_path()
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
    }
}

impl From<String> for ResourcePath {
    fn from(value: String) -> Self {
        Self::normalized(&value)
    }
}

impl From<ResourcePath> for String {
    fn from(path: ResourcePath) -> Self {
        path.0
    }
}

impl AsRef<Path> for ResourcePath {
    fn as_ref(&self) -> &Path {
        self.as_path()
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
