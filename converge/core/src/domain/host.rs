// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Host Filesystem Trait - Anti-Corruption Layer for local file I/O
//!
//! Low-level file I/O and directory creation are consumed through this trait
//! so providers stay independent of the concrete host and can be exercised
//! against recording doubles in tests.

use crate::domain::attributes::ObjectKind;
use std::path::Path;
use thiserror::Error;

/// Result of an `lstat` on a filesystem object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    /// Object type (file, directory, symlink)
    pub kind: ObjectKind,
    /// Full `st_mode`, including type bits
    pub mode: u32,
    /// Owning user id
    pub uid: u32,
    /// Owning group id
    pub gid: u32,
    /// Size in bytes
    pub size: u64,
}

/// Host filesystem operations used by the convergence providers.
///
/// Every method is blocking. Paths are already normalized by the caller.
pub trait HostFilesystem: Send + Sync {
    /// Stat without following symlinks.
    fn stat(&self, path: &Path) -> Result<FileStat, HostError>;

    /// Whether the current process can open the object for reading.
    fn is_readable(&self, path: &Path) -> bool;

    /// Read the full content of a regular file.
    fn read(&self, path: &Path) -> Result<Vec<u8>, HostError>;

    /// Create or truncate `path` and write `content`.
    fn write(&self, path: &Path, content: &[u8]) -> Result<(), HostError>;

    /// Create a single directory; the parent must exist.
    fn create_dir(&self, path: &Path) -> Result<(), HostError>;

    /// Create a directory and every missing parent.
    fn create_dir_all(&self, path: &Path) -> Result<(), HostError>;

    fn remove_file(&self, path: &Path) -> Result<(), HostError>;

    /// Remove an empty directory.
    fn remove_dir(&self, path: &Path) -> Result<(), HostError>;

    /// Remove a directory and everything below it.
    fn remove_dir_all(&self, path: &Path) -> Result<(), HostError>;

    /// Change ownership without following symlinks. `None` leaves that id unchanged.
    fn chown(&self, path: &Path, uid: Option<u32>, gid: Option<u32>) -> Result<(), HostError>;

    /// Set permission bits.
    fn chmod(&self, path: &Path, mode: u32) -> Result<(), HostError>;

    /// Resolve a user name through the host user database.
    fn resolve_user(&self, name: &str) -> Result<u32, HostError>;

    /// Resolve a group name through the host group database.
    fn resolve_group(&self, name: &str) -> Result<u32, HostError>;

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.stat(path), Ok(stat) if stat.kind == ObjectKind::Directory)
    }
}

/// Host filesystem errors
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error("Unknown group: {0}")]
    UnknownGroup(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl HostError {
    /// Classify an I/O error for `path`.
    pub fn from_io(path: &Path, err: std::io::Error) -> Self {
        let target = format!("{}: {}", path.display(), err);
        match err.kind() {
            std::io::ErrorKind::NotFound => HostError::NotFound(target),
            std::io::ErrorKind::AlreadyExists => HostError::AlreadyExists(target),
            std::io::ErrorKind::PermissionDenied => HostError::PermissionDenied(target),
            _ => HostError::Io(target),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, HostError::NotFound(_))
    }
}
