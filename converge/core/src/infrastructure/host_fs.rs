// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Local Filesystem Host Provider
//!
//! `HostFilesystem` over `std::fs`, with `nix` for the user and group
//! database lookups std does not cover.
//!
//! **Semantics:**
//! - `stat` and `chown` never follow symlinks
//! - `write` truncates and rewrites the whole file
//! - `create_dir` fails when the parent is missing; `create_dir_all` does not

use nix::unistd::{Group, Uid, User};
use std::fs;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::Path;

use crate::domain::attributes::ObjectKind;
use crate::domain::host::{FileStat, HostError, HostFilesystem};

/// Host filesystem provider for the local machine
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalHostFilesystem;

impl LocalHostFilesystem {
    pub fn new() -> Self {
        Self
    }
}

impl HostFilesystem for LocalHostFilesystem {
    fn stat(&self, path: &Path) -> Result<FileStat, HostError> {
        let metadata = fs::symlink_metadata(path).map_err(|e| HostError::from_io(path, e))?;

        Ok(FileStat {
            kind: ObjectKind::from_mode(metadata.mode()),
            mode: metadata.mode(),
            uid: metadata.uid(),
            gid: metadata.gid(),
            size: metadata.len(),
        })
    }

    fn is_readable(&self, path: &Path) -> bool {
        match fs::symlink_metadata(path) {
            Ok(metadata) if metadata.is_dir() => fs::read_dir(path).is_ok(),
            Ok(_) => fs::File::open(path).is_ok(),
            Err(_) => false,
        }
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>, HostError> {
        fs::read(path).map_err(|e| HostError::from_io(path, e))
    }

    fn write(&self, path: &Path, content: &[u8]) -> Result<(), HostError> {
        fs::write(path, content).map_err(|e| HostError::from_io(path, e))
    }

    fn create_dir(&self, path: &Path) -> Result<(), HostError> {
        fs::create_dir(path).map_err(|e| HostError::from_io(path, e))
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), HostError> {
        fs::create_dir_all(path).map_err(|e| HostError::from_io(path, e))
    }

    fn remove_file(&self, path: &Path) -> Result<(), HostError> {
        fs::remove_file(path).map_err(|e| HostError::from_io(path, e))
    }

    fn remove_dir(&self, path: &Path) -> Result<(), HostError> {
        fs::remove_dir(path).map_err(|e| HostError::from_io(path, e))
    }

    fn remove_dir_all(&self, path: &Path) -> Result<(), HostError> {
        fs::remove_dir_all(path).map_err(|e| HostError::from_io(path, e))
    }

    fn chown(&self, path: &Path, uid: Option<u32>, gid: Option<u32>) -> Result<(), HostError> {
        std::os::unix::fs::lchown(path, uid, gid).map_err(|e| HostError::from_io(path, e))
    }

    fn chmod(&self, path: &Path, mode: u32) -> Result<(), HostError> {
        fs::set_permissions(path, fs::Permissions::from_mode(mode))
            .map_err(|e| HostError::from_io(path, e))
    }

    fn resolve_user(&self, name: &str) -> Result<u32, HostError> {
        lookup_user(name)?.ok_or_else(|| HostError::UnknownUser(name.to_string()))
    }

    fn resolve_group(&self, name: &str) -> Result<u32, HostError> {
        lookup_group(name)?.ok_or_else(|| HostError::UnknownGroup(name.to_string()))
    }
}

fn lookup_failed(what: &str, name: &str, errno: nix::errno::Errno) -> HostError {
    HostError::Io(format!("{} lookup for {:?} failed: {}", what, name, errno))
}

/// passwd lookup, `Ok(None)` when no such user exists.
fn lookup_user(name: &str) -> Result<Option<u32>, HostError> {
    User::from_name(name)
        .map(|user| user.map(|u| u.uid.as_raw()))
        .map_err(|e| lookup_failed("user", name, e))
}

/// group lookup, `Ok(None)` when no such group exists.
fn lookup_group(name: &str) -> Result<Option<u32>, HostError> {
    Group::from_name(name)
        .map(|group| group.map(|g| g.gid.as_raw()))
        .map_err(|e| lookup_failed("group", name, e))
}

/// Name of the user owning `uid`, for display.
pub fn user_name(uid: u32) -> Option<String> {
    User::from_uid(Uid::from_raw(uid)).ok().flatten().map(|u| u.name)
}
