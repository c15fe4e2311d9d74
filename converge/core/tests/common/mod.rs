// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Recording doubles shared by the provider integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use fsconverge_core::application::ProviderContext;
use fsconverge_core::domain::host::{FileStat, HostError, HostFilesystem};
use fsconverge_core::domain::path::ResourcePath;
use fsconverge_core::domain::security_label::SecurityContextResolver;
use fsconverge_core::infrastructure::LocalHostFilesystem;

/// In-memory label store with per-path defaults and call counters.
#[derive(Default)]
pub struct RecordingResolver {
    supported: bool,
    labels: Mutex<HashMap<PathBuf, String>>,
    defaults: HashMap<PathBuf, String>,
    /// Label reported for any path without a stored label (e.g. inherited on create).
    inherited: Option<String>,
    pub default_lookups: Mutex<Vec<(PathBuf, u32)>>,
    pub get_calls: AtomicUsize,
    pub set_calls: AtomicUsize,
    pub fail_writes: bool,
}

impl RecordingResolver {
    pub fn supported() -> Self {
        Self {
            supported: true,
            ..Self::default()
        }
    }

    pub fn unsupported() -> Self {
        Self::default()
    }

    pub fn with_default(mut self, path: impl Into<PathBuf>, label: &str) -> Self {
        self.defaults.insert(path.into(), label.to_string());
        self
    }

    pub fn with_inherited(mut self, label: &str) -> Self {
        self.inherited = Some(label.to_string());
        self
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn put_label(&self, path: impl Into<PathBuf>, label: &str) {
        self.labels
            .lock()
            .unwrap()
            .insert(path.into(), label.to_string());
    }

    pub fn label_of(&self, path: impl AsRef<Path>) -> Option<String> {
        self.labels.lock().unwrap().get(path.as_ref()).cloned()
    }

    pub fn sets(&self) -> usize {
        self.set_calls.load(Ordering::SeqCst)
    }

    pub fn gets(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn lookups(&self) -> Vec<(PathBuf, u32)> {
        self.default_lookups.lock().unwrap().clone()
    }
}

impl SecurityContextResolver for RecordingResolver {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn get_label(&self, path: &Path) -> Option<String> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if !self.supported || !path.exists() {
            return None;
        }
        self.labels
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .or_else(|| self.inherited.clone())
    }

    fn set_label(&self, path: &Path, label: &str) -> bool {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        if !self.supported || self.fail_writes {
            return false;
        }
        self.put_label(path, label);
        true
    }

    fn get_default_label(&self, path: &Path, mode: u32) -> Option<String> {
        self.default_lookups
            .lock()
            .unwrap()
            .push((path.to_path_buf(), mode));
        if !self.supported {
            return None;
        }
        self.defaults.get(path).cloned()
    }
}

/// Real local filesystem that counts attribute and content writes.
#[derive(Default)]
pub struct RecordingHost {
    inner: LocalHostFilesystem,
    pub chown_calls: AtomicUsize,
    pub chmod_calls: AtomicUsize,
    pub write_calls: AtomicUsize,
    /// Report every object as unreadable, as for a file behind a denied directory.
    pub unreadable: bool,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unreadable() -> Self {
        Self {
            unreadable: true,
            ..Self::default()
        }
    }

    pub fn chowns(&self) -> usize {
        self.chown_calls.load(Ordering::SeqCst)
    }

    pub fn chmods(&self) -> usize {
        self.chmod_calls.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.chown_calls.store(0, Ordering::SeqCst);
        self.chmod_calls.store(0, Ordering::SeqCst);
        self.write_calls.store(0, Ordering::SeqCst);
    }
}

impl HostFilesystem for RecordingHost {
    fn stat(&self, path: &Path) -> Result<FileStat, HostError> {
        self.inner.stat(path)
    }

    fn is_readable(&self, path: &Path) -> bool {
        !self.unreadable && self.inner.is_readable(path)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>, HostError> {
        self.inner.read(path)
    }

    fn write(&self, path: &Path, content: &[u8]) -> Result<(), HostError> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.write(path, content)
    }

    fn create_dir(&self, path: &Path) -> Result<(), HostError> {
        self.inner.create_dir(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), HostError> {
        self.inner.create_dir_all(path)
    }

    fn remove_file(&self, path: &Path) -> Result<(), HostError> {
        self.inner.remove_file(path)
    }

    fn remove_dir(&self, path: &Path) -> Result<(), HostError> {
        self.inner.remove_dir(path)
    }

    fn remove_dir_all(&self, path: &Path) -> Result<(), HostError> {
        self.inner.remove_dir_all(path)
    }

    fn chown(&self, path: &Path, uid: Option<u32>, gid: Option<u32>) -> Result<(), HostError> {
        self.chown_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.chown(path, uid, gid)
    }

    fn chmod(&self, path: &Path, mode: u32) -> Result<(), HostError> {
        self.chmod_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.chmod(path, mode)
    }

    fn resolve_user(&self, name: &str) -> Result<u32, HostError> {
        self.inner.resolve_user(name)
    }

    fn resolve_group(&self, name: &str) -> Result<u32, HostError> {
        self.inner.resolve_group(name)
    }
}

pub fn context(host: &Arc<RecordingHost>, resolver: &Arc<RecordingResolver>) -> ProviderContext {
    ProviderContext::new(host.clone(), resolver.clone())
}

pub fn rpath(path: impl AsRef<Path>) -> ResourcePath {
    ResourcePath::parse(&path.as_ref().to_string_lossy()).unwrap()
}

/// uid/gid owning `path`; chown to these always succeeds unprivileged.
pub fn owner_of(path: impl AsRef<Path>) -> (u32, u32) {
    let meta = std::fs::symlink_metadata(path).unwrap();
    (meta.uid(), meta.gid())
}

pub fn permissions_of(path: impl AsRef<Path>) -> u32 {
    std::fs::symlink_metadata(path).unwrap().mode() & 0o7777
}
