// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Security Label Domain Module
//!
//! Contracts for mandatory-access-control labels on filesystem objects.
//!
//! | Item | Contents |
//! |------|----------|
//! | [`SecurityContextResolver`] | probe, read, write and default-lookup of labels |
//! | [`HasSecurityLabel`] | label accessor shared by desired and current state |
//!
//! Every resolver operation is best-effort: when MAC is not active on the
//! host, or the native call fails, reads yield `None` and writes yield
//! `false`. Nothing here aborts a convergence pass.

use std::path::Path;

/// Reads, writes and resolves security labels on the host.
///
/// MAC support is probed once when the implementation is constructed and
/// reported by [`SecurityContextResolver::is_supported`] for the resolver's
/// lifetime.
pub trait SecurityContextResolver: Send + Sync {
    /// `true` only when the host's MAC subsystem is active.
    fn is_supported(&self) -> bool;

    /// Live label of an existing object; `None` when unsupported or unreadable.
    fn get_label(&self, path: &Path) -> Option<String>;

    /// Write `label`; `false` when unsupported or the native call failed.
    fn set_label(&self, path: &Path, label: &str) -> bool;

    /// Policy default label for `path` given its `st_mode` (type bits matter).
    fn get_default_label(&self, path: &Path, mode: u32) -> Option<String>;
}

/// Anything carrying an optional security label.
pub trait HasSecurityLabel {
    fn security_label(&self) -> Option<&str>;
}

/// Resolver for hosts without MAC: every operation is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedResolver;

impl SecurityContextResolver for UnsupportedResolver {
    fn is_supported(&self) -> bool {
        false
    }

    fn get_label(&self, _path: &Path) -> Option<String> {
        None
    }

    fn set_label(&self, _path: &Path, _label: &str) -> bool {
        false
    }

    fn get_default_label(&self, _path: &Path, _mode: u32) -> Option<String> {
        None
    }
}
