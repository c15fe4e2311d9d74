// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Access Attribute Value Objects
//!
//! Owner, group and permission bits as declared for a resource, plus the
//! object-type bits needed by type-sensitive lookups (default labels differ
//! for directories and regular files).
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Implements owner/group/mode value objects

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Mask selecting permission, setuid, setgid and sticky bits.
pub const PERMISSION_MASK: u32 = 0o7777;
/// Mask selecting the object-type bits of `st_mode`.
pub const TYPE_MASK: u32 = 0o170000;

/// Owner or group as declared: numeric id or symbolic name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identity {
    Id(u32),
    Name(String),
}

impl FromStr for Identity {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<u32>() {
            Ok(id) => Identity::Id(id),
            Err(_) => Identity::Name(s.to_string()),
        })
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Id(id) => write!(f, "{}", id),
            Identity::Name(name) => f.write_str(name),
        }
    }
}

/// Permission bits of a filesystem object, always masked to `0o7777`.
///
/// Deserializes from an integer (raw bits, e.g. `0o644` in YAML) or from an
/// octal string (`"0644"`, `"755"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ModeRepr", into = "String")]
pub struct FileMode(u32);

impl FileMode {
    pub fn new(bits: u32) -> Self {
        Self(bits & PERMISSION_MASK)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    /// Parse an octal string such as `"0644"`.
    pub fn from_octal(s: &str) -> Result<Self, String> {
        let digits = s.trim().trim_start_matches("0o");
        let bits = u32::from_str_radix(digits, 8)
            .map_err(|e| format!("invalid octal mode {:?}: {}", s, e))?;
        if bits > PERMISSION_MASK {
            return Err(format!("mode {:?} exceeds 0o7777", s));
        }
        Ok(Self(bits))
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04o}", self.0)
    }
}

impl From<FileMode> for String {
    fn from(mode: FileMode) -> Self {
        mode.to_string()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ModeRepr {
    Bits(u32),
    Octal(String),
}

impl TryFrom<ModeRepr> for FileMode {
    type Error = String;

    fn try_from(repr: ModeRepr) -> Result<Self, Self::Error> {
        match repr {
            ModeRepr::Bits(bits) if bits <= PERMISSION_MASK => Ok(Self(bits)),
            ModeRepr::Bits(bits) => Err(format!("mode {:o} exceeds 0o7777", bits)),
            ModeRepr::Octal(s) => Self::from_octal(&s),
        }
    }
}

/// Type of an on-disk object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    File,
    Directory,
    Symlink,
    Other,
}

impl ObjectKind {
    /// `st_mode` type bits (`S_IFREG`, `S_IFDIR`, `S_IFLNK`), zero for `Other`.
    pub fn type_bits(self) -> u32 {
        match self {
            ObjectKind::File => 0o100000,
            ObjectKind::Directory => 0o040000,
            ObjectKind::Symlink => 0o120000,
            ObjectKind::Other => 0,
        }
    }

    pub fn from_mode(mode: u32) -> Self {
        match mode & TYPE_MASK {
            0o100000 => ObjectKind::File,
            0o040000 => ObjectKind::Directory,
            0o120000 => ObjectKind::Symlink,
            _ => ObjectKind::Other,
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectKind::File => "file",
            ObjectKind::Directory => "directory",
            ObjectKind::Symlink => "symlink",
            ObjectKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// Declared owner, group and mode shared by every resource kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Identity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<Identity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<FileMode>,
}

impl AccessAttributes {
    pub fn is_empty(&self) -> bool {
        self.owner.is_none() && self.group.is_none() && self.mode.is_none()
    }
}
