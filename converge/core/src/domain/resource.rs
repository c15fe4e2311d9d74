// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Resource Domain Types
//!
//! Desired state for each managed object kind, the current-state snapshot
//! captured by inspection, and the result of one convergence pass.
//!
//! Desired state is supplied by the declaration layer and never mutated here.
//! Current state is rebuilt on every pass and discarded afterwards.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Implements desired/current state and convergence result

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::attributes::{AccessAttributes, FileMode, ObjectKind};
use crate::domain::path::ResourcePath;
use crate::domain::security_label::HasSecurityLabel;
use crate::domain::template::TemplateSource;

/// Common view over the desired state of every resource kind.
pub trait DesiredObject: HasSecurityLabel {
    fn path(&self) -> &ResourcePath;

    /// Object type the resource manages.
    fn kind(&self) -> ObjectKind;

    fn attributes(&self) -> &AccessAttributes;

    /// `st_mode` of the object being converged, used for default-label lookup.
    ///
    /// Built from the managed object type and the declared permissions, never
    /// from whatever currently sits at the path.
    fn label_lookup_mode(&self) -> u32 {
        let permissions = self.attributes().mode.map(FileMode::bits).unwrap_or(0);
        self.kind().type_bits() | permissions
    }
}

/// Desired state of a plain file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileResource {
    pub path: ResourcePath,

    #[serde(flatten)]
    pub attributes: AccessAttributes,

    /// Bytes written verbatim; `None` leaves existing content alone.
    #[serde(default, with = "content_bytes", skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<u8>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_label: Option<String>,
}

impl FileResource {
    pub fn new(path: ResourcePath) -> Self {
        Self {
            path,
            attributes: AccessAttributes::default(),
            content: None,
            security_label: None,
        }
    }

    pub fn with_content(mut self, content: impl Into<Vec<u8>>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_attributes(mut self, attributes: AccessAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_security_label(mut self, label: impl Into<String>) -> Self {
        self.security_label = Some(label.into());
        self
    }
}

/// Desired state of a directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryResource {
    pub path: ResourcePath,

    #[serde(flatten)]
    pub attributes: AccessAttributes,

    /// Create missing parents on create, remove contents on delete.
    #[serde(default)]
    pub recursive: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_label: Option<String>,
}

impl DirectoryResource {
    pub fn new(path: ResourcePath) -> Self {
        Self {
            path,
            attributes: AccessAttributes::default(),
            recursive: false,
            security_label: None,
        }
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_attributes(mut self, attributes: AccessAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_security_label(mut self, label: impl Into<String>) -> Self {
        self.security_label = Some(label.into());
        self
    }
}

/// Desired state of a file whose content is rendered from a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateResource {
    pub path: ResourcePath,

    #[serde(flatten)]
    pub attributes: AccessAttributes,

    pub template: TemplateSource,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_label: Option<String>,
}

impl TemplateResource {
    pub fn new(path: ResourcePath, template: TemplateSource) -> Self {
        Self {
            path,
            attributes: AccessAttributes::default(),
            template,
            security_label: None,
        }
    }

    pub fn with_attributes(mut self, attributes: AccessAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_security_label(mut self, label: impl Into<String>) -> Self {
        self.security_label = Some(label.into());
        self
    }
}

macro_rules! impl_desired_object {
    ($ty:ty, $kind:expr) => {
        impl HasSecurityLabel for $ty {
            fn security_label(&self) -> Option<&str> {
                self.security_label.as_deref()
            }
        }

        impl DesiredObject for $ty {
            fn path(&self) -> &ResourcePath {
                &self.path
            }

            fn kind(&self) -> ObjectKind {
                $kind
            }

            fn attributes(&self) -> &AccessAttributes {
                &self.attributes
            }
        }
    };
}

impl_desired_object!(FileResource, ObjectKind::File);
impl_desired_object!(DirectoryResource, ObjectKind::Directory);
impl_desired_object!(TemplateResource, ObjectKind::File);

/// A declared resource of any supported kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Resource {
    File(FileResource),
    Directory(DirectoryResource),
    Template(TemplateResource),
}

impl Resource {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Resource::File(_) => "file",
            Resource::Directory(_) => "directory",
            Resource::Template(_) => "template",
        }
    }

    pub fn desired(&self) -> &dyn DesiredObject {
        match self {
            Resource::File(r) => r,
            Resource::Directory(r) => r,
            Resource::Template(r) => r,
        }
    }

    pub fn path(&self) -> &ResourcePath {
        self.desired().path()
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.kind_name(), self.path())
    }
}

/// Action requested for a resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    #[default]
    Create,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Create => f.write_str("create"),
            Action::Delete => f.write_str("delete"),
        }
    }
}

/// Observed state of one filesystem object.
///
/// `exists == false` means nothing is at the path. An object that exists but
/// could not be inspected has `exists == true` with every attribute `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentState {
    pub path: ResourcePath,
    pub exists: bool,
    pub kind: Option<ObjectKind>,
    pub owner: Option<u32>,
    pub group: Option<u32>,
    /// Permission bits only; type bits are reported through `kind`.
    pub mode: Option<FileMode>,
    pub checksum: Option<String>,
    pub security_label: Option<String>,
}

impl CurrentState {
    pub fn absent(path: ResourcePath) -> Self {
        Self {
            path,
            exists: false,
            kind: None,
            owner: None,
            group: None,
            mode: None,
            checksum: None,
            security_label: None,
        }
    }

    /// Object is present but its attributes are unknown.
    pub fn unreadable(path: ResourcePath, kind: Option<ObjectKind>) -> Self {
        Self {
            exists: true,
            kind,
            ..Self::absent(path)
        }
    }

    pub fn is_absent(&self) -> bool {
        !self.exists
    }
}

impl HasSecurityLabel for CurrentState {
    fn security_label(&self) -> Option<&str> {
        self.security_label.as_deref()
    }
}

/// Outcome of one convergence pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConvergenceResult {
    /// Something was created or changed during the pass.
    pub updated: bool,
}

impl ConvergenceResult {
    pub fn new(updated: bool) -> Self {
        Self { updated }
    }

    pub fn unchanged() -> Self {
        Self { updated: false }
    }
}

mod content_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(content: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match content {
            Some(bytes) => serializer.serialize_str(&String::from_utf8_lossy(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<String>::deserialize(deserializer)?.map(String::into_bytes))
    }
}
