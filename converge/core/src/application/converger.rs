// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Converger Application Service
//!
//! Selects the provider for each declared [`Resource`] and runs lists of
//! resources with failures isolated per resource: a fatal error for one
//! resource is recorded in the [`RunReport`] and the run moves on.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

use crate::application::directory_provider::DirectoryProvider;
use crate::application::error::ConvergeError;
use crate::application::file_provider::FileProvider;
use crate::application::provider::{ConvergenceProvider, ProviderContext};
use crate::application::template_provider::TemplateProvider;
use crate::domain::path::{ResourcePath, DEFAULT_MAX_PATH_LEN};
use crate::domain::resource::{Action, ConvergenceResult, CurrentState, Resource};
use crate::domain::template::TemplateRenderer;

/// A resource plus the action requested for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDeclaration {
    #[serde(flatten)]
    pub resource: Resource,

    #[serde(default)]
    pub action: Action,
}

/// Ordered list of declarations, as read from a YAML manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub resources: Vec<ResourceDeclaration>,
}

impl Manifest {
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Changed,
    Unchanged,
    Failed,
}

/// Result of converging one declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceOutcome {
    pub kind: String,
    pub path: String,
    pub action: Action,
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-resource outcomes of one run, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub outcomes: Vec<ResourceOutcome>,
}

impl RunReport {
    pub fn count(&self, status: OutcomeStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    pub fn has_failures(&self) -> bool {
        self.count(OutcomeStatus::Failed) > 0
    }
}

/// Provider dispatch over {file, directory, template}.
pub struct Converger {
    file: FileProvider,
    directory: DirectoryProvider,
    template: TemplateProvider,
    max_path_len: usize,
}

impl Converger {
    pub fn new(context: ProviderContext, renderer: Arc<dyn TemplateRenderer>) -> Self {
        Self {
            file: FileProvider::new(context.clone()),
            directory: DirectoryProvider::new(context.clone()),
            template: TemplateProvider::new(context, renderer),
            max_path_len: DEFAULT_MAX_PATH_LEN,
        }
    }

    /// Reject resources whose path is longer than `max_path_len` bytes.
    pub fn with_path_limit(mut self, max_path_len: usize) -> Self {
        self.max_path_len = max_path_len;
        self
    }

    pub fn load_current_resource(&self, resource: &Resource) -> CurrentState {
        match resource {
            Resource::File(r) => self.file.load_current_resource(r),
            Resource::Directory(r) => self.directory.load_current_resource(r),
            Resource::Template(r) => self.template.load_current_resource(r),
        }
    }

    pub fn apply_create_action(
        &self,
        resource: &Resource,
    ) -> Result<ConvergenceResult, ConvergeError> {
        match resource {
            Resource::File(r) => self.file.apply_create_action(r),
            Resource::Directory(r) => self.directory.apply_create_action(r),
            Resource::Template(r) => self.template.apply_create_action(r),
        }
    }

    pub fn apply_delete_action(
        &self,
        resource: &Resource,
    ) -> Result<ConvergenceResult, ConvergeError> {
        match resource {
            Resource::File(r) => self.file.apply_delete_action(r),
            Resource::Directory(r) => self.directory.apply_delete_action(r),
            Resource::Template(r) => self.template.apply_delete_action(r),
        }
    }

    pub fn apply(
        &self,
        resource: &Resource,
        action: Action,
    ) -> Result<ConvergenceResult, ConvergeError> {
        ResourcePath::parse_with_limit(resource.path().as_str(), self.max_path_len)?;
        match action {
            Action::Create => self.apply_create_action(resource),
            Action::Delete => self.apply_delete_action(resource),
        }
    }

    /// Converge every declaration in order, isolating failures.
    pub fn converge_all(&self, declarations: &[ResourceDeclaration]) -> RunReport {
        let mut report = RunReport::default();

        for declaration in declarations {
            let resource = &declaration.resource;
            let (status, error_message) = match self.apply(resource, declaration.action) {
                Ok(result) if result.updated => (OutcomeStatus::Changed, None),
                Ok(_) => (OutcomeStatus::Unchanged, None),
                Err(e) => {
                    error!(
                        resource = %resource,
                        action = %declaration.action,
                        error = %e,
                        "Convergence failed"
                    );
                    (OutcomeStatus::Failed, Some(e.to_string()))
                }
            };

            report.outcomes.push(ResourceOutcome {
                kind: resource.kind_name().to_string(),
                path: resource.path().to_string(),
                action: declaration.action,
                status,
                error: error_message,
            });
        }

        info!(
            total = report.outcomes.len(),
            changed = report.count(OutcomeStatus::Changed),
            failed = report.count(OutcomeStatus::Failed),
            "Convergence run finished"
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_parse() {
        let yaml = r#"
resources:
  - kind: directory
    path: /srv/app
    recursive: true
    mode: "0755"
  - kind: file
    path: /srv/app/motd
    content: "hello"
  - kind: template
    path: /srv/app/app.conf
    template:
      source: "port={{port}}"
      variables: { port: 80 }
  - kind: file
    path: /srv/app/old
    action: delete
"#;
        let manifest = Manifest::from_yaml_str(yaml).unwrap();
        assert_eq!(manifest.resources.len(), 4);
        assert_eq!(manifest.resources[0].resource.kind_name(), "directory");
        assert_eq!(manifest.resources[0].action, Action::Create);
        assert_eq!(manifest.resources[3].action, Action::Delete);
        assert_eq!(manifest.resources[3].resource.path().as_str(), "/srv/app/old");
    }

    #[test]
    fn test_manifest_unknown_kind() {
        let yaml = "resources:\n  - kind: socket\n    path: /run/x\n";
        assert!(Manifest::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_report_counts() {
        let outcome = |status| ResourceOutcome {
            kind: "file".to_string(),
            path: "/x".to_string(),
            action: Action::Create,
            status,
            error: None,
        };
        let report = RunReport {
            outcomes: vec![
                outcome(OutcomeStatus::Changed),
                outcome(OutcomeStatus::Unchanged),
                outcome(OutcomeStatus::Failed),
            ],
        };
        assert_eq!(report.count(OutcomeStatus::Changed), 1);
        assert!(report.has_failures());
        assert!(!RunReport::default().has_failures());
    }
}
