// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! SELinux Security Context Resolver
//!
//! Implements [`SecurityContextResolver`] for SELinux hosts:
//!
//! | Operation | Mechanism |
//! |-----------|-----------|
//! | support probe | `<selinuxfs>/enforce` present, once at construction |
//! | read/write label | `security.selinux` xattr via `lgetxattr`/`lsetxattr` |
//! | default label | [`FileContexts`] lookup (`matchpathcon` semantics) |
//!
//! Native failures are logged and degrade to `None`/`false`.

pub mod file_contexts;
pub mod xattr;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::domain::config::{MacConfig, MacMode};
use crate::domain::security_label::SecurityContextResolver;

pub use file_contexts::{FileContexts, PolicyError};

const DEFAULT_POLICY_TYPE: &str = "targeted";

/// Where the active policy lives, known only when SELinux is active.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ActivePolicy {
    policy_type: String,
    files_dir: PathBuf,
    selinuxfs_mount: PathBuf,
}

/// SELinux-backed resolver. Construct with [`SelinuxResolver::probe`].
#[derive(Debug)]
pub struct SelinuxResolver {
    active: Option<ActivePolicy>,
    policy: OnceLock<Option<FileContexts>>,
}

impl SelinuxResolver {
    /// Probe the host once and build a resolver reflecting the result.
    pub fn probe(config: &MacConfig) -> Self {
        if config.mode == MacMode::Disabled {
            tracing::info!("Security label management disabled by configuration");
            return Self::disabled();
        }

        let enforce = config.selinuxfs_mount.join("enforce");
        if !enforce.exists() {
            tracing::debug!(
                selinuxfs = %config.selinuxfs_mount.display(),
                "SELinux not active on this host; label management disabled"
            );
            return Self::disabled();
        }

        let policy_type = config
            .policy_type
            .clone()
            .or_else(|| read_policy_type(&config.config_root.join("config")))
            .unwrap_or_else(|| DEFAULT_POLICY_TYPE.to_string());

        let files_dir = config
            .config_root
            .join(&policy_type)
            .join("contexts")
            .join("files");

        tracing::info!(
            policy_type = %policy_type,
            policy_dir = %files_dir.display(),
            "SELinux support detected"
        );

        Self {
            active: Some(ActivePolicy {
                policy_type,
                files_dir,
                selinuxfs_mount: config.selinuxfs_mount.clone(),
            }),
            policy: OnceLock::new(),
        }
    }

    /// Resolver that never touches labels.
    pub fn disabled() -> Self {
        Self {
            active: None,
            policy: OnceLock::new(),
        }
    }

    /// Active policy name, e.g. "targeted".
    pub fn policy_type(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.policy_type.as_str())
    }

    /// Directory holding the `file_contexts` files of the active policy.
    pub fn policy_files_dir(&self) -> Option<&Path> {
        self.active.as_ref().map(|a| a.files_dir.as_path())
    }

    /// Current enforcement state read from selinuxfs.
    pub fn enforcing(&self) -> Option<bool> {
        let active = self.active.as_ref()?;
        let value = std::fs::read_to_string(active.selinuxfs_mount.join("enforce")).ok()?;
        match value.trim() {
            "1" => Some(true),
            "0" => Some(false),
            _ => None,
        }
    }

    /// File context policy, loaded on first use.
    fn policy(&self) -> Option<&FileContexts> {
        let active = self.active.as_ref()?;
        self.policy
            .get_or_init(|| match FileContexts::load(&active.files_dir) {
                Ok(policy) => Some(policy),
                Err(e) => {
                    tracing::warn!(error = %e, "Default label lookups unavailable");
                    None
                }
            })
            .as_ref()
    }
}

impl SecurityContextResolver for SelinuxResolver {
    fn is_supported(&self) -> bool {
        self.active.is_some()
    }

    fn get_label(&self, path: &Path) -> Option<String> {
        if !self.is_supported() {
            return None;
        }
        match xattr::get_label(path) {
            Ok(label) => Some(label),
            Err(e) => {
                tracing::debug!(
                    path = %path.display(),
                    error = %e,
                    "Failed to read security label"
                );
                None
            }
        }
    }

    fn set_label(&self, path: &Path, label: &str) -> bool {
        if !self.is_supported() {
            return false;
        }
        match xattr::set_label(path, label) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    label = %label,
                    error = %e,
                    "Failed to set security label"
                );
                false
            }
        }
    }

    fn get_default_label(&self, path: &Path, mode: u32) -> Option<String> {
        if !self.is_supported() {
            return None;
        }
        self.policy()?.lookup(&path.to_string_lossy(), mode)
    }
}

/// `SELINUXTYPE=` from the SELinux config file.
fn read_policy_type(config_file: &Path) -> Option<String> {
    let text = std::fs::read_to_string(config_file).ok()?;
    text.lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .find_map(|line| line.strip_prefix("SELINUXTYPE="))
        .map(|value| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fake_host(enforce: Option<&str>, selinux_config: Option<&str>) -> (TempDir, MacConfig) {
        let temp_dir = TempDir::new().unwrap();
        let selinuxfs = temp_dir.path().join("selinuxfs");
        let root = temp_dir.path().join("etc-selinux");
        std::fs::create_dir_all(&selinuxfs).unwrap();
        std::fs::create_dir_all(&root).unwrap();
        if let Some(value) = enforce {
            std::fs::write(selinuxfs.join("enforce"), value).unwrap();
        }
        if let Some(text) = selinux_config {
            std::fs::write(root.join("config"), text).unwrap();
        }
        let config = MacConfig {
            mode: MacMode::Auto,
            selinuxfs_mount: selinuxfs,
            config_root: root,
            policy_type: None,
        };
        (temp_dir, config)
    }

    #[test]
    fn test_probe_without_selinuxfs() {
        let (_dir, config) = fake_host(None, None);
        let resolver = SelinuxResolver::probe(&config);
        assert!(!resolver.is_supported());
        assert_eq!(resolver.get_label(Path::new("/etc")), None);
        assert!(!resolver.set_label(Path::new("/etc"), "system_u:object_r:etc_t:s0"));
        assert_eq!(resolver.get_default_label(Path::new("/etc"), 0o040000), None);
    }

    #[test]
    fn test_probe_disabled_by_config() {
        let (_dir, mut config) = fake_host(Some("1"), None);
        config.mode = MacMode::Disabled;
        assert!(!SelinuxResolver::probe(&config).is_supported());
    }

    #[test]
    fn test_probe_reads_policy_type() {
        let (_dir, config) = fake_host(
            Some("0\n"),
            Some("# managed\nSELINUX=permissive\nSELINUXTYPE=\"mls\"\n"),
        );
        let resolver = SelinuxResolver::probe(&config);
        assert!(resolver.is_supported());
        assert_eq!(resolver.policy_type(), Some("mls"));
        assert_eq!(resolver.enforcing(), Some(false));
        assert!(resolver
            .policy_files_dir()
            .unwrap()
            .ends_with("mls/contexts/files"));
    }

    #[test]
    fn test_probe_defaults_to_targeted() {
        let (_dir, config) = fake_host(Some("1"), None);
        let resolver = SelinuxResolver::probe(&config);
        assert_eq!(resolver.policy_type(), Some("targeted"));
        assert_eq!(resolver.enforcing(), Some(true));
    }

    #[test]
    fn test_default_label_from_policy_tree() {
        let (_dir, config) = fake_host(Some("1"), Some("SELINUXTYPE=targeted\n"));
        let files_dir = config.config_root.join("targeted/contexts/files");
        std::fs::create_dir_all(&files_dir).unwrap();
        std::fs::write(
            files_dir.join("file_contexts"),
            "/etc(/.*)? system_u:object_r:etc_t:s0\n/srv -d system_u:object_r:var_t:s0\n",
        )
        .unwrap();

        let resolver = SelinuxResolver::probe(&config);
        assert_eq!(
            resolver
                .get_default_label(Path::new("/etc/motd"), 0o100644)
                .as_deref(),
            Some("system_u:object_r:etc_t:s0")
        );
        assert_eq!(
            resolver
                .get_default_label(Path::new("/srv"), 0o040755)
                .as_deref(),
            Some("system_u:object_r:var_t:s0")
        );
        assert_eq!(resolver.get_default_label(Path::new("/srv"), 0o100644), None);
    }

    #[test]
    fn test_missing_policy_degrades_to_none() {
        let (_dir, config) = fake_host(Some("1"), None);
        let resolver = SelinuxResolver::probe(&config);
        assert_eq!(resolver.get_default_label(Path::new("/etc"), 0o040000), None);
    }

    #[test]
    fn test_label_read_failure_is_absent() {
        let (dir, config) = fake_host(Some("1"), None);
        let resolver = SelinuxResolver::probe(&config);
        assert_eq!(resolver.get_label(&dir.path().join("missing")), None);
    }
}
