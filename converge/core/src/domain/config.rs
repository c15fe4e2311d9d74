// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Converge Configuration Types
//
// Defines the configuration schema for the fsconverge engine:
// - Mandatory access control probing (mode, selinuxfs mount, policy root)
// - Path validation limits
//
// Every field has a default, so an empty file (or no file at all) is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::path::DEFAULT_MAX_PATH_LEN;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "FSCONVERGE_CONFIG_PATH";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConvergeConfig {
    /// Mandatory access control settings
    #[serde(default)]
    pub mac: MacConfig,

    /// Validation limits
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Whether label management may be enabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MacMode {
    /// Probe the host and manage labels when SELinux is active
    #[default]
    Auto,
    /// Never touch labels
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacConfig {
    #[serde(default)]
    pub mode: MacMode,

    /// Mount point of selinuxfs
    #[serde(default = "default_selinuxfs_mount")]
    pub selinuxfs_mount: PathBuf,

    /// Root of the SELinux configuration tree (holds `config` and policy dirs)
    #[serde(default = "default_config_root")]
    pub config_root: PathBuf,

    /// Policy name (e.g. "targeted"); read from `<config_root>/config` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_type: Option<String>,
}

fn default_selinuxfs_mount() -> PathBuf {
    PathBuf::from("/sys/fs/selinux")
}

fn default_config_root() -> PathBuf {
    PathBuf::from("/etc/selinux")
}

impl Default for MacConfig {
    fn default() -> Self {
        Self {
            mode: MacMode::Auto,
            selinuxfs_mount: default_selinuxfs_mount(),
            config_root: default_config_root(),
            policy_type: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum accepted path length in bytes
    #[serde(default = "default_max_path_len")]
    pub max_path_len: usize,
}

fn default_max_path_len() -> usize {
    DEFAULT_MAX_PATH_LEN
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_path_len: DEFAULT_MAX_PATH_LEN,
        }
    }
}

impl ConvergeConfig {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Serialize configuration to YAML
    pub fn to_yaml_string(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Discover configuration file using precedence order
    /// 1. FSCONVERGE_CONFIG_PATH environment variable
    /// 2. ./fsconverge.yaml (working directory)
    /// 3. ~/.fsconverge/config.yaml (user home)
    /// 4. /etc/fsconverge/config.yaml (system)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./fsconverge.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".fsconverge").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        let system_config = PathBuf::from("/etc/fsconverge/config.yaml");
        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit CLI path (fail if missing/invalid)
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::debug!("No configuration file found in standard locations. Using defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("FSCONVERGE_MAC_MODE") {
            match val.to_lowercase().as_str() {
                "auto" => {
                    tracing::info!("Environment override: FSCONVERGE_MAC_MODE=auto");
                    self.mac.mode = MacMode::Auto;
                }
                "disabled" | "off" | "false" | "0" => {
                    tracing::info!("Environment override: FSCONVERGE_MAC_MODE=disabled");
                    self.mac.mode = MacMode::Disabled;
                }
                _ => {
                    tracing::warn!(
                        "Invalid FSCONVERGE_MAC_MODE value: '{}'. Expected 'auto' or 'disabled'.",
                        val
                    );
                }
            }
        }

        if let Ok(val) = std::env::var("FSCONVERGE_SELINUX_ROOT") {
            tracing::info!("Environment override: FSCONVERGE_SELINUX_ROOT={}", val);
            self.mac.config_root = PathBuf::from(val);
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.mac.selinuxfs_mount.as_os_str().is_empty() {
            anyhow::bail!("mac.selinuxfs_mount cannot be empty");
        }

        if self.mac.config_root.as_os_str().is_empty() {
            anyhow::bail!("mac.config_root cannot be empty");
        }

        if let Some(policy_type) = &self.mac.policy_type {
            if policy_type.is_empty() || policy_type.contains('/') {
                anyhow::bail!("mac.policy_type must be a plain policy name, got '{}'", policy_type);
            }
        }

        if self.limits.max_path_len == 0 {
            anyhow::bail!("limits.max_path_len must be greater than zero");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_is_default() {
        let config = ConvergeConfig::from_yaml_str("").unwrap();
        assert_eq!(config, ConvergeConfig::default());
        assert_eq!(config.mac.mode, MacMode::Auto);
        assert_eq!(config.mac.selinuxfs_mount, PathBuf::from("/sys/fs/selinux"));
        assert_eq!(config.limits.max_path_len, 4096);
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
mac:
  mode: disabled
  policy_type: mls
"#;
        let config = ConvergeConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.mac.mode, MacMode::Disabled);
        assert_eq!(config.mac.policy_type.as_deref(), Some("mls"));
        assert_eq!(config.mac.config_root, PathBuf::from("/etc/selinux"));
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_bad_policy_type() {
        let mut config = ConvergeConfig::default();
        config.mac.policy_type = Some("../etc".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_path_len() {
        let mut config = ConvergeConfig::default();
        config.limits.max_path_len = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_roundtrip_of_defaults() {
        let config = ConvergeConfig::default();
        let yaml = config.to_yaml_string().unwrap();
        assert_eq!(ConvergeConfig::from_yaml_str(&yaml).unwrap(), config);
    }

    #[test]
    fn test_explicit_missing_path_fails() {
        let result = ConvergeConfig::load_or_default(Some(PathBuf::from(
            "/nonexistent/fsconverge/config.yaml",
        )));
        assert!(result.is_err());
    }
}
