use crate::infrastructure::git::DEFAULT_SSH_COMMAND;
use crate::infrastructure::registry::registry_client::DEFAULT_REGISTRY_URL;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use validator::Validate;

/// Name of the optional workspace configuration file
pub const CONFIG_FILE_NAME: &str = "libws.yaml";

/// Configuration store related errors
#[derive(Debug, Error)]
pub enum ConfigStoreError {
    #[error("Configuration file read failed: {0}")]
    ReadFailed(String),

    #[error("Configuration file write failed: {0}")]
    WriteFailed(String),

    #[error("YAML parsing failed: {0}")]
    YamlParsingFailed(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Workspace settings read from `libws.yaml`
///
/// Every field is optional in the file; missing ones take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Registry URL or local catalog path
    #[validate(length(min = 1))]
    pub registry_url: String,

    #[validate(length(min = 1))]
    pub git_executable: String,

    /// Value pinned into `GIT_SSH_COMMAND`
    #[validate(length(min = 1))]
    pub ssh_command: String,

    /// Per-subprocess timeout; absent means no limit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,

    /// Upper bound on concurrent git processes for fan-out operations
    #[validate(range(min = 1, max = 256))]
    pub max_parallel: usize,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            git_executable: "git".to_string(),
            ssh_command: DEFAULT_SSH_COMMAND.to_string(),
            timeout_seconds: None,
            max_parallel: num_cpus::get().clamp(1, 256),
        }
    }
}

/// Configuration store for the YAML workspace file
#[derive(Debug, Clone, Default)]
pub struct ConfigStore;

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    /// Path of the configuration file for `workspace_root`
    pub fn config_path(workspace_root: &Path) -> PathBuf {
        workspace_root.join(CONFIG_FILE_NAME)
    }

    /// Load and validate the configuration for `workspace_root`.
    ///
    /// A missing file yields the defaults.
    pub fn load(&self, workspace_root: &Path) -> Result<WorkspaceConfig, ConfigStoreError> {
        let config_path = Self::config_path(workspace_root);
        if !config_path.exists() {
            return Ok(WorkspaceConfig::default());
        }
        self.read_workspace_config(&config_path)
    }

    /// Read workspace configuration from a YAML file
    pub fn read_workspace_config<P: AsRef<Path>>(
        &self,
        config_path: P,
    ) -> Result<WorkspaceConfig, ConfigStoreError> {
        let config_path = config_path.as_ref();

        let contents = fs::read_to_string(config_path)
            .map_err(|e| ConfigStoreError::ReadFailed(format!("{}: {}", config_path.display(), e)))?;

        // 空ファイルはデフォルト扱い
        let config: WorkspaceConfig = if contents.trim().is_empty() {
            WorkspaceConfig::default()
        } else {
            serde_yaml::from_str(&contents)
                .map_err(|e| ConfigStoreError::YamlParsingFailed(e.to_string()))?
        };

        config
            .validate()
            .map_err(|e| ConfigStoreError::ValidationFailed(e.to_string()))?;

        Ok(config)
    }

    /// Write workspace configuration to a YAML file
    pub fn write_workspace_config<P: AsRef<Path>>(
        &self,
        config_path: P,
        config: &WorkspaceConfig,
    ) -> Result<(), ConfigStoreError> {
        let config_path = config_path.as_ref();

        config
            .validate()
            .map_err(|e| ConfigStoreError::ValidationFailed(e.to_string()))?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigStoreError::WriteFailed(e.to_string()))?;
        }

        let yaml_content = serde_yaml::to_string(config)
            .map_err(|e| ConfigStoreError::WriteFailed(e.to_string()))?;

        fs::write(config_path, yaml_content)
            .map_err(|e| ConfigStoreError::WriteFailed(e.to_string()))
    }
}
