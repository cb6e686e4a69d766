use crate::domain::value_objects::scm_type::ScmType;
use crate::infrastructure::process::DEFAULT_LOCALE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use validator::Validate;

/// File picked up from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "scm-checkout.yaml";

/// Upper bound on checkout attempts
pub const MAX_CHECKOUT_ATTEMPTS: u32 = 4;

/// Configuration store related errors
#[derive(Debug, Error)]
pub enum ConfigStoreError {
    #[error("Configuration file not found at path: {0}")]
    ConfigFileNotFound(String),

    #[error("Configuration file read failed: {0}")]
    ReadFailed(String),

    #[error("YAML parsing failed: {0}")]
    YamlParsingFailed(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Per-tool settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Executable tried before any platform discovery
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub git: ToolConfig,
    pub svn: ToolConfig,
}

impl ToolsConfig {
    /// Discovery hint for a tool kind
    pub fn hint(&self, scm_type: ScmType) -> Option<&Path> {
        match scm_type {
            ScmType::Git => self.git.path.as_deref(),
            ScmType::Svn => self.svn.path.as_deref(),
        }
    }
}

/// Engine settings loaded from YAML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct EngineConfig {
    /// Value for `LC_ALL` and `LANG` in every child process
    #[validate(length(min = 1))]
    pub locale: String,

    /// Total checkout attempts, including the first
    #[validate(range(min = 1, max = 4))]
    pub max_attempts: u32,

    /// Appended to `.<target name>` to form the staging directory
    #[validate(length(min = 1))]
    pub staging_suffix: String,

    pub tools: ToolsConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_string(),
            max_attempts: MAX_CHECKOUT_ATTEMPTS,
            staging_suffix: ".clone".to_string(),
            tools: ToolsConfig::default(),
        }
    }
}

/// Reads and validates [`EngineConfig`] files
#[derive(Debug, Default, Clone)]
pub struct ConfigStore;

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    /// Resolve the configuration for a run.
    ///
    /// An explicit path must exist. Without one, `scm-checkout.yaml` in
    /// `search_dir` is used when present, else the defaults.
    pub fn load(
        &self,
        explicit: Option<&Path>,
        search_dir: &Path,
    ) -> Result<EngineConfig, ConfigStoreError> {
        if let Some(path) = explicit {
            return self.read_config(path);
        }

        let candidate = search_dir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            return self.read_config(&candidate);
        }

        debug!("No configuration file found, using defaults");
        Ok(EngineConfig::default())
    }

    /// Read and validate a configuration file
    pub fn read_config<P: AsRef<Path>>(&self, config_path: P) -> Result<EngineConfig, ConfigStoreError> {
        let config_path = config_path.as_ref();

        if !config_path.exists() {
            return Err(ConfigStoreError::ConfigFileNotFound(
                config_path.display().to_string(),
            ));
        }

        let contents = fs::read_to_string(config_path)
            .map_err(|e| ConfigStoreError::ReadFailed(e.to_string()))?;

        let config: EngineConfig = serde_yaml::from_str(&contents)
            .map_err(|e| ConfigStoreError::YamlParsingFailed(e.to_string()))?;

        self.validate_config(&config)?;
        debug!("Loaded configuration from {}", config_path.display());

        Ok(config)
    }

    pub fn validate_config(&self, config: &EngineConfig) -> Result<(), ConfigStoreError> {
        config
            .validate()
            .map_err(|e| ConfigStoreError::ValidationFailed(format!("{:?}", e)))?;

        // The suffix becomes part of a single path component
        if config.staging_suffix.contains(['/', '\\']) {
            return Err(ConfigStoreError::ValidationFailed(
                "staging_suffix must not contain path separators".to_string(),
            ));
        }

        Ok(())
    }
}
