// -- imports
use serde::Deserialize;
use std::path::Path;

use crate::error::{AppError, Result};
use crate::observe::ObserveConfig;

// -- config

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct TomlConfig {
    observe: ObserveConfig,
}

impl TomlConfig {
    /// Parse TOML config file with explicit project root for path resolution.
    ///
    /// # Arguments
    ///
    /// * `toml_path` - Path to the TOML config file
    /// * `project_root` - Base directory for resolving relative paths
    ///
    /// # Errors
    ///
    /// Returns `AppError` if:
    /// - The path is not a valid toml file
    /// - File read fails
    /// - TOML parsing fails
    pub fn from_toml(toml_path: &Path, project_root: &Path) -> Result<Self> {
        if !toml_path.is_file() || toml_path.extension().is_none_or(|ext| ext != "toml") {
            return Err(AppError::Config(format!(
                "TOML config path is not a valid .toml file: {:?}",
                toml_path
            )));
        }

        let content = std::fs::read_to_string(toml_path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.resolve_paths(project_root);

        if config.observe.comparison_name.contains(['/', '\\']) {
            return Err(AppError::Config(format!(
                "comparison_name must not contain path separators: {:?}",
                config.observe.comparison_name
            )));
        }

        Ok(config)
    }

    /// Resolve relative paths against project root
    fn resolve_paths(&mut self, project_root: &Path) {
        if !self.observe.output_folder.is_absolute() {
            self.observe.output_folder = project_root.join(&self.observe.output_folder);
        }
    }
}

impl From<TomlConfig> for ObserveConfig {
    fn from(config: TomlConfig) -> Self {
        config.observe
    }
}

// -- public API

/// Parse TOML config file and return the observation settings.
///
/// # Arguments
///
/// * `toml_path` - Path to the TOML config file
/// * `project_root` - Base directory for resolving relative paths
///
/// # Errors
///
/// Returns `AppError` if TOML parsing or validation fails.
pub fn parse_toml(toml_path: &Path, project_root: &Path) -> Result<ObserveConfig> {
    TomlConfig::from_toml(toml_path, project_root).map(Into::into)
}

// -- tests
