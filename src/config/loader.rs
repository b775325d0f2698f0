//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the service
//! configuration from a YAML file.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{ConverterConfig, ServiceConfig};

/// The configuration file read from the configuration directory.
pub const CONFIG_FILE: &str = "service.yaml";

/// Loads and provides access to the service configuration.
///
/// # Directory Structure
///
/// ```text
/// config/
/// └── service.yaml   # Server, workspace and converter settings
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_jv::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config")?;
/// println!("Listening on {}", loader.config().server.bind);
/// # Ok::<(), payroll_jv::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: ServiceConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns [`EngineError::ConfigNotFound`] when `service.yaml` is missing
    /// and [`EngineError::ConfigParseError`] when it is not valid.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let config = Self::load_yaml::<ServiceConfig>(&path.as_ref().join(CONFIG_FILE))?;
        Ok(Self { config })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: ServiceConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Returns the converter settings, if a converter is configured.
    pub fn converter(&self) -> Option<&ConverterConfig> {
        self.config.converter.as_ref()
    }
}
