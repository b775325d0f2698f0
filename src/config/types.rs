//! Configuration types for the journal service.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from `service.yaml`.

use serde::Deserialize;
use std::path::PathBuf;

/// The default listen address.
pub const DEFAULT_BIND: &str = "0.0.0.0:8001";

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// The socket address to listen on.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

/// Where generated workbooks are written.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkspaceConfig {
    /// The directory that receives one sub-directory per request.
    pub output_dir: PathBuf,
}

/// The external legacy-workbook converter.
///
/// `args` may contain the placeholders `{input}` and `{output}`, replaced by
/// the paths of one conversion.
#[derive(Debug, Clone, Deserialize)]
pub struct ConverterConfig {
    /// The program to run.
    pub program: String,
    /// Its arguments.
    #[serde(default)]
    pub args: Vec<String>,
    /// Seconds before the program is killed; no limit when absent or zero.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// The complete service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Output location.
    pub workspace: WorkspaceConfig,
    /// Legacy conversion; `.xls` files cannot keep their content without it.
    #[serde(default)]
    pub converter: Option<ConverterConfig>,
}
