//! Application state for the journal API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::path::Path;
use std::sync::Arc;

use crate::config::ConfigLoader;
use crate::workbook::{ExternalConverter, FormatConverter};

/// Shared application state.
///
/// Contains resources that are shared across all request handlers: the
/// loaded configuration and the legacy-workbook converter, if any.
#[derive(Clone)]
pub struct AppState {
    /// The loaded service configuration.
    config: Arc<ConfigLoader>,
    /// The converter used for `.xls` workbooks in preserve mode.
    converter: Option<Arc<dyn FormatConverter>>,
}

impl AppState {
    /// Creates a new application state, building the external converter
    /// when one is configured.
    pub fn new(config: ConfigLoader) -> Self {
        let converter = config
            .converter()
            .map(|c| Arc::new(ExternalConverter::new(c)) as Arc<dyn FormatConverter>);
        Self {
            config: Arc::new(config),
            converter,
        }
    }

    /// Replaces the converter.
    pub fn with_converter(mut self, converter: Arc<dyn FormatConverter>) -> Self {
        self.converter = Some(converter);
        self
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns the converter, if any.
    pub fn converter(&self) -> Option<Arc<dyn FormatConverter>> {
        self.converter.clone()
    }

    /// The directory that receives per-request output directories.
    pub fn output_dir(&self) -> &Path {
        &self.config.config().workspace.output_dir
    }
}
