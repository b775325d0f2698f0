//! Configuration loading for the journal service.
//!
//! # Example
//!
//! ```no_run
//! use payroll_jv::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config").unwrap();
//! println!("Output directory: {}", config.config().workspace.output_dir.display());
//! ```

mod loader;
mod types;

pub use loader::{CONFIG_FILE, ConfigLoader};
pub use types::{
    ConverterConfig, DEFAULT_BIND, ServerConfig, ServiceConfig, WorkspaceConfig,
};
