//! Configuration system for Folio.
//!
//! Provides TOML-based configuration with:
//! - Storage locations for permanent content, temporary uploads and libraries
//! - Temporary file lifetime and filename limits
//! - Reconciliation settings (hosted video mime types)
//! - Config file layering (user config + project-local overrides)

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    ConfigSource, LoadedConfig, config_path_in, load_config, load_config_file,
    load_config_with_options, project_config_path, save_config, user_config_dir,
    user_config_path,
};
pub use error::{ConfigError, Result};
pub use types::*;
