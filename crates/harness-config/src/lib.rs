//! Harness configuration
//!
//! Environment-keyed settings for the UI harness:
//! - [`settings`]: TOML settings files (`config-<env>.toml`) with an
//!   explicit-file override and cached variants for parallel runs
//! - [`paths`]: resolved output directories (reports, logs, screenshots,
//!   videos, downloads, session artifacts)
//!
//! # Example
//!
//! ```rust,ignore
//! use harness_config::{effective_env, load_cached, OutputPaths, default_base_dir};
//!
//! let env = effective_env(None);
//! let settings = load_cached(&env, std::path::Path::new("config"))?;
//! let paths = OutputPaths::resolve(default_base_dir(), &settings.paths);
//! paths.ensure()?;
//! ```

pub mod error;
pub mod paths;
pub mod settings;

pub use error::ConfigError;
pub use paths::{default_base_dir, OutputPaths, PathOverrides, BASE_DIR_VAR};
pub use settings::{
    effective_browser, effective_env, load, load_cached, Settings, BROWSER_VAR, CONFIG_FILE_VAR,
    DEFAULT_ENV, ENV_VAR,
};
