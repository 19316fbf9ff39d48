//! Error types for settings loading and path provisioning

use std::path::PathBuf;

/// Errors raised while loading settings or provisioning output directories
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No settings file found for the requested environment
    #[error("no settings found for env `{env}`: tried {tried:?}")]
    NotFound {
        /// Environment name that was being resolved
        env: String,
        /// Path that was probed
        tried: PathBuf,
    },

    /// Settings file could not be read
    #[error("failed to read settings file {path:?}")]
    Io {
        /// Offending path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Settings file is not valid TOML for the expected schema
    #[error("failed to parse settings file {path:?}")]
    Parse {
        /// Offending path
        path: PathBuf,
        /// Underlying TOML error
        #[source]
        source: toml::de::Error,
    },

    /// A required key is missing or blank
    #[error("missing required setting `{key}` in {origin}")]
    MissingKey {
        /// Key name
        key: &'static str,
        /// Where the settings came from (file path or env label)
        origin: String,
    },

    /// An output directory could not be created
    #[error("failed to create directory {path:?}")]
    CreateDir {
        /// Offending path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
