//! Environment-keyed settings loader
//!
//! Settings live in TOML files named `config-<env>.toml` under a config
//! directory. Precedence:
//! 1. An explicit file named by `HARNESS_CONFIG` wins outright.
//! 2. Otherwise `config-<env>.toml`, where the environment comes from the
//!    caller, then `HARNESS_ENV`, then the `local` default.
//!
//! Cached variants are provided for parallel runs: every worker thread may
//! call [`load_cached`] and only the first call per source touches disk.

use crate::error::ConfigError;
use crate::paths::PathOverrides;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Environment variable selecting the environment name.
pub const ENV_VAR: &str = "HARNESS_ENV";
/// Environment variable naming an explicit settings file.
pub const CONFIG_FILE_VAR: &str = "HARNESS_CONFIG";
/// Environment variable overriding the configured browser.
pub const BROWSER_VAR: &str = "HARNESS_BROWSER";
/// Environment used when nothing else selects one.
pub const DEFAULT_ENV: &str = "local";

/// Suite settings for one environment
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    /// Application under test. Required and must be non-blank.
    pub base_url: String,
    /// Browser kind to launch (`chrome` | `edge` | `firefox`)
    #[serde(default = "default_browser")]
    pub browser: String,
    /// Whether browsers run headless
    #[serde(default)]
    pub headless: bool,
    /// How long a waiting caller tolerates a session-creation attempt
    #[serde(default = "default_session_timeout_secs")]
    pub session_timeout_secs: u64,
    /// Output directory overrides
    #[serde(default)]
    pub paths: PathOverrides,
}

fn default_browser() -> String {
    "chrome".to_string()
}

fn default_session_timeout_secs() -> u64 {
    60
}

impl Settings {
    /// Session-creation timeout as a [`Duration`].
    #[inline]
    #[must_use]
    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.session_timeout_secs)
    }

    fn validate(self, origin: &str) -> Result<Self, ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::MissingKey {
                key: "base-url",
                origin: origin.to_string(),
            });
        }
        Ok(self)
    }
}

/// Resolve the effective environment name: caller-supplied value first,
/// then `HARNESS_ENV`, then [`DEFAULT_ENV`]. The result is trimmed and
/// lowercased.
#[must_use]
pub fn effective_env(cli: Option<&str>) -> String {
    let raw = cli
        .map(str::to_string)
        .or_else(|| env::var(ENV_VAR).ok())
        .unwrap_or_else(|| DEFAULT_ENV.to_string());
    let trimmed = raw.trim().to_lowercase();
    if trimmed.is_empty() {
        DEFAULT_ENV.to_string()
    } else {
        trimmed
    }
}

/// Effective browser selection: `HARNESS_BROWSER` beats the settings file.
#[must_use]
pub fn effective_browser(settings: &Settings) -> String {
    match env::var(BROWSER_VAR) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_lowercase(),
        _ => settings.browser.trim().to_lowercase(),
    }
}

/// Load settings for `env_name` from `config_dir`, honoring the
/// `HARNESS_CONFIG` explicit-file override.
///
/// # Errors
/// [`ConfigError::NotFound`] when no file exists for the environment,
/// [`ConfigError::Parse`] on malformed TOML, and
/// [`ConfigError::MissingKey`] when `base-url` is absent or blank.
pub fn load(env_name: &str, config_dir: &Path) -> Result<Settings, ConfigError> {
    let path = settings_file(env_name, config_dir);
    if !path.is_file() {
        return Err(ConfigError::NotFound {
            env: env_name.to_string(),
            tried: path,
        });
    }
    let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let settings: Settings = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;
    tracing::debug!(env = env_name, path = %path.display(), "loaded settings");
    settings.validate(&path.display().to_string())
}

/// Cached variant of [`load`]: one disk read per settings source per
/// process, safe under parallel scenario threads.
///
/// # Errors
/// Same as [`load`]. Failures are not cached, so a later call may succeed
/// once the file appears.
pub fn load_cached(env_name: &str, config_dir: &Path) -> Result<Arc<Settings>, ConfigError> {
    static CACHE: Lazy<DashMap<PathBuf, Arc<Settings>>> = Lazy::new(DashMap::new);

    let key = settings_file(env_name, config_dir);
    if let Some(hit) = CACHE.get(&key) {
        return Ok(Arc::clone(&hit));
    }
    let loaded = Arc::new(load(env_name, config_dir)?);
    let entry = CACHE.entry(key).or_insert_with(|| Arc::clone(&loaded));
    Ok(Arc::clone(&entry))
}

fn settings_file(env_name: &str, config_dir: &Path) -> PathBuf {
    match env::var(CONFIG_FILE_VAR) {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => config_dir.join(format!("config-{env_name}.toml")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn write_settings(dir: &Path, env_name: &str, body: &str) -> PathBuf {
        let path = dir.join(format!("config-{env_name}.toml"));
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn load_applies_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        write_settings(tmp.path(), "dev", "base-url = \"https://app.example.test\"\n");

        let settings = load("dev", tmp.path()).unwrap();
        assert_eq!(settings.base_url, "https://app.example.test");
        assert_eq!(settings.browser, "chrome");
        assert_eq!(settings.session_timeout_secs, 60);
        assert!(!settings.headless);
    }

    #[test]
    fn load_reads_overrides() {
        let tmp = tempfile::tempdir().unwrap();
        write_settings(
            tmp.path(),
            "uat",
            concat!(
                "base-url = \"https://uat.example.test\"\n",
                "browser = \"firefox\"\n",
                "headless = true\n",
                "session-timeout-secs = 15\n",
                "[paths]\n",
                "session-dir = \"state/sessions\"\n",
            ),
        );

        let settings = load("uat", tmp.path()).unwrap();
        assert_eq!(settings.browser, "firefox");
        assert!(settings.headless);
        assert_eq!(settings.session_timeout(), Duration::from_secs(15));
        assert_eq!(settings.paths.session_dir.as_deref(), Some("state/sessions"));
    }

    #[test]
    fn blank_base_url_fails_fast() {
        let tmp = tempfile::tempdir().unwrap();
        write_settings(tmp.path(), "dev", "base-url = \"  \"\n");

        let err = load("dev", tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey { key: "base-url", .. }));
    }

    #[test]
    fn missing_env_file_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let err = load("nope", tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn cached_load_returns_same_instance() {
        let tmp = tempfile::tempdir().unwrap();
        write_settings(tmp.path(), "dev", "base-url = \"https://app.example.test\"\n");

        let a = load_cached("dev", tmp.path()).unwrap();
        let b = load_cached("dev", tmp.path()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn effective_env_prefers_caller_value() {
        assert_eq!(effective_env(Some(" UAT ")), "uat");
        // Blank caller input falls through to the default chain.
        assert_eq!(effective_env(Some("   ")), DEFAULT_ENV);
    }
}
