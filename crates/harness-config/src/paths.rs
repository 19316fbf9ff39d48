//! Output path resolution and provisioning
//!
//! Resolves the real filesystem outputs of a run (reports, logs,
//! screenshots, videos, downloads, session artifacts) from a base
//! directory plus optional per-directory overrides. Relative overrides are
//! resolved under the base directory; absolute overrides are kept as-is.

use crate::error::ConfigError;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable overriding the base output directory.
pub const BASE_DIR_VAR: &str = "HARNESS_BASE_DIR";

/// Optional per-directory overrides, as they appear under `[paths]` in a
/// settings file. Any omitted entry falls back to its default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PathOverrides {
    /// Report output directory
    pub report_dir: Option<String>,
    /// Log output directory
    pub log_dir: Option<String>,
    /// Screenshot output directory
    pub screenshot_dir: Option<String>,
    /// Video output directory
    pub video_dir: Option<String>,
    /// Download directory handed to the browser
    pub download_dir: Option<String>,
    /// Session artifact directory
    pub session_dir: Option<String>,
}

/// Resolved, absolute output directories for a run
#[derive(Debug, Clone)]
pub struct OutputPaths {
    /// Base directory everything else resolves under
    pub base: PathBuf,
    /// Report output directory
    pub reports: PathBuf,
    /// Log output directory
    pub logs: PathBuf,
    /// Screenshot output directory
    pub screenshots: PathBuf,
    /// Video output directory
    pub videos: PathBuf,
    /// Download directory
    pub downloads: PathBuf,
    /// Session artifact directory
    pub sessions: PathBuf,
}

impl OutputPaths {
    /// Resolve all output directories under `base`, honoring overrides.
    #[must_use]
    pub fn resolve(base: impl Into<PathBuf>, overrides: &PathOverrides) -> Self {
        let base = base.into();
        let dir = |spec: &Option<String>, default: &str| {
            resolve_under(&base, spec.as_deref().unwrap_or(default))
        };
        Self {
            reports: dir(&overrides.report_dir, "reports"),
            logs: dir(&overrides.log_dir, "logs"),
            screenshots: dir(&overrides.screenshot_dir, "reports/screenshots"),
            videos: dir(&overrides.video_dir, "reports/videos"),
            downloads: dir(&overrides.download_dir, "downloads"),
            sessions: dir(&overrides.session_dir, "sessions"),
            base,
        }
    }

    /// Create every output directory. Safe to call repeatedly and from
    /// multiple threads; `create_dir_all` is idempotent.
    ///
    /// # Errors
    /// Returns [`ConfigError::CreateDir`] on the first directory that
    /// cannot be created.
    pub fn ensure(&self) -> Result<(), ConfigError> {
        for path in [
            &self.reports,
            &self.logs,
            &self.screenshots,
            &self.videos,
            &self.downloads,
            &self.sessions,
        ] {
            std::fs::create_dir_all(path).map_err(|source| ConfigError::CreateDir {
                path: path.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

/// Base output directory: `HARNESS_BASE_DIR` if set and non-blank,
/// otherwise the current working directory.
#[must_use]
pub fn default_base_dir() -> PathBuf {
    match env::var(BASE_DIR_VAR) {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

fn resolve_under(base: &Path, spec: &str) -> PathBuf {
    let p = Path::new(spec);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_resolve_under_base() {
        let paths = OutputPaths::resolve("/tmp/run", &PathOverrides::default());
        assert_eq!(paths.reports, PathBuf::from("/tmp/run/reports"));
        assert_eq!(paths.sessions, PathBuf::from("/tmp/run/sessions"));
        assert_eq!(paths.screenshots, PathBuf::from("/tmp/run/reports/screenshots"));
    }

    #[test]
    fn absolute_override_is_kept() {
        let overrides = PathOverrides {
            session_dir: Some("/var/sessions".to_string()),
            report_dir: Some("out/reports".to_string()),
            ..PathOverrides::default()
        };
        let paths = OutputPaths::resolve("/tmp/run", &overrides);
        assert_eq!(paths.sessions, PathBuf::from("/var/sessions"));
        assert_eq!(paths.reports, PathBuf::from("/tmp/run/out/reports"));
    }

    #[test]
    fn ensure_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = OutputPaths::resolve(tmp.path(), &PathOverrides::default());
        paths.ensure().unwrap();
        paths.ensure().unwrap();
        assert!(paths.sessions.is_dir());
        assert!(paths.logs.is_dir());
    }
}
