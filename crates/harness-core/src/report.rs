//! Run-report metadata
//!
//! Suite-level facts published once per process for reporting: the
//! environment snapshot logged at suite start, and the browser version
//! captured by whichever scenario initializes a browser first. Parallel
//! scenarios race for the slot; exactly one wins and the rest skip, so the
//! report never carries duplicate or conflicting entries.

use harness_config::{OutputPaths, Settings};
use once_cell::sync::OnceCell;
use std::path::PathBuf;

static BROWSER_VERSION: OnceCell<String> = OnceCell::new();

/// Record the browser version label for the run report. Returns `true`
/// for the single caller that actually published it.
pub fn capture_browser_version(label: impl Into<String>) -> bool {
    let label = label.into();
    let published = BROWSER_VERSION.set(label.clone()).is_ok();
    if published {
        tracing::info!(browser = %label, "browser version recorded for run report");
    }
    published
}

/// Browser version captured for this run, if any scenario has initialized
/// a browser yet.
#[must_use]
pub fn browser_version() -> Option<&'static str> {
    BROWSER_VERSION.get().map(String::as_str)
}

/// Suite-start snapshot for the run report
#[derive(Debug, Clone)]
pub struct RunInfo {
    /// Environment name the suite runs against
    pub environment: String,
    /// Configured browser kind
    pub browser: String,
    /// Application under test
    pub base_url: String,
    /// Where session artifacts are stored
    pub session_dir: PathBuf,
    /// Where reports are written
    pub report_dir: PathBuf,
}

impl RunInfo {
    /// Build the snapshot from resolved settings and paths.
    #[must_use]
    pub fn from_settings(environment: impl Into<String>, settings: &Settings, paths: &OutputPaths) -> Self {
        Self {
            environment: environment.into(),
            browser: harness_config::effective_browser(settings),
            base_url: settings.base_url.clone(),
            session_dir: paths.sessions.clone(),
            report_dir: paths.reports.clone(),
        }
    }

    /// Log the snapshot at suite start.
    pub fn log(&self) {
        tracing::info!(
            environment = %self.environment,
            browser = %self.browser,
            base_url = %self.base_url,
            session_dir = %self.session_dir.display(),
            report_dir = %self.report_dir.display(),
            "suite starting"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test owns the process-global slot: the first capture publishes,
    // every later capture is skipped.
    #[test]
    fn capture_publishes_exactly_once() {
        let first = capture_browser_version("chrome 117.0");
        let second = capture_browser_version("firefox 118.0");

        assert!(first);
        assert!(!second);
        assert_eq!(browser_version(), Some("chrome 117.0"));
    }
}
