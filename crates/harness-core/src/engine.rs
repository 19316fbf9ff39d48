//! Automation engine seam
//!
//! The harness never drives a browser directly; it talks to an engine
//! through the object-safe traits below and owns only lifecycle and
//! coordination. Real engines (a Playwright-style driver, a WebDriver
//! client) and the test fakes both live behind this boundary.
//!
//! None of the handle traits carry a `Send` bound: a handle created on a
//! worker thread cannot leave it, which turns the thread-isolation
//! invariant into a compile-time property.

use crate::error::ResourceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Once;

/// Supported browser kinds. Selection is immutable for the lifetime of a
/// worker's engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    /// Chromium with the Chrome channel
    Chrome,
    /// Chromium with the Edge channel
    Edge,
    /// Firefox
    Firefox,
}

impl BrowserKind {
    /// Parse a configured browser name, case-insensitively.
    ///
    /// # Errors
    /// [`ResourceError::UnsupportedBrowser`] for anything but the three
    /// supported kinds (`safari` included).
    pub fn parse(raw: &str) -> Result<Self, ResourceError> {
        match raw.trim().to_lowercase().as_str() {
            "chrome" => Ok(Self::Chrome),
            "edge" => Ok(Self::Edge),
            "firefox" => Ok(Self::Firefox),
            _ => Err(ResourceError::UnsupportedBrowser(raw.trim().to_string())),
        }
    }

    /// Canonical lowercase name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::Edge => "edge",
            Self::Firefox => "firefox",
        }
    }
}

impl FromStr for BrowserKind {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures reported by the underlying automation engine
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The engine process/runtime could not start
    #[error("failed to start automation engine: {0}")]
    Startup(String),

    /// A browser could not be launched
    #[error("failed to launch browser: {0}")]
    Launch(String),

    /// A browsing-context operation failed
    #[error("browser context operation failed: {0}")]
    Context(String),

    /// A page operation failed
    #[error("page operation failed: {0}")]
    Page(String),

    /// The storage-state blob could not be written or read
    #[error("storage state I/O failed")]
    StorageState(#[from] std::io::Error),
}

/// A single page within a browsing context
pub trait PageHandle {
    /// Navigate the page to `url`.
    ///
    /// # Errors
    /// [`EngineError::Page`] when navigation fails.
    fn navigate(&mut self, url: &str) -> Result<(), EngineError>;

    /// Current page URL (empty before the first navigation)
    fn current_url(&self) -> String;
}

/// An isolated browsing context
pub trait ContextHandle {
    /// Open a new page in this context.
    ///
    /// # Errors
    /// [`EngineError::Context`] when the page cannot be created.
    fn new_page(&mut self) -> Result<Box<dyn PageHandle>, EngineError>;

    /// Serialize this context's authentication/storage state to `path`.
    ///
    /// # Errors
    /// [`EngineError::StorageState`] on I/O failure.
    fn save_storage_state(&self, path: &Path) -> Result<(), EngineError>;

    /// Close the context and everything in it.
    ///
    /// # Errors
    /// [`EngineError::Context`] when the engine reports a close failure.
    fn close(&mut self) -> Result<(), EngineError>;
}

/// A launched browser
pub trait BrowserHandle {
    /// Engine-reported browser version, e.g. `"117.0.5938.62"`
    fn version(&self) -> String;

    /// Create a fresh isolated context, optionally pre-seeded with a
    /// previously saved storage-state artifact so it starts authenticated.
    ///
    /// # Errors
    /// [`EngineError::Context`] when the context cannot be created.
    fn new_context(&mut self, storage_state: Option<&Path>)
        -> Result<Box<dyn ContextHandle>, EngineError>;

    /// Close the browser.
    ///
    /// # Errors
    /// [`EngineError::Launch`] when the engine reports a close failure.
    fn close(&mut self) -> Result<(), EngineError>;
}

/// A per-worker automation engine instance
pub trait AutomationEngine {
    /// Launch a browser of the requested kind.
    ///
    /// # Errors
    /// [`EngineError::Launch`] when the browser cannot start.
    fn launch(&mut self, kind: BrowserKind, headless: bool)
        -> Result<Box<dyn BrowserHandle>, EngineError>;

    /// Shut the engine down.
    ///
    /// # Errors
    /// [`EngineError::Startup`] when shutdown fails.
    fn shutdown(&mut self) -> Result<(), EngineError>;
}

/// Creates per-worker engines. The factory is the only engine-side type
/// shared across threads, so it must be `Send + Sync`; the engines it
/// produces are thread-owned.
pub trait EngineFactory: Send + Sync {
    /// Create a new engine for the calling worker thread.
    ///
    /// # Errors
    /// [`EngineError::Startup`] when the runtime cannot be created.
    fn create(&self) -> Result<Box<dyn AutomationEngine>, EngineError>;
}

/// Record (once per process) that the automation runtime has been
/// bootstrapped. Only the first worker logs; later calls are no-ops.
pub(crate) fn note_runtime_bootstrap() {
    static BOOTSTRAP: Once = Once::new();
    BOOTSTRAP.call_once(|| {
        tracing::info!("automation runtime bootstrapped");
    });
}
