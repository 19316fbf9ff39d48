//! Thread-scoped automation resources
//!
//! One [`WorkerResources`] per worker thread, owning the strict nesting
//! engine → browser → context → page. Engine and browser are suite-scoped
//! for the thread; context and page are scenario-scoped and replaced per
//! scenario.
//!
//! The struct is handed down the call chain explicitly instead of living
//! in thread-local statics. It is also `!Send` (the handle traits carry no
//! `Send` bound), so a context created on one worker cannot be observed
//! from another: the isolation invariant holds at compile time.

use crate::engine::{
    note_runtime_bootstrap, AutomationEngine, BrowserHandle, BrowserKind, ContextHandle,
    EngineFactory, PageHandle,
};
use crate::error::ResourceError;
use std::path::Path;
use std::sync::Arc;
use std::thread::{self, ThreadId};

/// Version label used before a browser is initialized
pub const UNKNOWN_BROWSER: &str = "Unknown";

/// Per-worker automation resource set
pub struct WorkerResources {
    factory: Arc<dyn EngineFactory>,
    owner: ThreadId,
    headless: bool,
    engine: Option<Box<dyn AutomationEngine>>,
    browser: Option<Box<dyn BrowserHandle>>,
    kind: Option<BrowserKind>,
    context: Option<Box<dyn ContextHandle>>,
    page: Option<Box<dyn PageHandle>>,
}

impl WorkerResources {
    /// Create an empty resource set owned by the calling thread.
    #[must_use]
    pub fn new(factory: Arc<dyn EngineFactory>, headless: bool) -> Self {
        Self {
            factory,
            owner: thread::current().id(),
            headless,
            engine: None,
            browser: None,
            kind: None,
            context: None,
            page: None,
        }
    }

    /// Thread this resource set belongs to (diagnostics only; ownership is
    /// already enforced by the type system).
    #[inline]
    #[must_use]
    pub fn owner(&self) -> ThreadId {
        self.owner
    }

    /// Start the engine and launch a browser of the requested kind.
    ///
    /// Idempotent: once a kind is active on this worker the call is a
    /// no-op. A repeat call naming a *different* kind keeps the pinned
    /// browser and logs a warning, because the selection is immutable for
    /// the engine's lifetime. On launch failure everything created so far
    /// is torn back down, leaving no half-initialized state.
    ///
    /// # Errors
    /// [`ResourceError::UnsupportedBrowser`] for an unrecognized kind
    /// (checked before any resource is touched), or
    /// [`ResourceError::Engine`] when the engine or browser fails to start.
    pub fn init_engine_and_browser(&mut self, raw_kind: &str) -> Result<(), ResourceError> {
        let kind = BrowserKind::parse(raw_kind)?;

        if let Some(active) = self.kind {
            if active != kind {
                tracing::warn!(
                    %active,
                    requested = %kind,
                    "browser kind is pinned for this worker; keeping the active browser"
                );
            }
            return Ok(());
        }

        let mut engine = self.factory.create()?;
        note_runtime_bootstrap();
        match engine.launch(kind, self.headless) {
            Ok(browser) => {
                tracing::debug!(%kind, owner = ?self.owner, "browser ready");
                self.engine = Some(engine);
                self.browser = Some(browser);
                self.kind = Some(kind);
                Ok(())
            }
            Err(error) => {
                if let Err(shutdown_error) = engine.shutdown() {
                    tracing::warn!(%shutdown_error, "engine shutdown after failed launch");
                }
                Err(error.into())
            }
        }
    }

    /// Create a fresh isolated context (and its initial page) for the next
    /// scenario, optionally seeded with a session artifact so it starts
    /// authenticated. Any previous context is closed first.
    ///
    /// # Errors
    /// [`ResourceError::NotInitialized`] before
    /// [`init_engine_and_browser`](Self::init_engine_and_browser), or
    /// [`ResourceError::Engine`] when the engine fails.
    pub fn create_context(&mut self, storage_state: Option<&Path>) -> Result<(), ResourceError> {
        self.close_context();

        let browser = self
            .browser
            .as_mut()
            .ok_or(ResourceError::NotInitialized("browser"))?;
        let mut context = browser.new_context(storage_state)?;
        let page = match context.new_page() {
            Ok(page) => page,
            Err(error) => {
                if let Err(close_error) = context.close() {
                    tracing::warn!(%close_error, "context close after failed page creation");
                }
                return Err(error.into());
            }
        };

        self.context = Some(context);
        self.page = Some(page);
        Ok(())
    }

    /// Current scenario page.
    ///
    /// # Errors
    /// [`ResourceError::NotInitialized`] before
    /// [`create_context`](Self::create_context).
    pub fn page(&mut self) -> Result<&mut (dyn PageHandle + 'static), ResourceError> {
        self.page
            .as_deref_mut()
            .ok_or(ResourceError::NotInitialized("page"))
    }

    /// Current scenario context.
    ///
    /// # Errors
    /// [`ResourceError::NotInitialized`] before
    /// [`create_context`](Self::create_context).
    pub fn context(&mut self) -> Result<&mut (dyn ContextHandle + 'static), ResourceError> {
        self.context
            .as_deref_mut()
            .ok_or(ResourceError::NotInitialized("browsing context"))
    }

    /// Close and discard this worker's context and page. Safe to call when
    /// none exists. Close failures are logged, never propagated: teardown
    /// must not mask the scenario's real outcome.
    pub fn close_context(&mut self) {
        self.page = None;
        if let Some(mut context) = self.context.take() {
            if let Err(error) = context.close() {
                tracing::warn!(%error, "failed to close browsing context");
            }
        }
    }

    /// Suite/thread teardown: context, then browser, then engine, all
    /// best-effort with logged warnings.
    pub fn close_all(&mut self) {
        self.close_context();
        if let Some(mut browser) = self.browser.take() {
            if let Err(error) = browser.close() {
                tracing::warn!(%error, "failed to close browser");
            }
        }
        if let Some(mut engine) = self.engine.take() {
            if let Err(error) = engine.shutdown() {
                tracing::warn!(%error, "failed to shut down engine");
            }
        }
        self.kind = None;
    }

    /// Human-readable `"<kind> <version>"` label for reporting, or
    /// [`UNKNOWN_BROWSER`] when no browser is initialized.
    #[must_use]
    pub fn browser_version_label(&self) -> String {
        match (self.kind, &self.browser) {
            (Some(kind), Some(browser)) => format!("{kind} {}", browser.version()),
            _ => UNKNOWN_BROWSER.to_string(),
        }
    }
}

impl Drop for WorkerResources {
    fn drop(&mut self) {
        self.close_all();
    }
}

impl std::fmt::Debug for WorkerResources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerResources")
            .field("owner", &self.owner)
            .field("kind", &self.kind)
            .field("has_context", &self.context.is_some())
            .finish_non_exhaustive()
    }
}
