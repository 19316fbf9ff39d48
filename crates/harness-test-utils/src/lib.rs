//! Testing utilities for the harness workspace
//!
//! Recording fakes over the engine and identity seams, shared by unit and
//! integration tests.

#![allow(missing_docs)]

use harness_core::engine::{
    AutomationEngine, BrowserHandle, BrowserKind, ContextHandle, EngineError, EngineFactory,
    PageHandle,
};
use harness_core::error::IdentityError;
use harness_core::identity::{CredentialProvider, Credentials, Identity};
use harness_core::orchestrator::{LoginFlow, Scenario};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Browser version every fake browser reports.
pub const FAKE_BROWSER_VERSION: &str = "117.0.fake";

/// Shared recording of everything the fake engine stack was asked to do.
#[derive(Debug, Default)]
pub struct EngineLog {
    launches: AtomicUsize,
    contexts_created: AtomicUsize,
    contexts_closed: AtomicUsize,
    seeds: Mutex<Vec<Option<PathBuf>>>,
    navigations: Mutex<Vec<String>>,
}

impl EngineLog {
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn contexts_created(&self) -> usize {
        self.contexts_created.load(Ordering::SeqCst)
    }

    pub fn contexts_closed(&self) -> usize {
        self.contexts_closed.load(Ordering::SeqCst)
    }

    /// Storage-state seed passed to each created context, in order.
    pub fn seeds(&self) -> Vec<Option<PathBuf>> {
        self.seeds.lock().clone()
    }

    /// URLs navigated to, across all pages, in order.
    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().clone()
    }

    pub fn version(&self) -> &'static str {
        FAKE_BROWSER_VERSION
    }
}

/// Factory producing recording fake engines. Clones share one [`EngineLog`].
#[derive(Debug, Clone, Default)]
pub struct FakeEngineFactory {
    log: Arc<EngineLog>,
    fail_launch: bool,
}

impl FakeEngineFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A factory whose engines refuse to launch browsers.
    #[must_use]
    pub fn failing_launch() -> Self {
        Self {
            log: Arc::default(),
            fail_launch: true,
        }
    }

    #[must_use]
    pub fn log(&self) -> Arc<EngineLog> {
        Arc::clone(&self.log)
    }
}

impl EngineFactory for FakeEngineFactory {
    fn create(&self) -> Result<Box<dyn AutomationEngine>, EngineError> {
        Ok(Box::new(FakeEngine {
            log: Arc::clone(&self.log),
            fail_launch: self.fail_launch,
        }))
    }
}

struct FakeEngine {
    log: Arc<EngineLog>,
    fail_launch: bool,
}

impl AutomationEngine for FakeEngine {
    fn launch(
        &mut self,
        kind: BrowserKind,
        _headless: bool,
    ) -> Result<Box<dyn BrowserHandle>, EngineError> {
        if self.fail_launch {
            return Err(EngineError::Launch(format!("forced launch failure for {kind}")));
        }
        self.log.launches.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeBrowser {
            log: Arc::clone(&self.log),
        }))
    }

    fn shutdown(&mut self) -> Result<(), EngineError> {
        Ok(())
    }
}

struct FakeBrowser {
    log: Arc<EngineLog>,
}

impl BrowserHandle for FakeBrowser {
    fn version(&self) -> String {
        FAKE_BROWSER_VERSION.to_string()
    }

    fn new_context(
        &mut self,
        storage_state: Option<&Path>,
    ) -> Result<Box<dyn ContextHandle>, EngineError> {
        self.log.contexts_created.fetch_add(1, Ordering::SeqCst);
        self.log.seeds.lock().push(storage_state.map(Path::to_path_buf));
        Ok(Box::new(FakeContext {
            log: Arc::clone(&self.log),
        }))
    }

    fn close(&mut self) -> Result<(), EngineError> {
        Ok(())
    }
}

struct FakeContext {
    log: Arc<EngineLog>,
}

impl ContextHandle for FakeContext {
    fn new_page(&mut self) -> Result<Box<dyn PageHandle>, EngineError> {
        Ok(Box::new(FakePage {
            log: Arc::clone(&self.log),
            url: String::new(),
        }))
    }

    fn save_storage_state(&self, path: &Path) -> Result<(), EngineError> {
        let blob = serde_json::json!({
            "cookies": [],
            "origins": [{ "origin": "https://app.example.test" }],
        });
        std::fs::write(path, blob.to_string())?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), EngineError> {
        self.log.contexts_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FakePage {
    log: Arc<EngineLog>,
    url: String,
}

impl PageHandle for FakePage {
    fn navigate(&mut self, url: &str) -> Result<(), EngineError> {
        self.log.navigations.lock().push(url.to_string());
        self.url = url.to_string();
        Ok(())
    }

    fn current_url(&self) -> String {
        self.url.clone()
    }
}

/// In-memory credential provider keyed by role.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    by_role: HashMap<String, Credentials>,
}

impl StaticCredentials {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(
        mut self,
        role: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.by_role.insert(
            role.into(),
            Credentials {
                username: username.into(),
                password: password.into(),
            },
        );
        self
    }
}

impl CredentialProvider for StaticCredentials {
    fn credentials(&self, role: &str) -> Result<Credentials, IdentityError> {
        self.by_role
            .get(role)
            .cloned()
            .ok_or_else(|| IdentityError::UnknownRole(role.to_string()))
    }
}

/// Login flow that records invocations instead of driving a UI.
#[derive(Debug, Clone, Default)]
pub struct RecordingLoginFlow {
    invocations: Arc<AtomicUsize>,
    fail: bool,
}

impl RecordingLoginFlow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A flow that always fails, for exercising setup-failure paths.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            invocations: Arc::default(),
            fail: true,
        }
    }

    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

impl LoginFlow for RecordingLoginFlow {
    fn perform(
        &self,
        _page: &mut dyn PageHandle,
        identity: &Identity,
        _credentials: &Credentials,
    ) -> anyhow::Result<()> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("forced login failure for {identity}");
        }
        Ok(())
    }
}

/// Scenario fixture with tags in declaration order.
#[must_use]
pub fn tagged_scenario(name: &str, tags: &[&str]) -> Scenario {
    Scenario::new(name).with_tags(tags.iter().copied())
}
