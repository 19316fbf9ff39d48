//! Scenario orchestration
//!
//! Per-scenario control flow over the core pieces: resolve the identity,
//! make sure the worker's engine and browser are up, obtain the session
//! artifact through the single-flight cache (running the one-time login
//! flow when elected), then hand the scenario a fresh context pre-loaded
//! with that artifact.

use crate::engine::PageHandle;
use crate::error::HarnessError;
use crate::identity::{
    resolve_role, role_override_from_env, CredentialProvider, Credentials, Identity,
};
use crate::report;
use crate::resources::WorkerResources;
use crate::session::SessionCache;
use harness_config::{OutputPaths, Settings};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

/// A scenario about to execute: its name and declared tags.
#[derive(Debug, Clone)]
pub struct Scenario {
    name: String,
    tags: Vec<String>,
}

impl Scenario {
    /// Create a scenario with no tags.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
        }
    }

    /// Attach declared tags, keeping declaration order.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Scenario name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared tags in declaration order
    #[inline]
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// The business login flow. External collaborator: it drives the login
/// page through UI primitives this core does not know about.
pub trait LoginFlow: Send + Sync {
    /// Log `identity` in on `page` using `credentials`. Runs inside a
    /// throwaway context; the orchestrator persists the resulting storage
    /// state afterwards.
    ///
    /// # Errors
    /// Any collaborator failure; it aborts session establishment for the
    /// elected thread and surfaces as a session setup failure.
    fn perform(
        &self,
        page: &mut dyn PageHandle,
        identity: &Identity,
        credentials: &Credentials,
    ) -> anyhow::Result<()>;
}

/// Everything a scenario needs before its first step runs
#[derive(Debug, Clone)]
pub struct PreparedScenario {
    /// Identity the scenario authenticates as
    pub identity: Identity,
    /// Session artifact its context was seeded with
    pub artifact: PathBuf,
}

/// Per-scenario control flow. One instance per suite, shared by every
/// worker thread; all per-thread state stays in [`WorkerResources`].
pub struct ScenarioOrchestrator {
    sessions: Arc<SessionCache>,
    credentials: Arc<dyn CredentialProvider>,
    login: Arc<dyn LoginFlow>,
    browser: String,
    base_url: String,
    role_override: Option<String>,
}

impl ScenarioOrchestrator {
    /// Create an orchestrator from its parts.
    #[must_use]
    pub fn new(
        sessions: Arc<SessionCache>,
        credentials: Arc<dyn CredentialProvider>,
        login: Arc<dyn LoginFlow>,
        browser: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            sessions,
            credentials,
            login,
            browser: browser.into(),
            base_url: base_url.into(),
            role_override: role_override_from_env(),
        }
    }

    /// Wire an orchestrator from resolved settings and output paths.
    #[must_use]
    pub fn from_settings(
        settings: &Settings,
        paths: &OutputPaths,
        credentials: Arc<dyn CredentialProvider>,
        login: Arc<dyn LoginFlow>,
    ) -> Self {
        let sessions = Arc::new(SessionCache::new(
            paths.sessions.clone(),
            settings.session_timeout(),
        ));
        Self::new(
            sessions,
            credentials,
            login,
            harness_config::effective_browser(settings),
            settings.base_url.clone(),
        )
    }

    /// Force a role, overriding both the environment and scenario tags.
    #[must_use]
    pub fn with_role_override(mut self, role: impl Into<String>) -> Self {
        self.role_override = Some(role.into());
        self
    }

    /// Session cache backing this orchestrator
    #[inline]
    #[must_use]
    pub fn sessions(&self) -> &Arc<SessionCache> {
        &self.sessions
    }

    /// Prepare `scenario` on the calling worker: resolve identity, ensure
    /// engine/browser, obtain the session artifact (running the login flow
    /// when this thread is elected), and build the scenario's working
    /// context seeded with it. On success the worker's page is at the
    /// application base URL, already authenticated.
    ///
    /// # Errors
    /// [`HarnessError`] for identity, resource or session failures; the
    /// scenario fails independently, nothing here aborts the suite.
    pub fn prepare(
        &self,
        worker: &mut WorkerResources,
        scenario: &Scenario,
    ) -> Result<PreparedScenario, HarnessError> {
        let role = resolve_role(scenario.tags(), self.role_override.as_deref())?;
        let correlation = Uuid::new_v4();
        let span = tracing::info_span!(
            "scenario",
            name = %scenario.name(),
            %role,
            %correlation
        );
        let _entered = span.enter();

        let credentials = self.credentials.credentials(&role)?;
        let identity = Identity::new(role, credentials.username.clone());

        worker.init_engine_and_browser(&self.browser)?;
        report::capture_browser_version(worker.browser_version_label());

        let artifact = self.sessions.get_or_create(&identity, || {
            self.establish_session(&mut *worker, &identity, &credentials)
        })?;

        worker.create_context(Some(&artifact))?;
        worker
            .page()?
            .navigate(&self.base_url)
            .map_err(crate::error::ResourceError::from)?;

        tracing::info!(identity = %identity, "scenario context ready");
        Ok(PreparedScenario { identity, artifact })
    }

    /// Scenario teardown: log the outcome and discard the scenario's
    /// context. Best-effort; never fails.
    pub fn finish(&self, worker: &mut WorkerResources, scenario: &Scenario, passed: bool) {
        if passed {
            tracing::info!(name = %scenario.name(), "scenario passed");
        } else {
            tracing::error!(name = %scenario.name(), "scenario failed");
        }
        worker.close_context();
    }

    /// The one-time login flow run by the elected thread: a throwaway
    /// unseeded context, the collaborator's login steps, then the storage
    /// state persisted to the conventional artifact location.
    fn establish_session(
        &self,
        worker: &mut WorkerResources,
        identity: &Identity,
        credentials: &Credentials,
    ) -> anyhow::Result<()> {
        tracing::info!(
            identity = %identity,
            thread = ?std::thread::current().id(),
            "running login flow"
        );

        worker.create_context(None)?;
        {
            let page = worker.page()?;
            page.navigate(&self.base_url)?;
            self.login.perform(page, identity, credentials)?;
        }

        let artifact = self.sessions.artifact_path(identity);
        worker.context()?.save_storage_state(&artifact)?;
        worker.close_context();
        Ok(())
    }
}

impl std::fmt::Debug for ScenarioOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioOrchestrator")
            .field("browser", &self.browser)
            .field("base_url", &self.base_url)
            .field("role_override", &self.role_override)
            .field("session_dir", &self.sessions.session_dir())
            .finish_non_exhaustive()
    }
}
