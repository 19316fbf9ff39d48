//! Harness core - concurrent session cache and thread-scoped browser lifecycle
//!
//! The coordination layer of a parallel UI test suite:
//! - Resolves which identity each scenario authenticates as
//! - Runs the expensive login flow at most once per identity process-wide
//!   and persists the result as a reusable session artifact
//! - Owns a strict per-worker lifecycle of engine → browser → context → page
//! - Glues the above together per scenario
//!
//! UI interaction itself (click/fill/navigate) stays behind the engine and
//! login-flow traits; this crate only coordinates.
//!
//! # Example
//!
//! ```rust,ignore
//! use harness_core::prelude::*;
//! use std::sync::Arc;
//!
//! let settings = harness_config::load_cached(&harness_config::effective_env(None),
//!     std::path::Path::new("config"))?;
//! let paths = harness_config::OutputPaths::resolve(
//!     harness_config::default_base_dir(), &settings.paths);
//! paths.ensure()?;
//!
//! let orchestrator = ScenarioOrchestrator::from_settings(
//!     &settings, &paths, credential_provider, login_flow);
//!
//! // On each worker thread:
//! let mut worker = WorkerResources::new(engine_factory, settings.headless);
//! let scenario = Scenario::new("checkout").with_tags(["role_admin"]);
//! let prepared = orchestrator.prepare(&mut worker, &scenario)?;
//! // ... run the scenario against worker.page() ...
//! orchestrator.finish(&mut worker, &scenario, true);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod engine;
pub mod error;
pub mod identity;
pub mod logging;
pub mod orchestrator;
pub mod report;
pub mod resources;
pub mod session;

// Re-exports for convenience
pub use engine::{
    AutomationEngine, BrowserHandle, BrowserKind, ContextHandle, EngineError, EngineFactory,
    PageHandle,
};
pub use error::{HarnessError, IdentityError, ResourceError, SessionError};
pub use identity::{
    resolve_role, role_override_from_env, CredentialProvider, Credentials, Identity,
    ROLE_TAG_PREFIX, ROLE_VAR,
};
pub use logging::init_logging;
pub use orchestrator::{LoginFlow, PreparedScenario, Scenario, ScenarioOrchestrator};
pub use report::{browser_version, capture_browser_version, RunInfo};
pub use resources::{WorkerResources, UNKNOWN_BROWSER};
pub use session::{SessionCache, DEFAULT_SESSION_TIMEOUT};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for wiring a suite
    pub use crate::{
        BrowserKind, CredentialProvider, Credentials, EngineFactory, HarnessError, Identity,
        LoginFlow, PreparedScenario, Scenario, ScenarioOrchestrator, SessionCache,
        WorkerResources,
    };
}
