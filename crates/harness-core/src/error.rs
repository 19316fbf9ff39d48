//! Error types for the harness core
//!
//! Per-concern enums plus the [`HarnessError`] umbrella:
//! - Identity resolution failures (fatal configuration errors)
//! - Worker resource lifecycle violations
//! - Session cache failures
//!
//! Teardown failures are deliberately absent: context/browser/engine close
//! problems are downgraded to logged warnings so cleanup never masks the
//! scenario's real outcome.

use crate::engine::EngineError;
use std::path::PathBuf;
use std::time::Duration;

/// Identity/role resolution errors. Fatal for the scenario, never retried.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// Neither the role override nor a scenario tag yields a role
    #[error("no role found: pass a role override or tag the scenario with `role_<name>`")]
    RoleUnresolved,

    /// The resolved role has no configured credentials
    #[error("no credentials configured for role `{0}`")]
    UnknownRole(String),
}

/// Worker resource lifecycle errors
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// Requested browser kind is not recognized. Fatal at thread-init time.
    #[error("unsupported browser: `{0}` (expected chrome, edge or firefox)")]
    UnsupportedBrowser(String),

    /// A resource accessor was called out of state-machine order
    #[error("{0} requested before it was initialized on this worker")]
    NotInitialized(&'static str),

    /// The underlying automation engine failed
    #[error("automation engine failure")]
    Engine(#[from] EngineError),
}

/// Session cache failures. The per-key lock is released on every one of
/// these, so a later scenario for the same identity may attempt setup again.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The session-creation attempt exceeded the configured timeout
    #[error("session creation for `{key}` exceeded {waited:?}")]
    Timeout {
        /// Identity cache key
        key: String,
        /// How long the caller waited
        waited: Duration,
    },

    /// The setup procedure returned without producing the artifact.
    /// A contract violation by the procedure, not a timing problem.
    #[error("session setup for `{key}` completed without producing {path:?}")]
    ArtifactMissing {
        /// Identity cache key
        key: String,
        /// Conventional artifact location that stayed absent
        path: PathBuf,
    },

    /// The setup procedure itself failed
    #[error("session setup failed for `{key}`: {source}")]
    SetupFailed {
        /// Identity cache key
        key: String,
        /// Collaborator error
        #[source]
        source: anyhow::Error,
    },
}

impl SessionError {
    /// Identity cache key this failure belongs to.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Timeout { key, .. }
            | Self::ArtifactMissing { key, .. }
            | Self::SetupFailed { key, .. } => key,
        }
    }
}

/// Umbrella error for scenario orchestration
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// Identity resolution failed
    #[error("identity resolution failed: {0}")]
    Identity(#[from] IdentityError),

    /// Worker resource lifecycle violation
    #[error("worker resource failure: {0}")]
    Resource(#[from] ResourceError),

    /// Session cache failure
    #[error("session failure: {0}")]
    Session(#[from] SessionError),

    /// Settings could not be loaded
    #[error("configuration failure: {0}")]
    Config(#[from] harness_config::ConfigError),
}

impl HarnessError {
    /// Whether a later scenario for the same identity is allowed to retry
    /// the failed work. True only for session failures, whose lock is
    /// released on the way out; everything else is a configuration or
    /// contract problem that repeats identically.
    #[must_use]
    pub fn later_scenario_may_retry(&self) -> bool {
        matches!(self, Self::Session(_))
    }
}
