//! Single-flight session cache
//!
//! Guarantees that the expensive login flow runs at most once per identity
//! process-wide, no matter how many scenario threads request it
//! simultaneously. The persisted storage-state artifact is the single
//! source of truth for "session already established": its existence on
//! disk short-circuits everything, and in the steady state after the first
//! scenario per identity no locking happens at all.
//!
//! Lock entries are kept for the process lifetime. Removing them eagerly
//! opens a window where a releasing thread and a fresh `entry()` caller
//! hold two different locks for the same key; the bounded growth (one
//! entry per distinct identity per run) is the accepted cost.

use crate::error::SessionError;
use crate::identity::Identity;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default bound on a session-creation attempt
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(60);

/// Concurrent, filesystem-backed session cache keyed by identity
#[derive(Debug)]
pub struct SessionCache {
    session_dir: PathBuf,
    timeout: Duration,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl SessionCache {
    /// Create a cache storing artifacts under `session_dir`.
    #[must_use]
    pub fn new(session_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            session_dir: session_dir.into(),
            timeout,
            locks: DashMap::new(),
        }
    }

    /// Directory holding the session artifacts
    #[inline]
    #[must_use]
    pub fn session_dir(&self) -> &Path {
        &self.session_dir
    }

    /// Conventional artifact location for `identity`:
    /// `<session_dir>/<role>_<username>.json`. The setup procedure is
    /// expected to write exactly here; it is never handed the path.
    #[must_use]
    pub fn artifact_path(&self, identity: &Identity) -> PathBuf {
        self.session_dir
            .join(format!("{}.json", identity.cache_key()))
    }

    /// Return the session artifact for `identity`, running `setup` first if
    /// no artifact exists yet.
    ///
    /// Concurrent callers for the same identity serialize on a per-key
    /// lock and `setup` executes at most once; callers for different
    /// identities never block each other. The winning thread fully
    /// persists the artifact before any waiter observes success.
    ///
    /// `setup` runs synchronously on the calling thread and must produce
    /// the artifact file at the conventional location as an externally
    /// observable side effect.
    ///
    /// # Errors
    /// - [`SessionError::Timeout`] when the per-key lock cannot be
    ///   acquired within the configured timeout, or when `setup` returned
    ///   after the timeout without producing the artifact
    /// - [`SessionError::SetupFailed`] when `setup` itself fails
    /// - [`SessionError::ArtifactMissing`] when `setup` returned within
    ///   the timeout but produced no artifact
    ///
    /// On every failure the lock is released, so a later scenario for the
    /// same identity may attempt setup again.
    pub fn get_or_create<F>(
        &self,
        identity: &Identity,
        setup: F,
    ) -> Result<PathBuf, SessionError>
    where
        F: FnOnce() -> anyhow::Result<()>,
    {
        let key = identity.cache_key();
        let path = self.artifact_path(identity);

        // Fast path: steady state after the first scenario per identity.
        if path.exists() {
            tracing::trace!(%key, "session artifact reused");
            return Ok(path);
        }

        let lock = Arc::clone(&self.locks.entry(key.clone()).or_default());
        let guard = lock
            .try_lock_for(self.timeout)
            .ok_or_else(|| SessionError::Timeout {
                key: key.clone(),
                waited: self.timeout,
            })?;
        let acquired = Instant::now();

        // Another thread may have finished while we queued for the lock.
        if path.exists() {
            tracing::debug!(%key, "session established by a concurrent caller");
            return Ok(path);
        }

        tracing::info!(%key, "establishing session");
        setup().map_err(|source| SessionError::SetupFailed {
            key: key.clone(),
            source,
        })?;

        if !path.exists() {
            let waited = acquired.elapsed();
            if waited > self.timeout {
                return Err(SessionError::Timeout { key, waited });
            }
            return Err(SessionError::ArtifactMissing { key, path });
        }

        tracing::info!(%key, path = %path.display(), "session artifact persisted");
        drop(guard);
        Ok(path)
    }
}
