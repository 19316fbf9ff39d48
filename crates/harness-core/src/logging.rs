//! Logging bootstrap
//!
//! Installs the process-wide `tracing` subscriber exactly once. Per-thread
//! correlation (scenario name, role, uuid) rides on spans created by the
//! orchestrator rather than on a mutable logging context.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

/// Initialize the fmt subscriber with an env-filter (`RUST_LOG`,
/// defaulting to `info`) and thread ids on every line. Safe to call from
/// every test or worker; only the first call installs anything, and an
/// already-installed outer subscriber is left in place.
pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_thread_ids(true)
            .try_init();
    });
}
