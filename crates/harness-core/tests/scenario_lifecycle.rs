//! End-to-end scenario orchestration over the fake engine
//!
//! Exercises the full per-scenario flow: identity resolution, per-worker
//! engine/browser lifecycle, single-flight login, and seeded contexts.

use harness_core::prelude::*;
use harness_core::{HarnessError, IdentityError, ResourceError, SessionError};
use harness_test_utils::{tagged_scenario, FakeEngineFactory, RecordingLoginFlow, StaticCredentials};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const BASE_URL: &str = "https://app.example.test";

fn provider() -> Arc<StaticCredentials> {
    Arc::new(
        StaticCredentials::new()
            .with("admin", "alice", "s3cret")
            .with("qa", "bob", "hunter2"),
    )
}

fn orchestrator(
    sessions: Arc<SessionCache>,
    login: RecordingLoginFlow,
    browser: &str,
) -> ScenarioOrchestrator {
    ScenarioOrchestrator::new(sessions, provider(), Arc::new(login), browser, BASE_URL)
}

fn sessions_in(dir: &std::path::Path) -> Arc<SessionCache> {
    Arc::new(SessionCache::new(dir, Duration::from_secs(60)))
}

#[test]
fn first_scenario_logs_in_and_later_ones_reuse_the_session() {
    let tmp = tempfile::tempdir().unwrap();
    let login = RecordingLoginFlow::new();
    let orchestrator = orchestrator(sessions_in(tmp.path()), login.clone(), "chrome");
    let factory = FakeEngineFactory::new();
    let mut worker = WorkerResources::new(Arc::new(factory.clone()), true);

    let first = tagged_scenario("first admin scenario", &["smoke", "role_admin"]);
    let prepared = orchestrator.prepare(&mut worker, &first).unwrap();
    assert_eq!(prepared.identity, Identity::new("admin", "alice"));
    assert_eq!(login.invocations(), 1);
    assert!(prepared.artifact.exists());
    orchestrator.finish(&mut worker, &first, true);

    let second = tagged_scenario("second admin scenario", &["role_admin"]);
    let again = orchestrator.prepare(&mut worker, &second).unwrap();
    assert_eq!(login.invocations(), 1, "session must be reused");
    assert_eq!(again.artifact, prepared.artifact);

    // Throwaway login context is unseeded; every scenario context is
    // seeded with the artifact.
    let seeds = factory.log().seeds();
    assert_eq!(
        seeds,
        vec![
            None,
            Some(prepared.artifact.clone()),
            Some(prepared.artifact.clone()),
        ]
    );

    // Login flow and both scenarios all land on the base URL first.
    assert!(factory.log().navigations().iter().all(|url| url == BASE_URL));
}

#[test]
fn parallel_workers_for_one_identity_share_a_single_login() {
    let tmp = tempfile::tempdir().unwrap();
    let login = RecordingLoginFlow::new();
    let orchestrator = orchestrator(sessions_in(tmp.path()), login.clone(), "chrome");
    let factory = FakeEngineFactory::new();

    thread::scope(|s| {
        for worker_index in 0..4 {
            let orchestrator = &orchestrator;
            let factory = factory.clone();
            s.spawn(move || {
                let mut worker = WorkerResources::new(Arc::new(factory), true);
                let scenario =
                    tagged_scenario(&format!("qa scenario {worker_index}"), &["role_qa"]);
                let prepared = orchestrator.prepare(&mut worker, &scenario).unwrap();
                assert_eq!(prepared.identity, Identity::new("qa", "bob"));
                orchestrator.finish(&mut worker, &scenario, true);
            });
        }
    });

    assert_eq!(login.invocations(), 1, "one login across all workers");
    // One engine/browser per worker thread.
    assert_eq!(factory.log().launches(), 4);
}

#[test]
fn role_override_beats_scenario_tag() {
    let tmp = tempfile::tempdir().unwrap();
    let login = RecordingLoginFlow::new();
    let orchestrator = orchestrator(sessions_in(tmp.path()), login.clone(), "chrome")
        .with_role_override("qa");
    let mut worker = WorkerResources::new(Arc::new(FakeEngineFactory::new()), true);

    let scenario = tagged_scenario("tagged as admin", &["role_admin"]);
    let prepared = orchestrator.prepare(&mut worker, &scenario).unwrap();
    assert_eq!(prepared.identity, Identity::new("qa", "bob"));
}

#[test]
fn missing_role_is_a_configuration_error() {
    let tmp = tempfile::tempdir().unwrap();
    let orchestrator = orchestrator(sessions_in(tmp.path()), RecordingLoginFlow::new(), "chrome");
    let mut worker = WorkerResources::new(Arc::new(FakeEngineFactory::new()), true);

    let scenario = tagged_scenario("untagged", &["smoke", "regression"]);
    let err = orchestrator.prepare(&mut worker, &scenario).unwrap_err();
    assert!(matches!(
        err,
        HarnessError::Identity(IdentityError::RoleUnresolved)
    ));
    assert!(!err.later_scenario_may_retry());
}

#[test]
fn unknown_role_is_a_configuration_error() {
    let tmp = tempfile::tempdir().unwrap();
    let orchestrator = orchestrator(sessions_in(tmp.path()), RecordingLoginFlow::new(), "chrome");
    let mut worker = WorkerResources::new(Arc::new(FakeEngineFactory::new()), true);

    let scenario = tagged_scenario("ghost role", &["role_ghost"]);
    let err = orchestrator.prepare(&mut worker, &scenario).unwrap_err();
    assert!(matches!(
        err,
        HarnessError::Identity(IdentityError::UnknownRole(_))
    ));
}

#[test]
fn unsupported_browser_fails_before_any_resource_exists() {
    let tmp = tempfile::tempdir().unwrap();
    let orchestrator = orchestrator(sessions_in(tmp.path()), RecordingLoginFlow::new(), "safari");
    let factory = FakeEngineFactory::new();
    let mut worker = WorkerResources::new(Arc::new(factory.clone()), true);

    let scenario = tagged_scenario("safari attempt", &["role_admin"]);
    let err = orchestrator.prepare(&mut worker, &scenario).unwrap_err();
    assert!(matches!(
        err,
        HarnessError::Resource(ResourceError::UnsupportedBrowser(_))
    ));
    assert_eq!(factory.log().launches(), 0);
    assert_eq!(worker.browser_version_label(), harness_core::UNKNOWN_BROWSER);
}

#[test]
fn failed_login_surfaces_as_setup_failure_and_allows_retry() {
    let tmp = tempfile::tempdir().unwrap();
    let sessions = sessions_in(tmp.path());
    let broken = orchestrator(Arc::clone(&sessions), RecordingLoginFlow::failing(), "chrome");
    let mut worker = WorkerResources::new(Arc::new(FakeEngineFactory::new()), true);

    let scenario = tagged_scenario("login down", &["role_admin"]);
    let err = broken.prepare(&mut worker, &scenario).unwrap_err();
    assert!(matches!(
        err,
        HarnessError::Session(SessionError::SetupFailed { .. })
    ));
    assert!(err.later_scenario_may_retry());

    // Same cache, working login flow: the lock was released, the retry
    // succeeds.
    let working = orchestrator(sessions, RecordingLoginFlow::new(), "chrome");
    let prepared = working.prepare(&mut worker, &scenario).unwrap();
    assert!(prepared.artifact.exists());
}

#[test]
fn finish_discards_the_scenario_context() {
    let tmp = tempfile::tempdir().unwrap();
    let orchestrator = orchestrator(sessions_in(tmp.path()), RecordingLoginFlow::new(), "edge");
    let factory = FakeEngineFactory::new();
    let mut worker = WorkerResources::new(Arc::new(factory.clone()), true);

    let scenario = tagged_scenario("teardown check", &["role_admin"]);
    orchestrator.prepare(&mut worker, &scenario).unwrap();
    assert!(worker.page().is_ok());

    orchestrator.finish(&mut worker, &scenario, false);
    assert!(matches!(
        worker.page(),
        Err(ResourceError::NotInitialized(_))
    ));
    // Login context + scenario context both closed.
    assert_eq!(factory.log().contexts_closed(), 2);
}

#[test]
fn orchestrator_wires_from_settings_and_paths() {
    let tmp = tempfile::tempdir().unwrap();
    let config_dir = tmp.path().join("config");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config-ci.toml"),
        concat!(
            "base-url = \"https://ci.example.test\"\n",
            "browser = \"firefox\"\n",
            "session-timeout-secs = 30\n",
        ),
    )
    .unwrap();

    let settings = harness_config::load("ci", &config_dir).unwrap();
    let paths = harness_config::OutputPaths::resolve(tmp.path().join("out"), &settings.paths);
    paths.ensure().unwrap();

    let login = RecordingLoginFlow::new();
    let orchestrator = ScenarioOrchestrator::from_settings(
        &settings,
        &paths,
        provider(),
        Arc::new(login.clone()),
    );
    let mut worker = WorkerResources::new(Arc::new(FakeEngineFactory::new()), settings.headless);

    let scenario = tagged_scenario("configured run", &["role_admin"]);
    let prepared = orchestrator.prepare(&mut worker, &scenario).unwrap();
    assert!(prepared.artifact.starts_with(&paths.sessions));
    assert_eq!(login.invocations(), 1);

    harness_core::RunInfo::from_settings("ci", &settings, &paths).log();
}
