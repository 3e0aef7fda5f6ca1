//! End-to-end scheduler scenarios.
//!
//! Runs full cycles (checker → report → store) against a scripted probe,
//! on tokio's paused clock so backoff, throttle and interval sleeps take
//! no real time.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;

use uptick_core::{ErrorKind, ProbeOutcome, Status, UptickConfig};
use uptick_probe::Probe;
use uptick_scheduler::{ExitStatus, Scheduler, SchedulerState};
use uptick_store::ResultStore;

const CONFIG: &str = r#"
check_interval_minutes = 15
timeout_seconds = 10
retry_attempts = 3
request_delay_seconds = 2
user_agents = ["agent-a", "agent-b"]

[services.search]
description = "Search frontend"
endpoints = ["https://search.example.com"]

[services.maps]
description = "Maps tiles"
endpoints = ["https://maps.example.com"]
"#;

/// Answers per URL (200 by default) and counts requests.
#[derive(Default)]
struct FakeProbe {
    answers: Mutex<HashMap<String, ProbeOutcome>>,
    calls: AtomicUsize,
}

impl FakeProbe {
    fn answer(&self, outcome: ProbeOutcome) {
        self.answers
            .lock()
            .unwrap()
            .insert(outcome.url.clone(), outcome);
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Probe for FakeProbe {
    async fn probe(&self, url: &str, _timeout: Duration, _identity: &str) -> ProbeOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let answers = self.answers.lock().unwrap();
        answers
            .get(url)
            .cloned()
            .unwrap_or_else(|| ProbeOutcome::response(url, 200, Duration::from_millis(25)))
    }
}

fn config() -> UptickConfig {
    UptickConfig::from_toml_str(CONFIG).unwrap()
}

fn scheduler(probe: Arc<FakeProbe>, snapshot: &Path) -> Arc<Scheduler<Arc<FakeProbe>>> {
    Arc::new(Scheduler::from_config(
        &config(),
        probe,
        ResultStore::new(snapshot),
    ))
}

/// Wait until `cycles` cycles have finished and the scheduler is between cycles.
async fn wait_for_cycles(scheduler: &Scheduler<Arc<FakeProbe>>, cycles: u64) {
    let mut states = scheduler.subscribe();
    while scheduler.completed_cycles() < cycles || scheduler.state() != SchedulerState::Idle {
        states.changed().await.unwrap();
    }
}

#[tokio::test(start_paused = true)]
async fn all_endpoints_up_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("latest_results.json");
    let probe = Arc::new(FakeProbe::default());
    let scheduler = scheduler(probe.clone(), &snapshot);

    let report = scheduler.run_cycle().await.unwrap();
    assert_eq!(report.total, 2);
    assert_eq!(report.up, 2);
    assert_eq!(report.down, 0);
    assert_eq!(report.up_percentage, 100.0);

    assert_eq!(scheduler.run_once().await, ExitStatus::Healthy);
    assert_eq!(ExitStatus::Healthy.code(), 0);
    assert_eq!(probe.calls(), 4);

    let stored = ResultStore::new(&snapshot).load().unwrap().unwrap();
    let urls: Vec<_> = stored.results.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, ["https://search.example.com", "https://maps.example.com"]);
    assert!(stored.results.iter().all(|r| r.status_code == Some(200)));
}

#[tokio::test(start_paused = true)]
async fn endpoint_timing_out_on_every_attempt_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("latest_results.json");
    let probe = Arc::new(FakeProbe::default());
    probe.answer(ProbeOutcome::timeout(
        "https://maps.example.com",
        Duration::from_secs(10),
    ));
    let scheduler = scheduler(probe.clone(), &snapshot);

    assert_eq!(scheduler.run_once().await, ExitStatus::Degraded);
    assert_eq!(ExitStatus::Degraded.code(), 1);
    // One attempt for search, three for maps.
    assert_eq!(probe.calls(), 4);

    let stored = ResultStore::new(&snapshot).load().unwrap().unwrap();
    let maps = &stored.results[1];
    assert_eq!(maps.service, "maps");
    assert_eq!(maps.status, Status::Down);
    assert_eq!(maps.error, Some(ErrorKind::Timeout));
    assert_eq!(maps.status_code, None);

    let report = uptick_checker::summarize(&uptick_core::CheckBatch {
        timestamp: stored.last_check,
        results: stored.results,
    });
    assert_eq!(report.total, 2);
    assert_eq!(report.up, 1);
    assert_eq!(report.down, 1);
    assert_eq!(report.up_percentage, 50.0);
}

#[tokio::test(start_paused = true)]
async fn persistence_failure_in_single_shot_is_faulted() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"file").unwrap();

    let probe = Arc::new(FakeProbe::default());
    let scheduler = scheduler(probe, &blocker.join("latest_results.json"));

    let status = scheduler.run_once().await;
    assert_eq!(status, ExitStatus::Faulted);
    assert_ne!(status.code(), 0);
}

#[tokio::test(start_paused = true)]
async fn persistence_failure_does_not_stop_continuous_loop() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"file").unwrap();

    let probe = Arc::new(FakeProbe::default());
    let scheduler = scheduler(probe.clone(), &blocker.join("latest_results.json"));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let handle = tokio::spawn({
        let scheduler = scheduler.clone();
        async move { scheduler.run(shutdown_rx).await }
    });

    wait_for_cycles(&scheduler, 3).await;
    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();

    assert!(scheduler.completed_cycles() >= 3);
    assert_eq!(scheduler.state(), SchedulerState::Stopped);
}

#[tokio::test(start_paused = true)]
async fn shutdown_while_waiting_starts_no_new_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("latest_results.json");
    let probe = Arc::new(FakeProbe::default());
    let scheduler = scheduler(probe.clone(), &snapshot);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let handle = tokio::spawn({
        let scheduler = scheduler.clone();
        async move { scheduler.run(shutdown_rx).await }
    });

    wait_for_cycles(&scheduler, 1).await;
    let written = std::fs::read(&snapshot).unwrap();

    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();

    assert_eq!(scheduler.completed_cycles(), 1);
    assert_eq!(probe.calls(), 2);
    assert_eq!(scheduler.state(), SchedulerState::Stopped);

    // The last snapshot is intact and unchanged.
    assert_eq!(std::fs::read(&snapshot).unwrap(), written);
    let stored = ResultStore::new(&snapshot).load().unwrap().unwrap();
    assert_eq!(stored.results.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn continuous_mode_repeats_every_interval() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("latest_results.json");
    let probe = Arc::new(FakeProbe::default());
    let scheduler = scheduler(probe.clone(), &snapshot);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let started = tokio::time::Instant::now();

    let handle = tokio::spawn({
        let scheduler = scheduler.clone();
        async move { scheduler.run(shutdown_rx).await }
    });

    wait_for_cycles(&scheduler, 3).await;
    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();

    assert_eq!(scheduler.completed_cycles(), 3);
    assert_eq!(probe.calls(), 6);
    // Two 15 minute waits, plus a 2s throttle gap inside each of 3 cycles.
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(2 * 15 * 60 + 3 * 2), "{elapsed:?}");
    assert!(elapsed < Duration::from_secs(3 * 15 * 60), "{elapsed:?}");
}
