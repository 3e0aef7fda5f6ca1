//! Cycle scheduler.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tracing::{error, info, warn};

use uptick_checker::{Report, ServiceChecker, summarize};
use uptick_core::UptickConfig;
use uptick_probe::Probe;
use uptick_store::ResultStore;

use crate::error::SchedulerResult;

/// Callback invoked with every cycle's report, before it is persisted.
pub type ReportCallback = Arc<dyn Fn(&Report) + Send + Sync>;

/// Lifecycle of a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Between cycles, or not started.
    Idle,
    /// A cycle is checking endpoints or persisting results.
    Running,
    /// The run loop has exited.
    Stopped,
}

/// Process exit status for single-shot mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Every endpoint was UP.
    Healthy,
    /// At least one endpoint was DOWN.
    Degraded,
    /// The cycle failed for an infrastructure reason.
    Faulted,
}

impl ExitStatus {
    pub fn code(&self) -> u8 {
        match self {
            ExitStatus::Healthy => 0,
            ExitStatus::Degraded => 1,
            ExitStatus::Faulted => 2,
        }
    }
}

pub struct Scheduler<P> {
    checker: ServiceChecker<P>,
    store: ResultStore,
    interval: Duration,
    /// Serializes check + persist so cycles never overlap.
    cycle_guard: Mutex<()>,
    state: watch::Sender<SchedulerState>,
    completed: AtomicU64,
    on_report: Option<ReportCallback>,
}

impl<P: Probe> Scheduler<P> {
    pub fn new(checker: ServiceChecker<P>, store: ResultStore, interval: Duration) -> Self {
        let (state, _) = watch::channel(SchedulerState::Idle);
        Self {
            checker,
            store,
            interval,
            cycle_guard: Mutex::new(()),
            state,
            completed: AtomicU64::new(0),
            on_report: None,
        }
    }

    pub fn from_config(config: &UptickConfig, probe: P, store: ResultStore) -> Self {
        Self::new(
            ServiceChecker::from_config(config, probe),
            store,
            config.check_interval(),
        )
    }

    /// Set a callback for each cycle's report.
    pub fn with_callback(mut self, callback: ReportCallback) -> Self {
        self.on_report = Some(callback);
        self
    }

    pub fn state(&self) -> SchedulerState {
        *self.state.borrow()
    }

    /// Watch state transitions.
    pub fn subscribe(&self) -> watch::Receiver<SchedulerState> {
        self.state.subscribe()
    }

    /// Cycles run to completion, whether or not persistence succeeded.
    pub fn completed_cycles(&self) -> u64 {
        self.completed.load(Ordering::SeqCst)
    }

    /// Run exactly one cycle: check, summarize, report, persist.
    pub async fn run_cycle(&self) -> SchedulerResult<Report> {
        let _guard = self.cycle_guard.lock().await;
        self.state.send_replace(SchedulerState::Running);

        let result = self.execute_cycle().await;

        self.completed.fetch_add(1, Ordering::SeqCst);
        self.state.send_replace(SchedulerState::Idle);
        result
    }

    async fn execute_cycle(&self) -> SchedulerResult<Report> {
        info!(
            services = self.checker.services().len(),
            endpoints = self.checker.endpoint_count(),
            "starting availability check"
        );

        let batch = self.checker.run_cycle().await;
        let report = summarize(&batch);

        info!(
            total = report.total,
            up = report.up,
            down = report.down,
            up_percentage = report.up_percentage,
            "check completed"
        );
        for entry in &report.down_entries {
            warn!(
                service = %entry.service,
                url = %entry.url,
                code = ?entry.status_code,
                error = ?entry.error,
                "endpoint down"
            );
        }

        if let Some(ref callback) = self.on_report {
            callback(&report);
        }

        self.store.save(&batch)?;
        Ok(report)
    }

    /// Single-shot mode: one cycle, mapped to an exit status.
    pub async fn run_once(&self) -> ExitStatus {
        let status = match self.run_cycle().await {
            Ok(report) if report.all_up() => ExitStatus::Healthy,
            Ok(_) => ExitStatus::Degraded,
            Err(e) => {
                error!(error = %e, path = %self.store.path().display(), "check cycle failed");
                ExitStatus::Faulted
            }
        };
        self.state.send_replace(SchedulerState::Stopped);
        status
    }

    /// Continuous mode: cycle now, then every interval until shutdown.
    ///
    /// Failed cycles are logged and the loop carries on. The shutdown
    /// channel is only observed between cycles.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = self.interval.as_secs(),
            "continuous monitoring started"
        );

        loop {
            if *shutdown.borrow_and_update() {
                break;
            }

            if let Err(e) = self.run_cycle().await {
                error!(
                    error = %e,
                    path = %self.store.path().display(),
                    "check cycle failed; next cycle still scheduled"
                );
            }

            if self.wait_interval(&mut shutdown).await {
                break;
            }
        }

        self.state.send_replace(SchedulerState::Stopped);
        info!(cycles = self.completed_cycles(), "continuous monitoring stopped");
    }

    /// Sleep for one interval. Returns `true` if shutdown was requested.
    async fn wait_interval(&self, shutdown: &mut watch::Receiver<bool>) -> bool {
        let sleep = tokio::time::sleep(self.interval);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    // A closed channel can never signal again; treat it as shutdown.
                    if changed.is_err() || *shutdown.borrow_and_update() {
                        info!("shutdown requested; no further cycles");
                        return true;
                    }
                }
                _ = &mut sleep => return false,
            }
        }
    }
}
