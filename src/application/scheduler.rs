//! Scheduler - owns the single background reconciliation task.
//!
//! At most one pass runs at a time. A trigger while a pass is running is
//! refused with [`TriggerOutcome::AlreadyRunning`]; nothing is queued and the
//! running pass is not disturbed.
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `startup_delay` | 1s | Wait before the startup pass |
//! | `poll_interval` | 30min | Time between periodic passes in [`Scheduler::run`] |
//!
//! ## Graceful Shutdown
//!
//! [`Scheduler::run`] stops on a `watch` shutdown signal. A pass already in
//! flight is left to finish on its own task.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use super::engine::{ReconcileError, ReconciliationEngine};
use crate::domain::reconciliation::{PassSummary, ReconcileEvent};
use crate::ports::UpdateNotifier;

/// Configuration for the Scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub startup_delay: Duration,
    pub poll_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            startup_delay: Duration::from_secs(1),
            poll_interval: Duration::from_secs(30 * 60),
        }
    }
}

impl SchedulerConfig {
    pub fn with_startup_delay(mut self, delay: Duration) -> Self {
        self.startup_delay = delay;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// Answer to a trigger request.
#[derive(Debug)]
pub enum TriggerOutcome {
    /// A pass was started; the handle resolves when it ends.
    Started(JoinHandle<Result<PassSummary, ReconcileError>>),
    /// A pass is already running. Try again later.
    AlreadyRunning,
}

impl TriggerOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, TriggerOutcome::Started(_))
    }
}

/// Clears the running flag however the pass task ends.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs reconciliation passes one at a time.
#[derive(Clone)]
pub struct Scheduler {
    engine: Arc<ReconciliationEngine>,
    notifier: Arc<dyn UpdateNotifier>,
    running: Arc<AtomicBool>,
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(engine: Arc<ReconciliationEngine>, notifier: Arc<dyn UpdateNotifier>) -> Self {
        Self {
            engine,
            notifier,
            running: Arc::new(AtomicBool::new(false)),
            config: SchedulerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Starts a pass unless one is already running.
    ///
    /// The outcome of the pass is also sent to the notifier as
    /// `PassCompleted` or `PassFailed`.
    pub fn trigger(&self) -> TriggerOutcome {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("pass already running, trigger refused");
            return TriggerOutcome::AlreadyRunning;
        }

        let guard = RunningGuard(self.running.clone());
        let engine = self.engine.clone();
        let notifier = self.notifier.clone();

        TriggerOutcome::Started(tokio::spawn(async move {
            let result = engine.run_pass().await;
            drop(guard);

            match &result {
                Ok(summary) => notifier.notify(ReconcileEvent::PassCompleted(summary.clone())),
                Err(e) => notifier.notify(ReconcileEvent::PassFailed {
                    pass_id: e.pass_id(),
                    message: e.to_string(),
                }),
            }
            result
        }))
    }

    /// Triggers one pass after the startup delay, off the caller's task.
    pub fn trigger_on_startup(&self) -> JoinHandle<TriggerOutcome> {
        let scheduler = self.clone();
        tokio::spawn(async move {
            time::sleep(scheduler.config.startup_delay).await;
            let outcome = scheduler.trigger();
            if !outcome.is_started() {
                tracing::info!("startup pass skipped, a pass is already running");
            }
            outcome
        })
    }

    /// Triggers a pass every `poll_interval` until shutdown is signalled.
    ///
    /// The first periodic pass fires one interval after the call; pair with
    /// [`Scheduler::trigger_on_startup`] for an early first pass.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let period = self.config.poll_interval;
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("scheduler stopping");
                        return;
                    }
                }

                _ = interval.tick() => {
                    if let TriggerOutcome::AlreadyRunning = self.trigger() {
                        tracing::info!("periodic pass skipped, previous pass still running");
                    }
                }
            }
        }
    }
}
