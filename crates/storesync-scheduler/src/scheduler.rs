//! Periodic sweeps driven by tokio timers.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use storesync_core::config::SchedulerConfig;
use storesync_core::errors::StoreSyncResult;
use storesync_observability::tracing_setup::events;
use storesync_observability::MetricsCollector;

use crate::registry::TaskRegistry;
use crate::sweeps::{SweepReport, Sweeper};

/// Finished task records older than this are dropped by the retention loop.
const TASK_RECORD_RETENTION_HOURS: i64 = 24;

/// Result of one activation plus completion pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepRun {
    pub activated: SweepReport,
    pub completed: SweepReport,
    /// Sweeps that could not list their due campaigns, as `"<sweep>: <error>"`.
    pub errors: Vec<String>,
}

/// Run both sweeps once at `now` and record them.
///
/// A sweep that fails is logged and listed in [`SweepRun::errors`] with an
/// empty report. The other sweep still runs.
pub fn run_sweeps(
    sweeper: &Sweeper,
    now: chrono::DateTime<Utc>,
    metrics: &Mutex<MetricsCollector>,
) -> SweepRun {
    let mut errors = Vec::new();
    let mut settle = |name: &str, result: StoreSyncResult<SweepReport>| {
        result.unwrap_or_else(|e| {
            error!(sweep = name, error = %e, "campaign sweep failed");
            errors.push(format!("{name}: {e}"));
            SweepReport::default()
        })
    };
    let activated = settle("activate", sweeper.activate_due(now));
    let completed = settle("complete", sweeper.complete_expired(now));
    if let Ok(mut m) = metrics.lock() {
        m.sweeps
            .record_activation(activated.processed, activated.failed);
        m.sweeps
            .record_completion(completed.processed, completed.failed);
    }
    SweepRun {
        activated,
        completed,
        errors,
    }
}

/// Handle to the periodic loops. Dropping it also stops them.
pub struct SchedulerHandle {
    cancel: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl SchedulerHandle {
    /// Signal both loops to exit after their current pass.
    pub fn stop(&self) {
        let _ = self.cancel.send(true);
    }

    /// Stop and wait for the loops to exit.
    pub async fn shutdown(self) {
        self.stop();
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}

pub struct PeriodicScheduler;

impl PeriodicScheduler {
    /// Spawn the sweep loop and the retention loop. Must be called inside a
    /// tokio runtime. The first pass of each loop runs after one interval.
    pub fn spawn(
        sweeper: Arc<Sweeper>,
        registry: Arc<TaskRegistry>,
        metrics: Arc<Mutex<MetricsCollector>>,
        config: &SchedulerConfig,
    ) -> SchedulerHandle {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let sweep_secs = config.sweep_interval_secs;
        let retention_secs = config.retention_interval_secs;

        let sweeps = {
            let sweeper = sweeper.clone();
            let metrics = metrics.clone();
            every(sweep_secs, "sweep", cancel_rx.clone(), move || {
                run_sweeps(&sweeper, Utc::now(), &metrics);
            })
        };

        let retention = every(retention_secs, "retention", cancel_rx, move || {
            let now = Utc::now();
            match sweeper.purge_old_approvals(now) {
                Ok(purged) => {
                    if let Ok(mut m) = metrics.lock() {
                        m.sweeps.record_retention(purged);
                    }
                }
                Err(e) => error!(error = %e, "approval retention failed"),
            }
            let pruned =
                registry.prune_finished(now - chrono::Duration::hours(TASK_RECORD_RETENTION_HOURS));
            if pruned > 0 {
                info!(pruned, "finished task records pruned");
            }
        });

        SchedulerHandle {
            cancel: cancel_tx,
            handles: vec![sweeps, retention],
        }
    }
}

fn every<F>(
    interval_secs: u64,
    name: &'static str,
    mut cancel_rx: watch::Receiver<bool>,
    pass: F,
) -> JoinHandle<()>
where
    F: Fn() + Send + Sync + 'static,
{
    let pass = Arc::new(pass);
    tokio::spawn(async move {
        let interval = Duration::from_secs(interval_secs);
        events::scheduler_lifecycle("started", interval_secs);
        info!(loop_name = name, "periodic loop started");
        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    let pass = pass.clone();
                    if let Err(e) = tokio::task::spawn_blocking(move || pass()).await {
                        error!(loop_name = name, error = %e, "periodic pass panicked");
                    }
                }
                changed = cancel_rx.changed() => {
                    if changed.is_err() || *cancel_rx.borrow() {
                        events::scheduler_lifecycle("stopped", interval_secs);
                        break;
                    }
                }
            }
        }
    })
}
