//! Periodic ingestion
//!
//! The first tick fires one full interval after spawning; callers that want
//! an immediate run do it themselves before scheduling.

use crate::orchestrator::Orchestrator;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Handle to a running periodic job
pub struct SchedulerHandle {
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stops the job; a run in progress is abandoned
    pub fn stop(self) {
        self.task.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

/// Runs `orchestrator.run_all()` every `interval`
///
/// A run that overruns the interval delays the next one instead of
/// triggering a burst of catch-up runs.
pub fn spawn_periodic(orchestrator: Orchestrator, interval: Duration) -> SchedulerHandle {
    let task = tokio::spawn(async move {
        let start = tokio::time::Instant::now() + interval;
        let mut ticker = tokio::time::interval_at(start, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            tracing::info!("Scheduled ingestion run starting");
            let articles = orchestrator.run_all().await;
            tracing::info!(persisted = articles.len(), "Scheduled ingestion run done");
        }
    });

    SchedulerHandle { task }
}
