//! Scheduler: periodic refresh owned by the panel's lifetime.
//!
//! DESIGN
//! ======
//! One task ticks a `tokio::time::interval`; the first tick fires at once.
//! Each tick runs its refresh as a separate task in a `JoinSet`, so a hung
//! fetch never delays the next tick. There is no backoff: a failed fetch
//! renders its error and the next tick fires on schedule.
//!
//! Teardown is explicit. [`SchedulerHandle::stop`] (or dropping the handle)
//! ends the loop, and refreshes started by ticks that are still in flight are
//! aborted with it. Refreshes started by sends or deletes are not owned here
//! and run to completion.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::RefreshPolicy;
use crate::panel::Panel;

/// Floor applied to the poll interval; `tokio::time::interval` rejects zero.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Owner of a running scheduler. Dropping it stops polling.
pub struct SchedulerHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl SchedulerHandle {
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop polling and wait for the scheduler task to wind down.
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            if shutdown.send(()).is_err() {
                debug!("scheduler already finished");
            }
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "scheduler task ended abnormally");
            }
        }
    }
}

/// Spawn the polling loop for `panel`. Returns a handle for teardown.
pub fn spawn_scheduler(panel: Panel, interval: Duration, policy: RefreshPolicy) -> SchedulerHandle {
    let interval = interval.max(MIN_POLL_INTERVAL);
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let event_id = panel.event_id().clone();
        info!(%event_id, ?interval, ?policy, "chat polling started");

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut refreshes: JoinSet<bool> = JoinSet::new();

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => break,
                _ = ticker.tick() => {
                    let panel = panel.clone();
                    refreshes.spawn(async move { panel.scheduled_refresh(policy).await });
                }
                Some(joined) = refreshes.join_next() => {
                    if let Err(e) = joined {
                        warn!(%event_id, error = %e, "scheduled refresh task failed");
                    }
                }
            }
        }

        refreshes.shutdown().await;
        info!(%event_id, "chat polling stopped");
    });

    SchedulerHandle { shutdown: Some(shutdown_tx), task: Some(task) }
}

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod tests;
