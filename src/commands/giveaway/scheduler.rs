use std::future::Future;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::commands::giveaway::models::GiveawayId;

// Keeps one deferred conclusion per giveaway. A timer is never cancelled by the
// manual draw: once it fires, the conclusion itself turns into a no-op.
#[derive(Debug, Default)]
pub struct Scheduler {
    timers: Arc<DashMap<GiveawayId, JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler {
            timers: Arc::new(DashMap::new()),
        }
    }

    // Runs `action` at (or right after) the deadline. Deadlines in the past fire immediately.
    pub fn arm<F, Fut>(&self, id: GiveawayId, deadline: DateTime<Utc>, action: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.timers.retain(|_, handle| !handle.is_finished());

        let delay = (deadline - Utc::now())
            .to_std()
            .unwrap_or(StdDuration::ZERO);
        debug!("Giveaway {} will be concluded in {:?}", id, delay);

        let handle = tokio::spawn(async move {
            if !delay.is_zero() {
                sleep(delay).await;
            }

            debug!("Timer of giveaway {} has fired", id);
            action().await;
        });

        if let Some(previous) = self.timers.insert(id, handle) {
            warn!("Giveaway {} was armed twice, the previous timer is dropped", id);
            previous.abort();
        }
    }

    // Number of timers which haven't fired yet.
    pub fn pending(&self) -> usize {
        self.timers
            .iter()
            .filter(|entry| !entry.value().is_finished())
            .count()
    }

    // Abandons every outstanding timer. Used on the process shutdown.
    pub fn shutdown(&self) {
        let pending = self.pending();
        self.timers.iter().for_each(|entry| entry.value().abort());
        self.timers.clear();
        info!("Scheduler stopped, {} pending timer(s) abandoned", pending);
    }
}
