use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::info;

use crate::config::SyncConfig;
use crate::service::{ExternalSyncService, SyncSummary};

/// Fixed-interval trigger for external sync.
///
/// By default a tick only logs; pulling from the remote API on every tick is
/// opt-in through [`SyncConfig::sync_on_tick`].
pub struct PeriodicTrigger {
    interval: Duration,
    sync_on_tick: bool,
    service: Option<Arc<ExternalSyncService>>,
}

impl PeriodicTrigger {
    pub fn new(config: &SyncConfig, service: Option<Arc<ExternalSyncService>>) -> Self {
        Self {
            interval: config.interval,
            sync_on_tick: config.sync_on_tick,
            service,
        }
    }

    /// Runs one tick. Returns the sync summary when the tick pulled.
    pub async fn tick(&self) -> Option<SyncSummary> {
        info!("Simulating periodic sync at {}", Utc::now());

        if !self.sync_on_tick {
            return None;
        }
        let service = self.service.as_ref()?;
        Some(service.sync_all().await)
    }

    /// Ticks forever; the first tick fires one interval after start.
    pub async fn run(self) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(interval_secs = self.interval.as_secs(), "Periodic sync trigger started");
        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
