//! Drives the poll cycle and the heartbeat on their own cadences.

use std::time::Duration;

use chrono::Local;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{info, warn};

use crate::models::Snapshot;
use crate::monitor::Watcher;
use crate::notifier::{Notification, Notifier};

/// Owns the live snapshot and runs one action at a time, forever
pub struct Scheduler {
    watcher: Watcher,
    notifier: Notifier,
    check_every: Duration,
    heartbeat_every: Duration,
    snapshot: Snapshot,
}

impl Scheduler {
    pub fn new(
        watcher: Watcher,
        notifier: Notifier,
        check_every: Duration,
        heartbeat_every: Duration,
    ) -> Self {
        Self {
            watcher,
            notifier,
            check_every,
            heartbeat_every,
            snapshot: Snapshot::default(),
        }
    }

    /// Announce startup, then poll and send heartbeats until the process dies
    ///
    /// Each timer first fires one full period after start.
    pub async fn run(mut self) {
        self.announce_startup().await;

        let start = Instant::now();
        let mut checks = interval_at(start + self.check_every, self.check_every);
        checks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut heartbeats = interval_at(start + self.heartbeat_every, self.heartbeat_every);
        heartbeats.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "⏱️  Checking every {:?}, heartbeat every {:?}",
            self.check_every, self.heartbeat_every
        );

        loop {
            tokio::select! {
                _ = checks.tick() => self.check().await,
                _ = heartbeats.tick() => self.heartbeat().await,
            }
        }
    }

    async fn announce_startup(&self) {
        let notification = Notification::Startup {
            check_every: self.check_every,
            heartbeat_every: self.heartbeat_every,
        };
        if let Err(e) = self.notifier.send(&notification).await {
            warn!("Failed to send startup message: {:#}", e);
        }
    }

    async fn check(&mut self) {
        match self.watcher.poll(&self.snapshot).await {
            Ok(snapshot) => self.snapshot = snapshot,
            Err(e) => warn!("Poll failed, keeping previous snapshot: {:#}", e),
        }
    }

    async fn heartbeat(&self) {
        info!("🤖 Sending heartbeat");
        let notification = Notification::Heartbeat {
            at: Local::now().naive_local(),
        };
        if let Err(e) = self.notifier.send(&notification).await {
            warn!("Failed to send heartbeat: {:#}", e);
        }
    }
}
