use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{debug, info, warn};

use crate::marketplace::FavoritesSource;
use crate::models::Snapshot;
use crate::monitor::detect::{detect, StockChange};
use crate::monitor::extract::extract_snapshot;
use crate::notifier::{Notification, Notifier};

/// One poll cycle: fetch, compare with the previous snapshot, notify
pub struct Watcher {
    source: Arc<dyn FavoritesSource>,
    notifier: Notifier,
}

impl Watcher {
    pub fn new(source: Arc<dyn FavoritesSource>, notifier: Notifier) -> Self {
        Self { source, notifier }
    }

    /// Run a cycle against `previous` and return the snapshot that replaces it
    ///
    /// Fetch and extraction failures are returned before anything is sent.
    /// Delivery failures are logged and do not stop the cycle.
    pub async fn poll(&self, previous: &Snapshot) -> Result<Snapshot> {
        let records = self
            .source
            .fetch_favorites()
            .await
            .with_context(|| format!("Failed to fetch favorites from {}", self.source.source_name()))?;

        let current = extract_snapshot(records, &Local::now())?;
        let diff = detect(previous, &current);

        if !diff.has_changes() {
            debug!("No stock changes since last poll");
        }
        for gone in &diff.dropped {
            info!("{} ({}) is no longer a favorite, dropping it", gone.display_name, gone.item_id);
        }

        for transition in &diff.transitions {
            let name = &transition.item.display_name;
            match transition.change {
                StockChange::Restock { available } => info!("🥡 {} restocked with {}", name, available),
                StockChange::Sellout { previous } => info!("❌ {} sold out (had {})", name, previous),
                StockChange::Changed {
                    previous,
                    available,
                } => info!("🔄 {} went from {} to {}", name, previous, available),
            }

            if let Err(e) = self.notifier.send(&Notification::Stock(transition.clone())).await {
                warn!("Failed to notify about {}: {:#}", name, e);
            }
        }

        if current.is_empty() {
            info!("✅ Poll complete, no favorites found");
        } else {
            info!("✅ Poll complete, current stock of {} favorites:", current.len());
        }
        for item in current.iter() {
            info!("   {}: {}", item.display_name, item.items_available);
        }

        Ok(current)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::marketplace::RawFavorite;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Source that replays queued responses, then reports no favorites
    #[derive(Default)]
    pub struct ScriptedSource {
        responses: Mutex<VecDeque<std::result::Result<Vec<RawFavorite>, String>>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        pub fn push_ok(&self, favorites: Vec<RawFavorite>) {
            self.responses.lock().unwrap().push_back(Ok(favorites));
        }

        pub fn push_err(&self, message: &str) {
            self.responses.lock().unwrap().push_back(Err(message.to_string()));
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FavoritesSource for ScriptedSource {
        async fn fetch_favorites(&self) -> Result<Vec<RawFavorite>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.responses.lock().unwrap().pop_front();
            match next {
                Some(Ok(favorites)) => Ok(favorites),
                Some(Err(message)) => Err(anyhow::anyhow!(message)),
                None => Ok(Vec::new()),
            }
        }

        fn source_name(&self) -> &'static str {
            "scripted"
        }
    }
}
