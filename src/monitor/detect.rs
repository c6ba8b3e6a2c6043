//! Stock change detection between two snapshots.

use crate::models::{FavoriteSnapshotItem, Snapshot};

/// How an item's availability moved between two polls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockChange {
    /// Nothing was left before, bags are available now
    Restock { available: u32 },
    /// Bags were available before, none are left now
    Sellout { previous: u32 },
    /// Any other change in the number of bags
    Changed { previous: u32, available: u32 },
}

/// Classify a single quantity transition, `None` when nothing changed
pub fn classify(previous: u32, available: u32) -> Option<StockChange> {
    match (previous, available) {
        (p, a) if p == a => None,
        (0, a) => Some(StockChange::Restock { available: a }),
        (p, 0) => Some(StockChange::Sellout { previous: p }),
        (p, a) => Some(StockChange::Changed {
            previous: p,
            available: a,
        }),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition<'a> {
    pub item: &'a FavoriteSnapshotItem,
    pub change: StockChange,
}

/// Result of comparing the previous snapshot with the current one
#[derive(Debug, Default)]
pub struct SnapshotDiff<'a> {
    /// Changed items, in the order of the current snapshot
    pub transitions: Vec<Transition<'a>>,
    /// Items that were known before but are missing from the current fetch
    pub dropped: Vec<&'a FavoriteSnapshotItem>,
}

impl SnapshotDiff<'_> {
    pub fn has_changes(&self) -> bool {
        !self.transitions.is_empty()
    }
}

/// Compare two snapshots; items unknown to `previous` count as sold out
pub fn detect<'a>(previous: &'a Snapshot, current: &'a Snapshot) -> SnapshotDiff<'a> {
    let transitions = current
        .iter()
        .filter_map(|item| {
            let before = previous.quantity_of(&item.item_id);
            classify(before, item.items_available).map(|change| Transition { item, change })
        })
        .collect();

    let dropped = previous
        .iter()
        .filter(|item| !current.contains(&item.item_id))
        .collect();

    SnapshotDiff {
        transitions,
        dropped,
    }
}
