use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer};
use tracing::warn;

/// Marketplace identifier of a listing
///
/// The API sends item ids as strings, but numeric ids are accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self::new(s),
            Raw::Number(n) => Self::new(n.to_string()),
        })
    }
}

/// One favorite listing as of a single poll
#[derive(Debug, Clone, PartialEq)]
pub struct FavoriteSnapshotItem {
    pub item_id: ItemId,
    pub display_name: String,
    pub items_available: u32,
    pub cover_picture: String,
    pub address_line: String,
    pub latitude: f64,
    pub longitude: f64,
    pub description: String,
    pub price: String,
    pub value: String,
    pub pickup_start: Option<String>,
    pub pickup_end: Option<String>,
    pub rating: Option<f64>,
}

/// All favorites as of the last poll, in fetch order
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    items: Vec<FavoriteSnapshotItem>,
    index: HashMap<ItemId, usize>,
}

impl Snapshot {
    /// Build a snapshot, keeping the first occurrence of a repeated id
    pub fn from_items(items: impl IntoIterator<Item = FavoriteSnapshotItem>) -> Self {
        let mut snapshot = Self::default();

        for item in items {
            if snapshot.index.contains_key(&item.item_id) {
                warn!("Duplicate favorite {} in fetch, keeping first", item.item_id);
                continue;
            }
            snapshot.index.insert(item.item_id.clone(), snapshot.items.len());
            snapshot.items.push(item);
        }

        snapshot
    }

    pub fn get(&self, id: &ItemId) -> Option<&FavoriteSnapshotItem> {
        self.index.get(id).map(|&i| &self.items[i])
    }

    /// Quantity on record for `id`; unknown items count as sold out
    pub fn quantity_of(&self, id: &ItemId) -> u32 {
        self.get(id).map_or(0, |item| item.items_available)
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FavoriteSnapshotItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::item;
    use super::*;

    #[test]
    fn test_item_id_accepts_string_and_number() {
        let from_text: ItemId = serde_json::from_str("\"12345\"").unwrap();
        let from_number: ItemId = serde_json::from_str("12345").unwrap();
        assert_eq!(from_text, from_number);
        assert_eq!(from_text.as_str(), "12345");
    }

    #[test]
    fn test_snapshot_lookup_and_default_quantity() {
        let snapshot = Snapshot::from_items(vec![item("a", "Bakery", 2), item("b", "Deli", 0)]);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.quantity_of(&ItemId::new("a")), 2);
        assert_eq!(snapshot.quantity_of(&ItemId::new("b")), 0);
        assert_eq!(snapshot.quantity_of(&ItemId::new("missing")), 0);
        assert!(!snapshot.contains(&ItemId::new("missing")));
    }

    #[test]
    fn test_snapshot_keeps_first_duplicate() {
        let snapshot = Snapshot::from_items(vec![
            item("a", "First", 1),
            item("b", "Other", 4),
            item("a", "Second", 9),
        ]);

        assert_eq!(snapshot.len(), 2);
        let kept = snapshot.get(&ItemId::new("a")).unwrap();
        assert_eq!(kept.display_name, "First");
        let order: Vec<_> = snapshot.iter().map(|i| i.item_id.as_str()).collect();
        assert_eq!(order, vec!["a", "b"]);
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = Snapshot::default();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.iter().count(), 0);
    }
}
