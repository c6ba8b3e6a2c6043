use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ItemId;

/// Body of the item listing request
#[derive(Debug, Clone, Serialize)]
pub struct FavoritesQuery {
    pub user_id: String,
    pub origin: Origin,
    /// Search radius in kilometres; ignored when only favorites are listed
    pub radius: u32,
    pub page_size: usize,
    pub page: usize,
    pub favorites_only: bool,
    pub with_stock_only: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Origin {
    pub latitude: f64,
    pub longitude: f64,
}

impl FavoritesQuery {
    pub fn favorites(user_id: impl Into<String>, page_size: usize) -> Self {
        Self {
            user_id: user_id.into(),
            origin: Origin {
                latitude: 0.0,
                longitude: 0.0,
            },
            radius: 21,
            page_size,
            page: 1,
            favorites_only: true,
            with_stock_only: false,
        }
    }
}

/// A body without `items` is an error, not an empty favorites list
#[derive(Debug, Deserialize)]
pub struct ItemsResponse {
    pub items: Vec<RawFavorite>,
}

/// One favorite as returned by the marketplace API
///
/// Only the fields the watcher reads are modelled. Missing required fields fail
/// deserialization of the whole response.
#[derive(Debug, Clone, Deserialize)]
pub struct RawFavorite {
    pub item: RawItem,
    pub store: RawStore,
    pub display_name: String,
    pub items_available: u32,
    pub pickup_location: PickupLocation,
    #[serde(default)]
    pub pickup_interval: Option<PickupInterval>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawItem {
    pub item_id: ItemId,
    #[serde(default)]
    pub description: String,
    pub price_including_taxes: Money,
    pub value_including_taxes: Money,
    #[serde(default)]
    pub average_overall_rating: Option<AverageRating>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AverageRating {
    pub average_overall_rating: f64,
}

/// Amount in minor units, e.g. 1050 with 2 decimals is 10.50
#[derive(Debug, Clone, Deserialize)]
pub struct Money {
    pub code: String,
    pub minor_units: u64,
    pub decimals: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawStore {
    pub cover_picture: Picture,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Picture {
    pub current_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PickupLocation {
    pub address: Address,
    pub location: Origin,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Address {
    pub address_line: String,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct PickupInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}
