//! Normalization of raw favorites into a [`Snapshot`].

use std::fmt::Display;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};

use crate::marketplace::types::{Money, PickupInterval};
use crate::marketplace::RawFavorite;
use crate::models::{FavoriteSnapshotItem, Snapshot};

/// Turn a fetch result into a snapshot, phrasing pickup times relative to `now`
pub fn extract_snapshot<Tz>(records: Vec<RawFavorite>, now: &DateTime<Tz>) -> Result<Snapshot>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let items = records
        .into_iter()
        .map(|record| extract_item(record, now))
        .collect::<Result<Vec<_>>>()?;

    Ok(Snapshot::from_items(items))
}

fn extract_item<Tz>(record: RawFavorite, now: &DateTime<Tz>) -> Result<FavoriteSnapshotItem>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let item_id = record.item.item_id;
    let price = format_money(&record.item.price_including_taxes)
        .with_context(|| format!("Invalid price for favorite {item_id}"))?;
    let value = format_money(&record.item.value_including_taxes)
        .with_context(|| format!("Invalid value for favorite {item_id}"))?;

    let (pickup_start, pickup_end) = match record.pickup_interval {
        Some(PickupInterval { start, end }) => {
            (Some(pickup_phrase(start, now)), Some(pickup_phrase(end, now)))
        }
        None => (None, None),
    };

    Ok(FavoriteSnapshotItem {
        item_id,
        display_name: record.display_name,
        items_available: record.items_available,
        cover_picture: record.store.cover_picture.current_url,
        address_line: record.pickup_location.address.address_line,
        latitude: record.pickup_location.location.latitude,
        longitude: record.pickup_location.location.longitude,
        description: record.item.description,
        price,
        value,
        pickup_start,
        pickup_end,
        rating: record
            .item
            .average_overall_rating
            .map(|r| round_rating(r.average_overall_rating)),
    })
}

/// Fixed-point amount followed by the currency code, e.g. `10.50EUR`
pub fn format_money(money: &Money) -> Result<String> {
    if money.decimals == 0 {
        return Ok(format!("{}{}", money.minor_units, money.code));
    }

    let scale = 10u64
        .checked_pow(money.decimals)
        .with_context(|| format!("Unsupported number of decimals: {}", money.decimals))?;

    Ok(format!(
        "{}.{:0width$}{}",
        money.minor_units / scale,
        money.minor_units % scale,
        money.code,
        width = money.decimals as usize
    ))
}

/// Local-time phrase such as `Tomorrow 18:30`
pub fn pickup_phrase<Tz>(at: DateTime<Utc>, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let local = at.with_timezone(&now.timezone());
    let days = (local.date_naive() - now.date_naive()).num_days();
    format!("{} {}", relative_day(days), local.format("%H:%M"))
}

fn relative_day(days: i64) -> String {
    match days {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        -1 => "Yesterday".to_string(),
        d if d > 1 => format!("In {d} days"),
        d => format!("{} days ago", -d),
    }
}

fn round_rating(rating: f64) -> f64 {
    (rating * 100.0).round() / 100.0
}
