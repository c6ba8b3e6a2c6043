//! Message templates for chat notifications.
//!
//! Templates use Telegram's legacy Markdown. Text coming from the marketplace
//! is escaped outside of entities and stripped of the entity's own marker
//! inside them, since legacy Markdown has no escapes within an entity.

use std::time::Duration;

use crate::models::FavoriteSnapshotItem;
use crate::monitor::detect::{StockChange, Transition};
use crate::notifier::{Notification, OutgoingMessage};

const DEEP_LINK_BASE: &str = "https://share.toogoodtogo.com/item/";
const MAP_SEARCH_BASE: &str = "https://www.google.com/maps/search/?api=1&query=";
// Together these keep restock captions below Telegram's 1024 character cap
const MAX_DESCRIPTION_CHARS: usize = 400;
const MAX_NAME_CHARS: usize = 80;
const MAX_ADDRESS_CHARS: usize = 120;

/// Render a notification into the message that will be sent
pub fn render(notification: &Notification<'_>) -> OutgoingMessage {
    match notification {
        Notification::Startup {
            check_every,
            heartbeat_every,
        } => OutgoingMessage::Text(format!(
            "🚀 The bot has started successfully. It checks your Too Good To Go favorites \
             every {} and sends a 'still alive' message every {}.",
            describe_every(*check_every),
            describe_every(*heartbeat_every)
        )),
        Notification::Heartbeat { at } => OutgoingMessage::Text(format!(
            "🤖 Current time: {}. The bot is still running.",
            at.format("%a %b %e %H:%M:%S %Y")
        )),
        Notification::Stock(transition) => render_transition(transition),
    }
}

fn render_transition(transition: &Transition<'_>) -> OutgoingMessage {
    let item = transition.item;
    match transition.change {
        StockChange::Restock { available } => OutgoingMessage::Photo {
            url: item.cover_picture.clone(),
            caption: restock_caption(item, available),
        },
        StockChange::Sellout { .. } => OutgoingMessage::Text(format!(
            "❌ Sold out! There are no more bags available at *{}*.",
            inside_entity(&item.display_name, '*')
        )),
        StockChange::Changed {
            previous,
            available,
        } => OutgoingMessage::Text(format!(
            "🔄 The number of bags at *{}* changed from *{}* to *{}*.",
            inside_entity(&item.display_name, '*'),
            previous,
            available
        )),
    }
}

fn restock_caption(item: &FavoriteSnapshotItem, available: u32) -> String {
    let mut caption = format!(
        "🥡 There {} *{}* new {} at [{}]({}{})\n\n",
        if available == 1 { "is" } else { "are" },
        available,
        if available == 1 { "bag" } else { "bags" },
        inside_entity(&truncate(&item.display_name, MAX_NAME_CHARS), ']'),
        DEEP_LINK_BASE,
        item.item_id
    );

    let description = item.description.trim();
    if !description.is_empty() {
        caption.push_str(&format!(
            "📋 _{}_\n\n",
            inside_entity(&truncate(description, MAX_DESCRIPTION_CHARS), '_')
        ));
    }

    let rating = item
        .rating
        .map_or_else(|| "n/a".to_string(), |r| format!("{r}/5"));
    let pickup = match (&item.pickup_start, &item.pickup_end) {
        (Some(start), Some(end)) => format!("{start} - {end}"),
        _ => "n/a".to_string(),
    };

    caption.push_str(&format!(
        "💰 *{}* instead of {}\n\
         ⭐ *{}*\n\
         ⏰ *{}*\n\
         📍 [{}]({}{}%2C{})",
        item.price,
        escape_markdown(&item.value),
        rating,
        pickup,
        inside_entity(&truncate(&item.address_line, MAX_ADDRESS_CHARS), ']'),
        MAP_SEARCH_BASE,
        item.latitude,
        item.longitude
    ));

    caption
}

/// Human cadence such as `minute`, `3 minutes` or `24 hours`
pub fn describe_every(period: Duration) -> String {
    let secs = period.as_secs();
    let (count, unit) = if secs >= 3600 && secs % 3600 == 0 {
        (secs / 3600, "hour")
    } else if secs >= 60 && secs % 60 == 0 {
        (secs / 60, "minute")
    } else {
        (secs, "second")
    };

    if count == 1 {
        unit.to_string()
    } else {
        format!("{count} {unit}s")
    }
}

/// Escape legacy Markdown markers in text placed outside of any entity
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Drop characters that would close the surrounding entity early
fn inside_entity(text: &str, closing: char) -> String {
    text.chars()
        .filter(|&c| c != closing && c != '[' && c != ']' && c != '`')
        .collect()
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
