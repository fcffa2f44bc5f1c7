//! Display helpers for event cards.

use chrono::{DateTime, Utc};

use super::model::Event;

/// `Dec 12, 2025`.
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Whole-hour clock label: `9:00 AM`, `12:00 PM`, `3:00 PM`.
///
/// Midnight renders as `0:00 AM`.
pub fn format_time(hour: u8) -> String {
    if hour >= 12 {
        let display = if hour == 12 { 12 } else { hour - 12 };
        format!("{display}:00 PM")
    } else {
        format!("{hour}:00 AM")
    }
}

/// `0.5 ETH` for paid events, `None` for free ones.
pub fn price_label(event: &Event) -> Option<String> {
    (!event.is_free()).then(|| format!("{} ETH", event.ticket_price.normalize()))
}

/// `12/40 seats`.
pub fn seats_label(event: &Event) -> String {
    format!("{}/{} seats", event.sold_seats, event.max_seats)
}

/// Title and body for a share sheet.
pub fn share_text(event: &Event) -> (String, String) {
    (event.event_name.clone(), event.event_description.clone())
}
