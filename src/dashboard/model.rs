//! Event data models, camelCase on the wire.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Who may join an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Anyone may join.
    #[default]
    Open,
    /// The host approves each attendee.
    Approval,
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Approval => write!(f, "approval"),
        }
    }
}

/// An event as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "_id")]
    pub id: String,
    pub event_name: String,
    #[serde(default)]
    pub event_description: String,
    #[serde(default = "default_mode")]
    pub mode: String,
    pub date: DateTime<Utc>,
    /// Hour of day, 0..=23.
    #[serde(default)]
    pub time: u8,
    #[serde(default)]
    pub location: String,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub ticket_price: Decimal,
    #[serde(default)]
    pub permission: Permission,
    #[serde(default)]
    pub image_url: String,
    #[serde(default = "default_seats")]
    pub max_seats: u32,
    #[serde(default)]
    pub sold_seats: u32,
    #[serde(default)]
    pub host_address: String,
    #[serde(default)]
    pub event_blockchain_id: i64,
}

impl Event {
    pub fn is_free(&self) -> bool {
        self.ticket_price <= Decimal::ZERO
    }
}

/// The creation form, before host details are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub event_name: String,
    pub event_description: String,
    pub mode: String,
    pub date: NaiveDate,
    pub time: u8,
    pub location: String,
    pub ticket_price: Decimal,
    pub permission: Permission,
    pub image_url: String,
    pub max_seats: u32,
}

impl EventDraft {
    pub fn new(event_name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            event_name: event_name.into(),
            event_description: String::new(),
            mode: default_mode(),
            date,
            time: 0,
            location: String::new(),
            ticket_price: Decimal::ZERO,
            permission: Permission::Open,
            image_url: String::new(),
            max_seats: default_seats(),
        }
    }
}

/// `POST /api/events` body: the draft plus host fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub event_name: String,
    pub event_description: String,
    pub mode: String,
    pub date: DateTime<Utc>,
    pub time: u8,
    pub location: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub ticket_price: Decimal,
    pub permission: Permission,
    pub image_url: String,
    pub max_seats: u32,
    pub host_address: String,
    pub event_blockchain_id: i64,
}

impl NewEvent {
    /// Attach host details. The date becomes midnight UTC.
    pub fn from_draft(draft: EventDraft, host_address: &str, event_blockchain_id: i64) -> Self {
        let date = draft.date.and_time(chrono::NaiveTime::MIN).and_utc();
        Self {
            event_name: draft.event_name,
            event_description: draft.event_description,
            mode: draft.mode,
            date,
            time: draft.time,
            location: draft.location,
            ticket_price: draft.ticket_price,
            permission: draft.permission,
            image_url: draft.image_url,
            max_seats: draft.max_seats,
            host_address: host_address.to_string(),
            event_blockchain_id,
        }
    }
}

fn default_mode() -> String {
    "virtual".to_string()
}

fn default_seats() -> u32 {
    1
}
