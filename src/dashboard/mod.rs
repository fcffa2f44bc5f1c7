//! Event dashboard: browse, join-list and create events for the
//! connected wallet.

pub mod format;
pub mod model;

use std::sync::Arc;

use tracing::info;

use crate::backend::BackendApi;
use crate::error::DashboardError;
use crate::store::{Session, SessionStore};

pub use model::{Event, EventDraft, NewEvent, Permission};

/// Tabs shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DashboardTab {
    #[default]
    Available,
    Joined,
}

/// Event operations for the signed-in user.
pub struct EventDashboard {
    backend: Arc<dyn BackendApi>,
    store: Arc<dyn SessionStore>,
}

impl EventDashboard {
    pub fn new(backend: Arc<dyn BackendApi>, store: Arc<dyn SessionStore>) -> Self {
        Self { backend, store }
    }

    async fn address(&self) -> Result<Option<String>, DashboardError> {
        Ok(Session::load(self.store.as_ref()).await?.address)
    }

    /// Events for the given tab.
    pub async fn events(&self, tab: DashboardTab) -> Result<Vec<Event>, DashboardError> {
        match tab {
            DashboardTab::Available => self.available_events().await,
            DashboardTab::Joined => self.joined_events().await,
        }
    }

    pub async fn available_events(&self) -> Result<Vec<Event>, DashboardError> {
        Ok(self.backend.list_events().await?)
    }

    /// Events the connected wallet holds tickets for. Empty when no wallet
    /// is connected.
    pub async fn joined_events(&self) -> Result<Vec<Event>, DashboardError> {
        match self.address().await? {
            Some(address) => Ok(self.backend.joined_events(&address).await?),
            None => Ok(Vec::new()),
        }
    }

    /// Validate and publish a draft, hosted by the connected wallet.
    pub async fn create_event(&self, draft: EventDraft) -> Result<Event, DashboardError> {
        let host = self
            .address()
            .await?
            .ok_or(DashboardError::WalletNotConnected)?;
        validate_draft(&draft)?;

        let blockchain_id = chrono::Utc::now().timestamp_millis();
        let request = NewEvent::from_draft(draft, &host, blockchain_id);
        let created = self.backend.create_event(&request).await?;
        info!(event_id = %created.id, host = %host, "Event created");
        Ok(created)
    }
}

fn validate_draft(draft: &EventDraft) -> Result<(), DashboardError> {
    let invalid = |field: &str, reason: &str| DashboardError::InvalidDraft {
        field: field.to_string(),
        reason: reason.to_string(),
    };
    if draft.event_name.trim().is_empty() {
        return Err(invalid("eventName", "must not be empty"));
    }
    if draft.time > 23 {
        return Err(invalid("time", "hour must be between 0 and 23"));
    }
    if draft.max_seats == 0 {
        return Err(invalid("maxSeats", "must be at least 1"));
    }
    if draft.ticket_price.is_sign_negative() {
        return Err(invalid("ticketPrice", "must not be negative"));
    }
    Ok(())
}
