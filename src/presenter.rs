//! User-visible surface: notifications, new tabs and redirects.

use std::sync::Mutex;

use async_trait::async_trait;

/// Severity of a user notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// A toast-style notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }
}

/// Front-end hooks the client drives.
#[async_trait]
pub trait Presenter: Send + Sync {
    /// Show a notification.
    async fn notify(&self, notification: Notification);

    /// Open `url` in a new tab (install pages and the like).
    async fn open_new_tab(&self, url: &str);

    /// Navigate to an in-app route.
    async fn navigate(&self, route: &str);
}

/// Presenter that only logs. Useful for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingPresenter;

#[async_trait]
impl Presenter for TracingPresenter {
    async fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => tracing::info!(message = %notification.message, "Notify"),
            NotificationKind::Error => tracing::warn!(message = %notification.message, "Notify"),
        }
    }

    async fn open_new_tab(&self, url: &str) {
        tracing::info!(url, "Open new tab");
    }

    async fn navigate(&self, route: &str) {
        tracing::info!(route, "Navigate");
    }
}

/// Something the presenter was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterEvent {
    Notified(Notification),
    OpenedTab(String),
    Navigated(String),
}

/// Presenter that records every call, for assertions.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    events: Mutex<Vec<PresenterEvent>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PresenterEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn opened_tabs(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                PresenterEvent::OpenedTab(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                PresenterEvent::Navigated(route) => Some(route),
                _ => None,
            })
            .collect()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                PresenterEvent::Notified(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: PresenterEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

#[async_trait]
impl Presenter for RecordingPresenter {
    async fn notify(&self, notification: Notification) {
        self.record(PresenterEvent::Notified(notification));
    }

    async fn open_new_tab(&self, url: &str) {
        self.record(PresenterEvent::OpenedTab(url.to_string()));
    }

    async fn navigate(&self, route: &str) {
        self.record(PresenterEvent::Navigated(route.to_string()));
    }
}
