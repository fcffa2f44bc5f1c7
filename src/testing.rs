//! Test doubles shared by unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::SecretString;
use serde_json::Value;

use crate::backend::BackendApi;
use crate::dashboard::model::{Event, NewEvent};
use crate::error::{BackendError, StorageError, WalletError};
use crate::store::{MemoryStore, SessionStore};
use crate::wallet::{AccountInfo, WalletCapability};

/// Scriptable wallet extension.
pub struct FakeWallet {
    address: String,
    cached: Option<String>,
    reject_connect: bool,
    connected: AtomicBool,
    /// Number of `account()` calls that fail before the address shows up.
    address_after: u32,
    account_calls: AtomicU32,
    connect_calls: AtomicU32,
}

impl FakeWallet {
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
            cached: None,
            reject_connect: false,
            connected: AtomicBool::new(false),
            address_after: 0,
            account_calls: AtomicU32::new(0),
            connect_calls: AtomicU32::new(0),
        }
    }

    pub fn rejecting() -> Self {
        Self {
            reject_connect: true,
            ..Self::new("0xabc")
        }
    }

    pub fn already_connected(self) -> Self {
        self.connected.store(true, Ordering::SeqCst);
        self
    }

    pub fn with_cached(mut self, address: &str) -> Self {
        self.cached = Some(address.to_string());
        self
    }

    pub fn address_after(mut self, failures: u32) -> Self {
        self.address_after = failures;
        self
    }

    pub fn account_calls(&self) -> u32 {
        self.account_calls.load(Ordering::SeqCst)
    }

    pub fn connect_calls(&self) -> u32 {
        self.connect_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletCapability for FakeWallet {
    async fn connect(&self, provider: &str) -> Result<(), WalletError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        if self.reject_connect {
            return Err(WalletError::ConnectionRejected {
                provider: provider.to_string(),
                reason: "user declined".to_string(),
            });
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn account(&self) -> Result<AccountInfo, WalletError> {
        let call = self.account_calls.fetch_add(1, Ordering::SeqCst);
        if call < self.address_after {
            return Err(WalletError::AccountUnavailable("not ready".to_string()));
        }
        Ok(AccountInfo {
            address: self.address.clone(),
        })
    }

    async fn disconnect(&self) -> Result<(), WalletError> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn is_connected(&self) -> Result<bool, WalletError> {
        Ok(self.connected.load(Ordering::SeqCst))
    }

    fn cached_account(&self) -> Option<AccountInfo> {
        self.cached.clone().map(|address| AccountInfo { address })
    }
}

/// Backend that records calls and fails on demand.
pub struct StubBackend {
    calls: Mutex<Vec<String>>,
    failures_left: AtomicU32,
    events: Vec<Event>,
    latency: Duration,
}

impl StubBackend {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failures_left: AtomicU32::new(0),
            events: Vec::new(),
            latency: Duration::ZERO,
        }
    }

    /// Every call fails.
    pub fn failing() -> Self {
        Self {
            failures_left: AtomicU32::new(u32::MAX),
            ..Self::new()
        }
    }

    /// The next `n` calls fail, later ones succeed.
    pub fn failing_times(n: u32) -> Self {
        Self {
            failures_left: AtomicU32::new(n),
            ..Self::new()
        }
    }

    pub fn with_events(mut self, events: Vec<Event>) -> Self {
        self.events = events;
        self
    }

    /// Every call sleeps `latency` before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    async fn record(&self, endpoint: &str, call: String) -> Result<(), BackendError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(BackendError::Status {
                endpoint: endpoint.to_string(),
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: "stub failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl BackendApi for StubBackend {
    async fn wallet_login(&self, address: &str) -> Result<SecretString, BackendError> {
        self.record("/api/wallet/login", format!("wallet_login:{address}")).await?;
        Ok(SecretString::from(format!("token-{address}")))
    }

    async fn submit_email(&self, email: &str) -> Result<(), BackendError> {
        self.record("/api/email", format!("email:{email}")).await
    }

    async fn submit_name(&self, name: &str) -> Result<(), BackendError> {
        self.record("/api/name", format!("name:{name}")).await
    }

    async fn verify_otp(&self, otp: &str) -> Result<(), BackendError> {
        self.record("/api/verify", format!("verify:{otp}")).await
    }

    async fn list_events(&self) -> Result<Vec<Event>, BackendError> {
        self.record("/api/events", "list_events".to_string()).await?;
        Ok(self.events.clone())
    }

    async fn joined_events(&self, address: &str) -> Result<Vec<Event>, BackendError> {
        self.record("/api/tickets/my", format!("joined_events:{address}")).await?;
        Ok(self.events.clone())
    }

    async fn create_event(&self, event: &NewEvent) -> Result<Event, BackendError> {
        self.record("/api/events", format!("create_event:{}", event.event_name)).await?;
        Ok(Event {
            id: "created".to_string(),
            event_name: event.event_name.clone(),
            event_description: event.event_description.clone(),
            mode: event.mode.clone(),
            date: event.date,
            time: event.time,
            location: event.location.clone(),
            ticket_price: event.ticket_price,
            permission: event.permission,
            image_url: event.image_url.clone(),
            max_seats: event.max_seats,
            sold_seats: 0,
            host_address: event.host_address.clone(),
            event_blockchain_id: event.event_blockchain_id,
        })
    }
}

/// In-memory store whose writes to chosen keys always fail.
pub struct FailingStore {
    inner: MemoryStore,
    failing: Vec<&'static str>,
}

impl FailingStore {
    pub fn failing_on(keys: &[&'static str]) -> Self {
        Self {
            inner: MemoryStore::new(),
            failing: keys.to_vec(),
        }
    }

    /// Seed the underlying store with already-encoded entries.
    pub fn with_raw<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, &'static str)>,
    {
        self.inner = MemoryStore::with_raw(entries);
        self
    }

    pub async fn keys(&self) -> Vec<String> {
        self.inner.keys().await
    }
}

#[async_trait]
impl SessionStore for FailingStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &Value) -> Result<(), StorageError> {
        if self.failing.iter().any(|k| *k == key) {
            return Err(StorageError::Write {
                path: "memory".to_string(),
                reason: "disk full".to_string(),
            });
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key).await
    }
}
