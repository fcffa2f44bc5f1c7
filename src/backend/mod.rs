//! REST backend contract.
//!
//! The backend is external; this module only speaks its HTTP contract.
//! `BackendApi` is the seam the wallet connector, the onboarding sequencer
//! and the dashboard depend on, so tests can substitute a stub.

pub mod http;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::Deserialize;

use crate::dashboard::model::{Event, NewEvent};
use crate::error::BackendError;

pub use http::HttpBackend;

/// Endpoint paths.
pub mod endpoints {
    pub const WALLET_LOGIN: &str = "/api/wallet/login";
    pub const EMAIL: &str = "/api/email";
    pub const NAME: &str = "/api/name";
    pub const VERIFY: &str = "/api/verify";
    pub const EVENTS: &str = "/api/events";
    pub const MY_TICKETS: &str = "/api/tickets/my";
}

/// Operations the client needs from the backend.
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// Register a wallet address. Returns the issued auth token.
    async fn wallet_login(&self, address: &str) -> Result<SecretString, BackendError>;

    async fn submit_email(&self, email: &str) -> Result<(), BackendError>;

    async fn submit_name(&self, name: &str) -> Result<(), BackendError>;

    /// Check a one-time code.
    async fn verify_otp(&self, otp: &str) -> Result<(), BackendError>;

    /// All events open for browsing.
    async fn list_events(&self) -> Result<Vec<Event>, BackendError>;

    /// Events the given address holds tickets for.
    async fn joined_events(&self, address: &str) -> Result<Vec<Event>, BackendError>;

    async fn create_event(&self, event: &NewEvent) -> Result<Event, BackendError>;
}

/// `POST /api/wallet/login` response: `{ "data": { "token": "..." } }`.
#[derive(Debug, Deserialize)]
pub(crate) struct LoginEnvelope {
    pub data: LoginData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginData {
    pub token: String,
}
