//! Session model: the independently-settable fields behind onboarding.

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use super::traits::{SessionStore, keys};
use crate::error::StorageError;

/// Persisted client session.
///
/// Every field is stored under its own key and may be set independently;
/// any combination is a valid, resumable state.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub address: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub verified: bool,
    pub token: Option<SecretString>,
}

impl Session {
    /// Read every session key from `store`.
    pub async fn load(store: &dyn SessionStore) -> Result<Self, StorageError> {
        Ok(Self {
            address: text(store.get(keys::ADDRESS).await?),
            email: text(store.get(keys::EMAIL).await?),
            name: text(store.get(keys::NAME).await?),
            verified: matches!(store.get(keys::VERIFIED).await?, Some(Value::Bool(true))),
            token: text(store.get(keys::TOKEN).await?).map(SecretString::from),
        })
    }

    /// Whether every onboarding field is populated.
    pub fn is_complete(&self) -> bool {
        self.address.is_some() && self.email.is_some() && self.name.is_some() && self.verified
    }

    pub fn token_str(&self) -> Option<&str> {
        self.token.as_ref().map(|t| t.expose_secret())
    }
}

/// Non-empty string content of a stored value.
fn text(value: Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    }
}
