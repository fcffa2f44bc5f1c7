//! `SessionStore` trait: JSON values under well-known keys.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StorageError;

/// Keys persisted by the client. Each holds one JSON-encoded value.
pub mod keys {
    pub const ADDRESS: &str = "address";
    pub const EMAIL: &str = "email";
    pub const NAME: &str = "name";
    pub const VERIFIED: &str = "verified";
    pub const TOKEN: &str = "token";
}

/// Durable key/value storage that survives restarts.
///
/// Values are stored JSON-encoded. Implementations return raw non-JSON
/// content as a JSON string rather than failing.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read the value under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Store `value` under `key`, replacing what was there.
    async fn set(&self, key: &str, value: &Value) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Decode a stored string: JSON when it parses, the raw text otherwise.
pub(crate) fn decode_raw(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
