//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::retry::PollPolicy;

/// Default wallet provider requested on connect.
pub const DEFAULT_WALLET_PROVIDER: &str = "Petra";

/// Install page opened when the wallet cannot be reached.
pub const DEFAULT_INSTALL_URL: &str = "https://petra.app";

/// Route the sequencer redirects to once onboarding is complete.
pub const DASHBOARD_ROUTE: &str = "/dashboard";

/// Backend client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST backend, without a trailing slash.
    pub backend_url: String,
    /// Per-request timeout.
    pub http_timeout: Duration,
    /// Location of the persisted session file.
    pub store_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:3000".to_string(),
            http_timeout: Duration::from_secs(30),
            store_path: default_store_path(),
        }
    }
}

impl ClientConfig {
    /// Load from `TICKIT_*` environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `var`.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = var("TICKIT_BACKEND_URL") {
            config.backend_url = normalize_base_url(&url)?;
        }
        if let Some(path) = var("TICKIT_STORE_PATH") {
            config.store_path = PathBuf::from(path);
        }
        if let Some(secs) = var("TICKIT_HTTP_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| ConfigError::InvalidValue {
                key: "TICKIT_HTTP_TIMEOUT_SECS".to_string(),
                message: format!("expected whole seconds, got {secs:?}"),
            })?;
            config.http_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

/// Wallet connection configuration.
#[derive(Debug, Clone)]
pub struct WalletConfig {
    /// Provider name passed to `connect`.
    pub provider_name: String,
    /// Page opened in a new tab when the wallet is missing or refuses.
    pub install_url: String,
    /// Address polling after connect.
    pub poll: PollPolicy,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            provider_name: DEFAULT_WALLET_PROVIDER.to_string(),
            install_url: DEFAULT_INSTALL_URL.to_string(),
            poll: PollPolicy::default(),
        }
    }
}

impl WalletConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(provider) = std::env::var("TICKIT_WALLET_PROVIDER") {
            config.provider_name = provider;
        }
        if let Ok(url) = std::env::var("TICKIT_INSTALL_URL") {
            config.install_url = url;
        }
        config
    }
}

fn default_store_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".tickit/session.json")
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidValue {
            key: "TICKIT_BACKEND_URL".to_string(),
            message: format!("expected an http(s) URL, got {raw:?}"),
        });
    }
    Ok(trimmed.to_string())
}
