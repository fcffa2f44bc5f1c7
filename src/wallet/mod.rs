//! Wallet capability: the browser-injected wallet, behind a narrow trait.
//!
//! The capability is resolved once through a [`WalletLocator`]. A missing
//! wallet is the explicit [`WalletHandle::Unavailable`] variant rather than
//! an error.

pub mod connector;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::WalletError;

pub use connector::{ConnectOutcome, WalletConnector};

/// Account reported by the wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub address: String,
}

/// Operations exposed by a wallet extension.
#[async_trait]
pub trait WalletCapability: Send + Sync {
    /// Ask the user to connect `provider`.
    async fn connect(&self, provider: &str) -> Result<(), WalletError>;

    /// Read the connected account straight from the extension.
    async fn account(&self) -> Result<AccountInfo, WalletError>;

    async fn disconnect(&self) -> Result<(), WalletError>;

    async fn is_connected(&self) -> Result<bool, WalletError>;

    /// Account already cached by the connection library, if it has caught
    /// up with the extension yet.
    fn cached_account(&self) -> Option<AccountInfo> {
        None
    }
}

/// Result of looking up the wallet.
#[derive(Clone)]
pub enum WalletHandle {
    Available(Arc<dyn WalletCapability>),
    Unavailable,
}

impl std::fmt::Debug for WalletHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available(_) => write!(f, "WalletHandle::Available"),
            Self::Unavailable => write!(f, "WalletHandle::Unavailable"),
        }
    }
}

/// Finds the wallet capability, if one is installed.
pub trait WalletLocator: Send + Sync {
    fn locate(&self) -> WalletHandle;
}

/// Locator that always returns the same handle.
pub struct FixedLocator(pub WalletHandle);

impl WalletLocator for FixedLocator {
    fn locate(&self) -> WalletHandle {
        self.0.clone()
    }
}

/// A wallet with a fixed address, for headless use.
///
/// Stands in for the extension when the address is known up front (the
/// CLI reads it from `TICKIT_WALLET_ADDRESS`).
pub struct StaticWallet {
    address: String,
    connected: AtomicBool,
}

impl StaticWallet {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            connected: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl WalletCapability for StaticWallet {
    async fn connect(&self, _provider: &str) -> Result<(), WalletError> {
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn account(&self) -> Result<AccountInfo, WalletError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(WalletError::NotConnected);
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
}

/// Locator backed by `TICKIT_WALLET_ADDRESS`.
pub struct EnvLocator;

impl WalletLocator for EnvLocator {
    fn locate(&self) -> WalletHandle {
        match std::env::var("TICKIT_WALLET_ADDRESS") {
            Ok(address) if !address.trim().is_empty() => {
                WalletHandle::Available(Arc::new(StaticWallet::new(address.trim())))
            }
            _ => WalletHandle::Unavailable,
        }
    }
}

/// Shorten an address for display: `0x1234...abcd`.
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}
