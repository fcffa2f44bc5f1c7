//! WalletConnector: connect the wallet, find its address, log in.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{WalletCapability, WalletHandle, WalletLocator};
use crate::backend::BackendApi;
use crate::config::WalletConfig;
use crate::error::Result;
use crate::presenter::{Notification, Presenter};
use crate::retry::poll_until;
use crate::store::{SessionStore, keys};

/// How a call to [`WalletConnector::connect`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// Logged in; the address is persisted along with the token.
    Connected(String),
    /// No usable wallet. The install page was opened.
    InstallRedirected,
    /// Something failed after the address was known. The user was notified.
    Failed(String),
    /// Another attempt is still in flight; nothing was done.
    Busy,
}

/// Transient state of one connection attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletConnectionAttempt {
    pub connected: bool,
    pub address: Option<String>,
    pub retry_count: u32,
    pub loading: bool,
}

/// Holds a busy flag for the duration of one operation and clears it on
/// drop, however the operation ends.
pub(crate) struct LoadingGuard<'a>(&'a AtomicBool);

impl<'a> LoadingGuard<'a> {
    /// Set `flag`, or `None` when it is already set.
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Obtains a wallet address, registers it with the backend and persists it.
pub struct WalletConnector {
    locator: Arc<dyn WalletLocator>,
    backend: Arc<dyn BackendApi>,
    store: Arc<dyn SessionStore>,
    presenter: Arc<dyn Presenter>,
    config: WalletConfig,
    loading: AtomicBool,
}

impl WalletConnector {
    pub fn new(
        locator: Arc<dyn WalletLocator>,
        backend: Arc<dyn BackendApi>,
        store: Arc<dyn SessionStore>,
        presenter: Arc<dyn Presenter>,
        config: WalletConfig,
    ) -> Self {
        Self {
            locator,
            backend,
            store,
            presenter,
            config,
            loading: AtomicBool::new(false),
        }
    }

    /// Whether an attempt is in flight. Front-ends disable the connect
    /// control while this is true.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Run one connection attempt.
    ///
    /// Never returns an error: failures are reported to the presenter and
    /// folded into the outcome.
    pub async fn connect(&self) -> ConnectOutcome {
        let Some(_guard) = LoadingGuard::acquire(&self.loading) else {
            debug!("Wallet connection already in progress");
            return ConnectOutcome::Busy;
        };

        match self.try_connect().await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Wallet connection failed");
                self.presenter
                    .notify(Notification::error("Wallet connection failed"))
                    .await;
                ConnectOutcome::Failed(e.to_string())
            }
        }
    }

    async fn try_connect(&self) -> Result<ConnectOutcome> {
        let wallet = match self.locator.locate() {
            WalletHandle::Available(wallet) => wallet,
            WalletHandle::Unavailable => {
                return Ok(self.redirect_to_install("wallet not installed").await);
            }
        };

        let mut attempt = WalletConnectionAttempt {
            loading: true,
            connected: wallet.is_connected().await.unwrap_or(false),
            ..Default::default()
        };

        if !attempt.connected {
            if let Err(e) = wallet.connect(&self.config.provider_name).await {
                debug!(error = %e, "Wallet connect request failed");
                return Ok(self.redirect_to_install("connection rejected").await);
            }
            attempt.connected = true;
        }

        attempt.address = read_address(wallet.as_ref()).await;
        if attempt.address.is_none() {
            let outcome = poll_until(self.config.poll, |_| {
                let wallet = Arc::clone(&wallet);
                async move { read_address(wallet.as_ref()).await }
            })
            .await;
            attempt.retry_count = outcome.attempts();
            attempt.address = outcome.into_value();
        }
        debug!(?attempt, "Address lookup finished");

        let Some(address) = attempt.address else {
            return Ok(self.redirect_to_install("no address after retries").await);
        };

        let token = self.backend.wallet_login(&address).await?;
        if let Err(e) = self.persist_login(&address, &token).await {
            self.forget_login().await;
            return Err(e);
        }

        info!(address = %address, retries = attempt.retry_count, "Wallet connected");
        self.presenter
            .notify(Notification::success("Wallet connected"))
            .await;
        Ok(ConnectOutcome::Connected(address))
    }

    /// Address first, token last: a stored token always has its address.
    async fn persist_login(&self, address: &str, token: &SecretString) -> Result<()> {
        self.store
            .set(keys::ADDRESS, &Value::String(address.to_string()))
            .await?;
        self.store
            .set(keys::TOKEN, &Value::String(token.expose_secret().to_string()))
            .await?;
        Ok(())
    }

    /// Best-effort removal of a half-written login.
    async fn forget_login(&self) {
        for key in [keys::TOKEN, keys::ADDRESS] {
            if let Err(e) = self.store.remove(key).await {
                debug!(key, error = %e, "Could not clear partial login");
            }
        }
    }

    async fn redirect_to_install(&self, reason: &str) -> ConnectOutcome {
        info!(reason, url = %self.config.install_url, "Redirecting to wallet install page");
        self.presenter.open_new_tab(&self.config.install_url).await;
        ConnectOutcome::InstallRedirected
    }

    /// Disconnect the wallet and forget the address and token.
    ///
    /// A failing extension disconnect is ignored; local state is cleared
    /// regardless.
    pub async fn disconnect(&self) -> Result<()> {
        if let WalletHandle::Available(wallet) = self.locator.locate() {
            if let Err(e) = wallet.disconnect().await {
                debug!(error = %e, "Wallet disconnect failed, clearing session anyway");
            }
        }
        self.store.remove(keys::ADDRESS).await?;
        self.store.remove(keys::TOKEN).await?;
        info!("Wallet disconnected");
        Ok(())
    }
}

/// Address from the library cache, then from the extension itself.
async fn read_address(wallet: &dyn WalletCapability) -> Option<String> {
    let non_empty = |address: String| {
        let trimmed = address.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    };

    if let Some(address) = wallet.cached_account().and_then(|a| non_empty(a.address)) {
        return Some(address);
    }
    match wallet.account().await {
        Ok(account) => non_empty(account.address),
        Err(e) => {
            debug!(error = %e, "Wallet account not available yet");
            None
        }
    }
}
