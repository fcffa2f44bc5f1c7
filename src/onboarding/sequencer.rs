//! OnboardingSequencer: drives the four steps over the persisted session.

use std::sync::Arc;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicBool, Ordering};

use regex::Regex;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::state::OnboardingStep;
use crate::backend::BackendApi;
use crate::config::DASHBOARD_ROUTE;
use crate::error::{BackendError, OnboardingError};
use crate::presenter::{Notification, Presenter};
use crate::store::{Session, SessionStore, keys};
use crate::wallet::connector::LoadingGuard;
use crate::wallet::{ConnectOutcome, WalletConnector};

/// Length of the one-time code.
pub const OTP_LENGTH: usize = 4;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Result of a successful step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    /// The step that was just completed.
    pub completed: OnboardingStep,
    /// The step now shown, or `None` when onboarding is done.
    pub next: Option<OnboardingStep>,
}

/// Walks the user through wallet → email → name → OTP.
///
/// Exactly one step is active at a time: the first one the session has not
/// completed. A step can only be submitted while it is active. Completion is
/// re-checked after every step, and the dashboard redirect fires once.
/// Submissions do not overlap: a call made while another is in flight
/// fails with [`OnboardingError::SubmissionInProgress`].
pub struct OnboardingSequencer {
    session: RwLock<Session>,
    store: Arc<dyn SessionStore>,
    backend: Arc<dyn BackendApi>,
    presenter: Arc<dyn Presenter>,
    connector: WalletConnector,
    submitting: AtomicBool,
    redirected: AtomicBool,
}

impl OnboardingSequencer {
    /// Read the persisted session and redirect right away if it is already
    /// complete.
    pub async fn load(
        connector: WalletConnector,
        store: Arc<dyn SessionStore>,
        backend: Arc<dyn BackendApi>,
        presenter: Arc<dyn Presenter>,
    ) -> Result<Self, OnboardingError> {
        let session = Session::load(store.as_ref()).await?;
        let sequencer = Self {
            session: RwLock::new(session),
            store,
            backend,
            presenter,
            connector,
            submitting: AtomicBool::new(false),
            redirected: AtomicBool::new(false),
        };
        info!(step = ?sequencer.current_step().await, "Onboarding loaded");
        sequencer.evaluate().await;
        Ok(sequencer)
    }

    /// The step to show, or `None` once everything is done.
    pub async fn current_step(&self) -> Option<OnboardingStep> {
        OnboardingStep::current(&*self.session.read().await)
    }

    pub async fn session(&self) -> Session {
        self.session.read().await.clone()
    }

    pub fn connector(&self) -> &WalletConnector {
        &self.connector
    }

    /// Whether the dashboard redirect has fired.
    pub fn has_redirected(&self) -> bool {
        self.redirected.load(Ordering::SeqCst)
    }

    /// Wallet step: run the connector and record the address.
    pub async fn connect_wallet(&self) -> Result<StepOutcome, OnboardingError> {
        let _submitting = self.begin_submission()?;
        self.ensure_active(OnboardingStep::Wallet).await?;

        match self.connector.connect().await {
            ConnectOutcome::Connected(address) => {
                // The connector has already persisted the address and token.
                let token = Session::load(self.store.as_ref()).await?.token;
                {
                    let mut session = self.session.write().await;
                    session.address = Some(address);
                    session.token = token;
                }
                Ok(self.advance(OnboardingStep::Wallet).await)
            }
            other => Err(OnboardingError::WalletNotConnected(format!("{other:?}"))),
        }
    }

    /// Email step.
    pub async fn submit_email(&self, email: &str) -> Result<StepOutcome, OnboardingError> {
        let step = OnboardingStep::Email;
        let _submitting = self.begin_submission()?;
        self.ensure_active(step).await?;
        let email = email.trim();
        if !EMAIL_RE.is_match(email) {
            let reason = "expected an address like name@example.com";
            return Err(self.reject(step, "email", reason).await);
        }

        if let Err(e) = self.backend.submit_email(email).await {
            return Err(self.submission_failed(step, e).await);
        }
        self.persist(step, keys::EMAIL, Value::String(email.to_string()))
            .await?;
        self.session.write().await.email = Some(email.to_string());
        Ok(self.advance(step).await)
    }

    /// Name step.
    pub async fn submit_name(&self, name: &str) -> Result<StepOutcome, OnboardingError> {
        let step = OnboardingStep::Name;
        let _submitting = self.begin_submission()?;
        self.ensure_active(step).await?;
        let name = name.trim();
        if name.is_empty() {
            return Err(self.reject(step, "name", "must not be empty").await);
        }

        if let Err(e) = self.backend.submit_name(name).await {
            return Err(self.submission_failed(step, e).await);
        }
        self.persist(step, keys::NAME, Value::String(name.to_string()))
            .await?;
        self.session.write().await.name = Some(name.to_string());
        Ok(self.advance(step).await)
    }

    /// One-time code step.
    pub async fn submit_otp(&self, code: &str) -> Result<StepOutcome, OnboardingError> {
        let step = OnboardingStep::Otp;
        let _submitting = self.begin_submission()?;
        self.ensure_active(step).await?;
        let code = code.trim();
        if code.chars().count() != OTP_LENGTH || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(self.reject(step, "otp", "expected 4 letters or digits").await);
        }

        if let Err(e) = self.backend.verify_otp(code).await {
            return Err(self.submission_failed(step, e).await);
        }
        self.persist(step, keys::VERIFIED, Value::Bool(true)).await?;
        self.session.write().await.verified = true;
        self.presenter.notify(Notification::success("Verified")).await;
        Ok(self.advance(step).await)
    }

    fn begin_submission(&self) -> Result<LoadingGuard<'_>, OnboardingError> {
        LoadingGuard::acquire(&self.submitting).ok_or(OnboardingError::SubmissionInProgress)
    }

    async fn ensure_active(&self, step: OnboardingStep) -> Result<(), OnboardingError> {
        match self.current_step().await {
            Some(current) if current == step => Ok(()),
            current => Err(OnboardingError::StepNotActive {
                step: step.to_string(),
                current: current.map_or_else(|| "complete".to_string(), |s| s.to_string()),
            }),
        }
    }

    async fn persist(
        &self,
        step: OnboardingStep,
        key: &str,
        value: Value,
    ) -> Result<(), OnboardingError> {
        if let Err(e) = self.store.set(key, &value).await {
            warn!(%step, error = %e, "Failed to persist onboarding step");
            self.presenter
                .notify(Notification::error("Could not save your progress, please try again"))
                .await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn reject(&self, step: OnboardingStep, field: &str, reason: &str) -> OnboardingError {
        self.presenter
            .notify(Notification::error(format!("Invalid {field}: {reason}")))
            .await;
        warn!(%step, field, reason, "Rejected step input");
        OnboardingError::InvalidInput {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    async fn submission_failed(
        &self,
        step: OnboardingStep,
        source: BackendError,
    ) -> OnboardingError {
        warn!(%step, error = %source, "Onboarding step submission failed");
        let message = format!("Could not submit {step}, please try again");
        self.presenter.notify(Notification::error(message)).await;
        OnboardingError::Submission {
            step: step.to_string(),
            source,
        }
    }

    async fn advance(&self, completed: OnboardingStep) -> StepOutcome {
        let next = self.current_step().await;
        info!(%completed, next = ?next, "Onboarding step completed");
        self.evaluate().await;
        StepOutcome { completed, next }
    }

    /// Redirect to the dashboard once the session is complete.
    async fn evaluate(&self) {
        if !self.session.read().await.is_complete() {
            return;
        }
        if self
            .redirected
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            info!(route = DASHBOARD_ROUTE, "Onboarding complete");
            self.presenter.navigate(DASHBOARD_ROUTE).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::WalletConfig;
    use crate::presenter::{NotificationKind, RecordingPresenter};
    use crate::store::MemoryStore;
    use crate::testing::{FailingStore, FakeWallet, StubBackend};
    use crate::wallet::{FixedLocator, WalletHandle};

    struct Harness<S> {
        sequencer: OnboardingSequencer,
        backend: Arc<StubBackend>,
        store: Arc<S>,
        presenter: Arc<RecordingPresenter>,
    }

    async fn harness<S: SessionStore + 'static>(store: S, backend: StubBackend) -> Harness<S> {
        let backend = Arc::new(backend);
        let store = Arc::new(store);
        let presenter = Arc::new(RecordingPresenter::new());
        let connector = WalletConnector::new(
            Arc::new(FixedLocator(WalletHandle::Available(Arc::new(FakeWallet::new(
                "0xabc",
            ))))),
            backend.clone(),
            store.clone(),
            presenter.clone(),
            WalletConfig::default(),
        );
        let sequencer =
            OnboardingSequencer::load(connector, store.clone(), backend.clone(), presenter.clone())
                .await
                .unwrap();
        Harness {
            sequencer,
            backend,
            store,
            presenter,
        }
    }

    #[tokio::test]
    async fn fresh_session_starts_at_wallet() {
        let h = harness(MemoryStore::new(), StubBackend::new()).await;
        assert_eq!(h.sequencer.current_step().await, Some(OnboardingStep::Wallet));
        assert!(h.presenter.navigations().is_empty());
    }

    #[tokio::test]
    async fn resumes_at_name_step() {
        let store = MemoryStore::with_raw([
            ("address", "\"0xabc\""),
            ("email", "\"a@b.com\""),
            ("name", "\"\""),
            ("verified", "false"),
        ]);
        let h = harness(store, StubBackend::new()).await;
        assert_eq!(h.sequencer.current_step().await, Some(OnboardingStep::Name));
    }

    #[tokio::test]
    async fn complete_session_redirects_once_and_shows_nothing() {
        let store = MemoryStore::with_raw([
            ("address", "\"0xabc\""),
            ("email", "\"a@b.com\""),
            ("name", "\"Ada\""),
            ("verified", "true"),
        ]);
        let h = harness(store, StubBackend::new()).await;

        assert_eq!(h.sequencer.current_step().await, None);
        assert_eq!(h.presenter.navigations(), vec!["/dashboard".to_string()]);
        assert!(h.sequencer.has_redirected());

        // Nothing can be submitted after completion.
        let err = h.sequencer.submit_otp("1234").await.unwrap_err();
        assert!(matches!(err, OnboardingError::StepNotActive { .. }));
        assert_eq!(h.presenter.navigations().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn full_walkthrough() {
        let h = harness(MemoryStore::new(), StubBackend::new()).await;

        let out = h.sequencer.connect_wallet().await.unwrap();
        assert_eq!(out.next, Some(OnboardingStep::Email));

        let out = h.sequencer.submit_email(" a@b.com ").await.unwrap();
        assert_eq!(out.next, Some(OnboardingStep::Name));

        let out = h.sequencer.submit_name("Ada").await.unwrap();
        assert_eq!(out.next, Some(OnboardingStep::Otp));
        assert!(h.presenter.navigations().is_empty());

        let out = h.sequencer.submit_otp("12ab").await.unwrap();
        assert_eq!(
            out,
            StepOutcome {
                completed: OnboardingStep::Otp,
                next: None
            }
        );

        assert_eq!(h.presenter.navigations(), vec!["/dashboard".to_string()]);
        assert_eq!(
            h.backend.calls(),
            vec![
                "wallet_login:0xabc",
                "email:a@b.com",
                "name:Ada",
                "verify:12ab"
            ]
        );
        assert_eq!(h.store.raw("email").await.as_deref(), Some("\"a@b.com\""));
        assert_eq!(h.store.raw("verified").await.as_deref(), Some("true"));
        assert_eq!(h.sequencer.session().await.token_str(), Some("token-0xabc"));
    }

    #[tokio::test]
    async fn steps_cannot_be_skipped() {
        let h = harness(MemoryStore::new(), StubBackend::new()).await;

        let err = h.sequencer.submit_email("a@b.com").await.unwrap_err();
        assert!(matches!(
            err,
            OnboardingError::StepNotActive { ref step, ref current }
                if step == "email" && current == "wallet"
        ));
        assert!(h.backend.calls().is_empty());
    }

    #[tokio::test]
    async fn completed_steps_cannot_be_revisited() {
        let store = MemoryStore::with_raw([("address", "\"0xabc\""), ("email", "\"a@b.com\"")]);
        let h = harness(store, StubBackend::new()).await;

        assert!(h.sequencer.submit_email("c@d.com").await.is_err());
        assert!(h.sequencer.connect_wallet().await.is_err());
        assert_eq!(h.store.raw("email").await.as_deref(), Some("\"a@b.com\""));
    }

    #[tokio::test]
    async fn failed_submission_leaves_step_resubmittable() {
        let store = MemoryStore::with_raw([("address", "\"0xabc\"")]);
        let h = harness(store, StubBackend::failing_times(1)).await;

        let err = h.sequencer.submit_email("a@b.com").await.unwrap_err();
        assert!(matches!(err, OnboardingError::Submission { .. }));
        assert_eq!(h.sequencer.current_step().await, Some(OnboardingStep::Email));
        assert!(h.store.raw("email").await.is_none());
        let notes = h.presenter.notifications();
        assert_eq!(notes.last().map(|n| n.kind), Some(NotificationKind::Error));

        let out = h.sequencer.submit_email("a@b.com").await.unwrap();
        assert_eq!(out.next, Some(OnboardingStep::Name));
    }

    #[tokio::test]
    async fn invalid_input_makes_no_call() {
        let store = MemoryStore::with_raw([
            ("address", "\"0xabc\""),
            ("email", "\"a@b.com\""),
            ("name", "\"Ada\""),
        ]);
        let h = harness(store, StubBackend::new()).await;

        for code in ["123", "12345", "12 4", "12-4", ""] {
            let err = h.sequencer.submit_otp(code).await.unwrap_err();
            assert!(matches!(err, OnboardingError::InvalidInput { .. }), "code {code:?}");
        }
        assert!(h.backend.calls().is_empty());
        assert_eq!(h.sequencer.current_step().await, Some(OnboardingStep::Otp));
    }

    #[tokio::test]
    async fn rejects_malformed_email_and_blank_name() {
        let store = MemoryStore::with_raw([("address", "\"0xabc\"")]);
        let h = harness(store, StubBackend::new()).await;
        assert!(h.sequencer.submit_email("not-an-email").await.is_err());
        assert!(h.sequencer.submit_email("").await.is_err());

        h.sequencer.submit_email("a@b.com").await.unwrap();
        assert!(h.sequencer.submit_name("   ").await.is_err());
        assert_eq!(h.backend.calls(), vec!["email:a@b.com"]);
    }

    #[tokio::test(start_paused = true)]
    async fn wallet_failure_does_not_advance() {
        let h = harness(MemoryStore::new(), StubBackend::failing()).await;

        let err = h.sequencer.connect_wallet().await.unwrap_err();
        assert!(matches!(err, OnboardingError::WalletNotConnected(_)));
        assert_eq!(h.sequencer.current_step().await, Some(OnboardingStep::Wallet));
    }

    #[tokio::test]
    async fn failed_save_notifies_and_keeps_step() {
        let store = FailingStore::failing_on(&[keys::EMAIL]).with_raw([("address", "\"0xabc\"")]);
        let h = harness(store, StubBackend::new()).await;

        let err = h.sequencer.submit_email("a@b.com").await.unwrap_err();

        assert!(matches!(err, OnboardingError::Storage(_)));
        assert_eq!(h.sequencer.current_step().await, Some(OnboardingStep::Email));
        assert_eq!(h.sequencer.session().await.email, None);
        assert_eq!(h.store.keys().await, vec!["address"]);
        let notes = h.presenter.notifications();
        assert_eq!(notes.last().map(|n| n.kind), Some(NotificationKind::Error));
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_submissions_reach_the_backend_once() {
        let store = MemoryStore::with_raw([("address", "\"0xabc\"")]);
        let backend = StubBackend::new().with_latency(Duration::from_millis(100));
        let h = harness(store, backend).await;

        let (first, second) = tokio::join!(
            h.sequencer.submit_email("a@b.com"),
            h.sequencer.submit_email("c@d.com")
        );

        assert_eq!(first.unwrap().next, Some(OnboardingStep::Name));
        assert!(matches!(second, Err(OnboardingError::SubmissionInProgress)));
        assert_eq!(h.backend.calls(), vec!["email:a@b.com"]);

        let out = h.sequencer.submit_name("Ada").await.unwrap();
        assert_eq!(out.next, Some(OnboardingStep::Otp));
    }
}
