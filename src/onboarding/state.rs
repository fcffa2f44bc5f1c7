//! Onboarding steps: which one the user is on, derived from the session.

use serde::{Deserialize, Serialize};

use crate::store::Session;

/// The onboarding steps, in the only order they can be completed.
///
/// Progresses linearly: Wallet → Email → Name → Otp. There is no terminal
/// variant; "no current step" means onboarding is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    Wallet,
    Email,
    Name,
    Otp,
}

impl OnboardingStep {
    pub const ORDER: [OnboardingStep; 4] = [Self::Wallet, Self::Email, Self::Name, Self::Otp];

    /// The first step the session has not completed, if any.
    pub fn current(session: &Session) -> Option<OnboardingStep> {
        Self::ORDER
            .into_iter()
            .find(|step| !step.is_satisfied_by(session))
    }

    /// Whether the session holds this step's result.
    pub fn is_satisfied_by(&self, session: &Session) -> bool {
        match self {
            Self::Wallet => session.address.is_some(),
            Self::Email => session.email.is_some(),
            Self::Name => session.name.is_some(),
            Self::Otp => session.verified,
        }
    }
}

impl std::fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Wallet => "wallet",
            Self::Email => "email",
            Self::Name => "name",
            Self::Otp => "otp",
        };
        write!(f, "{s}")
    }
}
