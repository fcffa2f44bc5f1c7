//! Onboarding: the gated, resumable sign-up flow.
//!
//! A new user walks four steps in fixed order: connect a wallet, confirm an
//! email, give a name, enter a one-time code. Each step persists its result
//! before the next one opens, so a restart resumes where the user left off.
//! Once all four are done the user is sent to the dashboard.

pub mod sequencer;
pub mod state;

pub use sequencer::{OnboardingSequencer, StepOutcome};
pub use state::OnboardingStep;
