//! tickit: wallet-gated onboarding and event ticketing client.

pub mod backend;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod onboarding;
pub mod presenter;
pub mod retry;
pub mod store;
pub mod wallet;

#[cfg(test)]
pub(crate) mod testing;
