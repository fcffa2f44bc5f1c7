//! Error types for tickit.

use reqwest::StatusCode;

/// Error type for a wallet login: the backend call or persisting its result.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Session store errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to read store at {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Failed to write store at {path}: {reason}")]
    Write { path: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised by a wallet capability.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("Connection to {provider} rejected: {reason}")]
    ConnectionRejected { provider: String, reason: String },

    #[error("Wallet is not connected")]
    NotConnected,

    #[error("Account unavailable: {0}")]
    AccountUnavailable(String),
}

/// Backend (REST) errors.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Request to {endpoint} failed: {reason}")]
    RequestFailed { endpoint: String, reason: String },

    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: StatusCode,
        body: String,
    },

    #[error("Invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },
}

/// Onboarding step errors.
#[derive(Debug, thiserror::Error)]
pub enum OnboardingError {
    #[error("Step {step} is not active (current: {current})")]
    StepNotActive { step: String, current: String },

    #[error("Another step submission is in progress")]
    SubmissionInProgress,

    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Wallet connection did not complete: {0}")]
    WalletNotConnected(String),

    #[error("Step {step} submission failed: {source}")]
    Submission {
        step: String,
        #[source]
        source: BackendError,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Event dashboard errors.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Wallet not connected")]
    WalletNotConnected,

    #[error("Invalid event field {field}: {reason}")]
    InvalidDraft { field: String, reason: String },

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type alias for wallet login.
pub type Result<T> = std::result::Result<T, Error>;
