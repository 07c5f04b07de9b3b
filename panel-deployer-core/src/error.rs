//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

// Re-export library error type
pub use panel_deployer_provider::ProviderError;

/// Core layer error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// The session could not be established within the connect timeout
    #[error("Connection to {host} timed out after {timeout_secs}s")]
    ConnectTimeout { host: String, timeout_secs: u64 },

    /// The remote host rejected the credentials
    #[error("Authentication failed for {username}@{host}")]
    AuthFailed { host: String, username: String },

    /// Transport-level failure (DNS, refused connection, dropped channel)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// A remote command exited non-zero
    #[error("Command '{label}' failed (exit {exit_code:?}): {stderr}")]
    CommandFailed {
        label: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// A remote command did not finish in time
    #[error("Command '{label}' timed out after {timeout_secs}s")]
    CommandTimedOut { label: String, timeout_secs: u64 },

    /// Remote path does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Remote path already exists
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Required configuration is missing
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Remote or local file I/O failure other than not-found
    #[error("Remote I/O error: {0}")]
    RemoteIo(String),

    /// serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The operation was cancelled before it completed
    #[error("Operation cancelled")]
    Cancelled,

    /// Provider error (converting from library)
    #[error("{0}")]
    Provider(#[from] ProviderError),
}

impl CoreError {
    /// Whether it is expected behavior (user input, missing path, etc.), used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method simultaneously when new variants are added.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::NotFound(_)
            | Self::AlreadyExists(_)
            | Self::Configuration(_)
            | Self::ValidationError(_)
            | Self::AuthFailed { .. }
            | Self::Cancelled => true,
            Self::Provider(e) => e.is_expected(),
            _ => false,
        }
    }

    /// Whether the error means the session itself is unusable.
    ///
    /// Connectivity errors are fatal to the current operation and never retried within it.
    #[must_use]
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            Self::ConnectTimeout { .. } | Self::AuthFailed { .. } | Self::NetworkError(_)
        )
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::SerializationError(e.to_string())
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
