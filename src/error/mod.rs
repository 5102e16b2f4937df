//! Error types for parley.

pub mod service;

pub use service::{GatewayError, ServiceError};

use thiserror::Error;

use crate::types::RunStatus;

/// Outcome of a relay turn that did not produce a response.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Agent run {run_id} failed")]
    RunExecution {
        run_id: String,
        detail: Option<serde_json::Value>,
    },

    #[error("Agent run {run_id} still {status} after {attempts} polls ({elapsed_ms}ms)")]
    RunTimeout {
        run_id: String,
        status: RunStatus,
        attempts: u32,
        elapsed_ms: u64,
    },

    #[error("Request cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Broad error category, used to pick the HTTP status and log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad input, correctable by the caller.
    Validation,
    /// Deployment misconfiguration, correctable by the operator.
    Configuration,
    /// The agent service failed at some stage.
    Upstream,
    Timeout,
    Cancelled,
    Internal,
}

impl RelayError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Gateway(_) | Self::RunExecution { .. } => ErrorCategory::Upstream,
            Self::RunTimeout { .. } => ErrorCategory::Timeout,
            Self::Cancelled => ErrorCategory::Cancelled,
            Self::Io(_) | Self::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// HTTP status code reported to the caller.
    pub fn status_code(&self) -> u16 {
        match self.category() {
            ErrorCategory::Validation => 400,
            ErrorCategory::Timeout => 504,
            ErrorCategory::Cancelled => 503,
            ErrorCategory::Configuration | ErrorCategory::Upstream | ErrorCategory::Internal => {
                500
            }
        }
    }

    /// Message shown to the person chatting. Never includes transport detail.
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(message) | Self::Configuration(message) => message.clone(),
            Self::Gateway(err) => err.public_message().to_string(),
            Self::RunExecution { .. } => "Agent run failed".to_string(),
            Self::RunTimeout { .. } => "Agent run timed out".to_string(),
            Self::Cancelled => "Request cancelled".to_string(),
            Self::Io(_) | Self::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// Service-reported detail attached to the error response, if any.
    pub fn details(&self) -> Option<&serde_json::Value> {
        match self {
            Self::RunExecution { detail, .. } => detail.as_ref(),
            _ => None,
        }
    }
}

/// Errors from [`crate::client::RelayClient`].
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx reply; `message` is the server's `error` field when present.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, RelayError>;
