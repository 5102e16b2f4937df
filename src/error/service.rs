//! Errors raised while talking to the agent service.

use thiserror::Error;

use crate::auth::AuthError;
use crate::types::Role;

/// Transport-level failure of a single service call.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Service error (status {status}): {message}")]
    Status {
        status: u16,
        message: String,
        body: Option<serde_json::Value>,
    },

    #[error("Malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Unexpected response: {0}")]
    Protocol(String),
}

impl ServiceError {
    /// HTTP status reported by the service, if it answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Network(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// A failed gateway operation, tagged with the stage it failed at.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("agent lookup failed: {0}")]
    AgentLookup(#[source] ServiceError),

    #[error("thread creation failed: {0}")]
    ThreadCreation(#[source] ServiceError),

    #[error("{role} message submission failed: {source}")]
    MessageSubmission {
        role: Role,
        #[source]
        source: ServiceError,
    },

    #[error("run start failed: {0}")]
    RunStart(#[source] ServiceError),

    #[error("run poll failed: {0}")]
    RunPoll(#[source] ServiceError),

    #[error("message retrieval failed: {0}")]
    MessageRetrieval(#[source] ServiceError),
}

impl GatewayError {
    /// Short stage name for logs.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::AgentLookup(_) => "agent_lookup",
            Self::ThreadCreation(_) => "thread_creation",
            Self::MessageSubmission { .. } => "message_submission",
            Self::RunStart(_) => "run_start",
            Self::RunPoll(_) => "run_poll",
            Self::MessageRetrieval(_) => "message_retrieval",
        }
    }

    pub fn public_message(&self) -> &'static str {
        match self {
            Self::AgentLookup(_) => "Failed to get agent",
            Self::ThreadCreation(_) => "Failed to create thread",
            Self::MessageSubmission {
                role: Role::User, ..
            } => "Failed to send user message",
            Self::MessageSubmission {
                role: Role::Assistant,
                ..
            } => "Failed to send assistant message",
            Self::RunStart(_) => "Failed to start agent run",
            Self::RunPoll(_) => "Failed to poll agent run",
            Self::MessageRetrieval(_) => "Failed to retrieve messages",
        }
    }

    /// The underlying transport failure.
    pub fn service_error(&self) -> &ServiceError {
        match self {
            Self::AgentLookup(source)
            | Self::ThreadCreation(source)
            | Self::RunStart(source)
            | Self::RunPoll(source)
            | Self::MessageRetrieval(source)
            | Self::MessageSubmission { source, .. } => source,
        }
    }
}
