//! Credentials for the agent service.
//!
//! The relay never mints credentials itself. A [`CredentialProvider`] hands
//! out whatever the deployment supplies: a static API key, a static bearer
//! token, or a token file refreshed by something else.

pub mod error;
pub mod file;
pub mod token;

pub use error::AuthError;
pub use file::FileTokenCredential;
pub use token::Token;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::RequestBuilder;

use crate::config::AgentSettings;

/// A credential ready to attach to a request.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// `Authorization: Bearer <token>`.
    Bearer(String),
    /// `api-key: <key>`.
    ApiKey(String),
    Anonymous,
}

impl Credential {
    /// Attach this credential to an outgoing request.
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::Bearer(token) => request.bearer_auth(token),
            Self::ApiKey(key) => request.header("api-key", key),
            Self::Anonymous => request,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearer(_) => f.write_str("Bearer(..)"),
            Self::ApiKey(_) => f.write_str("ApiKey(..)"),
            Self::Anonymous => f.write_str("Anonymous"),
        }
    }
}

/// Source of credentials, consulted once per outgoing request.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn credential(&self) -> Result<Credential, AuthError>;
}

/// A credential fixed at startup.
#[derive(Debug, Clone)]
pub struct StaticCredential(Credential);

impl StaticCredential {
    pub fn new(credential: Credential) -> Self {
        Self(credential)
    }

    pub fn anonymous() -> Self {
        Self(Credential::Anonymous)
    }
}

#[async_trait]
impl CredentialProvider for StaticCredential {
    async fn credential(&self) -> Result<Credential, AuthError> {
        Ok(self.0.clone())
    }
}

/// Pick a credential provider from configuration.
///
/// Order: token file, access token, API key, anonymous.
pub fn provider_from_settings(settings: &AgentSettings) -> Arc<dyn CredentialProvider> {
    if let Some(ref path) = settings.token_file {
        return Arc::new(FileTokenCredential::new(path.clone()));
    }
    if let Some(ref token) = settings.access_token {
        return Arc::new(StaticCredential::new(Credential::Bearer(token.clone())));
    }
    if let Some(ref key) = settings.api_key {
        return Arc::new(StaticCredential::new(Credential::ApiKey(key.clone())));
    }
    tracing::warn!("No agent service credential configured; sending anonymous requests");
    Arc::new(StaticCredential::anonymous())
}
