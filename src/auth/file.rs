use std::path::PathBuf;

use async_trait::async_trait;

use super::error::AuthError;
use super::token::Token;
use super::{Credential, CredentialProvider};

/// Reads a bearer token from a TOML file on every request.
///
/// The file is re-read each time so an external process can rotate the
/// token without restarting the server.
#[derive(Debug, Clone)]
pub struct FileTokenCredential {
    path: PathBuf,
}

impl FileTokenCredential {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    async fn load(&self) -> Result<Token, AuthError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(AuthError::MissingTokenFile(self.path.display().to_string()))
            }
            Err(err) => return Err(AuthError::Io(err.to_string())),
        };
        let token: Token = toml::from_str(&raw)?;
        if token.access_token.trim().is_empty() {
            return Err(AuthError::Invalid("empty access_token".into()));
        }
        Ok(token)
    }
}

#[async_trait]
impl CredentialProvider for FileTokenCredential {
    async fn credential(&self) -> Result<Credential, AuthError> {
        let token = self.load().await?;
        if token.is_expired() {
            let expired_at = token
                .expires_at
                .map(|exp| exp.to_rfc3339())
                .unwrap_or_default();
            return Err(AuthError::Expired(expired_at));
        }
        Ok(Credential::Bearer(token.access_token))
    }
}
