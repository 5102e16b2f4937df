use thiserror::Error;

/// Failures while obtaining a credential for the agent service.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token file not found: {0}")]
    MissingTokenFile(String),
    #[error("Token expired at {0}")]
    Expired(String),
    #[error("Invalid credential: {0}")]
    Invalid(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for AuthError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<toml::de::Error> for AuthError {
    fn from(error: toml::de::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}
