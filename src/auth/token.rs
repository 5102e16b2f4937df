use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bearer token for the agent service, as stored in a token file.
///
/// # Example
/// ```
/// use parley::auth::Token;
///
/// let token: Token = toml::from_str(
///     r#"
///     access_token = "eyJ0eXAi"
///     expires_at = "2030-01-01T00:00:00Z"
///     "#,
/// )
/// .unwrap();
/// assert!(!token.is_expired());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Token {
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .map(|exp| exp <= Utc::now())
            .unwrap_or(false)
    }
}
