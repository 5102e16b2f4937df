//! Shared HTTP client construction and response decoding.

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::{RelayError, ServiceError};

/// Header carrying a per-request id the service echoes in its logs.
pub const CLIENT_REQUEST_ID: &str = "x-ms-client-request-id";

/// Build the reqwest client used for one upstream service.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, RelayError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| RelayError::configuration(format!("Failed to build HTTP client: {e}")))
}

/// Decode a JSON body, turning non-2xx replies into [`ServiceError::Status`].
pub async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ServiceError> {
    let status = resp.status().as_u16();
    let body = resp.text().await?;
    if !(200..300).contains(&status) {
        return Err(status_to_error(status, &body));
    }
    Ok(serde_json::from_str(&body)?)
}

/// Build a status error, pulling the service's own message out of the body.
///
/// Azure-style bodies look like `{"error": {"code": "...", "message": "..."}}`.
pub fn status_to_error(status: u16, body: &str) -> ServiceError {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|v| v.get("error"))
        .and_then(|e| match e {
            serde_json::Value::String(message) => Some(message.clone()),
            other => other
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string),
        })
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("HTTP {status}")
            } else {
                body.to_string()
            }
        });
    ServiceError::Status {
        status,
        message,
        body: parsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_uses_nested_message() {
        let err = status_to_error(
            404,
            r#"{"error": {"code": "NotFound", "message": "No assistant found"}}"#,
        );
        match err {
            ServiceError::Status {
                status,
                message,
                body,
            } => {
                assert_eq!(status, 404);
                assert_eq!(message, "No assistant found");
                assert_eq!(body.unwrap()["error"]["code"], "NotFound");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[test]
    fn status_error_accepts_flat_error_string() {
        let err = status_to_error(400, r#"{"error": "bad thing"}"#);
        assert!(matches!(err, ServiceError::Status { ref message, .. } if message == "bad thing"));
    }

    #[test]
    fn status_error_falls_back_to_raw_body() {
        let err = status_to_error(502, "upstream exploded");
        assert!(
            matches!(err, ServiceError::Status { ref message, body: None, .. } if message == "upstream exploded")
        );

        let empty = status_to_error(503, "");
        assert!(matches!(empty, ServiceError::Status { ref message, .. } if message == "HTTP 503"));
    }
}
