//! Tests for configuration loading and layering.

use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use parley::auth::{provider_from_settings, Credential};
use parley::config::RelayConfig;
use parley::error::RelayError;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const CONFIG_ENV_VARS: [&str; 17] = [
    "PARLEY_CONFIG",
    "PROJECT_ENDPOINT",
    "AGENT_ID",
    "AGENT_API_VERSION",
    "AGENT_API_KEY",
    "AGENT_ACCESS_TOKEN",
    "AGENT_TOKEN_FILE",
    "AGENT_REQUEST_TIMEOUT_SECS",
    "PARLEY_POLL_INTERVAL_MS",
    "PARLEY_POLL_MAX_ATTEMPTS",
    "PARLEY_RUN_TIMEOUT_SECS",
    "PARLEY_MAX_TOKENS",
    "PARLEY_TEMPERATURE",
    "PARLEY_HOST",
    "PARLEY_PORT",
    "PARLEY_ALLOWED_ORIGINS",
    "RUST_LOG",
];

struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    fn capture(keys: &[&str]) -> Self {
        let saved = keys
            .iter()
            .map(|key| ((*key).to_string(), std::env::var(key).ok()))
            .collect();
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}

fn env_lock_guard() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn clear_env() {
    for key in CONFIG_ENV_VARS {
        std::env::remove_var(key);
    }
}

const FULL_FILE: &str = r#"
[agent]
endpoint = "https://file.example/api/projects/p"
agent_id = "asst_file"
api_version = "2025-05-01"
api_key = "file-key"
request_timeout_secs = 30

[poll]
interval_ms = 250
max_attempts = 40
timeout_secs = 90

[defaults]
max_tokens = 512
temperature = 0.2

[server]
host = "0.0.0.0"
port = 8080
allowed_origins = ["https://chat.example"]
"#;

#[test]
fn toml_file_overrides_defaults() {
    let config = RelayConfig::from_toml_str(FULL_FILE).unwrap();

    assert_eq!(
        config.agent.endpoint.as_deref(),
        Some("https://file.example/api/projects/p")
    );
    assert_eq!(config.agent.agent_id.as_deref(), Some("asst_file"));
    assert_eq!(config.agent.api_version, "2025-05-01");
    assert_eq!(config.agent.request_timeout, Duration::from_secs(30));
    assert_eq!(config.poll.interval, Duration::from_millis(250));
    assert_eq!(config.poll.max_attempts, Some(40));
    assert_eq!(config.poll.timeout, Some(Duration::from_secs(90)));
    assert_eq!(config.defaults.max_tokens, Some(512));
    assert_eq!(config.defaults.temperature, 0.2);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.allowed_origins, vec!["https://chat.example"]);
    assert!(config.is_agent_configured());
}

#[test]
fn partial_file_keeps_other_defaults() {
    let config = RelayConfig::from_toml_str("[server]\nport = 9000\n").unwrap();
    let defaults = RelayConfig::default();

    assert_eq!(config.server.port, 9000);
    assert_eq!(config.poll, defaults.poll);
    assert_eq!(config.defaults, defaults.defaults);
    assert!(!config.is_agent_configured());
}

#[test]
fn blank_file_values_count_as_missing() {
    let config = RelayConfig::from_toml_str("[agent]\nendpoint = \"\"\nagent_id = \"  \"\n").unwrap();
    assert!(config.agent.endpoint.is_none());
    assert!(config.agent.agent_id.is_none());
}

#[test]
fn unknown_keys_are_configuration_errors() {
    let err = RelayConfig::from_toml_str("[agent]\nendpont = \"typo\"\n").unwrap_err();
    assert!(matches!(err, RelayError::Configuration(_)));
    assert_eq!(err.status_code(), 500);
}

#[test]
fn missing_file_is_configuration_error() {
    let dir = TempDir::new().unwrap();
    let err = RelayConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, RelayError::Configuration(_)));
}

#[test]
fn env_overrides_file() {
    let _lock = env_lock_guard();
    let _guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    clear_env();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, FULL_FILE).unwrap();

    std::env::set_var("PARLEY_CONFIG", &path);
    std::env::set_var("PROJECT_ENDPOINT", "https://env.example/api/projects/p");
    std::env::set_var("PARLEY_POLL_MAX_ATTEMPTS", "0");
    std::env::set_var("PARLEY_PORT", "not-a-port");

    let config = RelayConfig::from_env().unwrap();

    assert_eq!(
        config.agent.endpoint.as_deref(),
        Some("https://env.example/api/projects/p")
    );
    assert_eq!(config.agent.agent_id.as_deref(), Some("asst_file"));
    assert_eq!(config.poll.max_attempts, None);
    assert_eq!(config.server.port, 8080);
}

#[test]
fn env_only_configuration() {
    let _lock = env_lock_guard();
    let _guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    clear_env();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.toml");
    std::fs::write(&path, "").unwrap();
    std::env::set_var("PARLEY_CONFIG", &path);
    std::env::set_var("PROJECT_ENDPOINT", "https://env.example");
    std::env::set_var("AGENT_ID", "asst_env");
    std::env::set_var("PARLEY_RUN_TIMEOUT_SECS", "45");

    let config = RelayConfig::from_env().unwrap();

    assert!(config.is_agent_configured());
    assert_eq!(config.poll.timeout, Some(Duration::from_secs(45)));
    assert_eq!(config.defaults.max_tokens, None);
}

#[tokio::test]
async fn token_file_takes_priority_over_keys() {
    let dir = TempDir::new().unwrap();
    let token_path = dir.path().join("token.toml");
    std::fs::write(&token_path, "access_token = \"from-file\"\n").unwrap();

    let raw = format!(
        "[agent]\napi_key = \"k\"\naccess_token = \"t\"\ntoken_file = {:?}\n",
        token_path.display().to_string()
    );
    let config = RelayConfig::from_toml_str(&raw).unwrap();

    let credential = provider_from_settings(&config.agent)
        .credential()
        .await
        .unwrap();
    assert_eq!(credential, Credential::Bearer("from-file".into()));
}

#[tokio::test]
async fn no_credentials_is_anonymous() {
    let config = RelayConfig::default();
    let credential = provider_from_settings(&config.agent)
        .credential()
        .await
        .unwrap();
    assert_eq!(credential, Credential::Anonymous);
}
