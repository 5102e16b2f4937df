//! Configuration (layered: code > env > config file > defaults).
//!
//! Resolved once at process start and handed to the relay and server.
//! Nothing reads the environment mid-request.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{RelayError, Result};
use crate::relay::PollPolicy;

const DEFAULT_API_VERSION: &str = "v1";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
const DEFAULT_TEMPERATURE: f64 = 0.7;
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_ALLOWED_ORIGINS: [&str; 4] = [
    "http://localhost:3000",
    "http://localhost:5173",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:5173",
];
const CONFIG_PATH_ENV: &str = "PARLEY_CONFIG";

/// Full process configuration.
#[derive(Debug, Clone, Default)]
pub struct RelayConfig {
    pub agent: AgentSettings,
    pub poll: PollPolicy,
    pub defaults: TurnDefaults,
    pub server: ServerSettings,
}

/// Where the agent service lives and how to reach it.
#[derive(Clone)]
pub struct AgentSettings {
    pub endpoint: Option<String>,
    pub agent_id: Option<String>,
    pub api_version: String,
    pub api_key: Option<String>,
    pub access_token: Option<String>,
    pub token_file: Option<PathBuf>,
    pub request_timeout: Duration,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            agent_id: None,
            api_version: DEFAULT_API_VERSION.to_string(),
            api_key: None,
            access_token: None,
            token_file: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl fmt::Debug for AgentSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentSettings")
            .field("endpoint", &self.endpoint)
            .field("agent_id", &self.agent_id)
            .field("api_version", &self.api_version)
            .field("api_key", &self.api_key.as_ref().map(|_| ".."))
            .field("access_token", &self.access_token.as_ref().map(|_| ".."))
            .field("token_file", &self.token_file)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Values used when a chat request leaves them out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnDefaults {
    /// Completion cap for runs whose request sets none. `None` leaves runs uncapped.
    pub max_tokens: Option<u32>,
    pub temperature: f64,
}

impl Default for TurnDefaults {
    fn default() -> Self {
        Self {
            max_tokens: None,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(|o| o.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    agent: FileAgent,
    poll: FilePoll,
    defaults: FileDefaults,
    server: FileServer,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileAgent {
    endpoint: Option<String>,
    agent_id: Option<String>,
    api_version: Option<String>,
    api_key: Option<String>,
    access_token: Option<String>,
    token_file: Option<PathBuf>,
    request_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FilePoll {
    interval_ms: Option<u64>,
    max_attempts: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileDefaults {
    max_tokens: Option<u32>,
    temperature: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileServer {
    host: Option<String>,
    port: Option<u16>,
    allowed_origins: Option<Vec<String>>,
}

impl RelayConfig {
    /// Load `.env`, the config file (if any), then environment overrides.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let mut config = match config_path() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env_from(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Defaults overlaid with a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            RelayError::configuration(format!("Cannot read {}: {e}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), "Loading config file");
        Self::from_toml_str(&raw)
    }

    /// Defaults overlaid with TOML text.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let file: FileConfig = toml::from_str(raw)
            .map_err(|e| RelayError::configuration(format!("Invalid config file: {e}")))?;
        let mut config = Self::default();
        config.merge_file(file);
        Ok(config)
    }

    fn merge_file(&mut self, file: FileConfig) {
        let agent = &mut self.agent;
        set_non_empty(&mut agent.endpoint, file.agent.endpoint);
        set_non_empty(&mut agent.agent_id, file.agent.agent_id);
        set_non_empty(&mut agent.api_key, file.agent.api_key);
        set_non_empty(&mut agent.access_token, file.agent.access_token);
        if let Some(version) = file.agent.api_version {
            agent.api_version = version;
        }
        if let Some(path) = file.agent.token_file {
            agent.token_file = Some(path);
        }
        if let Some(secs) = file.agent.request_timeout_secs {
            agent.request_timeout = Duration::from_secs(secs);
        }

        if let Some(ms) = file.poll.interval_ms {
            self.poll.interval = Duration::from_millis(ms);
        }
        if let Some(attempts) = file.poll.max_attempts {
            self.poll.max_attempts = (attempts > 0).then_some(attempts);
        }
        if let Some(secs) = file.poll.timeout_secs {
            self.poll.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        if let Some(max_tokens) = file.defaults.max_tokens {
            self.defaults.max_tokens = (max_tokens > 0).then_some(max_tokens);
        }
        if let Some(temperature) = file.defaults.temperature {
            self.defaults.temperature = temperature;
        }

        if let Some(host) = file.server.host {
            self.server.host = host;
        }
        if let Some(port) = file.server.port {
            self.server.port = port;
        }
        if let Some(origins) = file.server.allowed_origins {
            self.server.allowed_origins = origins;
        }
    }

    /// Overlay environment variables read through `lookup`.
    ///
    /// Empty values count as unset. Unparseable numbers are logged and ignored.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let string_mappings: [(&str, &mut Option<String>); 4] = [
            ("PROJECT_ENDPOINT", &mut self.agent.endpoint),
            ("AGENT_ID", &mut self.agent.agent_id),
            ("AGENT_API_KEY", &mut self.agent.api_key),
            ("AGENT_ACCESS_TOKEN", &mut self.agent.access_token),
        ];
        for (env_var, slot) in string_mappings {
            if let Some(value) = get(env_var) {
                *slot = Some(value);
            }
        }

        if let Some(version) = get("AGENT_API_VERSION") {
            self.agent.api_version = version;
        }
        if let Some(path) = get("AGENT_TOKEN_FILE") {
            self.agent.token_file = Some(PathBuf::from(path));
        }
        if let Some(secs) = parse_env::<u64>(&get, "AGENT_REQUEST_TIMEOUT_SECS") {
            self.agent.request_timeout = Duration::from_secs(secs);
        }

        if let Some(ms) = parse_env::<u64>(&get, "PARLEY_POLL_INTERVAL_MS") {
            self.poll.interval = Duration::from_millis(ms);
        }
        if let Some(attempts) = parse_env::<u32>(&get, "PARLEY_POLL_MAX_ATTEMPTS") {
            self.poll.max_attempts = (attempts > 0).then_some(attempts);
        }
        if let Some(secs) = parse_env::<u64>(&get, "PARLEY_RUN_TIMEOUT_SECS") {
            self.poll.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        if let Some(max_tokens) = parse_env::<u32>(&get, "PARLEY_MAX_TOKENS") {
            self.defaults.max_tokens = (max_tokens > 0).then_some(max_tokens);
        }
        if let Some(temperature) = parse_env::<f64>(&get, "PARLEY_TEMPERATURE") {
            self.defaults.temperature = temperature;
        }

        if let Some(host) = get("PARLEY_HOST") {
            self.server.host = host;
        }
        if let Some(port) = parse_env::<u16>(&get, "PARLEY_PORT") {
            self.server.port = port;
        }
        if let Some(origins) = get("PARLEY_ALLOWED_ORIGINS") {
            self.server.allowed_origins = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }
    }

    /// Both the endpoint and the agent id are known.
    pub fn is_agent_configured(&self) -> bool {
        self.agent.endpoint.is_some() && self.agent.agent_id.is_some()
    }
}

fn set_non_empty(slot: &mut Option<String>, value: Option<String>) {
    if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
        *slot = Some(value);
    }
}

pub(crate) fn parse_env<T: FromStr>(get: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = get(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring unparseable environment value");
            None
        }
    }
}

/// Config file location: `PARLEY_CONFIG`, else the platform config dir if the
/// file exists there.
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }
    directories::ProjectDirs::from("", "", "parley")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .filter(|path| path.is_file())
}
