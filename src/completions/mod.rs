//! Direct chat-completions client for an Azure-hosted model deployment.
//!
//! Unlike the relay this keeps no server-side thread: every call sends the
//! full history and gets one completion back, optionally streamed.

use std::time::Duration;

use futures::stream::BoxStream;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::parse_env;
use crate::error::{RelayError, ServiceError};
use crate::gateway::http::{build_client, read_json, status_to_error};
use crate::types::ChatMessage;

const DEFAULT_MODEL: &str = "gpt-35-turbo";
const DEFAULT_MAX_TOKENS: u32 = 1000;
const DEFAULT_TEMPERATURE: f64 = 0.7;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const NO_RESPONSE: &str = "No response from AI model";

/// Where and how to call the deployment.
#[derive(Clone, PartialEq)]
pub struct CompletionsConfig {
    /// Full chat-completions URL, including any `api-version` query.
    pub endpoint: String,
    pub api_key: String,
    pub model_name: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Default for CompletionsConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            model_name: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl std::fmt::Debug for CompletionsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionsConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[REDACTED]")
            .field("model_name", &self.model_name)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl CompletionsConfig {
    /// Defaults overlaid with `AZURE_GENAI_*` variables (after loading `.env`).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let mut config = Self::default();
        config.apply_env_from(|key| std::env::var(key).ok());
        config
    }

    /// Overlay variables read through `lookup`. Empty values count as unset.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(endpoint) = get("AZURE_GENAI_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Some(api_key) = get("AZURE_GENAI_API_KEY") {
            self.api_key = api_key;
        }
        if let Some(model) = get("AZURE_GENAI_MODEL") {
            self.model_name = model;
        }
        if let Some(max_tokens) = parse_env::<u32>(&get, "AZURE_GENAI_MAX_TOKENS") {
            self.max_tokens = max_tokens;
        }
        if let Some(temperature) = parse_env::<f64>(&get, "AZURE_GENAI_TEMPERATURE") {
            self.temperature = temperature;
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.endpoint.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

/// One `data:` payload of a server-sent event stream.
#[derive(Debug, PartialEq, Eq)]
pub enum SseData<'a> {
    Chunk(&'a str),
    Done,
}

/// Parse an SSE line. Anything other than a `data:` line yields `None`.
pub fn parse_sse_data(line: &str) -> Option<SseData<'_>> {
    let data = line.strip_prefix("data:")?.trim_start();
    if data == "[DONE]" {
        Some(SseData::Done)
    } else {
        Some(SseData::Chunk(data))
    }
}

/// Text delta carried by one streamed chunk, if any.
fn chunk_text(data: &str) -> Option<String> {
    let chunk: StreamChunk = serde_json::from_str(data).ok()?;
    chunk
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta.content)
        .filter(|text| !text.is_empty())
}

/// Client for an OpenAI-compatible chat-completions deployment.
#[derive(Debug, Clone)]
pub struct CompletionsClient {
    http: reqwest::Client,
    config: CompletionsConfig,
}

impl CompletionsClient {
    pub fn new(config: CompletionsConfig) -> Result<Self, RelayError> {
        if !config.is_configured() {
            return Err(RelayError::configuration("AZURE_GENAI_ENDPOINT not set"));
        }
        Ok(Self::with_client(build_client(REQUEST_TIMEOUT)?, config))
    }

    pub fn with_client(http: reqwest::Client, config: CompletionsConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &CompletionsConfig {
        &self.config
    }

    fn request_body(&self, message: &str, history: &[ChatMessage], stream: bool) -> Value {
        let mut messages = history.to_vec();
        messages.push(ChatMessage::user(message));
        let mut body = json!({
            "messages": messages,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "model": self.config.model_name,
        });
        if stream {
            body["stream"] = json!(true);
        }
        body
    }

    async fn post(&self, body: &Value) -> Result<reqwest::Response, ServiceError> {
        let mut request = self.http.post(&self.config.endpoint).json(body);
        if !self.config.api_key.is_empty() {
            request = request.header("api-key", &self.config.api_key);
        }
        Ok(request.send().await?)
    }

    /// Send `history` plus `message` and return the first choice's text.
    pub async fn send_message(
        &self,
        message: &str,
        history: &[ChatMessage],
    ) -> Result<String, ServiceError> {
        debug!(model = %self.config.model_name, "Completions send_message");
        let resp = self.post(&self.request_body(message, history, false)).await?;
        let data: CompletionResponse = read_json(resp).await.map_err(|e| {
            warn!(error = %e, "Completions request failed");
            e
        })?;
        data.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or_else(|| ServiceError::Protocol(NO_RESPONSE.to_string()))
    }

    /// Stream text deltas of one completion. Ends at `[DONE]` or end of body.
    pub async fn stream_message(
        &self,
        message: &str,
        history: &[ChatMessage],
    ) -> Result<BoxStream<'static, Result<String, ServiceError>>, ServiceError> {
        debug!(model = %self.config.model_name, "Completions stream_message");
        let resp = self.post(&self.request_body(message, history, true)).await?;

        let status = resp.status().as_u16();
        if !(200..300).contains(&status) {
            let body_text = resp.text().await.unwrap_or_default();
            let err = status_to_error(status, &body_text);
            warn!(error = %err, "Completions stream request failed");
            return Err(err);
        }

        let byte_stream = resp.bytes_stream();

        let stream = async_stream::stream! {
            let mut buffer = String::new();
            futures::pin_mut!(byte_stream);

            'read: while let Some(chunk_result) = byte_stream.next().await {
                let chunk = match chunk_result {
                    Ok(c) => c,
                    Err(e) => {
                        yield Err(ServiceError::Network(e));
                        break;
                    }
                };

                buffer.push_str(&String::from_utf8_lossy(&chunk));

                while let Some(line_end) = buffer.find('\n') {
                    let line = buffer[..line_end].trim().to_string();
                    buffer = buffer[line_end + 1..].to_string();

                    match parse_sse_data(&line) {
                        Some(SseData::Done) => break 'read,
                        // Partial or non-delta chunks are skipped.
                        Some(SseData::Chunk(data)) => {
                            if let Some(text) = chunk_text(data) {
                                yield Ok(text);
                            }
                        }
                        None => {}
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}
