//! Client for a running chat relay.
//!
//! Mirrors what a browser front end does: post the conversation to
//! `/api/chat` and pull one reply string out of whatever comes back.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ClientError;
use crate::normalize;
use crate::types::{ChatMessage, ChatRequest};

const CLIENT_MAX_TOKENS: u32 = 1000;
const CLIENT_TEMPERATURE: f64 = 0.7;

/// Default relay location when running locally.
pub const DEFAULT_URL: &str = "http://127.0.0.1:3000/api/chat";

/// Token counts some relays report alongside the reply.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct TokenUsage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

/// One entry of a reply's `messages`. Content is kept in whatever shape arrived.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ReplyMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: Value,
}

impl ReplyMessage {
    pub fn text(&self) -> String {
        normalize::extract_text(&self.content)
    }
}

/// Decoded relay reply. Every field is optional on the wire.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub messages: Vec<ReplyMessage>,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
    /// The one reply string [`normalize::extract_reply`] picks from the raw body.
    #[serde(skip)]
    pub text: String,
}

impl ChatReply {
    pub fn from_json(body: Value) -> Result<Self, serde_json::Error> {
        let text = normalize::extract_reply(&body);
        let mut reply: Self = serde_json::from_value(body)?;
        reply.text = text;
        Ok(reply)
    }
}

/// HTTP client for `POST /api/chat`.
#[derive(Debug, Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    url: String,
    max_tokens: u32,
    temperature: f64,
}

impl RelayClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
            max_tokens: CLIENT_MAX_TOKENS,
            temperature: CLIENT_TEMPERATURE,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Request body for `history` followed by a new user `message`.
    pub fn request(&self, message: &str, history: &[ChatMessage]) -> ChatRequest {
        let mut messages = history.to_vec();
        messages.push(ChatMessage::user(message));
        ChatRequest {
            messages,
            thread_id: None,
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
        }
    }

    /// Send one message and return the reply text, or `""` if none was found.
    pub async fn send_message(
        &self,
        message: &str,
        history: &[ChatMessage],
    ) -> Result<String, ClientError> {
        let body = self.post(&self.request(message, history)).await?;
        Ok(normalize::extract_reply(&body))
    }

    /// Send a prepared request and decode the full reply.
    pub async fn send_turn(&self, request: &ChatRequest) -> Result<ChatReply, ClientError> {
        let body = self.post(request).await?;
        Ok(ChatReply::from_json(body)?)
    }

    async fn post(&self, request: &ChatRequest) -> Result<Value, ClientError> {
        debug!(url = %self.url, messages = request.messages.len(), "Posting chat request");
        let resp = self.http.post(&self.url).json(request).send().await?;
        let status = resp.status().as_u16();
        let text = resp.text().await?;

        if !(200..300).contains(&status) {
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("HTTP error! status: {status}"));
            warn!(status, error = %message, "Chat request failed");
            return Err(ClientError::Api { status, message });
        }

        Ok(serde_json::from_str(&text)?)
    }
}
