//! Request and response bodies of the chat endpoint.

use bon::Builder;
use serde::{Deserialize, Serialize};

use super::message::ChatMessage;

/// Body of `POST /api/chat`.
///
/// Example:
/// ```
/// use parley::types::{ChatMessage, ChatRequest};
///
/// let request = ChatRequest::builder()
///     .messages(vec![ChatMessage::user("Hi")])
///     .temperature(0.2)
///     .build();
/// assert!(request.thread_id.is_none());
/// ```
#[derive(Debug, Clone, Builder, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    #[builder(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// Successful reply of `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub thread_id: String,
    pub messages: Vec<ChatMessage>,
}

/// Error reply of `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
