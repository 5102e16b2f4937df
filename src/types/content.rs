//! Content blocks carried by thread messages.

use serde::{Deserialize, Serialize};

/// A tagged unit of message content.
///
/// Only text carries meaning here; every other tag decodes to `Unsupported`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: TextContent },
    #[serde(other)]
    Unsupported,
}

impl ContentBlock {
    /// A plain text block, as submitted to a thread.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: TextContent::Plain(text.into()),
        }
    }

    /// Text of a text block; `None` for anything else.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text.as_str()),
            Self::Unsupported => None,
        }
    }
}

/// Body of a text block: either a bare string or `{ value, annotations }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TextContent {
    Plain(String),
    Annotated {
        value: String,
        #[serde(default)]
        annotations: Vec<serde_json::Value>,
    },
}

impl TextContent {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Plain(text) => text,
            Self::Annotated { value, .. } => value,
        }
    }
}
