//! Reduce heterogeneous content shapes to plain text.
//!
//! The agent service returns content as tagged blocks, while the chat
//! endpoint's own reply may carry a single `message` string or a `messages`
//! list depending on the server version. Everything that turns one of those
//! shapes into text goes through this module.

use serde_json::Value;

use crate::types::{ContentBlock, Role};

/// Extract plain text from any content shape.
///
/// Rules, in priority order:
/// 1. a string is returned as is;
/// 2. an array is normalized element-wise, empties dropped, joined by `\n`;
/// 3. a `"type": "text"` object yields its `text` string or `text.value`;
/// 4. otherwise a bare `value`, then a bare `content` string;
/// 5. anything else yields an empty string.
///
/// ```
/// use serde_json::json;
///
/// let block = json!({"type": "text", "text": {"value": "hi"}});
/// assert_eq!(parley::normalize::extract_text(&block), "hi");
/// assert_eq!(parley::normalize::extract_text(&json!(["a", "", "b"])), "a\nb");
/// assert_eq!(parley::normalize::extract_text(&json!(null)), "");
/// ```
pub fn extract_text(content: &Value) -> String {
    match content {
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(extract_text)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string(),
        Value::Object(map) => {
            if map.get("type").and_then(Value::as_str) == Some("text") {
                match map.get("text") {
                    Some(Value::String(text)) => return text.clone(),
                    Some(Value::Object(inner)) => {
                        if let Some(Value::String(value)) = inner.get("value") {
                            return value.clone();
                        }
                    }
                    _ => {}
                }
            }
            ["value", "content"]
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str))
                .map(str::to_string)
                .unwrap_or_default()
        }
        _ => String::new(),
    }
}

/// Decode one raw block from the service into the closed block type.
pub fn decode_block(raw: &Value) -> ContentBlock {
    serde_json::from_value(raw.clone()).unwrap_or(ContentBlock::Unsupported)
}

/// Text of a raw block when it is a non-empty text block.
pub fn block_text(raw: &Value) -> Option<String> {
    decode_block(raw)
        .as_text()
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Pick one reply string out of a chat endpoint response.
///
/// Prefers a non-blank top-level `message`, then the last assistant entry of
/// `messages`, then whatever [`extract_text`] finds in the whole response.
pub fn extract_reply(response: &Value) -> String {
    if let Some(message) = response.get("message").and_then(Value::as_str) {
        if !message.trim().is_empty() {
            return message.to_string();
        }
    }

    if let Some(messages) = response.get("messages").and_then(Value::as_array) {
        let last_assistant = messages
            .iter()
            .rev()
            .find(|m| m.get("role").and_then(Value::as_str) == Some(Role::Assistant.as_ref()));
        if let Some(entry) = last_assistant {
            let content = entry.get("content").filter(|c| !c.is_null());
            let text = extract_text(content.unwrap_or(entry));
            if !text.is_empty() {
                return text;
            }
        }
    }

    extract_text(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn nested_text_value() {
        assert_eq!(
            extract_text(&json!({"type": "text", "text": {"value": "hi"}})),
            "hi"
        );
    }

    #[test]
    fn direct_text_wins_over_value() {
        assert_eq!(
            extract_text(&json!({"type": "text", "text": "direct", "value": "other"})),
            "direct"
        );
    }

    #[test]
    fn sequence_drops_empties_and_trims() {
        assert_eq!(extract_text(&json!(["a", "", "b"])), "a\nb");
        assert_eq!(extract_text(&json!(["  ", "x"])), "x");
        assert_eq!(
            extract_text(&json!([{"type": "text", "text": {"value": "one"}}, {"value": "two"}])),
            "one\ntwo"
        );
    }

    #[test]
    fn bare_value_then_content() {
        assert_eq!(extract_text(&json!({"value": "v", "content": "c"})), "v");
        assert_eq!(extract_text(&json!({"content": "c"})), "c");
    }

    #[test]
    fn tagged_text_without_usable_text_falls_back() {
        assert_eq!(
            extract_text(&json!({"type": "text", "text": {"annotations": []}, "content": "c"})),
            "c"
        );
    }

    #[test]
    fn unrecognized_shapes_are_empty() {
        assert_eq!(extract_text(&json!(null)), "");
        assert_eq!(extract_text(&json!(42)), "");
        assert_eq!(extract_text(&json!({"type": "image_file", "image_file": {}})), "");
        assert_eq!(extract_text(&json!({"value": 3})), "");
    }

    #[test]
    fn decode_block_recognizes_text_only() {
        let text = decode_block(&json!({
            "type": "text",
            "text": {"value": "Hello!", "annotations": []}
        }));
        assert_eq!(text.as_text(), Some("Hello!"));

        let image = decode_block(&json!({"type": "image_file", "image_file": {"file_id": "f"}}));
        assert_eq!(image, ContentBlock::Unsupported);

        let broken = decode_block(&json!({"type": "text", "text": 5}));
        assert_eq!(broken, ContentBlock::Unsupported);

        assert_eq!(decode_block(&json!("loose")), ContentBlock::Unsupported);
    }

    #[test]
    fn block_text_skips_empty_text() {
        assert_eq!(block_text(&json!({"type": "text", "text": {"value": ""}})), None);
        assert_eq!(
            block_text(&json!({"type": "text", "text": "plain"})),
            Some("plain".to_string())
        );
    }

    #[test]
    fn reply_prefers_message_field() {
        let response = json!({
            "message": "top",
            "messages": [{"role": "assistant", "content": "nested"}]
        });
        assert_eq!(extract_reply(&response), "top");
    }

    #[test]
    fn reply_uses_last_assistant_message() {
        let response = json!({
            "threadId": "t",
            "message": "   ",
            "messages": [
                {"role": "user", "content": "Hi"},
                {"role": "assistant", "content": "first"},
                {"role": "user", "content": "again"},
                {"role": "assistant", "content": [{"type": "text", "text": {"value": "second"}}]}
            ]
        });
        assert_eq!(extract_reply(&response), "second");
    }

    #[test]
    fn reply_falls_back_to_generic_extraction() {
        assert_eq!(extract_reply(&json!({"content": "fallback"})), "fallback");
        assert_eq!(extract_reply(&json!({"messages": []})), "");
    }
}
