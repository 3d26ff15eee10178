//! Wire types for the Ollama runtime API (`/api/chat`, `/api/tags`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Generation options. `num_predict` is the runtime's name for max output length.
#[derive(Debug, Clone, Serialize)]
pub struct ChatOptions {
    pub temperature: f32,
    pub num_predict: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    pub options: ChatOptions,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub model: Option<String>,
    pub message: ChatMessage,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub done_reason: Option<String>,
    #[serde(default)]
    pub eval_count: Option<u64>,
}

/// Error body the runtime returns with non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelTag {
    pub name: String,
    #[serde(default)]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelTag>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chat_request_wire_format() {
        let request = ChatRequest {
            model: "deepseek-r1:7b".into(),
            messages: vec![ChatMessage::user("hello")],
            stream: false,
            options: ChatOptions {
                temperature: 0.5,
                num_predict: 100,
            },
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "model": "deepseek-r1:7b",
                "messages": [{ "role": "user", "content": "hello" }],
                "stream": false,
                "options": { "temperature": 0.5, "num_predict": 100 }
            })
        );
    }

    #[test]
    fn test_chat_response_ignores_extra_fields() {
        let body = json!({
            "model": "deepseek-r1:7b",
            "created_at": "2024-01-01T00:00:00Z",
            "message": { "role": "assistant", "content": "hi there" },
            "done": true,
            "total_duration": 12345
        });
        let response: ChatResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.message.role, ChatRole::Assistant);
        assert_eq!(response.message.content, "hi there");
        assert!(response.done);
    }
}
