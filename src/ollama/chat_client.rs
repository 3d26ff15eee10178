use crate::{
    config::OllamaConfig,
    error::{GatewayError, Result},
    models::{ChatMessage, ChatOptions, ChatRequest, ChatResponse, RuntimeErrorBody},
    ollama::traits::CompletionBackend,
};
use async_trait::async_trait;
use reqwest::Client;

#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    config: OllamaConfig,
}

impl ChatClient {
    pub fn new(client: Client, config: OllamaConfig) -> Self {
        Self { client, config }
    }

    pub fn build_request(&self, prompt: &str) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
            stream: false,
            options: ChatOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_tokens,
            },
        }
    }

    /// Sends one user message to `/api/chat` and returns the assistant's text.
    ///
    /// No timeout is applied; the call lasts as long as the runtime takes.
    pub async fn chat(&self, prompt: &str) -> Result<String> {
        let request = self.build_request(prompt);
        let url = self.config.endpoint("/api/chat");

        log::info!("Invoking model: {}", request.model);
        log::debug!(
            "Chat request payload: {}",
            serde_json::to_string(&request).unwrap_or_default()
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::RequestError(format!("Ollama request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::ResponseError(format!("Failed to read Ollama response: {}", e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<RuntimeErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            log::error!("Ollama returned {}: {}", status, message);
            return Err(GatewayError::ResponseError(format!(
                "Ollama returned {}: {}",
                status.as_u16(),
                message
            )));
        }

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            GatewayError::ResponseError(format!("Malformed Ollama response: {}", e))
        })?;

        if let Some(tokens) = parsed.eval_count {
            log::debug!(
                "Model {} produced {} tokens (done_reason: {})",
                parsed.model.as_deref().unwrap_or(&request.model),
                tokens,
                parsed.done_reason.as_deref().unwrap_or("unknown")
            );
        }

        Ok(parsed.message.content)
    }
}

#[async_trait]
impl CompletionBackend for ChatClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.chat(prompt).await
    }
}
