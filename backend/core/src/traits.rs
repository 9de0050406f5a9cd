use anyhow::Result;
use async_trait::async_trait;

/// One message in a chat-completion request.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Request to a chat-completion provider.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub system_prompt: String,
    /// Conversation history, oldest first, excluding the system prompt.
    pub history: Vec<ChatMessage>,
    pub temperature: f32,
}

/// Response from a chat-completion provider.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub content: String,
    pub provider: String,
    pub model: String,
    pub latency_ms: u64,
}

/// Trait for chat-completion providers used by the intent resolver.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Provider name (e.g., "openai").
    fn name(&self) -> &str;

    /// Send a completion request and return the raw reply text.
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse>;
}
