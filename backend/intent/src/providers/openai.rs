use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use frontdesk_core::{ChatProvider, ChatRequest, ChatResponse, FrontDeskError};

/// OpenAI chat-completion provider.
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(15))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[derive(Serialize)]
struct ApiRequest {
    model: String,
    messages: Vec<ApiMessage>,
    temperature: f32,
}

#[derive(Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ApiMessage,
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let start = Instant::now();

        let mut messages = Vec::with_capacity(request.history.len() + 1);
        if !request.system_prompt.is_empty() {
            messages.push(ApiMessage {
                role: "system".to_string(),
                content: request.system_prompt.clone(),
            });
        }
        for m in &request.history {
            messages.push(ApiMessage {
                role: m.role.clone(),
                content: m.content.clone(),
            });
        }

        let body = ApiRequest {
            model: request.model.clone(),
            messages,
            temperature: request.temperature,
        };

        debug!(model = %request.model, turns = request.history.len(), "Sending request to OpenAI");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("OpenAI HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(FrontDeskError::Llm {
                provider: "openai".to_string(),
                message: format!("{status}: {error_body}"),
            }
            .into());
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .context("Failed to parse OpenAI response")?;

        let content = api_response
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default();

        Ok(ChatResponse {
            content,
            provider: "openai".to_string(),
            model: request.model.clone(),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use frontdesk_core::ChatMessage;
    use serde_json::json;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn request() -> ChatRequest {
        ChatRequest {
            model: "gpt-4o-mini".to_string(),
            system_prompt: "Jesteś recepcjonistką.".to_string(),
            history: vec![ChatMessage::new("user", "dzień dobry")],
            temperature: 0.2,
        }
    }

    #[tokio::test]
    async fn test_complete_parses_first_choice() {
        let app = Router::new().route(
            "/chat/completions",
            post(|Json(body): Json<serde_json::Value>| async move {
                Json(json!({
                    "choices": [{
                        "message": {
                            "role": "assistant",
                            "content": format!("model={}", body["model"].as_str().unwrap()),
                        }
                    }]
                }))
            }),
        );
        let provider = OpenAiProvider::new("test-key").with_base_url(serve(app).await);

        let response = provider.complete(&request()).await.unwrap();
        // The echoed model proves the request body reached the endpoint.
        assert_eq!(response.content, "model=gpt-4o-mini");
        assert_eq!(response.provider, "openai");
        assert_eq!(response.model, "gpt-4o-mini");
    }

    #[tokio::test]
    async fn test_error_status_surfaces_as_llm_error() {
        let app = Router::new().route(
            "/chat/completions",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "rate limited") }),
        );
        let provider = OpenAiProvider::new("test-key").with_base_url(serve(app).await);

        let err = provider.complete(&request()).await.unwrap_err();
        match err.downcast_ref::<FrontDeskError>() {
            Some(FrontDeskError::Llm { provider, message }) => {
                assert_eq!(provider, "openai");
                assert!(message.contains("429"));
                assert!(message.contains("rate limited"));
            }
            other => panic!("expected Llm error, got {other:?}"),
        }
    }
}
