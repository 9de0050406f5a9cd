//! Deterministic chat provider for tests and offline runs.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use frontdesk_core::{ChatProvider, ChatRequest, ChatResponse};

/// Replays canned replies in order; fails once the script is exhausted
/// (or immediately when constructed with `failing()`).
pub struct MockChatProvider {
    replies: Vec<String>,
    cursor: AtomicUsize,
    fail: bool,
}

impl MockChatProvider {
    pub fn scripted(replies: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            replies: replies.into_iter().map(Into::into).collect(),
            cursor: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            replies: Vec::new(),
            cursor: AtomicUsize::new(0),
            fail: true,
        }
    }

    /// Requests served so far.
    pub fn calls(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatProvider for MockChatProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let index = self.cursor.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("mock provider configured to fail");
        }
        let content = self
            .replies
            .get(index)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("mock script exhausted at call {index}"))?;
        Ok(ChatResponse {
            content,
            provider: "mock".to_string(),
            model: request.model.clone(),
            latency_ms: 0,
        })
    }
}
