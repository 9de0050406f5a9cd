//! The intent resolver adapter.
//!
//! Wraps the chat-completion collaborator: appends the caller utterance
//! to the session, sends the system instruction plus the recent history,
//! appends the raw reply, and parses the trailing `ACTION:` marker into
//! the closed [`CallerAction`] enum. Provider failures and timeouts are
//! absorbed here: the caller layer always receives a speakable
//! [`ResolvedIntent`], never an error.

use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::time::timeout;
use tracing::{error, info};

use frontdesk_core::{
    CallerAction, ChatMessage, ChatProvider, ChatRequest, ResolvedIntent, Role,
};
use frontdesk_sessions::SessionStore;

use crate::prompt::SYSTEM_INSTRUCTION;

/// Upper bound on one resolution round trip.
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(15);

/// Spoken when the provider fails or times out; the call is then handed
/// to a human.
const FALLBACK_MESSAGE: &str =
    "Przepraszam, mamy chwilowy problem techniczny. Łączę z recepcją.";

/// Trailing action marker, e.g. `ACTION: book_appointment`.
static ACTION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\s*ACTION:\s*([a-z_]+)\s*$").expect("valid regex"));

pub struct IntentResolver {
    provider: Arc<dyn ChatProvider>,
    sessions: SessionStore,
    model: String,
    temperature: f32,
    resolve_timeout: Duration,
}

impl IntentResolver {
    pub fn new(provider: Arc<dyn ChatProvider>, sessions: SessionStore, model: impl Into<String>) -> Self {
        Self {
            provider,
            sessions,
            model: model.into(),
            temperature: 0.2,
            resolve_timeout: DEFAULT_RESOLVE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, resolve_timeout: Duration) -> Self {
        self.resolve_timeout = resolve_timeout;
        self
    }

    /// Resolve one caller utterance into a speakable message and action.
    pub async fn resolve(&self, caller_id: &str, transcript: &str) -> ResolvedIntent {
        let history = self
            .sessions
            .append_turn(caller_id, Role::Caller, transcript)
            .await;

        let request = ChatRequest {
            model: self.model.clone(),
            system_prompt: SYSTEM_INSTRUCTION.to_string(),
            history: history
                .iter()
                .map(|t| ChatMessage::new(t.role.chat_role(), t.text.clone()))
                .collect(),
            temperature: self.temperature,
        };

        let raw = match timeout(self.resolve_timeout, self.provider.complete(&request)).await {
            Ok(Ok(response)) => response.content,
            Ok(Err(e)) => {
                error!(provider = self.provider.name(), error = %e, "intent resolution failed");
                return Self::fallback();
            }
            Err(_) => {
                error!(
                    provider = self.provider.name(),
                    timeout_ms = self.resolve_timeout.as_millis() as u64,
                    "intent resolution timed out"
                );
                return Self::fallback();
            }
        };

        self.sessions
            .append_turn(caller_id, Role::Assistant, &raw)
            .await;

        let resolved = parse_reply(&raw);
        info!(caller = %caller_id, action = ?resolved.action, "intent resolved");
        resolved
    }

    fn fallback() -> ResolvedIntent {
        ResolvedIntent {
            message: FALLBACK_MESSAGE.to_string(),
            action: CallerAction::TransferToReception,
        }
    }
}

/// Split a raw completion reply into the caller-visible message and the
/// typed action. A missing or unrecognized marker yields `ProvideInfo`.
pub fn parse_reply(raw: &str) -> ResolvedIntent {
    match ACTION_MARKER.captures(raw) {
        Some(caps) => {
            let marker = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            let message = ACTION_MARKER.replace(raw, "").trim().to_string();
            ResolvedIntent {
                message,
                action: CallerAction::from_marker(marker),
            }
        }
        None => ResolvedIntent {
            message: raw.trim().to_string(),
            action: CallerAction::ProvideInfo,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MockChatProvider;

    fn resolver(provider: MockChatProvider) -> (IntentResolver, SessionStore) {
        let sessions = SessionStore::new();
        let resolver = IntentResolver::new(
            Arc::new(provider),
            sessions.clone(),
            "gpt-4o-mini",
        );
        (resolver, sessions)
    }

    #[test]
    fn test_parse_strips_marker_from_message() {
        let resolved = parse_reply(
            "Oczywiście, umówię Pana na wizytę.\nACTION: book_appointment",
        );
        assert_eq!(resolved.action, CallerAction::BookAppointment);
        assert_eq!(resolved.message, "Oczywiście, umówię Pana na wizytę.");
    }

    #[test]
    fn test_parse_without_marker_defaults_to_provide_info() {
        let resolved = parse_reply("Klinika jest otwarta od dziesiątej.");
        assert_eq!(resolved.action, CallerAction::ProvideInfo);
        assert_eq!(resolved.message, "Klinika jest otwarta od dziesiątej.");
    }

    #[test]
    fn test_parse_unknown_marker_is_safe_default() {
        let resolved = parse_reply("Chwileczkę.\nACTION: order_pizza");
        assert_eq!(resolved.action, CallerAction::ProvideInfo);
        assert_eq!(resolved.message, "Chwileczkę.");
    }

    #[test]
    fn test_parse_ignores_marker_mid_text() {
        // Only a trailing marker counts; free text mentioning the token
        // must not steer the state machine.
        let resolved = parse_reply("ACTION: book_appointment to nasz format. Coś jeszcze?");
        assert_eq!(resolved.action, CallerAction::ProvideInfo);
    }

    #[tokio::test]
    async fn test_resolve_appends_both_turns() {
        let (resolver, sessions) =
            resolver(MockChatProvider::scripted(["Zapraszam!\nACTION: provide_info"]));
        let resolved = resolver.resolve("+48111", "dzień dobry").await;
        assert_eq!(resolved.action, CallerAction::ProvideInfo);
        assert_eq!(resolved.message, "Zapraszam!");

        let history = sessions.recent("+48111").await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::Caller);
        assert_eq!(history[0].text, "dzień dobry");
        assert_eq!(history[1].role, Role::Assistant);
        // The stored assistant turn keeps the raw reply, marker included.
        assert!(history[1].text.contains("ACTION: provide_info"));
    }

    #[tokio::test]
    async fn test_provider_failure_yields_transfer_fallback() {
        let (resolver, sessions) = resolver(MockChatProvider::failing());
        let resolved = resolver.resolve("+48111", "halo").await;
        assert_eq!(resolved.action, CallerAction::TransferToReception);
        assert_eq!(resolved.message, FALLBACK_MESSAGE);
        // No assistant turn is recorded for a failed round trip.
        assert_eq!(sessions.recent("+48111").await.len(), 1);
    }

    #[tokio::test]
    async fn test_timeout_yields_transfer_fallback() {
        use async_trait::async_trait;
        use frontdesk_core::{ChatRequest, ChatResponse};

        struct SlowProvider;

        #[async_trait]
        impl ChatProvider for SlowProvider {
            fn name(&self) -> &str {
                "slow"
            }
            async fn complete(&self, _request: &ChatRequest) -> anyhow::Result<ChatResponse> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                unreachable!("timeout fires first");
            }
        }

        let sessions = SessionStore::new();
        let resolver = IntentResolver::new(Arc::new(SlowProvider), sessions, "gpt-4o-mini")
            .with_timeout(Duration::from_millis(20));
        let resolved = resolver.resolve("+48111", "halo").await;
        assert_eq!(resolved.action, CallerAction::TransferToReception);
    }
}
