use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who spoke a turn in the dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Caller,
    Assistant,
}

impl Role {
    /// Role string used when building chat-completion messages.
    pub fn chat_role(&self) -> &'static str {
        match self {
            Self::Caller => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One utterance in a caller's conversation transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl Turn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            at: Utc::now(),
        }
    }
}

/// The action the intent resolver extracted from the assistant reply.
///
/// A closed enum: the dialogue state machine only ever branches on these
/// three values, never on raw marker text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallerAction {
    ProvideInfo,
    BookAppointment,
    TransferToReception,
}

impl CallerAction {
    /// Parse a marker token; unrecognized markers map to the safe default.
    pub fn from_marker(marker: &str) -> Self {
        match marker.trim() {
            "book_appointment" => Self::BookAppointment,
            "transfer_to_reception" => Self::TransferToReception,
            _ => Self::ProvideInfo,
        }
    }
}

/// Result of one intent-resolution round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIntent {
    /// Caller-visible message with any action marker stripped.
    pub message: String,
    pub action: CallerAction,
}

/// What the turn controller tells the call-control layer to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnDecision {
    /// Text to speak back to the caller.
    pub spoken_text: String,
    /// Whether the call-control layer should gather another utterance
    /// (`false` means hang up after speaking).
    pub continue_listening: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_parsing_closed_set() {
        assert_eq!(
            CallerAction::from_marker("book_appointment"),
            CallerAction::BookAppointment
        );
        assert_eq!(
            CallerAction::from_marker(" transfer_to_reception "),
            CallerAction::TransferToReception
        );
        assert_eq!(
            CallerAction::from_marker("provide_info"),
            CallerAction::ProvideInfo
        );
        // Anything unknown falls back to the default action.
        assert_eq!(
            CallerAction::from_marker("order_pizza"),
            CallerAction::ProvideInfo
        );
    }

    #[test]
    fn test_chat_role_mapping() {
        assert_eq!(Role::Caller.chat_role(), "user");
        assert_eq!(Role::Assistant.chat_role(), "assistant");
    }
}
