//! The per-turn dialogue state machine.
//!
//! The call-control layer drives retries by re-invoking the turn endpoint,
//! so phases advance within a single turn: a turn starts in
//! `AwaitingSpeech`, moves through `Processing` once a transcript arrives,
//! lands in one of the action phases, and either loops back to listening
//! or ends the call.

use frontdesk_core::CallerAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialoguePhase {
    /// Waiting for the caller to speak (initial, and after every reply
    /// that keeps the call open).
    AwaitingSpeech,
    /// Transcript received, intent resolution in flight.
    Processing,
    /// Speaking an informational reply, then listening again.
    Informing,
    /// Speaking availability, then listening again.
    Booking,
    /// Speaking the escalation message; the call ends after it.
    Transferring,
    /// Terminal.
    Ended,
}

impl DialoguePhase {
    /// Phase reached when a transcript does (or does not) arrive while
    /// listening.
    pub fn on_transcript(self, has_speech: bool) -> Self {
        match (self, has_speech) {
            (Self::AwaitingSpeech, false) => Self::AwaitingSpeech,
            (Self::AwaitingSpeech, true) => Self::Processing,
            (other, _) => other,
        }
    }

    /// Phase reached once the resolver has produced an action.
    pub fn on_action(self, action: CallerAction) -> Self {
        match action {
            CallerAction::ProvideInfo => Self::Informing,
            CallerAction::BookAppointment => Self::Booking,
            CallerAction::TransferToReception => Self::Transferring,
        }
    }

    /// Phase after the reply has been spoken.
    pub fn after_speaking(self) -> Self {
        match self {
            Self::Transferring | Self::Ended => Self::Ended,
            _ => Self::AwaitingSpeech,
        }
    }

    pub fn keeps_listening(self) -> bool {
        self.after_speaking() == Self::AwaitingSpeech
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_transcript_stays_listening() {
        let phase = DialoguePhase::AwaitingSpeech.on_transcript(false);
        assert_eq!(phase, DialoguePhase::AwaitingSpeech);
        assert!(phase.keeps_listening());
    }

    #[test]
    fn test_actions_map_to_phases() {
        let processing = DialoguePhase::AwaitingSpeech.on_transcript(true);
        assert_eq!(processing, DialoguePhase::Processing);
        assert_eq!(
            processing.on_action(CallerAction::ProvideInfo),
            DialoguePhase::Informing
        );
        assert_eq!(
            processing.on_action(CallerAction::BookAppointment),
            DialoguePhase::Booking
        );
        assert_eq!(
            processing.on_action(CallerAction::TransferToReception),
            DialoguePhase::Transferring
        );
    }

    #[test]
    fn test_only_transfer_ends_the_call() {
        assert!(DialoguePhase::Informing.keeps_listening());
        assert!(DialoguePhase::Booking.keeps_listening());
        assert!(!DialoguePhase::Transferring.keeps_listening());
        assert_eq!(
            DialoguePhase::Transferring.after_speaking(),
            DialoguePhase::Ended
        );
    }
}
