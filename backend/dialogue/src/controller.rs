//! The turn controller: the orchestration core between the telephony
//! webhook, the intent resolver, and the appointment ledger.
//!
//! Every caller-facing failure path here ends in a polite Polish
//! apology; technical errors are never read aloud.

use chrono::{Local, NaiveDate, NaiveTime};
use tracing::{info, warn};

use frontdesk_calendar::{AppointmentBook, BookingError};
use frontdesk_core::{CallerAction, TurnDecision};
use frontdesk_intent::IntentResolver;

use crate::phase::DialoguePhase;

/// Played on the very first webhook of a call.
const GREETING: &str = "Dzień dobry! Tu Stomatologia Kraków, recepcja \
automatyczna. Jestem tutaj, aby pomóc umówić wizytę albo udzielić \
informacji. Proszę powiedzieć, w czym mogę pomóc?";

/// Played when the gather window closed without speech.
const REPROMPT: &str = "Nie usłyszałam wypowiedzi. Spróbujmy jeszcze raz.";

pub struct TurnController {
    resolver: IntentResolver,
    ledger: AppointmentBook,
    reception_number: String,
}

impl TurnController {
    pub fn new(
        resolver: IntentResolver,
        ledger: AppointmentBook,
        reception_number: impl Into<String>,
    ) -> Self {
        Self {
            resolver,
            ledger,
            reception_number: reception_number.into(),
        }
    }

    pub fn greeting(&self) -> &'static str {
        GREETING
    }

    pub fn reprompt(&self) -> &'static str {
        REPROMPT
    }

    /// Handle one inbound voice event. `transcript` is `None` (or blank)
    /// when the gather timed out; the resolver is only consulted for real
    /// speech.
    pub async fn handle_turn(&self, caller_id: &str, transcript: Option<&str>) -> TurnDecision {
        let speech = transcript.map(str::trim).filter(|t| !t.is_empty());
        let phase = DialoguePhase::AwaitingSpeech.on_transcript(speech.is_some());

        let Some(speech) = speech else {
            info!(caller = %caller_id, "no transcript, re-prompting");
            return TurnDecision {
                spoken_text: REPROMPT.to_string(),
                continue_listening: phase.keeps_listening(),
            };
        };

        let resolved = self.resolver.resolve(caller_id, speech).await;
        let phase = phase.on_action(resolved.action);
        info!(caller = %caller_id, ?phase, "turn resolved");

        let spoken_text = match resolved.action {
            CallerAction::ProvideInfo => resolved.message,
            CallerAction::BookAppointment => {
                let slots = self.ledger.spoken_slots(self.today()).await;
                format!(
                    "{} Dostępne terminy to: {}. Który termin najbardziej pasuje?",
                    resolved.message,
                    slots.join(", ")
                )
            }
            CallerAction::TransferToReception => format!(
                "{} Jeśli połączenie nie powiedzie się, proszę zanotować numer: {}.",
                resolved.message, self.reception_number
            ),
        };

        TurnDecision {
            spoken_text,
            continue_listening: phase.keeps_listening(),
        }
    }

    /// Attempt a booking on the caller's behalf. A conflict is an
    /// expected outcome: availability is re-queried and alternatives are
    /// offered instead of retrying the same slot.
    pub async fn confirm_booking(
        &self,
        patient_name: &str,
        phone_number: &str,
        service: &str,
        date: NaiveDate,
        time: NaiveTime,
    ) -> TurnDecision {
        match self
            .ledger
            .book(patient_name, phone_number, service, date, time)
            .await
        {
            Ok(appointment) => TurnDecision {
                spoken_text: format!(
                    "Zarezerwowałam wizytę na {} o {}. Czy mogę jeszcze w czymś pomóc?",
                    appointment.date.format("%d.%m.%Y"),
                    appointment.time.format("%H:%M")
                ),
                continue_listening: true,
            },
            Err(e @ (BookingError::SlotTaken(_) | BookingError::OutsideWorkingHours(_))) => {
                warn!(error = %e, "booking rejected, offering alternatives");
                let slots = self.ledger.spoken_slots(self.today()).await;
                TurnDecision {
                    spoken_text: format!(
                        "Niestety ten termin nie jest dostępny. Dostępne terminy to: {}. \
                         Który termin najbardziej pasuje?",
                        slots.join(", ")
                    ),
                    continue_listening: true,
                }
            }
            Err(e) => {
                warn!(error = %e, "booking failed");
                TurnDecision {
                    spoken_text: format!(
                        "Przepraszam, nie udało się zapisać wizyty. Proszę zadzwonić do \
                         recepcji pod numer {}.",
                        self.reception_number
                    ),
                    continue_listening: true,
                }
            }
        }
    }

    /// Clinic-local calendar date. The process runs in the clinic
    /// timezone; spoken dates depend on it.
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}
