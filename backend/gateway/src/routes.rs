//! Route handlers: Twilio webhooks, the `/tts` audio endpoint, and the
//! staff JSON API over the ledger and session store.

use axum::extract::{Host, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use chrono::{Local, NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use frontdesk_calendar::BookingError;

use crate::server::GatewayState;
use crate::twiml::VoiceResponse;

/// Closing prompt after each answered turn.
const FOLLOW_UP: &str = "Czy mogę jeszcze w czymś pomóc?";

/// Query-length guard for `/tts` URLs.
const MAX_TTS_TEXT: usize = 700;

/// Base URL Twilio fetches `/tts` audio from; the configured public base
/// wins over the Host header (the service sits behind a proxy).
fn public_base(state: &GatewayState, host: &str) -> String {
    state
        .config
        .public_base_url
        .clone()
        .unwrap_or_else(|| format!("https://{host}"))
}

/// Absolute URL for the `/tts` endpoint rendering `text`.
fn tts_url(base: &str, text: &str) -> String {
    let clamped: String = text.trim().chars().take(MAX_TTS_TEXT).collect();
    format!("{base}/tts?text={}", urlencoding::encode(&clamped))
}

fn xml(twiml: VoiceResponse) -> Response {
    (
        [(header::CONTENT_TYPE, "text/xml")],
        twiml.to_xml(),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// Twilio webhooks
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CallWebhook {
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "To")]
    pub to: Option<String>,
}

/// `POST /twilio/voice`: greet the caller and open the first gather.
pub async fn voice(
    State(state): State<GatewayState>,
    Host(host): Host,
    Form(webhook): Form<CallWebhook>,
) -> Response {
    info!(from = %webhook.from, to = ?webhook.to, "incoming call");
    let base = public_base(&state, &host);
    let greeting_url = tts_url(&base, state.controller.greeting());
    let twiml = VoiceResponse::new()
        .gather_speech("/twilio/process-speech", &greeting_url)
        // No response at all: start over.
        .redirect("/twilio/voice");
    xml(twiml)
}

#[derive(Debug, Deserialize)]
pub struct SpeechWebhook {
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "SpeechResult")]
    pub speech_result: Option<String>,
}

/// `POST /twilio/process-speech`: one dialogue turn.
pub async fn process_speech(
    State(state): State<GatewayState>,
    Host(host): Host,
    Form(webhook): Form<SpeechWebhook>,
) -> Response {
    let speech = webhook
        .speech_result
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    info!(from = %webhook.from, speech = ?speech, "speech received");

    let decision = state.controller.handle_turn(&webhook.from, speech).await;
    let base = public_base(&state, &host);
    let spoken_url = tts_url(&base, &decision.spoken_text);

    let twiml = if speech.is_none() {
        // Gather timed out; speak the re-prompt and restart the call flow.
        VoiceResponse::new().play(&spoken_url).redirect("/twilio/voice")
    } else if decision.continue_listening {
        let follow_up_url = tts_url(&base, FOLLOW_UP);
        VoiceResponse::new()
            .play(&spoken_url)
            .gather_speech("/twilio/process-speech", &follow_up_url)
    } else {
        VoiceResponse::new().play(&spoken_url).hangup()
    };
    xml(twiml)
}

#[derive(Debug, Deserialize)]
pub struct StatusWebhook {
    #[serde(rename = "From")]
    pub from: Option<String>,
    #[serde(rename = "CallStatus")]
    pub call_status: Option<String>,
    #[serde(rename = "CallDuration")]
    pub call_duration: Option<String>,
}

/// `POST /twilio/status`: call lifecycle callback, logged only.
pub async fn call_status(Form(webhook): Form<StatusWebhook>) -> StatusCode {
    info!(
        from = ?webhook.from,
        status = ?webhook.call_status,
        duration_secs = ?webhook.call_duration,
        "call status update"
    );
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Speech audio
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct TtsParams {
    pub text: String,
    pub voice: Option<String>,
}

/// `GET /tts`: render (or replay) the audio for a phrase.
///
/// A synthesis failure here is the one collaborator fault the core does
/// not absorb: there is no audio to apologize with, so the call-control
/// layer gets a plain 500.
pub async fn tts(
    State(state): State<GatewayState>,
    Query(params): Query<TtsParams>,
) -> Response {
    if params.text.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "missing text").into_response();
    }
    match state
        .speech
        .get_or_render(&params.text, params.voice.as_deref(), state.tts.as_ref())
        .await
    {
        Ok(audio) => ([(header::CONTENT_TYPE, "audio/wav")], audio).into_response(),
        Err(e) => {
            error!(error = %e, "speech synthesis failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "synthesis failed").into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// Service info
// ---------------------------------------------------------------------------

pub async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "status": "success",
        "message": "Stomatologia Kraków – AI Voice Receptionist",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

// ---------------------------------------------------------------------------
// Staff API
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct BookRequest {
    pub patient_name: String,
    pub phone_number: String,
    pub service: String,
    pub date: NaiveDate,
    /// "HH:MM" clinic-local.
    pub time: String,
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

/// `POST /api/appointments`
pub async fn api_book(
    State(state): State<GatewayState>,
    Json(req): Json<BookRequest>,
) -> Response {
    let Some(time) = parse_time(&req.time) else {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"error": "time must be HH:MM"})),
        )
            .into_response();
    };
    match state
        .ledger
        .book(&req.patient_name, &req.phone_number, &req.service, req.date, time)
        .await
    {
        Ok(appointment) => (StatusCode::CREATED, Json(appointment)).into_response(),
        Err(e @ BookingError::SlotTaken(_)) => {
            warn!(error = %e, "booking conflict");
            (StatusCode::CONFLICT, Json(json!({"error": e.to_string()}))).into_response()
        }
        Err(e) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

/// `DELETE /api/appointments/:id`
pub async fn api_cancel(
    State(state): State<GatewayState>,
    Path(id): Path<Uuid>,
) -> Response {
    match state.ledger.cancel(id).await {
        Ok(appointment) => Json(appointment).into_response(),
        Err(e) => {
            (StatusCode::NOT_FOUND, Json(json!({"error": e.to_string()}))).into_response()
        }
    }
}

/// `GET /api/appointments/:id`
pub async fn api_get_appointment(
    State(state): State<GatewayState>,
    Path(id): Path<Uuid>,
) -> Response {
    match state.ledger.get(id).await {
        Some(appointment) => Json(appointment).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "appointment not found"})),
        )
            .into_response(),
    }
}

/// `GET /api/appointments/today`
pub async fn api_today(State(state): State<GatewayState>) -> Response {
    let today = Local::now().date_naive();
    Json(state.ledger.appointments_for_day(today).await).into_response()
}

/// `GET /api/stats`
pub async fn api_stats(State(state): State<GatewayState>) -> Response {
    Json(state.ledger.stats().await).into_response()
}

/// `DELETE /api/sessions/:caller_id`: explicit per-caller session reset.
pub async fn api_reset_session(
    State(state): State<GatewayState>,
    Path(caller_id): Path<String>,
) -> StatusCode {
    state.sessions.clear(&caller_id).await;
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time_accepts_both_forms() {
        assert_eq!(parse_time("10:30"), NaiveTime::from_hms_opt(10, 30, 0));
        assert_eq!(parse_time("10:30:00"), NaiveTime::from_hms_opt(10, 30, 0));
        assert_eq!(parse_time("za późno"), None);
    }

    #[test]
    fn test_tts_url_encodes_query() {
        let url = tts_url("https://clinic.example", "Dzień dobry! Co słychać?");
        assert!(url.starts_with("https://clinic.example/tts?text="));
        assert!(!url.contains(' '));
        assert!(!url.contains('!'));
    }

    #[test]
    fn test_tts_url_clamps_long_text() {
        let long = "a".repeat(2000);
        let url = tts_url("https://clinic.example", &long);
        let query = url.split("text=").nth(1).unwrap();
        assert_eq!(query.len(), MAX_TTS_TEXT);
    }
}
