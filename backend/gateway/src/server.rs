//! Main HTTP gateway server.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::routing::{delete, get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use frontdesk_calendar::AppointmentBook;
use frontdesk_config::Config;
use frontdesk_dialogue::TurnController;
use frontdesk_sessions::SessionStore;
use frontdesk_speech::{SpeechCache, TtsProvider};

use crate::routes;

/// Application state shared across routes.
#[derive(Clone)]
pub struct GatewayState {
    pub controller: Arc<TurnController>,
    pub ledger: AppointmentBook,
    pub sessions: SessionStore,
    pub speech: SpeechCache,
    pub tts: Arc<dyn TtsProvider>,
    pub config: Arc<Config>,
}

/// Build the full application router.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        // Twilio call control
        .route("/twilio/voice", post(routes::voice))
        .route("/twilio/process-speech", post(routes::process_speech))
        .route("/twilio/status", post(routes::call_status))
        // Rendered speech audio
        .route("/tts", get(routes::tts))
        // Service info
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        // Staff API
        .route("/api/appointments", post(routes::api_book))
        .route("/api/appointments/today", get(routes::api_today))
        .route(
            "/api/appointments/:id",
            get(routes::api_get_appointment).delete(routes::api_cancel),
        )
        .route("/api/sessions/:caller_id", delete(routes::api_reset_session))
        .route("/api/stats", get(routes::api_stats))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the Axum HTTP server.
pub async fn start_server(addr: SocketAddr, state: GatewayState) -> Result<()> {
    let app = router(state);
    info!("gateway HTTP server listening on {}", addr);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
