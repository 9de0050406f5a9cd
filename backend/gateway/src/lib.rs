//! HTTP shell: Twilio webhook routes, TwiML rendering, the `/tts` audio
//! endpoint, and the small staff JSON API.

pub mod routes;
pub mod server;
pub mod twiml;

pub use server::{start_server, GatewayState};
