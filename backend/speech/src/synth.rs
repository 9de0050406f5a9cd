/// TTS provider trait and the Azure Cognitive Services implementation.
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::info;

use frontdesk_core::FrontDeskError;

use crate::ssml;

/// Output format served to the telephony layer: 8 kHz mono µ-law WAV,
/// what Twilio `<Play>` expects on a phone call.
const OUTPUT_FORMAT: &str = "riff-8khz-8bit-mono-mulaw";

/// A synthesis request.
#[derive(Debug, Clone)]
pub struct TtsRequest {
    pub text: String,
    pub voice: Option<String>,
}

/// Returns raw audio bytes.
#[async_trait]
pub trait TtsProvider: Send + Sync {
    /// Default voice used when a request carries none.
    fn default_voice(&self) -> &str;

    async fn synthesize(&self, req: TtsRequest) -> Result<Bytes>;
}

// ---------------------------------------------------------------------------
// Azure Speech
// ---------------------------------------------------------------------------

pub struct AzureTts {
    subscription_key: String,
    default_voice: String,
    endpoint: String,
    client: Client,
}

impl AzureTts {
    pub fn new(subscription_key: String, region: &str, default_voice: String) -> Self {
        Self {
            subscription_key,
            default_voice,
            endpoint: format!(
                "https://{region}.tts.speech.microsoft.com/cognitiveservices/v1"
            ),
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl TtsProvider for AzureTts {
    fn default_voice(&self) -> &str {
        &self.default_voice
    }

    async fn synthesize(&self, req: TtsRequest) -> Result<Bytes> {
        let voice = req.voice.as_deref().unwrap_or(&self.default_voice);
        let body = ssml::build(&req.text, voice);
        info!(voice = %voice, len = req.text.len(), "[TTS/Azure] synthesizing");
        let response = self
            .client
            .post(&self.endpoint)
            .header("Ocp-Apim-Subscription-Key", &self.subscription_key)
            .header("Content-Type", "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", OUTPUT_FORMAT)
            .header("User-Agent", "frontdesk")
            .body(body)
            .send()
            .await
            .map_err(|e| FrontDeskError::Synthesis(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FrontDeskError::Synthesis(format!("provider returned {status}")).into());
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FrontDeskError::Synthesis(format!("reading audio body: {e}")))?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::Router;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn provider(endpoint: String) -> AzureTts {
        AzureTts::new(
            "test-key".to_string(),
            "westeurope",
            "pl-PL-ZofiaNeural".to_string(),
        )
        .with_endpoint(endpoint)
    }

    #[tokio::test]
    async fn test_synthesize_sends_ssml_for_default_voice() {
        // Echoes the request body, so the returned "audio" is the SSML.
        let app = Router::new().route("/", post(|body: String| async move { body }));
        let tts = provider(serve(app).await);

        let audio = tts
            .synthesize(TtsRequest {
                text: "Dzień dobry".to_string(),
                voice: None,
            })
            .await
            .unwrap();

        let ssml = String::from_utf8(audio.to_vec()).unwrap();
        assert!(ssml.contains("Dzień dobry"));
        assert!(ssml.contains("pl-PL-ZofiaNeural"));
    }

    #[tokio::test]
    async fn test_error_status_surfaces_as_synthesis_error() {
        let app = Router::new().route("/", post(|| async { StatusCode::FORBIDDEN }));
        let tts = provider(serve(app).await);

        let err = tts
            .synthesize(TtsRequest {
                text: "halo".to_string(),
                voice: None,
            })
            .await
            .unwrap_err();

        match err.downcast_ref::<FrontDeskError>() {
            Some(FrontDeskError::Synthesis(message)) => {
                assert!(message.contains("403"));
            }
            other => panic!("expected Synthesis error, got {other:?}"),
        }
    }
}
