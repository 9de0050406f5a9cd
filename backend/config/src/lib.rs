//! Environment-based runtime configuration.
//!
//! Everything has a usable default except the collaborator credentials;
//! `validate` reports those at startup instead of failing lazily on the
//! first call.

use serde::Deserialize;

/// FrontDesk runtime configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// HTTP server bind address
    pub bind_address: String,
    /// HTTP server port
    pub port: u16,
    /// Public base URL Twilio uses to fetch `/tts` audio (proxy-facing).
    pub public_base_url: Option<String>,
    /// OpenAI API key
    pub openai_api_key: Option<String>,
    /// Chat model for intent resolution
    pub model: String,
    /// Azure Speech subscription key
    pub azure_speech_key: Option<String>,
    /// Azure Speech region, e.g. "westeurope"
    pub azure_speech_region: Option<String>,
    /// Default synthesis voice
    pub voice: String,
    /// Reception phone number spoken on escalation
    pub reception_number: String,
    /// Log level
    pub log_level: String,
    /// Optional directory for rolling file logs
    pub log_dir: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3000,
            public_base_url: None,
            openai_api_key: None,
            model: "gpt-4o-mini".to_string(),
            azure_speech_key: None,
            azure_speech_region: None,
            voice: "en-US-JennyMultilingualNeural".to_string(),
            reception_number: "+48 123 456 789".to_string(),
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_address: std::env::var("FRONTDESK_BIND").unwrap_or(defaults.bind_address),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            public_base_url: std::env::var("PUBLIC_BASE_URL").ok(),
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            model: std::env::var("OPENAI_MODEL").unwrap_or(defaults.model),
            azure_speech_key: std::env::var("AZURE_SPEECH_KEY").ok(),
            azure_speech_region: std::env::var("AZURE_SPEECH_REGION").ok(),
            voice: std::env::var("AZURE_VOICE_NAME").unwrap_or(defaults.voice),
            reception_number: std::env::var("RECEPTION_NUMBER")
                .unwrap_or(defaults.reception_number),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            log_dir: std::env::var("FRONTDESK_LOG_DIR").ok(),
        }
    }

    /// Names of required variables that are missing or blank.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());
        if blank(&self.openai_api_key) {
            missing.push("OPENAI_API_KEY");
        }
        if blank(&self.azure_speech_key) {
            missing.push("AZURE_SPEECH_KEY");
        }
        if blank(&self.azure_speech_region) {
            missing.push("AZURE_SPEECH_REGION");
        }
        missing
    }

    /// Log the outcome of the startup variable check, like a deployment
    /// smoke test. Returns `false` when anything required is missing.
    pub fn validate(&self) -> bool {
        let missing = self.missing_required();
        if missing.is_empty() {
            tracing::info!("all required environment variables present");
            true
        } else {
            for var in &missing {
                tracing::error!(var, "missing required environment variable");
            }
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_usable() {
        let config = Config::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.model, "gpt-4o-mini");
        assert!(!config.reception_number.is_empty());
    }

    #[test]
    fn test_missing_required_lists_absent_credentials() {
        let config = Config::default();
        assert_eq!(
            config.missing_required(),
            vec!["OPENAI_API_KEY", "AZURE_SPEECH_KEY", "AZURE_SPEECH_REGION"]
        );
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let config = Config {
            openai_api_key: Some("  ".to_string()),
            azure_speech_key: Some("key".to_string()),
            azure_speech_region: Some("westeurope".to_string()),
            ..Config::default()
        };
        assert_eq!(config.missing_required(), vec!["OPENAI_API_KEY"]);
    }

    #[test]
    fn test_fully_configured_validates() {
        let config = Config {
            openai_api_key: Some("sk-abc".to_string()),
            azure_speech_key: Some("key".to_string()),
            azure_speech_region: Some("westeurope".to_string()),
            ..Config::default()
        };
        assert!(config.missing_required().is_empty());
        assert!(config.validate());
    }
}
