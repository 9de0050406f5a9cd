//! Minimal TwiML document builder.
//!
//! Only the verbs this service answers with: `<Play>`, `<Gather>` with
//! speech input, `<Redirect>`, and `<Hangup>`. Attribute and text values
//! are XML-escaped at the boundary.

use std::fmt::Write;

/// ASR hints passed to Twilio speech recognition; clinic vocabulary
/// markedly improves Polish transcription.
pub const SPEECH_HINTS: &str = "higienizacja, aparat, rentgen, wyrwanie zęba, \
nakładki, retencja, Kraków, termin, wizyta";

const LANGUAGE: &str = "pl-PL";
const GATHER_TIMEOUT_SECS: u32 = 10;

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// A TwiML `<Response>` under construction.
#[derive(Debug, Default)]
pub struct VoiceResponse {
    body: String,
}

impl VoiceResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Play an audio URL.
    pub fn play(mut self, url: &str) -> Self {
        let _ = write!(self.body, "<Play>{}</Play>", escape(url));
        self
    }

    /// Gather a speech utterance, playing `prompt_url` first. Posts the
    /// transcript (possibly empty, `actionOnEmptyResult`) to `action`.
    pub fn gather_speech(mut self, action: &str, prompt_url: &str) -> Self {
        let _ = write!(
            self.body,
            r#"<Gather input="speech" language="{LANGUAGE}" timeout="{GATHER_TIMEOUT_SECS}" speechTimeout="auto" action="{}" method="POST" actionOnEmptyResult="true" hints="{}"><Play>{}</Play></Gather>"#,
            escape(action),
            escape(SPEECH_HINTS),
            escape(prompt_url),
        );
        self
    }

    pub fn redirect(mut self, url: &str) -> Self {
        let _ = write!(self.body, "<Redirect>{}</Redirect>", escape(url));
        self
    }

    pub fn hangup(mut self) -> Self {
        self.body.push_str("<Hangup/>");
        self
    }

    /// Serialize the complete document.
    pub fn to_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><Response>{}</Response>"#,
            self.body
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_and_hangup_document() {
        let xml = VoiceResponse::new()
            .play("https://example.com/tts?text=halo")
            .hangup()
            .to_xml();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?><Response>"#));
        assert!(xml.contains("<Play>https://example.com/tts?text=halo</Play>"));
        assert!(xml.ends_with("<Hangup/></Response>"));
    }

    #[test]
    fn test_gather_carries_speech_attributes() {
        let xml = VoiceResponse::new()
            .gather_speech("/twilio/process-speech", "https://example.com/tts?text=x")
            .to_xml();
        assert!(xml.contains(r#"input="speech""#));
        assert!(xml.contains(r#"language="pl-PL""#));
        assert!(xml.contains(r#"actionOnEmptyResult="true""#));
        assert!(xml.contains(r#"action="/twilio/process-speech""#));
        assert!(xml.contains("hints="));
        // The prompt is nested inside the gather.
        assert!(xml.contains("</Play></Gather>"));
    }

    #[test]
    fn test_urls_are_escaped() {
        let xml = VoiceResponse::new()
            .play("https://example.com/tts?text=a&voice=b")
            .to_xml();
        assert!(xml.contains("text=a&amp;voice=b"));
        assert!(!xml.contains("a&voice"));
    }

    #[test]
    fn test_redirect() {
        let xml = VoiceResponse::new().redirect("/twilio/voice").to_xml();
        assert_eq!(
            xml,
            r#"<?xml version="1.0" encoding="UTF-8"?><Response><Redirect>/twilio/voice</Redirect></Response>"#
        );
    }
}
