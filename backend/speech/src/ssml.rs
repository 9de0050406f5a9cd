//! SSML document construction for the synthesis request body.
//!
//! Multilingual voices (Jenny/Dragon/Multilingual families) need the text
//! wrapped in `<lang xml:lang="pl-PL">` or they drift into English
//! pronunciation of Polish words; plain Polish voices take the prosody
//! element directly.

const LANG: &str = "pl-PL";

/// Escape text for embedding in SSML character data or attributes.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

fn is_multilingual(voice: &str) -> bool {
    let v = voice.to_ascii_lowercase();
    v.contains("multilingual") || v.contains("dragon") || v.contains("jenny")
}

/// Build the SSML body for a synthesis request.
pub fn build(text: &str, voice: &str) -> String {
    let safe = escape_xml(text.trim());
    if is_multilingual(voice) {
        format!(
            r#"<speak version="1.0" xml:lang="{LANG}" xmlns:mstts="https://www.w3.org/2001/mstts"><voice name="{voice}"><lang xml:lang="{LANG}"><mstts:express-as style="assistant"><prosody rate="+0%" pitch="+0%">{safe}</prosody></mstts:express-as></lang></voice></speak>"#
        )
    } else {
        format!(
            r#"<speak version="1.0" xml:lang="{LANG}"><voice name="{voice}"><prosody rate="+0%" pitch="+0%">{safe}</prosody></voice></speak>"#
        )
    }
}
