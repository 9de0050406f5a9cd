//! Speech synthesis: provider trait, Azure REST implementation, SSML
//! construction, and the bounded output cache.

pub mod cache;
pub mod ssml;
pub mod synth;

pub use cache::{SpeechCache, MAX_CACHE_ENTRIES};
pub use synth::{AzureTts, TtsProvider, TtsRequest};
