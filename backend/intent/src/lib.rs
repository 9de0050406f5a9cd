//! Intent resolution: chat-completion providers and the adapter that
//! turns a caller utterance into a typed `(message, action)` pair.

pub mod prompt;
pub mod providers;
pub mod resolver;

pub use resolver::{IntentResolver, DEFAULT_RESOLVE_TIMEOUT};
