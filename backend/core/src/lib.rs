//! Core types, traits, and errors shared across the FrontDesk runtime.

pub mod error;
pub mod traits;
pub mod types;

pub use error::FrontDeskError;
pub use traits::{ChatMessage, ChatProvider, ChatRequest, ChatResponse};
pub use types::{CallerAction, ResolvedIntent, Role, Turn, TurnDecision};
