//! Per-caller conversation session store.

pub mod store;

pub use store::{SessionStore, HISTORY_WINDOW, MAX_SESSIONS, MAX_TRANSCRIPT};
