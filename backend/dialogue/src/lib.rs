//! Dialogue turn orchestration: transcript in, spoken reply and
//! continue-or-hangup decision out.

pub mod controller;
pub mod phase;

pub use controller::TurnController;
pub use phase::DialoguePhase;
