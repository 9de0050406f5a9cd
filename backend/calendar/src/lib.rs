//! Appointment ledger and slot-generation policy for the clinic calendar.

pub mod ledger;
pub mod slots;

pub use ledger::{Appointment, AppointmentBook, AppointmentStatus, BookingError, LedgerStats};
pub use slots::{Slot, DEFAULT_HORIZON_DAYS, DEFAULT_SLOT_LIMIT};
