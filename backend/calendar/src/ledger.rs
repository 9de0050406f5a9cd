//! In-memory appointment ledger.
//!
//! Owns the appointment records and the booked-slot key set. Process
//! lifetime only; a restart loses the ledger, which is an accepted
//! limitation of this deployment. Booking conflicts are expected business
//! outcomes on the concurrent hot path and are typed results, not faults.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::slots::{self, Slot, SPOKEN_SLOT_COUNT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Cancelled,
}

/// A booked appointment. Never physically deleted; cancellation flips the
/// status and frees the slot key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_name: String,
    pub phone_number: String,
    pub service: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

/// Expected, recoverable booking outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    #[error("slot {0} is already taken")]
    SlotTaken(String),

    #[error("slot {0} is outside clinic working hours")]
    OutsideWorkingHours(String),

    #[error("appointment {0} not found")]
    NotFound(Uuid),
}

/// Ledger counters for operational visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LedgerStats {
    pub total: usize,
    pub scheduled: usize,
    pub cancelled: usize,
    pub booked_slots: usize,
}

#[derive(Default)]
struct LedgerInner {
    appointments: HashMap<Uuid, Appointment>,
    booked: HashSet<String>,
}

/// Shared appointment ledger. All check-then-update sequences run under a
/// single lock so two concurrent callers can never book the same slot.
#[derive(Clone, Default)]
pub struct AppointmentBook {
    inner: Arc<Mutex<LedgerInner>>,
}

impl AppointmentBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Free slots from the day after `today` through `horizon_days` ahead.
    pub async fn available_slots(
        &self,
        today: NaiveDate,
        horizon_days: u32,
        limit: usize,
    ) -> Vec<Slot> {
        let inner = self.inner.lock().await;
        slots::generate(today, horizon_days, limit, &inner.booked)
    }

    /// First few free slots formatted for speech. Never fails: when no
    /// slot can be produced, a static fallback list keeps the dialogue
    /// moving.
    pub async fn spoken_slots(&self, today: NaiveDate) -> Vec<String> {
        let available = self
            .available_slots(today, slots::DEFAULT_HORIZON_DAYS, slots::DEFAULT_SLOT_LIMIT)
            .await;
        let formatted: Vec<String> = available
            .iter()
            .take(SPOKEN_SLOT_COUNT)
            .map(slots::format_spoken)
            .collect();
        if formatted.is_empty() {
            warn!("no free slots to offer, falling back to static phrases");
            return vec![
                "jutro o 10:00".to_string(),
                "pojutrze o 14:30".to_string(),
                "w piątek o 16:00".to_string(),
            ];
        }
        info!(count = formatted.len(), "generated spoken slots");
        formatted
    }

    /// Book a slot. The slot must belong to the working-hours policy for
    /// that date and must not already be taken; the check and the insert
    /// are one critical section.
    pub async fn book(
        &self,
        patient_name: &str,
        phone_number: &str,
        service: &str,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<Appointment, BookingError> {
        let key = slots::slot_key(date, time);
        let mut inner = self.inner.lock().await;

        if !slots::in_working_hours(date, time) {
            return Err(BookingError::OutsideWorkingHours(key));
        }
        if inner.booked.contains(&key) {
            return Err(BookingError::SlotTaken(key));
        }

        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_name: patient_name.to_string(),
            phone_number: phone_number.to_string(),
            service: service.to_string(),
            date,
            time,
            status: AppointmentStatus::Scheduled,
            created_at: Utc::now(),
            cancelled_at: None,
        };
        inner.booked.insert(key);
        inner.appointments.insert(appointment.id, appointment.clone());
        info!(
            id = %appointment.id,
            patient = %appointment.patient_name,
            date = %date,
            time = %time,
            "appointment booked"
        );
        Ok(appointment)
    }

    /// Cancel a scheduled appointment, freeing its slot. Cancelling an
    /// unknown or already-cancelled id is a not-found result.
    pub async fn cancel(&self, id: Uuid) -> Result<Appointment, BookingError> {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;
        match inner.appointments.get_mut(&id) {
            Some(a) if a.status == AppointmentStatus::Scheduled => {
                inner.booked.remove(&slots::slot_key(a.date, a.time));
                a.status = AppointmentStatus::Cancelled;
                a.cancelled_at = Some(Utc::now());
                info!(id = %id, "appointment cancelled");
                Ok(a.clone())
            }
            _ => Err(BookingError::NotFound(id)),
        }
    }

    /// Look up an appointment by id.
    pub async fn get(&self, id: Uuid) -> Option<Appointment> {
        self.inner.lock().await.appointments.get(&id).cloned()
    }

    /// Scheduled appointments for one day, time-ordered.
    pub async fn appointments_for_day(&self, date: NaiveDate) -> Vec<Appointment> {
        let inner = self.inner.lock().await;
        let mut out: Vec<Appointment> = inner
            .appointments
            .values()
            .filter(|a| a.date == date && a.status == AppointmentStatus::Scheduled)
            .cloned()
            .collect();
        out.sort_by_key(|a| a.time);
        out
    }

    pub async fn stats(&self) -> LedgerStats {
        let inner = self.inner.lock().await;
        let scheduled = inner
            .appointments
            .values()
            .filter(|a| a.status == AppointmentStatus::Scheduled)
            .count();
        LedgerStats {
            total: inner.appointments.len(),
            scheduled,
            cancelled: inner.appointments.len() - scheduled,
            booked_slots: inner.booked.len(),
        }
    }
}
