//! Deterministic slot generation under the clinic working-hours policy.
//!
//! Slots are never persisted; they are recomputed on every availability
//! query and filtered against the ledger's booked keys. The policy:
//! Mon-Fri 10:00-20:00, Saturday 10:00-15:00, Sunday closed, 30-minute
//! granularity.
//!
//! Enumeration is parameterized on `today` so callers control the clock
//! and tests stay deterministic. Production passes the clinic-local
//! calendar date; the process is expected to run in the clinic timezone.

use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// How far ahead availability queries look.
pub const DEFAULT_HORIZON_DAYS: u32 = 14;

/// Maximum slots returned by an availability query.
pub const DEFAULT_SLOT_LIMIT: usize = 20;

/// Slots spoken to the caller in one reply.
pub const SPOKEN_SLOT_COUNT: usize = 5;

/// A candidate appointment time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub date: NaiveDate,
    pub time: NaiveTime,
    /// Unique key `YYYY-MM-DD_HH:MM`, shared with the booked-slot set.
    pub key: String,
}

impl Slot {
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            date,
            time,
            key: slot_key(date, time),
        }
    }
}

/// Canonical booked-set key for a (date, time) pair.
pub fn slot_key(date: NaiveDate, time: NaiveTime) -> String {
    format!("{}_{}", date.format("%Y-%m-%d"), time.format("%H:%M"))
}

/// Opening hours for a weekday as half-open `[start, end)` full hours.
/// `None` means closed.
fn opening_hours(weekday: Weekday) -> Option<(u32, u32)> {
    match weekday {
        Weekday::Sun => None,
        Weekday::Sat => Some((10, 15)),
        _ => Some((10, 20)),
    }
}

/// Whether (date, time) is a slot the policy actually generates.
pub fn in_working_hours(date: NaiveDate, time: NaiveTime) -> bool {
    use chrono::Timelike;
    let Some((start, end)) = opening_hours(date.weekday()) else {
        return false;
    };
    time.hour() >= start
        && time.hour() < end
        && (time.minute() == 0 || time.minute() == 30)
        && time.second() == 0
}

/// Enumerate free slots from the day after `today` through `horizon_days`
/// ahead, skipping booked keys, ordered by date then time, truncated to
/// `limit`.
pub fn generate(
    today: NaiveDate,
    horizon_days: u32,
    limit: usize,
    booked: &HashSet<String>,
) -> Vec<Slot> {
    let mut slots = Vec::new();
    'days: for day in 1..=horizon_days as i64 {
        let date = today + Duration::days(day);
        let Some((start, end)) = opening_hours(date.weekday()) else {
            continue;
        };
        for hour in start..end {
            for minute in [0, 30] {
                let time = NaiveTime::from_hms_opt(hour, minute, 0)
                    .expect("hour/minute within range");
                let key = slot_key(date, time);
                if booked.contains(&key) {
                    continue;
                }
                if slots.len() >= limit {
                    break 'days;
                }
                slots.push(Slot { date, time, key });
            }
        }
    }
    slots
}

/// Polish weekday name, lowercase as spoken.
fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "poniedziałek",
        Weekday::Tue => "wtorek",
        Weekday::Wed => "środa",
        Weekday::Thu => "czwartek",
        Weekday::Fri => "piątek",
        Weekday::Sat => "sobota",
        Weekday::Sun => "niedziela",
    }
}

/// Format a slot for speech: "<weekday> <DD.MM.YYYY> o <HH:MM>".
pub fn format_spoken(slot: &Slot) -> String {
    format!(
        "{} {} o {}",
        weekday_name(slot.date.weekday()),
        slot.date.format("%d.%m.%Y"),
        slot.time.format("%H:%M")
    )
}
