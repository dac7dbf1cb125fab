//! # Clock
//!
//! Source of "now" for stamping sales and picking the day to close.
//!
//! The wall-clock implementation lives in `caixa-db` (reading the system
//! clock is I/O). Tests use [`FixedClock`].

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use std::sync::Mutex;

/// Provides the current local time.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current local date and time, truncated to whole seconds.
    fn now(&self) -> NaiveDateTime;

    /// Current calendar day.
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        FixedClock {
            now: Mutex::new(now),
        }
    }

    /// Starts at `hour:minute:00` on the given day.
    pub fn at(day: NaiveDate, hour: u32, minute: u32) -> Self {
        FixedClock::new(day.and_hms_opt(hour, minute, 0).unwrap_or_default())
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance_secs(&self, secs: i64) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += TimeDelta::seconds(secs);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}
