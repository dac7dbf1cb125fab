//! Wall-clock [`Clock`] implementation.

use caixa_core::Clock;
use chrono::{Local, NaiveDateTime, Timelike};

/// Reads the local system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        let now = Local::now().naive_local();
        now.with_nanosecond(0).unwrap_or(now)
    }
}
