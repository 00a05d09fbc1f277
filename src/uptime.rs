//! Site uptime counter.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

const SECS_PER_MINUTE: i64 = 60;
const SECS_PER_HOUR: i64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: i64 = 24 * SECS_PER_HOUR;

/// Elapsed time since the site went live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Uptime {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Uptime {
    /// Break `now - start` into whole days and the remaining h/min/s.
    /// A `now` earlier than `start` yields all zeros.
    pub fn between(start: NaiveDateTime, now: NaiveDateTime) -> Self {
        let total = (now - start).num_seconds().max(0);
        Self {
            days: total / SECS_PER_DAY,
            hours: total % SECS_PER_DAY / SECS_PER_HOUR,
            minutes: total % SECS_PER_HOUR / SECS_PER_MINUTE,
            seconds: total % SECS_PER_MINUTE,
        }
    }

    /// Uptime measured from midnight of `start`.
    pub fn since(start: NaiveDate, now: NaiveDateTime) -> Self {
        Self::between(start.and_time(chrono::NaiveTime::MIN), now)
    }

    /// Attach a label for display.
    pub fn labelled(self, label: &str) -> UptimeDisplay<'_> {
        UptimeDisplay { label, uptime: self }
    }
}

impl fmt::Display for Uptime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} days {} h {} min {} s", self.days, self.hours, self.minutes, self.seconds)
    }
}

/// `"<label> D days H h M min S s"`.
#[derive(Debug, Clone, Copy)]
pub struct UptimeDisplay<'a> {
    label: &'a str,
    uptime: Uptime,
}

impl fmt::Display for UptimeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.label.is_empty() {
            write!(f, "{}", self.uptime)
        } else {
            write!(f, "{} {}", self.label, self.uptime)
        }
    }
}
