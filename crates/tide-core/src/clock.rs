//! Injectable source of "now".
//!
//! Rollover and bucketing depend on the current date, so nothing in Tide
//! reads ambient system time directly. Hosts pass a [`Clock`]; tests pass a
//! [`FixedClock`].

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Offset, Utc};

use crate::calendar::local_date;

/// Provides the current instant and the local offset used to turn it into a
/// calendar date.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn offset(&self) -> FixedOffset;

    /// Today's calendar date in the clock's local offset.
    fn today(&self) -> NaiveDate {
        local_date(self.now(), self.offset())
    }
}

/// Wall clock. Uses the system's local offset unless one is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    offset: Option<FixedOffset>,
}

impl SystemClock {
    #[must_use]
    pub const fn new() -> Self {
        Self { offset: None }
    }

    #[must_use]
    pub const fn with_offset(offset: FixedOffset) -> Self {
        Self {
            offset: Some(offset),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn offset(&self) -> FixedOffset {
        self.offset.unwrap_or_else(|| Local::now().offset().fix())
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
    offset: FixedOffset,
}

impl FixedClock {
    #[must_use]
    pub const fn new(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self { now, offset }
    }

    /// Noon UTC on `date`, with a UTC offset.
    #[must_use]
    pub fn at_noon(date: NaiveDate) -> Self {
        let now = date
            .and_hms_opt(12, 0, 0)
            .map_or_else(Utc::now, |naive| naive.and_utc());
        Self {
            now,
            offset: Utc.fix(),
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn offset(&self) -> FixedOffset {
        self.offset
    }
}
