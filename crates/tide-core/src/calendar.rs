//! Calendar-date helpers.
//!
//! Every "how many days" question in Tide is answered on `NaiveDate`, never by
//! subtracting timestamps. Timestamps are converted to a local calendar date
//! once, at the boundary, with [`local_date`].

use chrono::{
    DateTime, Datelike, Days, FixedOffset, NaiveDate, NaiveTime, TimeDelta, Utc, Weekday,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Signed number of calendar days from `earlier` to `later`.
///
/// Positive when `later` is after `earlier`. Independent of time-of-day and
/// DST because both sides are plain dates.
#[must_use]
pub fn day_difference(later: NaiveDate, earlier: NaiveDate) -> i64 {
    later.signed_duration_since(earlier).num_days()
}

/// Calendar date of `ts` as seen from `offset`.
#[must_use]
pub fn local_date(ts: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    ts.with_timezone(&offset).date_naive()
}

/// The instant local midnight begins on `date` in `offset`.
#[must_use]
pub fn day_start(date: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
        - TimeDelta::seconds(i64::from(offset.local_minus_utc()))
}

/// The last representable instant (millisecond precision) of `date` in `offset`.
#[must_use]
pub fn day_end(date: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    day_start(shift_days(date, 1), offset) - TimeDelta::milliseconds(1)
}

/// Inclusive list of dates from `start` to `end`. Empty when `end < start`.
#[must_use]
pub fn dates_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}

/// Shift `date` by a signed number of days, saturating at chrono's bounds.
#[must_use]
pub fn shift_days(date: NaiveDate, days: i64) -> NaiveDate {
    let magnitude = Days::new(days.unsigned_abs());
    let shifted = if days >= 0 {
        date.checked_add_days(magnitude)
    } else {
        date.checked_sub_days(magnitude)
    };
    shifted.unwrap_or(if days >= 0 {
        NaiveDate::MAX
    } else {
        NaiveDate::MIN
    })
}

/// First day of the week used by weekly views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

impl WeekStart {
    #[must_use]
    pub const fn weekday(self) -> Weekday {
        match self {
            Self::Monday => Weekday::Mon,
            Self::Sunday => Weekday::Sun,
        }
    }

    /// The first day of the week containing `date`.
    #[must_use]
    pub fn week_containing(self, date: NaiveDate) -> NaiveDate {
        let back = match self {
            Self::Monday => date.weekday().num_days_from_monday(),
            Self::Sunday => date.weekday().num_days_from_sunday(),
        };
        shift_days(date, -i64::from(back))
    }
}
