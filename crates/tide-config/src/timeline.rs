//! Timeline view configuration.

use chrono::{FixedOffset, Local, Offset};
use serde::{Deserialize, Serialize};
use tide_core::calendar::WeekStart;

use crate::ConfigError;

/// Default ± window around today for daily views, in days.
const fn default_window_days() -> u32 {
    7
}

const MAX_WINDOW_DAYS: u32 = 366;
const MAX_OFFSET_MINUTES: i32 = 24 * 60 - 1;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TimelineConfig {
    /// Days loaded on each side of today.
    #[serde(default = "default_window_days")]
    pub window_days: u32,

    /// First day of weekly views.
    #[serde(default)]
    pub week_starts_on: WeekStart,

    /// UTC offset used to bucket by local date. Unset means the system's
    /// current local offset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_offset_minutes: Option<i32>,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            week_starts_on: WeekStart::default(),
            utc_offset_minutes: None,
        }
    }
}

impl TimelineConfig {
    /// The configured offset, if one is set and in range.
    pub fn fixed_offset(&self) -> Option<FixedOffset> {
        self.utc_offset_minutes
            .and_then(|minutes| FixedOffset::east_opt(minutes * 60))
    }

    /// The configured offset, else the system's local offset right now.
    pub fn offset(&self) -> FixedOffset {
        self.fixed_offset()
            .unwrap_or_else(|| Local::now().offset().fix())
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_WINDOW_DAYS).contains(&self.window_days) {
            return Err(ConfigError::invalid(
                "timeline.window_days",
                format!("must be between 1 and {MAX_WINDOW_DAYS}"),
            ));
        }
        if let Some(minutes) = self.utc_offset_minutes {
            if minutes.abs() > MAX_OFFSET_MINUTES {
                return Err(ConfigError::invalid(
                    "timeline.utc_offset_minutes",
                    format!("must be within ±{MAX_OFFSET_MINUTES}"),
                ));
            }
        }
        Ok(())
    }
}
