//! Time-of-day windows for the light relay.
//!
//! Pure functions over [`TimeOfDay`]; the relay task asks
//! [`is_within_schedule`] once per evaluation.  Windows are inclusive at
//! both ends at minute resolution, so `15:35-16:55` is on from 15:35:00
//! until 16:55:59.  A window whose start is later than its end wraps past
//! midnight.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Year reported by an RTC that has never been synchronised.
pub const SENTINEL_YEAR: u16 = 2000;

// ═══════════════════════════════════════════════════════════════
//  Time of day
// ═══════════════════════════════════════════════════════════════

/// Hour and minute of the local day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    pub const MIDNIGHT: Self = Self { hour: 0, minute: 0 };

    /// `None` if `hour > 23` or `minute > 59`.
    pub const fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour > 23 || minute > 59 {
            None
        } else {
            Some(Self { hour, minute })
        }
    }

    pub const fn hour(self) -> u8 {
        self.hour
    }

    pub const fn minute(self) -> u8 {
        self.minute
    }

    /// Minutes since midnight.
    pub const fn minutes(self) -> u16 {
        self.hour as u16 * 60 + self.minute as u16
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseTimeError;

impl fmt::Display for ParseTimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected a time of day as H:MM or HH:MM")
    }
}

impl std::error::Error for ParseTimeError {}

impl FromStr for TimeOfDay {
    type Err = ParseTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (h, m) = s.trim().split_once(':').ok_or(ParseTimeError)?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(ParseTimeError);
        }
        let hour = h.parse::<u8>().map_err(|_| ParseTimeError)?;
        let minute = m.parse::<u8>().map_err(|_| ParseTimeError)?;
        Self::new(hour, minute).ok_or(ParseTimeError)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ParseTimeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> Self {
        t.to_string()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Wall clock
// ═══════════════════════════════════════════════════════════════

/// Local calendar date and time as reported by a
/// [`ClockPort`](crate::app::ports::ClockPort).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallClock {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub time: TimeOfDay,
    pub second: u8,
}

impl WallClock {
    /// The value an unsynchronised RTC reports after power-up.
    pub const UNSYNCED: Self = Self {
        year: SENTINEL_YEAR,
        month: 1,
        day: 1,
        time: TimeOfDay::MIDNIGHT,
        second: 0,
    };

    /// `false` while the clock still sits in the sentinel year.
    pub fn is_synced(&self) -> bool {
        self.year != SENTINEL_YEAR
    }

    pub fn from_offset_datetime(dt: time::OffsetDateTime) -> Self {
        Self {
            year: dt.year().clamp(0, i32::from(u16::MAX)) as u16,
            month: u8::from(dt.month()),
            day: dt.day(),
            time: TimeOfDay {
                hour: dt.hour(),
                minute: dt.minute(),
            },
            second: dt.second(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Windows
// ═══════════════════════════════════════════════════════════════

/// One on-window for the light relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleWindow {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl ScheduleWindow {
    pub const fn new(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self { start, end }
    }

    /// Inclusive at both ends.
    pub fn contains(&self, t: TimeOfDay) -> bool {
        if self.start <= self.end {
            t >= self.start && t <= self.end
        } else {
            // e.g. 22:00-02:00, wraps around midnight
            t >= self.start || t <= self.end
        }
    }
}

impl fmt::Display for ScheduleWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// `true` iff `now` falls inside any of `windows`.
pub fn is_within_schedule(windows: &[ScheduleWindow], now: TimeOfDay) -> bool {
    windows.iter().any(|w| w.contains(now))
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
