//! Half-hour times of day and the intervals built from them.
//!
//! An interval ending at `00:00` ends at midnight of the same logical day, so
//! `23:30-00:00` is thirty minutes long. All comparisons go through
//! [`Interval::span`], which applies that normalization.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AvailabilityError, Result};

/// Minutes in a day; the normalized value of an interval end at `00:00`.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Every valid time of day falls on this boundary.
pub const GRANULARITY_MINUTES: u32 = 30;

/// A wall-clock time on a half-hour boundary.
///
/// Fields are public so vendor data can be carried as-is; validation happens
/// in [`TimeOfDay::minute_of_day`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hours: u32,
    pub minutes: u32,
}

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay {
        hours: 0,
        minutes: 0,
    };

    /// Validated constructor.
    ///
    /// # Errors
    /// Returns `AvailabilityError::InvalidTime` if `hours > 23` or `minutes`
    /// is not 0 or 30.
    pub fn new(hours: u32, minutes: u32) -> Result<Self> {
        let time = Self::raw(hours, minutes);
        time.minute_of_day()?;
        Ok(time)
    }

    /// Unchecked constructor for data that is validated later.
    pub const fn raw(hours: u32, minutes: u32) -> Self {
        TimeOfDay { hours, minutes }
    }

    /// Minutes since midnight.
    ///
    /// # Errors
    /// Returns `AvailabilityError::InvalidTime` for hours outside 0-23 or
    /// minutes outside {0, 30}.
    pub fn minute_of_day(&self) -> Result<u32> {
        if self.hours > 23 || self.minutes % GRANULARITY_MINUTES != 0 || self.minutes >= 60 {
            return Err(AvailabilityError::InvalidTime {
                hours: self.hours,
                minutes: self.minutes,
            });
        }
        Ok(self.hours * 60 + self.minutes)
    }

    /// Inverse of [`minute_of_day`](Self::minute_of_day); `1440` wraps to `00:00`.
    pub fn from_minute_of_day(minute: u32) -> Self {
        let minute = minute % MINUTES_PER_DAY;
        TimeOfDay {
            hours: minute / 60,
            minutes: minute % 60,
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hours, self.minutes)
    }
}

impl FromStr for TimeOfDay {
    type Err = AvailabilityError;

    /// Parses `HH:MM` (or `H:MM`) into a validated time.
    fn from_str(s: &str) -> Result<Self> {
        let (h, m) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| AvailabilityError::InvalidInput(format!("expected HH:MM, got '{s}'")))?;
        let hours = h
            .parse::<u32>()
            .map_err(|_| AvailabilityError::InvalidInput(format!("bad hours in '{s}'")))?;
        let minutes = m
            .parse::<u32>()
            .map_err(|_| AvailabilityError::InvalidInput(format!("bad minutes in '{s}'")))?;
        TimeOfDay::new(hours, minutes)
    }
}

/// A time range `[start, end)` within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl Interval {
    pub const fn new(start: TimeOfDay, end: TimeOfDay) -> Self {
        Interval { start, end }
    }

    /// The half-open minute range covered by this interval, with an end of
    /// `00:00` normalized to `24:00`.
    ///
    /// Returns `Ok(None)` for a zero-length interval (`start == end`) or one
    /// whose end precedes its start.
    ///
    /// # Errors
    /// Returns `AvailabilityError::InvalidTime` if either bound is malformed.
    pub fn span(&self) -> Result<Option<(u32, u32)>> {
        let start = self.start.minute_of_day()?;
        let mut end = self.end.minute_of_day()?;
        if start == end {
            return Ok(None);
        }
        if end == 0 {
            end = MINUTES_PER_DAY;
        }
        if end <= start {
            return Ok(None);
        }
        Ok(Some((start, end)))
    }

    /// Length in minutes; zero for empty or malformed intervals.
    pub fn duration_minutes(&self) -> u32 {
        match self.span() {
            Ok(Some((start, end))) => end - start,
            _ => 0,
        }
    }

    /// Half-open overlap test: `[a, b)` and `[c, d)` overlap iff
    /// `a < d && c < b`. Empty intervals overlap nothing, and adjacent
    /// intervals do not overlap.
    ///
    /// # Errors
    /// Returns `AvailabilityError::InvalidTime` if either interval is malformed.
    pub fn overlaps(&self, other: &Interval) -> Result<bool> {
        let (Some((a, b)), Some((c, d))) = (self.span()?, other.span()?) else {
            return Ok(false);
        };
        Ok(a < d && c < b)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl FromStr for Interval {
    type Err = AvailabilityError;

    /// Parses `HH:MM-HH:MM`.
    fn from_str(s: &str) -> Result<Self> {
        let (start, end) = s.split_once('-').ok_or_else(|| {
            AvailabilityError::InvalidInput(format!("expected HH:MM-HH:MM, got '{s}'"))
        })?;
        Ok(Interval::new(start.parse()?, end.parse()?))
    }
}
