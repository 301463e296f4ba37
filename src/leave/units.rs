use std::fmt;
use std::ops::Add;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::leave::error::LeaveError;
use crate::model::leave_request::HalfDaySegment;

/// Leave quantity, counted in half days so ledger arithmetic stays exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(into = "f64", try_from = "f64")]
pub struct LeaveUnits(u32);

impl LeaveUnits {
    pub const ZERO: LeaveUnits = LeaveUnits(0);
    pub const HALF_DAY: LeaveUnits = LeaveUnits(1);

    pub const fn days(days: u32) -> Self {
        LeaveUnits(days * 2)
    }

    pub const fn from_half_days(half_days: u32) -> Self {
        LeaveUnits(half_days)
    }

    pub const fn half_days(self) -> u32 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / 2.0
    }

    pub fn saturating_sub(self, other: LeaveUnits) -> LeaveUnits {
        LeaveUnits(self.0.saturating_sub(other.0))
    }

    pub fn checked_add(self, other: LeaveUnits) -> Option<LeaveUnits> {
        self.0.checked_add(other.0).map(LeaveUnits)
    }
}

impl Add for LeaveUnits {
    type Output = LeaveUnits;

    fn add(self, rhs: LeaveUnits) -> LeaveUnits {
        LeaveUnits(self.0.saturating_add(rhs.0))
    }
}

impl fmt::Display for LeaveUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 2 == 0 {
            write!(f, "{}", self.0 / 2)
        } else {
            write!(f, "{}.5", self.0 / 2)
        }
    }
}

impl From<LeaveUnits> for f64 {
    fn from(units: LeaveUnits) -> f64 {
        units.as_f64()
    }
}

impl TryFrom<f64> for LeaveUnits {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        let halves = value * 2.0;
        if !value.is_finite() || value < 0.0 || halves.fract() != 0.0 || halves > f64::from(u32::MAX) {
            return Err(format!("{value} is not a non-negative multiple of 0.5"));
        }
        Ok(LeaveUnits(halves as u32))
    }
}

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateSpan {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateSpan {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, LeaveError> {
        if end < start {
            return Err(LeaveError::Validation {
                field: "end_date",
                message: format!("end_date {end} is before start_date {start}"),
            });
        }
        Ok(Self { start, end })
    }

    /// For ranges read back from storage, already validated on the way in.
    pub(crate) fn from_parts(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn day_count(&self) -> u32 {
        let days = (self.end - self.start).num_days() + 1;
        u32::try_from(days.max(0)).unwrap_or(u32::MAX)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn overlaps(&self, other: &DateSpan) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// True when at least one date in the range falls on `weekday`.
    pub fn covers_weekday(&self, weekday: Weekday) -> bool {
        if self.day_count() >= 7 {
            return true;
        }
        let mut day = self.start;
        while day <= self.end {
            if chrono::Datelike::weekday(&day) == weekday {
                return true;
            }
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
        false
    }
}

/// A validated leave window: a date range plus the optional half-day segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveWindow {
    span: DateSpan,
    half_day: Option<HalfDaySegment>,
}

impl LeaveWindow {
    pub fn new(
        start: NaiveDate,
        end: NaiveDate,
        half_day: Option<HalfDaySegment>,
    ) -> Result<Self, LeaveError> {
        let span = DateSpan::new(start, end)?;
        if half_day.is_some() && span.day_count() != 1 {
            return Err(LeaveError::Validation {
                field: "half_day",
                message: "a half-day request must start and end on the same date".to_string(),
            });
        }
        Ok(Self { span, half_day })
    }

    pub(crate) fn from_parts(span: DateSpan, half_day: Option<HalfDaySegment>) -> Self {
        Self { span, half_day }
    }

    pub fn span(&self) -> DateSpan {
        self.span
    }

    pub fn half_day(&self) -> Option<HalfDaySegment> {
        self.half_day
    }

    /// The one place leave quantity is derived. Ledger checks and stored
    /// requests both go through here.
    pub fn units(&self) -> LeaveUnits {
        match self.half_day {
            Some(_) => LeaveUnits::HALF_DAY,
            None => LeaveUnits::days(self.span.day_count()),
        }
    }
}
