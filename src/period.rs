//! Reimbursement periods.
//!
//! A period is labelled by `(year, month)` and runs from the 21st of the
//! preceding month to the 20th of the labelled month, both inclusive:
//!
//! | date             | period    |
//! |------------------|-----------|
//! | 2024-12-20       | 2024-12   |
//! | 2024-12-21       | 2025-01   |
//! | 2025-01-20       | 2025-01   |
//! | 2025-01-21       | 2025-02   |
//!
//! Periods partition the calendar: every date belongs to exactly one.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::classifier::ClassifiedTrip;
use crate::error::{CommuteError, Result};

/// First day of a period within the preceding month.
pub const PERIOD_START_DAY: u32 = 21;
/// Last day of a period within its labelled month.
pub const PERIOD_END_DAY: u32 = 20;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A 21st-to-20th reporting window, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ReportingPeriod {
    year: i32,
    month: u32,
}

impl ReportingPeriod {
    /// Create a period, rejecting months outside 1-12 and years whose bounds
    /// fall outside the supported calendar.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        let invalid = || CommuteError::InvalidPeriod { year, month };
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }
        let (prev_year, prev_month) = previous_month(year, month);
        NaiveDate::from_ymd_opt(prev_year, prev_month, PERIOD_START_DAY).ok_or_else(invalid)?;
        NaiveDate::from_ymd_opt(year, month, PERIOD_END_DAY).ok_or_else(invalid)?;
        Ok(Self { year, month })
    }

    /// The period a date belongs to.
    pub fn of(date: NaiveDate) -> Self {
        let (year, month) = if date.day() >= PERIOD_START_DAY {
            next_month(date.year(), date.month())
        } else {
            (date.year(), date.month())
        };
        Self { year, month }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The 21st of the preceding month.
    ///
    /// Clamped to the supported calendar for periods built by [`Self::of`],
    /// [`Self::next`] or [`Self::previous`] at its edges.
    pub fn start_date(&self) -> NaiveDate {
        let (year, month) = previous_month(self.year, self.month);
        clamped_date(year, month, PERIOD_START_DAY)
    }

    /// The 20th of the labelled month, clamped like [`Self::start_date`].
    pub fn end_date(&self) -> NaiveDate {
        clamped_date(self.year, self.month, PERIOD_END_DAY)
    }

    /// Inclusive `(start, end)` bounds.
    pub fn range(&self) -> (NaiveDate, NaiveDate) {
        (self.start_date(), self.end_date())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date() <= date && date <= self.end_date()
    }

    pub fn next(&self) -> Self {
        let (year, month) = next_month(self.year, self.month);
        Self { year, month }
    }

    pub fn previous(&self) -> Self {
        let (year, month) = previous_month(self.year, self.month);
        Self { year, month }
    }

    /// Human label, e.g. `"January 2025"`.
    pub fn label(&self) -> String {
        format!("{} {}", MONTH_NAMES[(self.month - 1) as usize], self.year)
    }
}

impl fmt::Display for ReportingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Every month has a 20th and a 21st, so only years beyond chrono's range miss.
fn clamped_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(if year > 0 {
        NaiveDate::MAX
    } else {
        NaiveDate::MIN
    })
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

/// `(year, month)` of the period containing `date`.
pub fn period_of(date: NaiveDate) -> (i32, u32) {
    let period = ReportingPeriod::of(date);
    (period.year, period.month)
}

/// Inclusive date bounds of the `(year, month)` period.
pub fn range_of(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    Ok(ReportingPeriod::new(year, month)?.range())
}

/// Periods containing at least one trip.
pub fn periods_present(trips: &[ClassifiedTrip]) -> BTreeSet<ReportingPeriod> {
    trips.iter().map(|t| ReportingPeriod::of(t.date())).collect()
}

/// Trips whose local date falls inside `period`, order preserved.
pub fn trips_in_period(trips: &[ClassifiedTrip], period: ReportingPeriod) -> Vec<ClassifiedTrip> {
    let (start, end) = period.range();
    trips
        .iter()
        .filter(|t| start <= t.date() && t.date() <= end)
        .cloned()
        .collect()
}

/// Entry of a period picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodChoice {
    pub year: i32,
    pub month: u32,
    pub label: String,
}

/// Picker entries, most recent period first.
pub fn period_choices(periods: &BTreeSet<ReportingPeriod>) -> Vec<PeriodChoice> {
    periods
        .iter()
        .rev()
        .map(|p| PeriodChoice {
            year: p.year,
            month: p.month,
            label: p.label(),
        })
        .collect()
}
