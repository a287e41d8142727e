//! Day grouping of commute trips.
//!
//! All trips sharing a local calendar date form one [`DayGroup`]. The day's
//! distance is the sum over every trip, but only two legs are labelled; see
//! [`LegSummary`].

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::classifier::ClassifiedTrip;

/// Outbound/return labels summarising a day's trips.
///
/// Policy ("first and last leg"): the first trip of the day is the outbound
/// leg; when the day has two or more trips the last one is the return leg.
/// Trips in between still count toward the day's distance but get no label
/// of their own. This mirrors the reimbursement form, which has exactly one
/// outbound and one return column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegSummary {
    pub outbound: String,
    pub return_leg: Option<String>,
    /// Trips counted in the distance but not labelled
    pub unlabelled_trips: usize,
}

impl LegSummary {
    /// Apply the first-and-last policy to trips in chronological order.
    ///
    /// Returns `None` for an empty slice.
    pub fn first_and_last(trips: &[ClassifiedTrip]) -> Option<Self> {
        let first = trips.first()?;
        let return_leg = match trips {
            [_, .., last] => Some(last.leg_label()),
            _ => None,
        };
        Some(Self {
            outbound: first.leg_label(),
            return_leg,
            unlabelled_trips: trips.len().saturating_sub(2),
        })
    }
}

/// Every commute on one local calendar date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayGroup {
    date: NaiveDate,
    trips: Vec<ClassifiedTrip>,
    distance_km: f64,
}

impl DayGroup {
    fn new(date: NaiveDate, mut trips: Vec<ClassifiedTrip>) -> Self {
        trips.sort_by_key(|t| t.local_datetime());
        let distance_km = trips.iter().map(|t| t.distance_km()).sum();
        Self {
            date,
            trips,
            distance_km,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Trips in chronological order; never empty.
    pub fn trips(&self) -> &[ClassifiedTrip] {
        &self.trips
    }

    /// Unrounded sum of every trip's distance.
    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn legs(&self) -> LegSummary {
        LegSummary::first_and_last(&self.trips).unwrap_or(LegSummary {
            outbound: String::new(),
            return_leg: None,
            unlabelled_trips: 0,
        })
    }
}

/// Group trips by local date, groups in ascending date order.
///
/// Callers pass the trips of a single reporting period; nothing here checks
/// period membership.
pub fn group_by_day(trips: &[ClassifiedTrip]) -> Vec<DayGroup> {
    let mut by_date: BTreeMap<NaiveDate, Vec<ClassifiedTrip>> = BTreeMap::new();
    for trip in trips {
        by_date.entry(trip.date()).or_default().push(trip.clone());
    }

    by_date
        .into_iter()
        .map(|(date, day_trips)| DayGroup::new(date, day_trips))
        .collect()
}
