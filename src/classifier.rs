//! Commute detection.
//!
//! A commute is a ride whose start and end lie near the two configured
//! landmarks (in either direction), started on an allowed local weekday
//! within the local work-hour window.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Utc};
use chrono_tz::Tz;
use log::{debug, info};
use serde::Serialize;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::{CommuteWindow, Config};
use crate::error::{CommuteError, Result};
use crate::geo_utils::is_near;
use crate::{Landmark, RawActivity};

/// The API's sport tag for outdoor cycling. Compared exactly, without aliases.
pub const RIDE_SPORT_TYPE: &str = "Ride";

/// Why an activity is not a commute. Checks run in declaration order and the
/// first failing one is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NotARide,
    MissingCoordinates,
    NotBetweenLandmarks,
    OutsideWeekdays,
    OutsideWorkHours,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Rejection::NotARide => "not a ride",
            Rejection::MissingCoordinates => "missing start or end coordinates",
            Rejection::NotBetweenLandmarks => "does not link the two landmarks",
            Rejection::OutsideWeekdays => "not on a commute weekday",
            Rejection::OutsideWorkHours => "outside work hours",
        };
        f.write_str(reason)
    }
}

/// A ride recognised as a commute, with local time and direction resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedTrip {
    date: NaiveDate,
    local_datetime: NaiveDateTime,
    start_utc: DateTime<Utc>,
    departure: String,
    arrival: String,
    distance_km: f64,
    name: String,
}

impl ClassifiedTrip {
    pub(crate) fn new(
        start_utc: DateTime<Utc>,
        tz: &Tz,
        departure: &str,
        arrival: &str,
        distance_km: f64,
        name: &str,
    ) -> Self {
        let local = start_utc.with_timezone(tz);
        Self {
            date: local.date_naive(),
            local_datetime: local.naive_local(),
            start_utc,
            departure: departure.to_string(),
            arrival: arrival.to_string(),
            distance_km,
            name: name.to_string(),
        }
    }

    /// Local calendar date of the start.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Local wall-clock start time.
    pub fn local_datetime(&self) -> NaiveDateTime {
        self.local_datetime
    }

    pub fn start_utc(&self) -> DateTime<Utc> {
        self.start_utc
    }

    pub fn departure(&self) -> &str {
        &self.departure
    }

    pub fn arrival(&self) -> &str {
        &self.arrival
    }

    /// Unrounded distance in kilometres.
    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `"<departure> → <arrival>"`
    pub fn leg_label(&self) -> String {
        format!("{} → {}", self.departure, self.arrival)
    }
}

/// Decides which activities are commutes.
///
/// Built once per configuration; the timezone is resolved at construction so
/// classification itself cannot fail on configuration.
#[derive(Debug, Clone)]
pub struct CommuteClassifier {
    landmark_a: Landmark,
    landmark_b: Landmark,
    window: CommuteWindow,
    tz: Tz,
}

impl CommuteClassifier {
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            landmark_a: config.landmark_a.clone(),
            landmark_b: config.landmark_b.clone(),
            window: config.window.clone(),
            tz: config.window.tz()?,
        })
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn is_commute(&self, activity: &RawActivity) -> bool {
        self.evaluate(activity).is_ok()
    }

    /// The first rule the activity fails, or `None` for a commute.
    pub fn rejection(&self, activity: &RawActivity) -> Option<Rejection> {
        self.evaluate(activity).err()
    }

    /// Package a commute as a [`ClassifiedTrip`].
    ///
    /// Fails with [`CommuteError::InvalidPrecondition`] if the activity is not
    /// a commute; callers are expected to check [`Self::is_commute`] first.
    pub fn classify(&self, activity: &RawActivity) -> Result<ClassifiedTrip> {
        match self.evaluate(activity) {
            Ok((departure, arrival)) => Ok(self.build_trip(activity, departure, arrival)),
            Err(_) => Err(CommuteError::InvalidPrecondition {
                activity: activity.label(),
            }),
        }
    }

    /// Classify a whole snapshot, keeping only commutes.
    ///
    /// The result is sorted by local date-time; trips with equal wall times
    /// keep their input order.
    pub fn classify_all(&self, activities: &[RawActivity]) -> Vec<ClassifiedTrip> {
        #[cfg(feature = "parallel")]
        let mut trips: Vec<ClassifiedTrip> = activities
            .par_iter()
            .filter_map(|a| self.try_classify(a))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let mut trips: Vec<ClassifiedTrip> = activities
            .iter()
            .filter_map(|a| self.try_classify(a))
            .collect();

        trips.sort_by_key(|t| t.local_datetime);

        info!(
            "[Classifier] {} commutes out of {} activities",
            trips.len(),
            activities.len()
        );
        trips
    }

    fn try_classify(&self, activity: &RawActivity) -> Option<ClassifiedTrip> {
        match self.evaluate(activity) {
            Ok((departure, arrival)) => Some(self.build_trip(activity, departure, arrival)),
            Err(reason) => {
                debug!("[Classifier] skip {}: {}", activity.label(), reason);
                None
            }
        }
    }

    fn build_trip(
        &self,
        activity: &RawActivity,
        departure: &Landmark,
        arrival: &Landmark,
    ) -> ClassifiedTrip {
        ClassifiedTrip::new(
            activity.start_date,
            &self.tz,
            &departure.name,
            &arrival.name,
            activity.distance / 1000.0,
            &activity.name,
        )
    }

    /// Run every rule; on success return (departure, arrival).
    fn evaluate(&self, activity: &RawActivity) -> std::result::Result<(&Landmark, &Landmark), Rejection> {
        if activity.sport_type != RIDE_SPORT_TYPE {
            return Err(Rejection::NotARide);
        }

        let (start, end) = match (
            present(&activity.start_latlng),
            present(&activity.end_latlng),
        ) {
            (Some(start), Some(end)) => (start, end),
            _ => return Err(Rejection::MissingCoordinates),
        };

        let direction = self
            .direction(start, end)
            .ok_or(Rejection::NotBetweenLandmarks)?;

        let local = activity.start_date.with_timezone(&self.tz);
        if !self.window.allows_weekday(local.weekday()) {
            return Err(Rejection::OutsideWeekdays);
        }
        if !self.window.allows_hour(local.hour()) {
            return Err(Rejection::OutsideWorkHours);
        }

        Ok(direction)
    }

    /// A→B is tested first, so a route near both landmarks at both ends
    /// resolves to A→B.
    fn direction(&self, start: &[f64], end: &[f64]) -> Option<(&Landmark, &Landmark)> {
        let radius = self.window.radius_km;
        let a = &self.landmark_a;
        let b = &self.landmark_b;

        if is_near(Some(start), a, radius) && is_near(Some(end), b, radius) {
            Some((a, b))
        } else if is_near(Some(start), b, radius) && is_near(Some(end), a, radius) {
            Some((b, a))
        } else {
            None
        }
    }
}

/// Absent and empty coordinate arrays both mean "no GPS".
fn present(latlng: &Option<Vec<f64>>) -> Option<&[f64]> {
    latlng.as_deref().filter(|c| !c.is_empty())
}
