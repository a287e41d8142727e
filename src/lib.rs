//! # Commute Ledger
//!
//! Bicycle commute detection and mileage allowance reports built from a
//! fitness-tracking activity history.
//!
//! This library provides:
//! - Commute classification (two landmarks, weekday/work-hour window, IANA timezone)
//! - Reporting periods running from the 21st of one month to the 20th of the next
//! - Day grouping into outbound/return legs
//! - Report rows and totals whose values match the spreadsheet formulas that render them
//!
//! ## Features
//!
//! - **`parallel`** - Classify large activity histories with rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use commute_ledger::{CommuteLedger, Config, RawActivity, ReportOutcome};
//!
//! let json = r#"[{
//!     "id": 1,
//!     "sport_type": "Ride",
//!     "start_date": "2025-03-04T07:15:00Z",
//!     "start_latlng": [48.5150, 7.6470],
//!     "end_latlng": [48.5730, 7.7520],
//!     "distance": 12345.0,
//!     "name": "Morning Ride"
//! }]"#;
//! let activities: Vec<RawActivity> = serde_json::from_str(json).unwrap();
//!
//! let ledger = CommuteLedger::new(Config::default()).unwrap();
//! let trips = ledger.classify_all(&activities);
//! assert_eq!(trips.len(), 1);
//!
//! match ledger.build_report(&trips, 2025, 3, 0.25).unwrap() {
//!     ReportOutcome::Ready(report) => println!("{:.2} EUR", report.summary().total_amount),
//!     ReportOutcome::Empty(period) => println!("no commutes in {}", period.label()),
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{CommuteError, Result};

// Geographic utilities (haversine distance, landmark proximity)
pub mod geo_utils;

// Typed configuration with TOML loading
pub mod config;
pub use config::{CommuteWindow, Config};

// Commute detection
pub mod classifier;
pub use classifier::{ClassifiedTrip, CommuteClassifier, Rejection};

// 21st-to-20th reporting periods
pub mod period;
pub use period::{
    period_choices, period_of, periods_present, range_of, trips_in_period, PeriodChoice,
    ReportingPeriod,
};

// Day grouping
pub mod aggregate;
pub use aggregate::{group_by_day, DayGroup, LegSummary};

// Report rows and totals
pub mod report;
pub use report::{
    build, validate_rate, Report, ReportOutcome, ReportRow, ReportSummary, MOTIVE_LABEL,
};

// Spreadsheet hand-off
pub mod sheet;
pub use sheet::{report_file_name, Cell, Sheet};

// Stateless façade over an activity snapshot
pub mod ledger;
pub use ledger::CommuteLedger;

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use commute_ledger::GpsPoint;
/// let point = GpsPoint::new(48.5734, 7.7521); // Strasbourg
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build a point from an API `[lat, lng]` array.
    ///
    /// Returns `None` when fewer than two components are present.
    pub fn from_latlng(latlng: &[f64]) -> Option<Self> {
        match latlng {
            [lat, lng, ..] => Some(Self::new(*lat, *lng)),
            _ => None,
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// A named endpoint of the commute route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl Landmark {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lon,
        }
    }

    pub fn point(&self) -> GpsPoint {
        GpsPoint::new(self.lat, self.lon)
    }
}

/// An activity record as delivered by the fitness API.
///
/// Field names follow the API's JSON so cached payloads deserialize directly.
/// The library never mutates these records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawActivity {
    #[serde(default)]
    pub id: Option<u64>,
    /// Sport tag, e.g. `"Ride"`, `"Run"`, `"InlineSkate"`
    #[serde(default)]
    pub sport_type: String,
    /// Start instant (UTC)
    pub start_date: DateTime<Utc>,
    /// `[lat, lng]`, empty or absent for activities without GPS
    #[serde(default)]
    pub start_latlng: Option<Vec<f64>>,
    #[serde(default)]
    pub end_latlng: Option<Vec<f64>>,
    /// Distance in meters
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub name: String,
}

impl RawActivity {
    /// Create a record with no coordinates, distance or name.
    pub fn new(sport_type: impl Into<String>, start_date: DateTime<Utc>) -> Self {
        Self {
            id: None,
            sport_type: sport_type.into(),
            start_date,
            start_latlng: None,
            end_latlng: None,
            distance: 0.0,
            name: String::new(),
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_route(mut self, start: [f64; 2], end: [f64; 2]) -> Self {
        self.start_latlng = Some(start.to_vec());
        self.end_latlng = Some(end.to_vec());
        self
    }

    pub fn with_distance(mut self, meters: f64) -> Self {
        self.distance = meters;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Short identifier for log lines and error messages.
    pub fn label(&self) -> String {
        match self.id {
            Some(id) => format!("{} ({})", self.name, id),
            None => self.name.clone(),
        }
    }

    /// Starting point, or [`CommuteError::MalformedCoordinate`] when the
    /// pair is absent or short.
    pub fn start_point(&self) -> Result<GpsPoint> {
        self.point("start_latlng", self.start_latlng.as_deref())
    }

    /// Ending point, or [`CommuteError::MalformedCoordinate`] when the pair
    /// is absent or short.
    pub fn end_point(&self) -> Result<GpsPoint> {
        self.point("end_latlng", self.end_latlng.as_deref())
    }

    fn point(&self, field: &str, latlng: Option<&[f64]>) -> Result<GpsPoint> {
        let message = match latlng {
            None => format!("{} is missing", field),
            Some(pair) => match GpsPoint::from_latlng(pair) {
                Some(point) => return Ok(point),
                None => format!("{} has {} components, expected 2", field, pair.len()),
            },
        };
        Err(CommuteError::MalformedCoordinate {
            activity: self.label(),
            message,
        })
    }
}
