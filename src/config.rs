//! Configuration for commute detection and reimbursement.
//!
//! Every field has a default, so a TOML file only needs the values it
//! overrides:
//!
//! ```toml
//! rate_per_km = 0.30
//! owner_tag = "JD"
//!
//! [landmark_a]
//! name = "Illkirch"
//! lat = 48.5290
//! lon = 7.7150
//!
//! [window]
//! hour_start = 6
//! weekdays = ["Mon", "Tue", "Wed", "Thu"]
//! ```

use std::fs;
use std::path::Path;

use chrono::Weekday;
use chrono_tz::Tz;
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{CommuteError, Result};
use crate::report::validate_rate;
use crate::Landmark;

/// Geometric and temporal constraints a ride must satisfy to be a commute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommuteWindow {
    /// Maximum distance (km) from a landmark to count as "at" it.
    /// Default: 5.0
    pub radius_km: f64,
    /// Local weekdays on which commutes happen.
    /// Default: Monday to Friday
    pub weekdays: Vec<Weekday>,
    /// First local hour of the window (inclusive). Default: 7
    pub hour_start: u32,
    /// Local hour closing the window (exclusive). Default: 19
    pub hour_end: u32,
    /// IANA timezone used to derive local date and time.
    /// Default: "Europe/Paris"
    pub timezone: String,
}

impl Default for CommuteWindow {
    fn default() -> Self {
        Self {
            radius_km: 5.0,
            weekdays: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
            hour_start: 7,
            hour_end: 19,
            timezone: "Europe/Paris".to_string(),
        }
    }
}

impl CommuteWindow {
    /// Resolve the configured timezone against the IANA database.
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| CommuteError::InvalidTimezone {
                name: self.timezone.clone(),
            })
    }

    pub fn allows_weekday(&self, day: Weekday) -> bool {
        self.weekdays.contains(&day)
    }

    /// `hour_start <= hour < hour_end`
    pub fn allows_hour(&self, hour: u32) -> bool {
        self.hour_start <= hour && hour < self.hour_end
    }

    fn validate(&self) -> Result<()> {
        if !(self.radius_km.is_finite() && self.radius_km > 0.0) {
            return Err(invalid(format!(
                "radius_km must be positive, got {}",
                self.radius_km
            )));
        }
        if self.hour_start >= self.hour_end {
            return Err(invalid(format!(
                "hour_start ({}) must be before hour_end ({})",
                self.hour_start, self.hour_end
            )));
        }
        if self.hour_end > 24 {
            return Err(invalid(format!(
                "hour_end must be at most 24, got {}",
                self.hour_end
            )));
        }
        if self.weekdays.is_empty() {
            return Err(invalid("weekdays must not be empty".to_string()));
        }
        self.tz()?;
        Ok(())
    }
}

/// Complete configuration: the two landmarks, the commute window and the
/// reimbursement rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tested first when resolving direction
    pub landmark_a: Landmark,
    pub landmark_b: Landmark,
    pub window: CommuteWindow,
    /// Reimbursement per kilometre (EUR). Default: 0.25
    pub rate_per_km: f64,
    /// Owner initials inserted into workbook file names. Default: "MB"
    pub owner_tag: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            landmark_a: Landmark::new("Geispolsheim", 48.5147, 7.6467),
            landmark_b: Landmark::new("Strasbourg", 48.5734, 7.7521),
            window: CommuteWindow::default(),
            rate_per_km: 0.25,
            owner_tag: Some("MB".to_string()),
        }
    }
}

impl Config {
    /// Parse a TOML document. Omitted fields keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| CommuteError::ConfigIo {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        info!(
            "Loaded config from {}: {} <-> {}, radius {} km, {}",
            path.display(),
            config.landmark_a.name,
            config.landmark_b.name,
            config.window.radius_km,
            config.window.timezone
        );
        Ok(config)
    }

    /// Check every invariant, including that the timezone exists.
    pub fn validate(&self) -> Result<()> {
        for landmark in [&self.landmark_a, &self.landmark_b] {
            if !landmark.point().is_valid() {
                return Err(invalid(format!(
                    "landmark '{}' has invalid coordinates ({}, {})",
                    landmark.name, landmark.lat, landmark.lon
                )));
            }
        }
        validate_rate(self.rate_per_km)?;
        self.window.validate()
    }
}

fn invalid(message: String) -> CommuteError {
    CommuteError::InvalidConfig { message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.landmark_a.name, "Geispolsheim");
        assert_eq!(config.landmark_b.name, "Strasbourg");
        assert_eq!(config.window.radius_km, 5.0);
        assert_eq!(config.window.hour_start, 7);
        assert_eq!(config.window.hour_end, 19);
        assert_eq!(config.window.timezone, "Europe/Paris");
        assert_eq!(config.window.weekdays.len(), 5);
        assert_eq!(config.rate_per_km, 0.25);
        assert_eq!(config.owner_tag.as_deref(), Some("MB"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_hour_window_is_half_open() {
        let window = CommuteWindow::default();
        assert!(!window.allows_hour(6));
        assert!(window.allows_hour(7));
        assert!(window.allows_hour(18));
        assert!(!window.allows_hour(19));
    }

    #[test]
    fn test_weekend_not_allowed_by_default() {
        let window = CommuteWindow::default();
        assert!(window.allows_weekday(Weekday::Fri));
        assert!(!window.allows_weekday(Weekday::Sat));
        assert!(!window.allows_weekday(Weekday::Sun));
    }

    #[test]
    fn test_partial_toml_override() {
        let config = Config::from_toml_str(
            r#"
            rate_per_km = 0.3

            [window]
            hour_start = 6
            weekdays = ["Mon", "Tue"]
            "#,
        )
        .unwrap();
        assert_eq!(config.rate_per_km, 0.3);
        assert_eq!(config.window.hour_start, 6);
        assert_eq!(config.window.hour_end, 19);
        assert_eq!(config.window.weekdays, vec![Weekday::Mon, Weekday::Tue]);
        assert_eq!(config.landmark_a.name, "Geispolsheim");
    }

    #[test]
    fn test_rejects_bad_timezone() {
        let err = Config::from_toml_str("[window]\ntimezone = \"Mars/Olympus\"\n").unwrap_err();
        assert!(matches!(err, CommuteError::InvalidTimezone { .. }));
    }

    #[test]
    fn test_rejects_inverted_hours() {
        let err = Config::from_toml_str("[window]\nhour_start = 19\nhour_end = 7\n").unwrap_err();
        assert!(matches!(err, CommuteError::InvalidConfig { .. }));
    }

    #[test]
    fn test_rejects_non_positive_radius() {
        let mut config = Config::default();
        config.window.radius_km = 0.0;
        assert!(matches!(
            config.validate(),
            Err(CommuteError::InvalidConfig { .. })
        ));
    }
}
