//! Unified error handling for the commute-ledger library.
//!
//! Every fallible operation returns [`Result`]. Conditions that callers are
//! expected to handle as ordinary outcomes (an activity that is not a commute,
//! a reporting period without trips) are not errors: see
//! [`crate::CommuteClassifier::is_commute`] and [`crate::ReportOutcome`].
//! Nothing in the crate retries; every error goes straight to the caller.

use thiserror::Error;

/// Unified error type for commute-ledger operations.
#[derive(Debug, Error)]
pub enum CommuteError {
    /// Coordinate pair absent or with fewer than two components.
    ///
    /// Returned by [`crate::RawActivity::start_point`] and
    /// [`crate::RawActivity::end_point`]. Proximity tests treat the same
    /// input as "not near" and never fail.
    #[error("Activity '{activity}' has a malformed coordinate: {message}")]
    MalformedCoordinate { activity: String, message: String },

    /// `classify` was called on an activity that does not qualify as a commute.
    #[error("Activity '{activity}' is not a commute and cannot be classified")]
    InvalidPrecondition { activity: String },

    /// Timezone identifier not found in the IANA database.
    #[error("Unknown timezone '{name}'")]
    InvalidTimezone { name: String },

    /// Configuration values violate an invariant.
    #[error("Configuration error: {message}")]
    InvalidConfig { message: String },

    /// Reporting period outside the representable calendar.
    #[error("Invalid reporting period {year}-{month:02}")]
    InvalidPeriod { year: i32, month: u32 },

    /// Configuration file could not be read.
    #[error("Failed to read config file '{path}': {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for [`crate::Config`].
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Report export failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for commute-ledger operations.
pub type Result<T> = std::result::Result<T, CommuteError>;
