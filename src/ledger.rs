//! # Commute Ledger
//!
//! Entry point for collaborators (web handlers, CLIs, export jobs).
//!
//! The ledger holds only configuration. Activity data is passed into every
//! call as an immutable snapshot, so one ledger can serve concurrent requests
//! for different periods without locking.

use std::collections::BTreeSet;

use crate::classifier::{ClassifiedTrip, CommuteClassifier};
use crate::config::Config;
use crate::error::Result;
use crate::period::{self, PeriodChoice, ReportingPeriod};
use crate::report::{self, ReportOutcome};
use crate::sheet;
use crate::RawActivity;

#[derive(Debug, Clone)]
pub struct CommuteLedger {
    config: Config,
    classifier: CommuteClassifier,
}

impl CommuteLedger {
    /// Validate the configuration and resolve its timezone.
    pub fn new(config: Config) -> Result<Self> {
        let classifier = CommuteClassifier::new(&config)?;
        Ok(Self { config, classifier })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn classifier(&self) -> &CommuteClassifier {
        &self.classifier
    }

    /// Every commute in the snapshot, sorted by local date-time.
    pub fn classify_all(&self, activities: &[RawActivity]) -> Vec<ClassifiedTrip> {
        self.classifier.classify_all(activities)
    }

    /// Reporting periods containing at least one trip.
    pub fn periods_present(&self, trips: &[ClassifiedTrip]) -> BTreeSet<ReportingPeriod> {
        period::periods_present(trips)
    }

    /// Picker entries for the periods present, newest first.
    pub fn period_choices(&self, trips: &[ClassifiedTrip]) -> Vec<PeriodChoice> {
        period::period_choices(&self.periods_present(trips))
    }

    /// Report for `(year, month)` at an explicit rate.
    ///
    /// Fails on an invalid period or a negative or non-finite rate.
    pub fn build_report(
        &self,
        trips: &[ClassifiedTrip],
        year: i32,
        month: u32,
        rate: f64,
    ) -> Result<ReportOutcome> {
        let period = ReportingPeriod::new(year, month)?;
        report::build_report(trips, period, rate)
    }

    /// Workbook file name for `period`, tagged with the configured owner.
    pub fn report_file_name(&self, period: ReportingPeriod) -> String {
        sheet::report_file_name(period, self.config.owner_tag.as_deref())
    }

    /// Report for `(year, month)` at the configured rate.
    pub fn build_report_at_config_rate(
        &self,
        trips: &[ClassifiedTrip],
        year: i32,
        month: u32,
    ) -> Result<ReportOutcome> {
        self.build_report(trips, year, month, self.config.rate_per_km)
    }
}
