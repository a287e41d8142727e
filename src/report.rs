//! Reimbursement report assembly.
//!
//! One [`ReportRow`] per commute day, in date order. Distances are rounded
//! to two decimals here and only here; each row's amount is the rounded
//! distance times the rate, and the summary totals are plain sums of the row
//! values, so a spreadsheet rendering `=F2*G2` and `=SUM(...)` reproduces
//! them exactly.

use chrono::{Datelike, NaiveDate, Weekday};
use log::info;
use serde::Serialize;

use crate::aggregate::{group_by_day, DayGroup};
use crate::classifier::ClassifiedTrip;
use crate::error::{CommuteError, Result};
use crate::period::{trips_in_period, ReportingPeriod};

/// Motive printed on every row.
pub const MOTIVE_LABEL: &str = "Trajet domicile-travail";

/// Round half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// French weekday name, as the reimbursement form's `jjjj` date format prints it.
pub fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "lundi",
        Weekday::Tue => "mardi",
        Weekday::Wed => "mercredi",
        Weekday::Thu => "jeudi",
        Weekday::Fri => "vendredi",
        Weekday::Sat => "samedi",
        Weekday::Sun => "dimanche",
    }
}

/// One commute day of the report.
///
/// Fields are read-only so `amount == distance_km * rate` holds for every
/// row in existence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    date: NaiveDate,
    weekday: String,
    outbound: String,
    return_leg: String,
    motive: String,
    distance_km: f64,
    rate: f64,
    amount: f64,
}

impl ReportRow {
    pub fn from_day_group(group: &DayGroup, rate: f64) -> Self {
        let legs = group.legs();
        let distance_km = round2(group.distance_km());
        Self {
            date: group.date(),
            weekday: weekday_label(group.date().weekday()).to_string(),
            outbound: legs.outbound,
            return_leg: legs.return_leg.unwrap_or_default(),
            motive: MOTIVE_LABEL.to_string(),
            distance_km,
            rate,
            amount: distance_km * rate,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn weekday(&self) -> &str {
        &self.weekday
    }

    pub fn outbound(&self) -> &str {
        &self.outbound
    }

    /// Empty when the day had a single trip.
    pub fn return_leg(&self) -> &str {
        &self.return_leg
    }

    pub fn motive(&self) -> &str {
        &self.motive
    }

    /// Distance rounded to two decimals.
    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// `distance_km * rate`, not rounded further.
    pub fn amount(&self) -> f64 {
        self.amount
    }
}

/// Values a spreadsheet `SUM` over the row range must equal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReportSummary {
    pub days: usize,
    pub trips: usize,
    /// Sum of the rows' rounded distances
    pub total_distance_km: f64,
    /// Sum of the rows' amounts
    pub total_amount: f64,
}

impl ReportSummary {
    fn from_rows(rows: &[ReportRow], trips: usize) -> Self {
        Self {
            days: rows.len(),
            trips,
            total_distance_km: rows.iter().map(|r| r.distance_km).sum(),
            total_amount: rows.iter().map(|r| r.amount).sum(),
        }
    }
}

/// Reject a rate that is negative or not finite.
pub fn validate_rate(rate: f64) -> Result<()> {
    if rate.is_finite() && rate >= 0.0 {
        Ok(())
    } else {
        Err(CommuteError::InvalidConfig {
            message: format!("rate must be a non-negative number, got {}", rate),
        })
    }
}

/// Rows and totals for a set of day groups, in the groups' order.
///
/// `rate` is used as given; [`build_report`] checks it with [`validate_rate`].
pub fn build(day_groups: &[DayGroup], rate: f64) -> (Vec<ReportRow>, ReportSummary) {
    let rows: Vec<ReportRow> = day_groups
        .iter()
        .map(|g| ReportRow::from_day_group(g, rate))
        .collect();
    let trips = day_groups.iter().map(|g| g.trips().len()).sum();
    let summary = ReportSummary::from_rows(&rows, trips);
    (rows, summary)
}

/// A complete report for one reporting period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    period: ReportingPeriod,
    rate: f64,
    rows: Vec<ReportRow>,
    summary: ReportSummary,
}

impl Report {
    pub fn period(&self) -> ReportingPeriod {
        self.period
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    pub fn summary(&self) -> &ReportSummary {
        &self.summary
    }

    /// Pretty JSON rendering for API or file export.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Result of a report request.
///
/// A period without commutes is an ordinary outcome, not an error, so callers
/// can show "no data" instead of failing.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    Empty(ReportingPeriod),
    Ready(Report),
}

impl ReportOutcome {
    pub fn period(&self) -> ReportingPeriod {
        match self {
            ReportOutcome::Empty(period) => *period,
            ReportOutcome::Ready(report) => report.period,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ReportOutcome::Empty(_))
    }

    pub fn into_report(self) -> Option<Report> {
        match self {
            ReportOutcome::Ready(report) => Some(report),
            ReportOutcome::Empty(_) => None,
        }
    }
}

/// Select the period's trips, group them by day and build the report.
///
/// `trips` may span any number of periods. Fails with
/// [`CommuteError::InvalidConfig`] for a negative or non-finite rate.
pub fn build_report(
    trips: &[ClassifiedTrip],
    period: ReportingPeriod,
    rate: f64,
) -> Result<ReportOutcome> {
    validate_rate(rate)?;

    let selected = trips_in_period(trips, period);
    if selected.is_empty() {
        info!("[Report] no commutes in {}", period);
        return Ok(ReportOutcome::Empty(period));
    }

    let groups = group_by_day(&selected);
    let (rows, summary) = build(&groups, rate);
    info!(
        "[Report] {}: {} trips over {} days, {:.2} km, {:.2} EUR",
        period, summary.trips, summary.days, summary.total_distance_km, summary.total_amount
    );

    Ok(ReportOutcome::Ready(Report {
        period,
        rate,
        rows,
        summary,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use chrono_tz::Europe::Paris;

    fn trip(m: u32, d: u32, h: u32, dep: &str, arr: &str, km: f64) -> ClassifiedTrip {
        let start = Paris
            .with_ymd_and_hms(2025, m, d, h, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        ClassifiedTrip::new(start, &Paris, dep, arr, km, "Ride")
    }

    fn period(y: i32, m: u32) -> ReportingPeriod {
        ReportingPeriod::new(y, m).unwrap()
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(12.345), 12.35);
        assert_eq!(round2(10.004), 10.0);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_row_rounds_distance_and_derives_amount() {
        let groups = group_by_day(&[trip(3, 4, 8, "A", "B", 12.345)]);
        let (rows, summary) = build(&groups, 0.25);

        let row = &rows[0];
        assert_eq!(row.distance_km(), 12.35);
        assert_eq!(row.amount(), row.distance_km() * 0.25);
        assert!((row.amount() - 3.0875).abs() < 1e-12);
        assert_eq!(row.rate(), 0.25);
        assert_eq!(summary.total_amount, row.amount());
    }

    #[test]
    fn test_row_labels() {
        // 2025-03-04 is a Tuesday
        let groups = group_by_day(&[
            trip(3, 4, 8, "Geispolsheim", "Strasbourg", 10.0),
            trip(3, 4, 17, "Strasbourg", "Geispolsheim", 10.0),
        ]);
        let (rows, _) = build(&groups, 0.25);
        assert_eq!(rows[0].weekday(), "mardi");
        assert_eq!(rows[0].outbound(), "Geispolsheim → Strasbourg");
        assert_eq!(rows[0].return_leg(), "Strasbourg → Geispolsheim");
        assert_eq!(rows[0].motive(), MOTIVE_LABEL);
    }

    #[test]
    fn test_summary_is_sum_of_rows() {
        let groups = group_by_day(&[
            trip(3, 3, 8, "A", "B", 10.126),
            trip(3, 3, 17, "B", "A", 10.333),
            trip(3, 4, 8, "A", "B", 9.999),
            trip(3, 5, 8, "A", "B", 11.005),
        ]);
        let (rows, summary) = build(&groups, 0.25);
        assert_eq!(rows.len(), 3);
        assert_eq!(summary.days, 3);
        assert_eq!(summary.trips, 4);

        let distance: f64 = rows.iter().map(|r| r.distance_km()).sum();
        let amount: f64 = rows.iter().map(|r| r.amount()).sum();
        assert_eq!(summary.total_distance_km, distance);
        assert_eq!(summary.total_amount, amount);
    }

    #[test]
    fn test_build_report_filters_period() {
        let trips = vec![
            trip(2, 20, 8, "A", "B", 10.0),
            trip(2, 21, 8, "A", "B", 10.0),
            trip(3, 20, 8, "A", "B", 10.0),
            trip(3, 21, 8, "A", "B", 10.0),
        ];
        let report = build_report(&trips, period(2025, 3), 0.25)
            .unwrap()
            .into_report()
            .unwrap();
        let days: Vec<_> = report.rows().iter().map(|r| r.date()).collect();
        assert_eq!(
            days,
            vec![
                NaiveDate::from_ymd_opt(2025, 2, 21).unwrap(),
                NaiveDate::from_ymd_opt(2025, 3, 20).unwrap(),
            ]
        );
        assert_eq!(report.period(), period(2025, 3));
    }

    #[test]
    fn test_build_report_empty_period() {
        let trips = vec![trip(3, 4, 8, "A", "B", 10.0)];
        let outcome = build_report(&trips, period(2025, 6), 0.25).unwrap();
        assert!(outcome.is_empty());
        assert_eq!(outcome.period(), period(2025, 6));
    }

    #[test]
    fn test_build_report_rejects_invalid_rate() {
        let trips = vec![trip(3, 4, 8, "A", "B", 10.0)];
        for rate in [f64::NAN, f64::INFINITY, -0.25] {
            assert!(matches!(
                build_report(&trips, period(2025, 3), rate),
                Err(CommuteError::InvalidConfig { .. })
            ));
        }
        // Checked even when the period has no trips
        assert!(build_report(&trips, period(2025, 6), f64::NAN).is_err());
        assert!(validate_rate(0.0).is_ok());
    }

    #[test]
    fn test_report_json() {
        let trips = vec![trip(3, 4, 8, "A", "B", 10.0)];
        let report = build_report(&trips, period(2025, 3), 0.25)
            .unwrap()
            .into_report()
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["period"]["month"], 3);
        assert_eq!(json["rows"][0]["date"], "2025-03-04");
        assert_eq!(json["summary"]["total_amount"], 2.5);
    }
}
