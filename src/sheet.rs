//! Spreadsheet layout handed to a workbook writer.
//!
//! The layout fixes where every value goes and which cells are live
//! formulas; the writer owns fonts, borders and encoding. Formula cells carry
//! the value the formula must evaluate to, so a writer may emit either.
//!
//! | col | header         | content                    |
//! |-----|----------------|----------------------------|
//! | A   | Date           | date, `DD/MM/YYYY`         |
//! | B   | Jour           | `=TEXT(A{r},"jjjj")`       |
//! | C   | Trajet Aller   | outbound leg               |
//! | D   | Trajet Retour  | return leg                 |
//! | E   | Motif          | motive / `TOTAL`           |
//! | F   | Distance (km)  | rounded km / `=SUM(F..)`   |
//! | G   | Indemnité/km   | rate                       |
//! | H   | Indemnité (€)  | `=F{r}*G{r}` / `=SUM(H..)` |

use chrono::NaiveDate;
use serde::Serialize;

use crate::period::ReportingPeriod;
use crate::report::{Report, ReportRow};

pub const SHEET_TITLE: &str = "Indemnité km vélo";

pub const HEADERS: [&str; 8] = [
    "Date",
    "Jour",
    "Trajet Aller",
    "Trajet Retour",
    "Motif",
    "Distance (km)",
    "Indemnité/km",
    "Indemnité (€)",
];

pub const COLUMN_WIDTHS: [u16; 8] = [14, 12, 28, 28, 24, 14, 14, 14];

pub const DATE_FORMAT: &str = "DD/MM/YYYY";
pub const DECIMAL_FORMAT: &str = "0.00";
pub const TOTAL_DISTANCE_FORMAT: &str = "0.00\" km\"";
pub const TOTAL_AMOUNT_FORMAT: &str = "0.00\" €\"";

const FILE_NAME_PREFIX: &str = "Indemnité_KM_mobilite_velo";

/// First spreadsheet row (1-based) holding data; row 1 is the header.
pub const FIRST_DATA_ROW: usize = 2;

/// Static value of a cell, or the expected result of a formula.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cell {
    Empty,
    Text {
        value: String,
    },
    Number {
        value: f64,
        format: &'static str,
    },
    Date {
        value: NaiveDate,
        format: &'static str,
    },
    Formula {
        formula: String,
        expected: CellValue,
        format: Option<&'static str>,
    },
}

impl Cell {
    fn text(value: impl Into<String>) -> Self {
        Cell::Text {
            value: value.into(),
        }
    }

    /// Value a writer should store when it does not emit formulas.
    pub fn static_value(&self) -> Option<CellValue> {
        match self {
            Cell::Empty => None,
            Cell::Text { value } => Some(CellValue::Text(value.clone())),
            Cell::Number { value, .. } => Some(CellValue::Number(*value)),
            Cell::Date { value, .. } => Some(CellValue::Text(value.format("%d/%m/%Y").to_string())),
            Cell::Formula { expected, .. } => Some(expected.clone()),
        }
    }

    pub fn formula(&self) -> Option<&str> {
        match self {
            Cell::Formula { formula, .. } => Some(formula),
            _ => None,
        }
    }
}

/// A single-worksheet layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sheet {
    pub title: String,
    pub headers: Vec<String>,
    pub column_widths: Vec<u16>,
    /// Data rows, the first one at spreadsheet row [`FIRST_DATA_ROW`]
    pub rows: Vec<Vec<Cell>>,
    /// Placed directly after the last data row
    pub total_row: Vec<Cell>,
}

impl Sheet {
    pub fn from_report(report: &Report) -> Self {
        let rows: Vec<Vec<Cell>> = report
            .rows()
            .iter()
            .enumerate()
            .map(|(i, row)| data_row(row, FIRST_DATA_ROW + i))
            .collect();

        let last_data_row = FIRST_DATA_ROW + rows.len() - 1;
        let summary = report.summary();
        let total_row = vec![
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
            Cell::text("TOTAL"),
            Cell::Formula {
                formula: format!("=SUM(F{}:F{})", FIRST_DATA_ROW, last_data_row),
                expected: CellValue::Number(summary.total_distance_km),
                format: Some(TOTAL_DISTANCE_FORMAT),
            },
            Cell::Empty,
            Cell::Formula {
                formula: format!("=SUM(H{}:H{})", FIRST_DATA_ROW, last_data_row),
                expected: CellValue::Number(summary.total_amount),
                format: Some(TOTAL_AMOUNT_FORMAT),
            },
        ];

        Self {
            title: SHEET_TITLE.to_string(),
            headers: HEADERS.iter().map(|h| h.to_string()).collect(),
            column_widths: COLUMN_WIDTHS.to_vec(),
            rows,
            total_row,
        }
    }

    /// 1-based spreadsheet row of the total line.
    pub fn total_row_number(&self) -> usize {
        FIRST_DATA_ROW + self.rows.len()
    }
}

fn data_row(row: &ReportRow, r: usize) -> Vec<Cell> {
    vec![
        Cell::Date {
            value: row.date(),
            format: DATE_FORMAT,
        },
        Cell::Formula {
            formula: format!("=TEXT(A{},\"jjjj\")", r),
            expected: CellValue::Text(row.weekday().to_string()),
            format: None,
        },
        Cell::text(row.outbound()),
        Cell::text(row.return_leg()),
        Cell::text(row.motive()),
        Cell::Number {
            value: row.distance_km(),
            format: DECIMAL_FORMAT,
        },
        Cell::Number {
            value: row.rate(),
            format: DECIMAL_FORMAT,
        },
        Cell::Formula {
            formula: format!("=F{}*G{}", r, r),
            expected: CellValue::Number(row.amount()),
            format: Some(DECIMAL_FORMAT),
        },
    ]
}

/// Conventional workbook name, e.g. `Indemnité_KM_mobilite_velo_MB_2025_03.xlsx`
/// for owner tag `MB`. An absent or blank tag drops that segment.
pub fn report_file_name(period: ReportingPeriod, owner_tag: Option<&str>) -> String {
    match owner_tag.map(str::trim).filter(|tag| !tag.is_empty()) {
        Some(tag) => format!(
            "{}_{}_{}_{:02}.xlsx",
            FILE_NAME_PREFIX,
            tag,
            period.year(),
            period.month()
        ),
        None => format!(
            "{}_{}_{:02}.xlsx",
            FILE_NAME_PREFIX,
            period.year(),
            period.month()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassifiedTrip;
    use crate::report::build_report;
    use chrono::{TimeZone, Utc};
    use chrono_tz::Europe::Paris;

    fn trip(d: u32, h: u32, km: f64) -> ClassifiedTrip {
        let start = Paris
            .with_ymd_and_hms(2025, 3, d, h, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        ClassifiedTrip::new(start, &Paris, "Geispolsheim", "Strasbourg", km, "Ride")
    }

    fn sample_sheet() -> Sheet {
        let trips = vec![trip(3, 8, 10.1), trip(3, 17, 10.2), trip(4, 8, 12.345)];
        let period = ReportingPeriod::new(2025, 3).unwrap();
        let report = build_report(&trips, period, 0.25)
            .unwrap()
            .into_report()
            .unwrap();
        Sheet::from_report(&report)
    }

    #[test]
    fn test_layout_shape() {
        let sheet = sample_sheet();
        assert_eq!(sheet.title, SHEET_TITLE);
        assert_eq!(sheet.headers.len(), 8);
        assert_eq!(sheet.column_widths.len(), 8);
        assert_eq!(sheet.rows.len(), 2);
        assert!(sheet.rows.iter().all(|r| r.len() == 8));
        assert_eq!(sheet.total_row.len(), 8);
        assert_eq!(sheet.total_row_number(), 4);
    }

    #[test]
    fn test_formulas_reference_own_row() {
        let sheet = sample_sheet();
        assert_eq!(sheet.rows[0][1].formula(), Some("=TEXT(A2,\"jjjj\")"));
        assert_eq!(sheet.rows[0][7].formula(), Some("=F2*G2"));
        assert_eq!(sheet.rows[1][7].formula(), Some("=F3*G3"));
        assert_eq!(sheet.total_row[5].formula(), Some("=SUM(F2:F3)"));
        assert_eq!(sheet.total_row[7].formula(), Some("=SUM(H2:H3)"));
    }

    #[test]
    fn test_formula_expected_values() {
        let sheet = sample_sheet();
        assert_eq!(
            sheet.rows[1][7].static_value(),
            Some(CellValue::Number(12.35 * 0.25))
        );
        assert_eq!(
            sheet.rows[0][1].static_value(),
            Some(CellValue::Text("lundi".to_string()))
        );
        assert_eq!(sheet.rows[0][3], Cell::text("Geispolsheim → Strasbourg"));
        assert_eq!(sheet.rows[1][3], Cell::text(""));
    }

    #[test]
    fn test_file_name() {
        let period = ReportingPeriod::new(2025, 3).unwrap();
        assert_eq!(
            report_file_name(period, Some("MB")),
            "Indemnité_KM_mobilite_velo_MB_2025_03.xlsx"
        );
        assert_eq!(
            report_file_name(period, None),
            "Indemnité_KM_mobilite_velo_2025_03.xlsx"
        );
        assert_eq!(
            report_file_name(period, Some("  ")),
            "Indemnité_KM_mobilite_velo_2025_03.xlsx"
        );
    }
}
