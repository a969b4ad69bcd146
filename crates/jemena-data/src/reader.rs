//! Wide-format usage CSV loading.
//!
//! The portal export has one row per meter-day: identifier and flag columns
//! followed by one column per half-hour interval labelled `"HH:MM - HH:MM"`.
//! This module turns that file into typed [`UsageRow`]s, dropping the
//! identifier and estimation columns.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use jemena_core::error::{JemenaError, Result};
use jemena_core::models::{FlowDirection, UsageRow};
use jemena_core::time_utils::parse_date;
use tracing::debug;

// ── Column names ──────────────────────────────────────────────────────────────

pub const NMI_COLUMN: &str = "NMI";
pub const METER_COLUMN: &str = "METER SERIAL NUMBER";
pub const FLOW_COLUMN: &str = "CON/GEN";
pub const DATE_COLUMN: &str = "DATE";
pub const ESTIMATED_COLUMN: &str = "ESTIMATED?";

/// Every non-interval column the export carries. All must be present.
const KNOWN_COLUMNS: [&str; 5] = [
    NMI_COLUMN,
    METER_COLUMN,
    FLOW_COLUMN,
    DATE_COLUMN,
    ESTIMATED_COLUMN,
];

// ── RawUsage ──────────────────────────────────────────────────────────────────

/// The parsed contents of a usage CSV.
#[derive(Debug, Clone, PartialEq)]
pub struct RawUsage {
    /// Interval column labels in header order.
    pub interval_labels: Vec<String>,
    /// Data rows; each row's `values` align with `interval_labels`.
    pub rows: Vec<UsageRow>,
}

impl RawUsage {
    pub fn interval_count(&self) -> usize {
        self.interval_labels.len()
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Read and parse the usage CSV at `path`.
pub fn read_usage_csv(path: &Path) -> Result<RawUsage> {
    let file = File::open(path).map_err(|source| JemenaError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = parse_usage_csv(file)?;
    debug!(
        "Read {} rows x {} intervals from {}",
        raw.rows.len(),
        raw.interval_count(),
        path.display()
    );
    Ok(raw)
}

/// Parse usage CSV content from any reader.
pub fn parse_usage_csv<R: Read>(input: R) -> Result<RawUsage> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(input);

    let headers = reader.headers().map_err(csv_error)?.clone();
    let layout = ColumnLayout::from_headers(&headers)?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(csv_error)?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        rows.push(layout.parse_row(&record)?);
    }

    Ok(RawUsage {
        interval_labels: layout.intervals.into_iter().map(|(_, l)| l).collect(),
        rows,
    })
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn csv_error(e: csv::Error) -> JemenaError {
    JemenaError::Csv(e.to_string())
}

/// Column positions resolved from the header row.
struct ColumnLayout {
    date: usize,
    flow: usize,
    /// `(position, label)` of every interval column.
    intervals: Vec<(usize, String)>,
}

impl ColumnLayout {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        // Exports saved from spreadsheet tools often carry a UTF-8 BOM.
        let names: Vec<&str> = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim())
            .collect();

        let position = |name: &str| -> Result<usize> {
            names
                .iter()
                .position(|h| *h == name)
                .ok_or_else(|| JemenaError::MissingColumn(name.to_string()))
        };

        for name in KNOWN_COLUMNS {
            position(name)?;
        }

        let intervals: Vec<(usize, String)> = names
            .iter()
            .enumerate()
            .filter(|(_, h)| !KNOWN_COLUMNS.contains(*h))
            .map(|(i, h)| (i, (*h).to_string()))
            .collect();

        if intervals.is_empty() {
            return Err(JemenaError::NoIntervalColumns);
        }

        Ok(Self {
            date: position(DATE_COLUMN)?,
            flow: position(FLOW_COLUMN)?,
            intervals,
        })
    }

    fn parse_row(&self, record: &StringRecord) -> Result<UsageRow> {
        let date_cell = record.get(self.date).unwrap_or("");
        let date = parse_date(date_cell)?;

        let flow_cell = record.get(self.flow).unwrap_or("");
        let flow = FlowDirection::parse(flow_cell)
            .ok_or_else(|| JemenaError::InvalidFlow(flow_cell.to_string()))?;

        let values = self
            .intervals
            .iter()
            .map(|(idx, label)| parse_usage_cell(record.get(*idx).unwrap_or(""), date_cell, label))
            .collect::<Result<Vec<_>>>()?;

        Ok(UsageRow { date, flow, values })
    }
}

/// Blank → `None`; otherwise a finite, non-negative kWh value.
fn parse_usage_cell(cell: &str, date: &str, column: &str) -> Result<Option<f64>> {
    if cell.is_empty() {
        return Ok(None);
    }
    match cell.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(Some(v)),
        _ => Err(JemenaError::InvalidUsage {
            date: date.to_string(),
            column: column.to_string(),
            value: cell.to_string(),
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
