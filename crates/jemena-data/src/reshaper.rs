//! Wide → long reshaping of usage rows.
//!
//! Each interval column becomes one [`UsageSample`] per row: the row date is
//! combined with the interval's start time (the `HH:MM` before the ` - `
//! separator in the column label).

use chrono::NaiveTime;
use jemena_core::error::{JemenaError, Result};
use jemena_core::models::{FlowDirection, StartCutoff, UsageSample};
use regex::Regex;
use tracing::{debug, warn};

use crate::reader::RawUsage;

/// `HH:MM`, a dash, then the end of the range.
const INTERVAL_LABEL_PATTERN: &str = r"^(\d{2}:\d{2})\s*-\s*\S";

fn interval_regex() -> Regex {
    Regex::new(INTERVAL_LABEL_PATTERN).expect("regex is valid")
}

/// Extract the start time from an interval label such as `"17:30 - 18:00"`.
///
/// Labels that do not begin with `HH:MM - ` (or whose time is out of range)
/// are rejected rather than mapped to a default time.
pub fn parse_interval_start(label: &str) -> Result<NaiveTime> {
    parse_with(&interval_regex(), label)
}

fn parse_with(re: &Regex, label: &str) -> Result<NaiveTime> {
    let invalid = || JemenaError::InvalidIntervalLabel(label.to_string());
    let start = re
        .captures(label.trim())
        .and_then(|caps| caps.get(1))
        .ok_or_else(invalid)?;
    NaiveTime::parse_from_str(start.as_str(), "%H:%M").map_err(|_| invalid())
}

/// Reshape consumption rows into a timestamp-sorted series.
///
/// Generation rows are skipped. Blank cells produce no sample. Two samples
/// landing on the same timestamp is an error.
pub fn reshape(raw: &RawUsage) -> Result<Vec<UsageSample>> {
    let re = interval_regex();
    let starts = raw
        .interval_labels
        .iter()
        .map(|label| parse_with(&re, label))
        .collect::<Result<Vec<_>>>()?;

    let mut samples = Vec::with_capacity(raw.rows.len() * starts.len());
    let mut generation_rows = 0usize;
    let mut missing_cells = 0usize;

    for row in &raw.rows {
        if row.flow == FlowDirection::Generation {
            generation_rows += 1;
            continue;
        }
        for (start, value) in starts.iter().zip(&row.values) {
            match value {
                Some(usage) => samples.push(UsageSample::new(row.date.and_time(*start), *usage)),
                None => missing_cells += 1,
            }
        }
    }

    samples.sort_by_key(|s| s.timestamp);

    if let Some(pair) = samples.windows(2).find(|w| w[0].timestamp == w[1].timestamp) {
        return Err(JemenaError::DuplicateTimestamp(pair[0].timestamp));
    }

    if generation_rows > 0 {
        debug!("Skipped {} generation rows", generation_rows);
    }
    if missing_cells > 0 {
        warn!("{} interval cells were blank and have no sample", missing_cells);
    }
    debug!("Reshaped {} rows into {} samples", raw.rows.len(), samples.len());

    Ok(samples)
}

/// Drop samples dated before the cutoff. `None` keeps everything.
pub fn apply_cutoff(samples: Vec<UsageSample>, cutoff: Option<&StartCutoff>) -> Vec<UsageSample> {
    let Some(cutoff) = cutoff else {
        return samples;
    };
    let before = samples.len();
    let kept: Vec<UsageSample> = samples
        .into_iter()
        .filter(|s| cutoff.keeps(s.date()))
        .collect();
    debug!(
        "Start cutoff {} ({}) removed {} samples",
        cutoff.date,
        if cutoff.inclusive { "inclusive" } else { "exclusive" },
        before - kept.len()
    );
    kept
}

// ── Tests ─────────────────────────────────────────────────────────────────────
