//! Load pipeline: CSV → reshaped series → start-date cutoff.
//!
//! Returns a [`UsageSeries`] ready for the aggregator and the chart builders.

use std::path::Path;
use std::time::Instant;

use jemena_core::error::Result;
use jemena_core::models::{FlowDirection, StartCutoff, UsageSample};
use tracing::{debug, info};

use crate::reader::read_usage_csv;
use crate::reshaper::{apply_cutoff, reshape};

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the series.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadMetadata {
    /// Data rows in the CSV, of either flow direction.
    pub rows_read: usize,
    /// Rows skipped because they record exported energy.
    pub generation_rows: usize,
    /// Interval columns in the header.
    pub interval_columns: usize,
    /// Samples produced by reshaping, before the cutoff.
    pub samples_reshaped: usize,
    /// Wall-clock seconds spent reading the CSV.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent reshaping and filtering.
    pub transform_time_seconds: f64,
}

/// The output of [`load_usage_series`].
#[derive(Debug, Clone)]
pub struct UsageSeries {
    /// Timestamp-sorted samples that survived the cutoff.
    pub samples: Vec<UsageSample>,
    pub metadata: LoadMetadata,
}

impl UsageSeries {
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sum of all sample usage, kWh.
    pub fn total_usage(&self) -> f64 {
        self.samples.iter().map(|s| s.usage).sum()
    }
}

// ── Public function ───────────────────────────────────────────────────────────

/// Run the load pipeline.
///
/// 1. Read the wide CSV at `path`.
/// 2. Reshape consumption rows into a sorted series.
/// 3. Drop samples before `cutoff`.
pub fn load_usage_series(path: &Path, cutoff: Option<&StartCutoff>) -> Result<UsageSeries> {
    let load_start = Instant::now();
    let raw = read_usage_csv(path)?;
    let load_time = load_start.elapsed().as_secs_f64();

    let transform_start = Instant::now();
    let reshaped = reshape(&raw)?;
    let samples_reshaped = reshaped.len();
    let samples = apply_cutoff(reshaped, cutoff);
    let transform_time = transform_start.elapsed().as_secs_f64();

    let metadata = LoadMetadata {
        rows_read: raw.rows.len(),
        generation_rows: raw
            .rows
            .iter()
            .filter(|r| r.flow == FlowDirection::Generation)
            .count(),
        interval_columns: raw.interval_count(),
        samples_reshaped,
        load_time_seconds: load_time,
        transform_time_seconds: transform_time,
    };

    debug!(
        "Load {:.3}s, transform {:.3}s",
        metadata.load_time_seconds, metadata.transform_time_seconds
    );
    info!(
        "Loaded {} samples from {} rows in {}",
        samples.len(),
        metadata.rows_read,
        path.display()
    );

    Ok(UsageSeries { samples, metadata })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
