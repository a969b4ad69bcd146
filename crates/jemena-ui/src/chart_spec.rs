//! Chart descriptions for the three usage views.
//!
//! The builders here are pure: they turn usage data into a [`ChartSpec`]
//! (panels, axes with bounds and tick labels, styled series) which
//! [`crate::chart_view`] then draws. Date axes use fractional days since the
//! epoch as their x coordinate; the profile uses fractional hours.

use chrono::NaiveDate;
use jemena_core::formatting::{
    concise_date_labels, concise_day_labels, format_currency, format_kwh, format_number, hour_labels,
};
use jemena_core::models::{DailyTotal, ProfilePoint, UsageSample, INTERVALS_PER_HOUR};
use jemena_core::tariff::Tariff;
use jemena_core::time_utils::{date_to_day_number, datetime_to_day_number, hour_of_day};

/// Tick labels on date axes.
pub const DATE_TICKS: usize = 5;

/// Tick labels on value axes (zero, middle, top).
pub const VALUE_TICKS: usize = 3;

/// Headroom above the largest value on a y axis.
const Y_HEADROOM: f64 = 1.05;

/// Offset that centres a half-hour slot on the hour-of-day axis.
pub const SLOT_CENTRE_OFFSET: f64 = 0.25;

// Dash pattern for [`dash_points`], in units of the panel's normalised size.
const DASH_ON: f64 = 0.02;
const DASH_PERIOD: f64 = 0.035;
const DASH_SAMPLE: f64 = 0.0025;

// ── Types ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisKind {
    /// Whole calendar days.
    Date,
    /// Timestamps within and across days.
    DateTime,
    /// 0–24 hours since midnight.
    HourOfDay,
    /// Plain numeric values starting at zero.
    Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisSpec {
    pub title: String,
    pub kind: AxisKind,
    /// `[min, max]` in data coordinates.
    pub bounds: [f64; 2],
    /// Evenly spaced tick labels from `bounds[0]` to `bounds[1]`.
    pub labels: Vec<String>,
}

impl AxisSpec {
    /// Calendar-day axis covering `start..=end`, padded by half a day so bars
    /// on the first and last day are not clipped.
    pub fn date(title: impl Into<String>, start: f64, end: f64) -> Self {
        let bounds = [start - 0.5, end + 0.5];
        Self {
            title: title.into(),
            kind: AxisKind::Date,
            bounds,
            labels: concise_day_labels(bounds[0], bounds[1], DATE_TICKS),
        }
    }

    /// Timestamp axis covering `start..=end`. A zero-width range is widened
    /// to one hour either side.
    pub fn date_time(title: impl Into<String>, start: f64, end: f64) -> Self {
        let bounds = if end - start > f64::EPSILON {
            [start, end]
        } else {
            [start - 1.0 / 24.0, end + 1.0 / 24.0]
        };
        Self {
            title: title.into(),
            kind: AxisKind::DateTime,
            bounds,
            labels: concise_date_labels(bounds[0], bounds[1], DATE_TICKS),
        }
    }

    /// 0–24 hour axis with a tick every hour.
    pub fn hour_of_day(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind: AxisKind::HourOfDay,
            bounds: [0.0, 24.0],
            labels: hour_labels(0, 24, 1),
        }
    }

    /// Value axis from zero to just above `max`, or `[0, 1]` when `max <= 0`.
    pub fn value(title: impl Into<String>, max: f64) -> Self {
        let top = if max > 0.0 && max.is_finite() {
            max * Y_HEADROOM
        } else {
            1.0
        };
        let labels = (0..VALUE_TICKS)
            .map(|i| format_number(top * i as f64 / (VALUE_TICKS - 1) as f64, 2))
            .collect();
        Self {
            title: title.into(),
            kind: AxisKind::Value,
            bounds: [0.0, top],
            labels,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesStyle {
    /// Straight segments between points.
    Line,
    /// Horizontal runs; each value holds from the previous x to its own.
    Step,
    /// As [`SeriesStyle::Step`], drawn dashed.
    DashedStep,
    /// Vertical bars from zero.
    Bar,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub style: SeriesStyle,
    pub points: Vec<(f64, f64)>,
}

impl Series {
    pub fn new(name: impl Into<String>, style: SeriesStyle, points: Vec<(f64, f64)>) -> Self {
        Self {
            name: name.into(),
            style,
            points,
        }
    }

    fn max_y(&self) -> f64 {
        self.points.iter().map(|p| p.1).fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: String,
    pub x_axis: AxisSpec,
    pub y_axis: AxisSpec,
    pub series: Vec<Series>,
    pub show_legend: bool,
    /// Bar series are stacked: each series' y is the cumulative top of its
    /// segment, and later series sit on earlier ones.
    pub stacked: bool,
}

impl Panel {
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.points.is_empty())
    }
}

/// Everything needed to draw one chart window.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    /// One-line summary shown in the header.
    pub summary: String,
    /// Panels, laid out side by side.
    pub panels: Vec<Panel>,
}

impl ChartSpec {
    pub fn is_empty(&self) -> bool {
        self.panels.iter().all(Panel::is_empty)
    }
}

// ── Builders ──────────────────────────────────────────────────────────────────

/// Daily usage line, plus stacked daily cost bars when a tariff is set.
pub fn daily_chart(daily: &[DailyTotal], tariff: Option<&Tariff>) -> ChartSpec {
    let xs: Vec<f64> = daily.iter().map(|d| date_to_day_number(d.date)).collect();
    let (start, end) = x_range(&xs);

    let usage = Series::new(
        "Usage",
        SeriesStyle::Line,
        xs.iter()
            .zip(daily)
            .map(|(x, d)| (*x, d.total_usage))
            .collect(),
    );
    let mut panels = vec![Panel {
        title: "Daily usage".to_string(),
        x_axis: AxisSpec::date("Date", start, end),
        y_axis: AxisSpec::value("kWh/day", usage.max_y()),
        series: vec![usage],
        show_legend: false,
        stacked: false,
    }];

    let total_usage: f64 = daily.iter().map(|d| d.total_usage).sum();
    let mut summary = format!("{} days | {}", daily.len(), format_kwh(total_usage));

    if let Some(tariff) = tariff {
        let service = Series::new(
            "Service",
            SeriesStyle::Bar,
            xs.iter().map(|x| (*x, tariff.service_charge())).collect(),
        );
        let usage_cost = Series::new(
            "Usage",
            SeriesStyle::Bar,
            xs.iter()
                .zip(daily)
                .map(|(x, d)| (*x, tariff.daily_cost(d.total_usage)))
                .collect(),
        );
        let total_cost: f64 = daily.iter().map(|d| tariff.daily_cost(d.total_usage)).sum();
        summary.push_str(&format!(" | {}", format_currency(total_cost)));

        panels.push(Panel {
            title: "Daily cost".to_string(),
            x_axis: AxisSpec::date("Date", start, end),
            y_axis: AxisSpec::value("$/day", usage_cost.max_y()),
            series: vec![service, usage_cost],
            show_legend: true,
            stacked: true,
        });
    }

    ChartSpec {
        title: "Daily usage".to_string(),
        summary,
        panels,
    }
}

/// Every half-hour sample as one line.
pub fn raw_chart(samples: &[UsageSample]) -> ChartSpec {
    let series = Series::new(
        "Usage",
        SeriesStyle::Line,
        samples
            .iter()
            .map(|s| (datetime_to_day_number(s.timestamp), s.usage))
            .collect(),
    );
    let xs: Vec<f64> = series.points.iter().map(|p| p.0).collect();
    let (start, end) = x_range(&xs);
    let total: f64 = samples.iter().map(|s| s.usage).sum();

    ChartSpec {
        title: "Half hourly usage".to_string(),
        summary: format!("{} samples | {}", samples.len(), format_kwh(total)),
        panels: vec![Panel {
            title: "Half hourly usage".to_string(),
            x_axis: AxisSpec::date_time("Time", start, end),
            y_axis: AxisSpec::value("kWh/half hour", series.max_y()),
            series: vec![series],
            show_legend: false,
            stacked: false,
        }],
    }
}

/// Average power by time of day, with the latest day dashed on top.
pub fn profile_chart(
    average: &[ProfilePoint],
    latest_day: Option<NaiveDate>,
    latest: &[UsageSample],
) -> ChartSpec {
    let mut series = vec![Series::new(
        "Average",
        SeriesStyle::Step,
        average
            .iter()
            .map(|p| (hour_of_day(p.time_of_day) + SLOT_CENTRE_OFFSET, p.power_kw()))
            .collect(),
    )];
    if let Some(day) = latest_day {
        series.push(Series::new(
            day.format("%a %d %b").to_string(),
            SeriesStyle::DashedStep,
            latest
                .iter()
                .map(|s| {
                    (
                        hour_of_day(s.time_of_day()) + SLOT_CENTRE_OFFSET,
                        s.usage * INTERVALS_PER_HOUR,
                    )
                })
                .collect(),
        ));
    }

    let max = series.iter().map(Series::max_y).fold(0.0, f64::max);
    let daily_average: f64 = average.iter().map(|p| p.mean_usage).sum();

    ChartSpec {
        title: "Average daily usage profile".to_string(),
        summary: format!("{}/day average", format_kwh(daily_average)),
        panels: vec![Panel {
            title: "Average daily usage profile".to_string(),
            x_axis: AxisSpec::hour_of_day("Hour of day"),
            y_axis: AxisSpec::value("Average power usage kW", max),
            series,
            show_legend: true,
            stacked: false,
        }],
    }
}

// ── Geometry ──────────────────────────────────────────────────────────────────

/// Vertices of a step line where each value holds over the interval ending
/// at its own x: `(x0, y0)`, then `(x[i-1], y[i])`, `(x[i], y[i])`.
pub fn step_path(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let Some(first) = points.first() else {
        return Vec::new();
    };
    let mut path = Vec::with_capacity(points.len() * 2);
    path.push(*first);
    for w in points.windows(2) {
        path.push((w[0].0, w[1].1));
        path.push(w[1]);
    }
    path
}

/// Sample points along `path` that fall on the "on" part of a dash pattern.
///
/// Distances are measured in the panel's normalised coordinates so dashes
/// look the same on both axes.
pub fn dash_points(path: &[(f64, f64)], x_bounds: [f64; 2], y_bounds: [f64; 2]) -> Vec<(f64, f64)> {
    if path.len() < 2 {
        return path.to_vec();
    }
    let sx = span(x_bounds);
    let sy = span(y_bounds);

    let mut out = Vec::new();
    let mut travelled = 0.0;
    for w in path.windows(2) {
        let (x0, y0) = w[0];
        let (x1, y1) = w[1];
        let len = (((x1 - x0) / sx).powi(2) + ((y1 - y0) / sy).powi(2)).sqrt();
        if len == 0.0 {
            continue;
        }
        let steps = (len / DASH_SAMPLE).ceil() as usize;
        for k in 0..steps {
            let t = k as f64 / steps as f64;
            if (travelled + t * len) % DASH_PERIOD < DASH_ON {
                out.push((x0 + t * (x1 - x0), y0 + t * (y1 - y0)));
            }
        }
        travelled += len;
    }
    out
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn x_range(xs: &[f64]) -> (f64, f64) {
    let start = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let end = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if start.is_finite() && end.is_finite() {
        (start, end)
    } else {
        (0.0, 1.0)
    }
}

fn span(bounds: [f64; 2]) -> f64 {
    let s = bounds[1] - bounds[0];
    if s.abs() > f64::EPSILON {
        s.abs()
    } else {
        1.0
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
