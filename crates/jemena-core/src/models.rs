use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Number of native half-hour samples per hour; converts kWh per interval
/// into average kW.
pub const INTERVALS_PER_HOUR: f64 = 2.0;

/// Whether a CSV row records energy drawn from or exported to the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowDirection {
    /// Energy imported from the grid (`CON`).
    Consumption,
    /// Energy exported to the grid (`GEN`).
    Generation,
}

impl FlowDirection {
    /// Parse the `CON/GEN` cell. Blank cells count as consumption.
    pub fn parse(s: &str) -> Option<Self> {
        let upper = s.trim().to_uppercase();
        if upper.is_empty() || upper.starts_with("CON") {
            Some(Self::Consumption)
        } else if upper.starts_with("GEN") {
            Some(Self::Generation)
        } else {
            None
        }
    }
}

/// One data row of the wide usage CSV.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageRow {
    /// Calendar date the row covers.
    pub date: NaiveDate,
    /// Consumption or generation.
    pub flow: FlowDirection,
    /// One value per interval column, in header order. `None` for blank cells.
    pub values: Vec<Option<f64>>,
}

/// A single half-hour reading in the long time series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UsageSample {
    /// Local start time of the interval.
    pub timestamp: NaiveDateTime,
    /// Energy used in the interval, kWh.
    pub usage: f64,
}

impl UsageSample {
    pub fn new(timestamp: NaiveDateTime, usage: f64) -> Self {
        Self { timestamp, usage }
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn time_of_day(&self) -> NaiveTime {
        self.timestamp.time()
    }
}

/// Usage (and optionally cost) summed over one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    /// kWh used on `date`.
    pub total_usage: f64,
    /// Dollars, or `None` when no tariff is configured.
    pub cost: Option<f64>,
}

/// Mean usage at one time-of-day slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfilePoint {
    pub time_of_day: NaiveTime,
    /// Mean kWh per half-hour interval.
    pub mean_usage: f64,
}

impl ProfilePoint {
    /// Average power over the slot in kW.
    pub fn power_kw(&self) -> f64 {
        self.mean_usage * INTERVALS_PER_HOUR
    }
}

/// Start-date filter applied after reshaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartCutoff {
    pub date: NaiveDate,
    /// Keep samples dated on `date` itself when `true`.
    pub inclusive: bool,
}

impl StartCutoff {
    pub fn new(date: NaiveDate, inclusive: bool) -> Self {
        Self { date, inclusive }
    }

    /// `true` when a sample dated `day` survives the cutoff.
    pub fn keeps(&self, day: NaiveDate) -> bool {
        if self.inclusive {
            day >= self.date
        } else {
            day > self.date
        }
    }
}
