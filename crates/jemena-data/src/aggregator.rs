//! Usage aggregation over calendar days and time-of-day slots.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use jemena_core::models::{DailyTotal, ProfilePoint, UsageSample};
use jemena_core::tariff::Tariff;

// ── UsageTotals ───────────────────────────────────────────────────────────────

/// Sums across a run of [`DailyTotal`]s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageTotals {
    /// kWh across all days.
    pub total_usage: f64,
    /// Dollars across all days; `None` when the days carry no cost.
    pub total_cost: Option<f64>,
    /// Number of days with at least one sample.
    pub days: usize,
}

impl UsageTotals {
    /// Mean kWh per day, or `0.0` for an empty run.
    pub fn average_daily_usage(&self) -> f64 {
        if self.days == 0 {
            0.0
        } else {
            self.total_usage / self.days as f64
        }
    }
}

// ── DailyProfile ──────────────────────────────────────────────────────────────

/// Average usage by time of day plus the most recent day's raw trace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyProfile {
    /// Mean usage per time-of-day slot over every day except `latest_day`,
    /// sorted by time.
    pub average: Vec<ProfilePoint>,
    /// The most recent calendar day present in the input.
    pub latest_day: Option<NaiveDate>,
    /// Samples from `latest_day`, unaggregated and in time order.
    pub latest: Vec<UsageSample>,
}

impl DailyProfile {
    pub fn is_empty(&self) -> bool {
        self.average.is_empty() && self.latest.is_empty()
    }
}

// ── UsageAggregator ───────────────────────────────────────────────────────────

/// Stateless helper that derives the daily and profile views.
pub struct UsageAggregator;

impl UsageAggregator {
    /// Sum usage per calendar day, applying `tariff` when present.
    ///
    /// Only days that have samples produce a bucket. Sorted by date.
    pub fn daily_totals(samples: &[UsageSample], tariff: Option<&Tariff>) -> Vec<DailyTotal> {
        let mut map: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for sample in samples {
            *map.entry(sample.date()).or_insert(0.0) += sample.usage;
        }

        map.into_iter()
            .map(|(date, total_usage)| DailyTotal {
                date,
                total_usage,
                cost: tariff.map(|t| t.daily_cost(total_usage)),
            })
            .collect()
    }

    /// Sum up a run of daily totals.
    pub fn calculate_totals(daily: &[DailyTotal]) -> UsageTotals {
        let total_cost = if !daily.is_empty() && daily.iter().all(|d| d.cost.is_some()) {
            Some(daily.iter().filter_map(|d| d.cost).sum())
        } else {
            None
        };
        UsageTotals {
            total_usage: daily.iter().map(|d| d.total_usage).sum(),
            total_cost,
            days: daily.len(),
        }
    }

    /// Build the average daily profile.
    ///
    /// The latest day is kept out of the mean and returned verbatim as the
    /// overlay.
    pub fn profile(samples: &[UsageSample]) -> DailyProfile {
        let Some(latest_day) = samples.iter().map(UsageSample::date).max() else {
            return DailyProfile::default();
        };

        let mut slots: BTreeMap<NaiveTime, (f64, usize)> = BTreeMap::new();
        let mut latest = Vec::new();

        for sample in samples {
            if sample.date() == latest_day {
                latest.push(*sample);
            } else {
                let slot = slots.entry(sample.time_of_day()).or_insert((0.0, 0));
                slot.0 += sample.usage;
                slot.1 += 1;
            }
        }

        latest.sort_by_key(|s| s.timestamp);

        let average = slots
            .into_iter()
            .map(|(time_of_day, (sum, count))| ProfilePoint {
                time_of_day,
                mean_usage: sum / count as f64,
            })
            .collect();

        DailyProfile {
            average,
            latest_day: Some(latest_day),
            latest,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::parse_usage_csv;
    use crate::reshaper::reshape;
    use crate::testing::synthetic_csv;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample(d: NaiveDate, h: u32, m: u32, usage: f64) -> UsageSample {
        UsageSample::new(d.and_hms_opt(h, m, 0).unwrap(), usage)
    }

    fn from_csv(days: usize, value: impl Fn(usize, usize) -> f64) -> Vec<UsageSample> {
        let text = synthetic_csv(date(2024, 1, 1), days, value);
        reshape(&parse_usage_csv(text.as_bytes()).unwrap()).unwrap()
    }

    // ── daily_totals ──────────────────────────────────────────────────────────

    #[test]
    fn test_daily_totals_groups_by_date() {
        let samples = vec![
            sample(date(2024, 1, 15), 8, 0, 0.5),
            sample(date(2024, 1, 15), 20, 30, 0.25),
            sample(date(2024, 1, 16), 10, 0, 1.0),
        ];
        let daily = UsageAggregator::daily_totals(&samples, None);

        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].date, date(2024, 1, 15));
        assert!((daily[0].total_usage - 0.75).abs() < 1e-12);
        assert_eq!(daily[0].cost, None);
        assert_eq!(daily[1].date, date(2024, 1, 16));
    }

    #[test]
    fn test_daily_totals_skips_days_without_samples() {
        let samples = vec![
            sample(date(2024, 1, 10), 0, 0, 1.0),
            sample(date(2024, 1, 20), 0, 0, 1.0),
        ];
        let dates: Vec<NaiveDate> = UsageAggregator::daily_totals(&samples, None)
            .iter()
            .map(|d| d.date)
            .collect();
        assert_eq!(dates, vec![date(2024, 1, 10), date(2024, 1, 20)]);
    }

    #[test]
    fn test_daily_totals_empty() {
        assert!(UsageAggregator::daily_totals(&[], None).is_empty());
    }

    #[test]
    fn test_daily_totals_conserve_usage() {
        let samples = from_csv(5, |d, i| ((d + 1) * (i % 7)) as f64 * 0.01);
        let daily = UsageAggregator::daily_totals(&samples, None);

        let from_daily: f64 = daily.iter().map(|d| d.total_usage).sum();
        let from_samples: f64 = samples.iter().map(|s| s.usage).sum();
        assert!((from_daily - from_samples).abs() < 1e-9);
    }

    #[test]
    fn test_daily_totals_match_manual_sums() {
        let samples = from_csv(2, |d, _| if d == 0 { 0.1 } else { 0.2 });
        let daily = UsageAggregator::daily_totals(&samples, None);

        assert_eq!(daily.len(), 2);
        assert!((daily[0].total_usage - 4.8).abs() < 1e-9);
        assert!((daily[1].total_usage - 9.6).abs() < 1e-9);
    }

    #[test]
    fn test_daily_totals_apply_tariff() {
        let samples: Vec<UsageSample> = (0..20)
            .map(|i| sample(date(2024, 2, 1), i, 0, 0.5))
            .collect();
        let tariff = Tariff::new(20.0, 50.0);
        let daily = UsageAggregator::daily_totals(&samples, Some(&tariff));

        assert!((daily[0].total_usage - 10.0).abs() < 1e-12);
        assert!((daily[0].cost.unwrap() - 2.50).abs() < 1e-9);
    }

    // ── calculate_totals ──────────────────────────────────────────────────────

    #[test]
    fn test_calculate_totals_with_cost() {
        let daily = vec![
            DailyTotal { date: date(2024, 1, 1), total_usage: 10.0, cost: Some(2.5) },
            DailyTotal { date: date(2024, 1, 2), total_usage: 5.0, cost: Some(1.5) },
        ];
        let totals = UsageAggregator::calculate_totals(&daily);

        assert_eq!(totals.days, 2);
        assert!((totals.total_usage - 15.0).abs() < 1e-12);
        assert!((totals.total_cost.unwrap() - 4.0).abs() < 1e-12);
        assert!((totals.average_daily_usage() - 7.5).abs() < 1e-12);
    }

    #[test]
    fn test_calculate_totals_without_cost() {
        let daily = vec![DailyTotal { date: date(2024, 1, 1), total_usage: 3.0, cost: None }];
        assert_eq!(UsageAggregator::calculate_totals(&daily).total_cost, None);
    }

    #[test]
    fn test_calculate_totals_empty() {
        let totals = UsageAggregator::calculate_totals(&[]);
        assert_eq!(totals, UsageTotals::default());
        assert_eq!(totals.average_daily_usage(), 0.0);
    }

    // ── profile ───────────────────────────────────────────────────────────────

    #[test]
    fn test_profile_two_day_synthetic() {
        let samples = from_csv(2, |d, i| (d * 100 + i) as f64 / 100.0);
        let profile = UsageAggregator::profile(&samples);

        assert_eq!(profile.average.len(), 48);
        assert_eq!(profile.latest_day, Some(date(2024, 1, 2)));
        assert_eq!(profile.latest.len(), 48);
        // Only day 0 feeds the mean.
        assert!((profile.average[10].mean_usage - 0.10).abs() < 1e-12);
        assert_eq!(profile.average[0].time_of_day, NaiveTime::from_hms_opt(0, 0, 0).unwrap());
        assert_eq!(profile.average[47].time_of_day, NaiveTime::from_hms_opt(23, 30, 0).unwrap());
    }

    #[test]
    fn test_profile_excludes_latest_day_from_mean() {
        let d1 = date(2024, 3, 1);
        let d2 = date(2024, 3, 2);
        let d3 = date(2024, 3, 3);
        let samples = vec![
            sample(d1, 18, 0, 1.0),
            sample(d2, 18, 0, 3.0),
            sample(d3, 18, 0, 100.0),
            sample(d3, 18, 30, 50.0),
        ];
        let profile = UsageAggregator::profile(&samples);

        assert_eq!(profile.average.len(), 1);
        assert!((profile.average[0].mean_usage - 2.0).abs() < 1e-12);
        assert!((profile.average[0].power_kw() - 4.0).abs() < 1e-12);
        assert_eq!(profile.latest, vec![sample(d3, 18, 0, 100.0), sample(d3, 18, 30, 50.0)]);
    }

    #[test]
    fn test_profile_single_day_has_empty_average() {
        let samples = from_csv(1, |_, _| 0.3);
        let profile = UsageAggregator::profile(&samples);
        assert!(profile.average.is_empty());
        assert_eq!(profile.latest.len(), 48);
        assert!(!profile.is_empty());
    }

    #[test]
    fn test_profile_empty_input() {
        let profile = UsageAggregator::profile(&[]);
        assert!(profile.is_empty());
        assert_eq!(profile.latest_day, None);
    }
}
