use chrono::Timelike;

use crate::time_utils::day_number_to_datetime;

/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use jemena_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let body = match formatted.split_once('.') {
        Some((int_part, frac_part)) => format!("{}.{}", group_thousands(int_part), frac_part),
        None => group_thousands(&formatted),
    };

    // Suppress "-0.00" for values that round to zero.
    let is_zero = body.chars().all(|c| matches!(c, '0' | '.' | ','));
    if value < 0.0 && !is_zero {
        format!("-{}", body)
    } else {
        body
    }
}

/// Format a dollar amount with two decimal places and thousands separators.
///
/// ```
/// use jemena_core::formatting::format_currency;
///
/// assert_eq!(format_currency(1234.56), "$1,234.56");
/// assert_eq!(format_currency(2.5), "$2.50");
/// ```
pub fn format_currency(amount: f64) -> String {
    if amount < 0.0 {
        format!("$-{}", format_number(amount.abs(), 2))
    } else {
        format!("${}", format_number(amount, 2))
    }
}

/// Format an energy quantity, e.g. `"312.4 kWh"`.
pub fn format_kwh(kwh: f64) -> String {
    format!("{} kWh", format_number(kwh, 1))
}

// ── Axis labels ───────────────────────────────────────────────────────────────

/// Build `count` evenly spaced tick labels for a date axis spanning the day
/// numbers `start..=end` (see [`crate::time_utils::datetime_to_day_number`]).
///
/// The label layout adapts to the visible span:
///
/// * more than two years → `"2024"`
/// * more than ~three months → `"Mar 2024"`
/// * three days or more → `"09 Mar"`
/// * shorter spans → `"17:30"`, prefixed with the date whenever the day
///   changes from the previous tick.
///
/// ```
/// use jemena_core::formatting::concise_date_labels;
/// use jemena_core::time_utils::date_to_day_number;
/// use chrono::NaiveDate;
///
/// let start = date_to_day_number(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
/// let end = date_to_day_number(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
/// assert_eq!(concise_date_labels(start, end, 3), vec!["01 Jan", "16 Jan", "31 Jan"]);
/// ```
pub fn concise_date_labels(start: f64, end: f64, count: usize) -> Vec<String> {
    if count == 0 {
        return Vec::new();
    }
    let span = (end - start).abs();
    let step = if count > 1 {
        (end - start) / (count - 1) as f64
    } else {
        0.0
    };

    let mut labels = Vec::with_capacity(count);
    let mut previous_date = None;
    for i in 0..count {
        let Some(tick) = day_number_to_datetime(start + step * i as f64) else {
            labels.push(String::new());
            continue;
        };

        let label = if span > 730.0 {
            tick.format("%Y").to_string()
        } else if span > 90.0 {
            tick.format("%b %Y").to_string()
        } else if span >= 3.0 {
            tick.format("%d %b").to_string()
        } else if previous_date != Some(tick.date()) {
            tick.format("%d %b %H:%M").to_string()
        } else {
            format!("{:02}:{:02}", tick.hour(), tick.minute())
        };

        previous_date = Some(tick.date());
        labels.push(label);
    }
    labels
}

/// Tick labels for an axis of whole calendar days.
///
/// Like [`concise_date_labels`], but short spans never drop to time-of-day
/// labels: each tick is named by the nearest day within `start..=end`, and a
/// tick repeating its left neighbour's day is left blank.
pub fn concise_day_labels(start: f64, end: f64, count: usize) -> Vec<String> {
    if (end - start).abs() >= 3.0 {
        return concise_date_labels(start, end, count);
    }
    let first_day = start.ceil().min(end.floor());
    let last_day = end.floor().max(first_day);
    let step = if count > 1 {
        (end - start) / (count - 1) as f64
    } else {
        0.0
    };

    let mut labels = Vec::with_capacity(count);
    let mut previous = None;
    for i in 0..count {
        let day = (start + step * i as f64).round().clamp(first_day, last_day);
        let label = match day_number_to_datetime(day) {
            Some(tick) if previous != Some(tick.date()) => {
                previous = Some(tick.date());
                tick.format("%d %b").to_string()
            }
            _ => String::new(),
        };
        labels.push(label);
    }
    labels
}

/// Whole-number labels from `start` to `end` inclusive, every `step`.
///
/// ```
/// use jemena_core::formatting::hour_labels;
///
/// assert_eq!(hour_labels(0, 24, 6), vec!["0", "6", "12", "18", "24"]);
/// ```
pub fn hour_labels(start: u32, end: u32, step: u32) -> Vec<String> {
    (start..=end)
        .step_by(step.max(1) as usize)
        .map(|h| h.to_string())
        .collect()
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
