//! CSV fixtures shared by the data-layer tests.

use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate};

/// The 48 half-hour labels of a standard day: `"00:00 - 00:30"` ..
/// `"23:30 - 00:00"`.
pub(crate) fn interval_labels() -> Vec<String> {
    (0..48)
        .map(|i| {
            let start = i * 30;
            let end = (start + 30) % (24 * 60);
            format!(
                "{:02}:{:02} - {:02}:{:02}",
                start / 60,
                start % 60,
                end / 60,
                end % 60
            )
        })
        .collect()
}

/// Build a consumption-only export covering `days` days from `start`.
///
/// `value(day_index, interval_index)` supplies each cell.
pub(crate) fn synthetic_csv(
    start: NaiveDate,
    days: usize,
    value: impl Fn(usize, usize) -> f64,
) -> String {
    let mut text = format!(
        "NMI,METER SERIAL NUMBER,CON/GEN,DATE,ESTIMATED?,{}\n",
        interval_labels().join(",")
    );
    for day in 0..days {
        let date = start + Duration::days(day as i64);
        let cells: Vec<String> = (0..48).map(|i| value(day, i).to_string()).collect();
        text.push_str(&format!(
            "6001234567,M0001,CON,{},N,{}\n",
            date.format("%Y-%m-%d"),
            cells.join(",")
        ));
    }
    text
}

/// Write `text` to `electricity_outlook.csv` inside `dir`.
pub(crate) fn write_csv(dir: &Path, text: &str) -> PathBuf {
    let path = dir.join("electricity_outlook.csv");
    std::fs::write(&path, text).expect("write fixture csv");
    path
}
