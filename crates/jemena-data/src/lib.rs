//! Data layer for the Jemena usage tool.
//!
//! Reads the portal's wide usage CSV, reshapes it into a sorted half-hourly
//! series, applies the start-date cutoff and derives the daily and profile
//! views.

pub mod aggregator;
pub mod analysis;
pub mod reader;
pub mod reshaper;

#[cfg(test)]
mod testing;

pub use jemena_core as core;
