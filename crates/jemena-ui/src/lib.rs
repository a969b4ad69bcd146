//! Terminal UI layer for the Jemena usage tool.
//!
//! Builds chart descriptions for the daily, half-hourly and profile views
//! and draws them with [`ratatui`] in a window that stays open until the
//! user dismisses it.

pub mod app;
pub mod chart_spec;
pub mod chart_view;
pub mod components;
pub mod themes;

pub use jemena_core as core;
