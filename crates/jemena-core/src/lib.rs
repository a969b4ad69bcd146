//! Shared domain types for the Jemena usage tool.
//!
//! Holds the error type, usage models, the linear tariff, CLI settings and
//! configuration-file loading, plus formatting and time helpers used by the
//! data and UI layers.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod tariff;
pub mod time_utils;
