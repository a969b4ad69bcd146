//! Network layer for the Jemena usage tool: the portal login and CSV
//! download.

pub mod portal;

pub use jemena_core as core;
