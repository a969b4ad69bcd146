use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the Jemena usage tool.
#[derive(Error, Debug)]
pub enum JemenaError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV layer rejected the input (bad quoting, ragged rows, ...).
    #[error("Failed to parse CSV: {0}")]
    Csv(String),

    /// A required column is absent from the CSV header.
    #[error("Missing column in usage CSV: {0}")]
    MissingColumn(String),

    /// The CSV header carries no half-hour interval columns at all.
    #[error("No interval columns found in usage CSV")]
    NoIntervalColumns,

    /// An interval column label does not start with `HH:MM - `.
    #[error("Invalid interval label: {0:?}")]
    InvalidIntervalLabel(String),

    /// A date cell did not match any recognised format.
    #[error("Invalid date: {0:?}")]
    InvalidDate(String),

    /// A usage cell is not a non-negative number.
    #[error("Invalid usage value {value:?} in column {column:?} on {date}")]
    InvalidUsage {
        date: String,
        column: String,
        value: String,
    },

    /// The `CON/GEN` cell is neither a consumption nor a generation marker.
    #[error("Invalid flow direction: {0:?}")]
    InvalidFlow(String),

    /// Two samples in the same series share a timestamp.
    #[error("Duplicate timestamp in usage data: {0}")]
    DuplicateTimestamp(chrono::NaiveDateTime),

    /// The portal rejected the login form.
    #[error("Login failed: portal returned HTTP {status}")]
    LoginFailed { status: u16 },

    /// The usage CSV download did not succeed.
    #[error("Download failed: portal returned HTTP {status}")]
    DownloadFailed { status: u16 },

    /// Transport-level HTTP failure (DNS, TLS, connection reset, ...).
    #[error("HTTP error: {0}")]
    Http(String),

    /// An error originating from the terminal / TUI layer.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the jemena crates.
pub type Result<T> = std::result::Result<T, JemenaError>;
