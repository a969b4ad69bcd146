use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Deserializer};
use tracing::{debug, info};

use crate::error::{JemenaError, Result};
use crate::models::StartCutoff;
use crate::tariff::Tariff;

/// File name of the per-user configuration file in the home directory.
pub const CONFIG_FILE_NAME: &str = ".jemenarc";

/// Default location of the downloaded usage CSV (relative to the working
/// directory).
pub const DEFAULT_CSV_PATH: &str = "electricity_outlook.csv";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Tool for downloading and charting electricity usage data from Jemena
#[derive(Parser, Debug, Clone)]
#[command(
    name = "jemena",
    about = "Tool for downloading electricity usage data from Jemena",
    version
)]
pub struct Settings {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (defaults to ~/.jemenarc)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Usage CSV location
    #[arg(long, global = true, default_value = DEFAULT_CSV_PATH)]
    pub csv: PathBuf,

    /// Ignore usage before this date (YYYY-MM-DD); overrides start_date
    #[arg(long, global = true, value_parser = parse_cli_date)]
    pub start_date: Option<NaiveDate>,

    /// Display theme
    #[arg(long, global = true, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Logging level
    #[arg(long, global = true, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Commands understood by the tool.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Fetch latest data from Jemena.
    Update,
    /// Plot daily usage.
    Daily,
    /// Plot high frequency data.
    Plot,
    /// Plot average daily usage profile.
    Profile,
}

impl Settings {
    /// Parse the process arguments and apply the `--debug` override.
    pub fn load() -> Self {
        Self::resolve(Settings::parse())
    }

    /// Same as [`Settings::load`] but from an explicit argument list.
    pub fn load_from_args<I, T>(args: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Settings::try_parse_from(args).map(Self::resolve)
    }

    fn resolve(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

fn parse_cli_date(s: &str) -> std::result::Result<NaiveDate, String> {
    crate::time_utils::parse_date(s).map_err(|e| e.to_string())
}

// ── Config (file) ──────────────────────────────────────────────────────────────

/// Values read from the configuration file.
///
/// The file is either TOML or INI-style `key = value` lines. Keys may sit at
/// the top level or inside a `[DEFAULT]` section; every key is optional at
/// load time. Numbers, booleans and dates are accepted as bare or quoted
/// text.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Config {
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(default, deserialize_with = "deserialize_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_bool")]
    pub start_inclusive: Option<bool>,
    /// Consumption rate in cents per kWh.
    #[serde(default, deserialize_with = "deserialize_number")]
    pub rate_ckw: Option<f64>,
    /// Service charge in cents per day.
    #[serde(default, deserialize_with = "deserialize_number")]
    pub daily_c: Option<f64>,
}

/// Portal login credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Default config path: `~/.jemenarc`.
    pub fn default_path() -> PathBuf {
        Self::path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Config path rooted at `base_dir` (used for testing).
    pub fn path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(CONFIG_FILE_NAME)
    }

    /// Load the config file at `explicit`, or the default path when `None`.
    ///
    /// A missing default file yields an empty config; a missing explicit
    /// file is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    info!("No config file at {}; using defaults", path.display());
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load and parse the config file at `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| JemenaError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content)?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse config text, as TOML first and INI second. Keys in a
    /// `[DEFAULT]` section override top-level keys of the same name; other
    /// sections are ignored.
    pub fn parse(content: &str) -> Result<Self> {
        let table = match toml::from_str::<toml::Table>(content) {
            Ok(table) => table,
            Err(toml_err) => {
                debug!("Config is not TOML, reading as INI: {toml_err}");
                parse_ini(content).map_err(|ini_err| {
                    JemenaError::Config(format!("invalid config file: {ini_err}"))
                })?
            }
        };

        toml::Value::Table(merge_default_section(table)?)
            .try_into()
            .map_err(|e| JemenaError::Config(format!("invalid config value: {e}")))
    }

    /// Credentials for `update`; both keys must be present.
    pub fn credentials(&self) -> Result<Credentials> {
        let email = self
            .email
            .clone()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| JemenaError::Config("email is not set".to_string()))?;
        let password = self
            .password
            .clone()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| JemenaError::Config("password is not set".to_string()))?;
        Ok(Credentials { email, password })
    }

    /// The tariff, when both `rate_ckw` and `daily_c` are configured.
    pub fn tariff(&self) -> Option<Tariff> {
        match (self.rate_ckw, self.daily_c) {
            (Some(rate), Some(daily)) => Some(Tariff::new(rate, daily)),
            _ => None,
        }
    }

    /// Start-date cutoff. `override_date` (from the CLI) wins over the file.
    pub fn cutoff(&self, override_date: Option<NaiveDate>) -> Option<StartCutoff> {
        override_date
            .or(self.start_date)
            .map(|date| StartCutoff::new(date, self.start_inclusive.unwrap_or(true)))
    }
}

// ── Config file helpers ────────────────────────────────────────────────────────

/// Read INI-style text into a table: top-level keys at the root, each
/// `[section]` as a nested table. Values stay text; keys are lower-cased.
fn parse_ini(content: &str) -> std::result::Result<toml::Table, String> {
    let mut root = toml::Table::new();
    let mut section: Option<String> = None;

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let name = header
                .strip_suffix(']')
                .ok_or_else(|| format!("line {}: unterminated section header", index + 1))?;
            section = Some(name.trim().to_string());
            continue;
        }

        let (key, value) = line
            .split_once(['=', ':'])
            .ok_or_else(|| format!("line {}: expected `key = value`", index + 1))?;
        let key = key.trim().to_lowercase();
        let value = toml::Value::String(value.trim().to_string());

        match &section {
            None => {
                root.insert(key, value);
            }
            Some(name) => {
                if !root.contains_key(name) {
                    root.insert(name.clone(), toml::Value::Table(toml::Table::new()));
                }
                match root.get_mut(name) {
                    Some(toml::Value::Table(table)) => {
                        table.insert(key, value);
                    }
                    _ => return Err(format!("line {}: [{name}] clashes with a key", index + 1)),
                }
            }
        }
    }
    Ok(root)
}

/// Flatten top-level scalars and the `[DEFAULT]` section into one table.
fn merge_default_section(mut table: toml::Table) -> Result<toml::Table> {
    let default = match table.remove("DEFAULT") {
        Some(toml::Value::Table(default)) => Some(default),
        Some(_) => return Err(JemenaError::Config("[DEFAULT] must be a table".to_string())),
        None => None,
    };

    let mut merged: toml::Table = table.into_iter().filter(|(_, v)| !v.is_table()).collect();
    merged.extend(default.unwrap_or_default());

    // Bare TOML dates become text for `parse_date`.
    for (_, value) in merged.iter_mut() {
        if let toml::Value::Datetime(dt) = value {
            *value = toml::Value::String(dt.to_string());
        }
    }
    Ok(merged)
}

/// A config scalar as written, before it is read as its field's type.
#[derive(Deserialize)]
#[serde(untagged)]
enum ConfigScalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

fn deserialize_date<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match Option::<ConfigScalar>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(ConfigScalar::Text(s)) => s,
        Some(ConfigScalar::Int(n)) => n.to_string(),
        Some(_) => return Err(serde::de::Error::custom("expected a date")),
    };
    crate::time_utils::parse_date(&text)
        .map(Some)
        .map_err(serde::de::Error::custom)
}

fn deserialize_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<ConfigScalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(ConfigScalar::Int(n)) => Ok(Some(n as f64)),
        Some(ConfigScalar::Float(f)) => Ok(Some(f)),
        Some(ConfigScalar::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("expected a number, got {s:?}"))),
        Some(ConfigScalar::Bool(_)) => Err(serde::de::Error::custom("expected a number")),
    }
}

fn deserialize_bool<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<ConfigScalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(ConfigScalar::Bool(b)) => Ok(Some(b)),
        Some(ConfigScalar::Int(1)) => Ok(Some(true)),
        Some(ConfigScalar::Int(0)) => Ok(Some(false)),
        Some(ConfigScalar::Text(s)) => match s.trim().to_lowercase().as_str() {
            "1" | "yes" | "true" | "on" => Ok(Some(true)),
            "0" | "no" | "false" | "off" => Ok(Some(false)),
            _ => Err(serde::de::Error::custom(format!("expected a boolean, got {s:?}"))),
        },
        Some(_) => Err(serde::de::Error::custom("expected a boolean")),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ── CLI ───────────────────────────────────────────────────────────────────

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::load_from_args(["jemena", "daily"]).unwrap();

        assert_eq!(settings.command, Command::Daily);
        assert!(settings.config.is_none());
        assert_eq!(settings.csv, PathBuf::from(DEFAULT_CSV_PATH));
        assert!(settings.start_date.is_none());
        assert_eq!(settings.theme, "auto");
        assert_eq!(settings.log_level, "INFO");
        assert!(!settings.debug);
    }

    #[test]
    fn test_settings_all_commands() {
        for (name, expected) in [
            ("update", Command::Update),
            ("daily", Command::Daily),
            ("plot", Command::Plot),
            ("profile", Command::Profile),
        ] {
            let settings = Settings::load_from_args(["jemena", name]).unwrap();
            assert_eq!(settings.command, expected);
        }
    }

    #[test]
    fn test_settings_requires_command() {
        assert!(Settings::load_from_args(["jemena"]).is_err());
    }

    #[test]
    fn test_settings_global_flags_after_command() {
        let settings = Settings::load_from_args([
            "jemena",
            "profile",
            "--csv",
            "/tmp/usage.csv",
            "--start-date",
            "2024-02-01",
            "--theme",
            "light",
        ])
        .unwrap();
        assert_eq!(settings.csv, PathBuf::from("/tmp/usage.csv"));
        assert_eq!(settings.start_date, Some(date(2024, 2, 1)));
        assert_eq!(settings.theme, "light");
    }

    #[test]
    fn test_settings_rejects_bad_start_date() {
        assert!(Settings::load_from_args(["jemena", "plot", "--start-date", "soon"]).is_err());
    }

    #[test]
    fn test_settings_debug_overrides_log_level() {
        let settings = Settings::load_from_args(["jemena", "--debug", "plot"]).unwrap();
        assert_eq!(settings.log_level, "DEBUG");
    }

    // ── Config parsing ────────────────────────────────────────────────────────

    #[test]
    fn test_config_parse_default_section() {
        let config = Config::parse(
            r#"
            [DEFAULT]
            email = "me@example.com"
            password = "hunter2"
            start_date = "2024-01-01"
            rate_ckw = 20.0
            daily_c = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.email.as_deref(), Some("me@example.com"));
        assert_eq!(config.password.as_deref(), Some("hunter2"));
        assert_eq!(config.start_date, Some(date(2024, 1, 1)));
        assert_eq!(config.rate_ckw, Some(20.0));
        assert_eq!(config.daily_c, Some(50.0));
    }

    #[test]
    fn test_config_parse_top_level_keys() {
        let config = Config::parse("email = \"a@b.c\"\nstart_inclusive = false\n").unwrap();
        assert_eq!(config.email.as_deref(), Some("a@b.c"));
        assert_eq!(config.start_inclusive, Some(false));
        assert!(config.password.is_none());
    }

    #[test]
    fn test_config_parse_empty() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_config_parse_rejects_bad_date() {
        let err = Config::parse("start_date = \"last week\"").unwrap_err();
        assert!(matches!(err, JemenaError::Config(_)));
    }

    #[test]
    fn test_config_parse_rejects_unreadable_file() {
        let err = Config::parse("[DEFAULT]\njust some words\n").unwrap_err();
        assert!(matches!(err, JemenaError::Config(_)));
        assert!(err.to_string().contains("line 2"));

        assert!(Config::parse("[DEFAULT\nemail = a@b.c\n").is_err());
    }

    #[test]
    fn test_config_parse_ini_layout() {
        let config = Config::parse(
            "# jemena settings\n\
             [DEFAULT]\n\
             email = me@example.com\n\
             password = hunter2\n\
             start_date = 2024-1-5\n\
             start_inclusive = no\n\
             rate_ckw = 20.0\n\
             daily_c = 50\n",
        )
        .unwrap();

        assert_eq!(config.email.as_deref(), Some("me@example.com"));
        assert_eq!(config.password.as_deref(), Some("hunter2"));
        assert_eq!(config.start_date, Some(date(2024, 1, 5)));
        assert_eq!(config.start_inclusive, Some(false));
        assert_eq!(config.rate_ckw, Some(20.0));
        assert_eq!(config.daily_c, Some(50.0));
    }

    #[test]
    fn test_config_parse_ini_keeps_numeric_password_as_text() {
        let config = Config::parse("[DEFAULT]\nemail: me@example.com\npassword = 123456\n").unwrap();
        assert_eq!(config.email.as_deref(), Some("me@example.com"));
        assert_eq!(config.password.as_deref(), Some("123456"));
    }

    #[test]
    fn test_config_parse_ini_rejects_bad_number() {
        let err = Config::parse("[DEFAULT]\nemail = a@b.c\nrate_ckw = cheap\n").unwrap_err();
        assert!(matches!(err, JemenaError::Config(_)));
    }

    #[test]
    fn test_config_parse_default_section_overlays_top_level() {
        let config = Config::parse(
            "start_date = \"2024-03-01\"\nemail = \"top@b.c\"\n\
             [DEFAULT]\nemail = \"default@b.c\"\nrate_ckw = 20.0\ndaily_c = 50.0\n",
        )
        .unwrap();

        assert_eq!(config.start_date, Some(date(2024, 3, 1)));
        assert_eq!(config.email.as_deref(), Some("default@b.c"));
        assert!(config.tariff().is_some());
    }

    #[test]
    fn test_config_parse_ignores_other_sections() {
        let config = Config::parse("[DEFAULT]\ndaily_c = 50\n[other]\ndaily_c = 99\n").unwrap();
        assert_eq!(config.daily_c, Some(50.0));
    }

    #[test]
    fn test_config_start_date_accepts_csv_formats() {
        for text in ["start_date = \"05/01/2024\"", "start_date = 20240105", "start_date = 2024-01-05"] {
            let config = Config::parse(text).unwrap();
            assert_eq!(config.start_date, Some(date(2024, 1, 5)), "{text}");
        }
    }

    // ── Config derived values ─────────────────────────────────────────────────

    #[test]
    fn test_config_tariff_requires_both_rates() {
        let mut config = Config {
            rate_ckw: Some(20.0),
            ..Default::default()
        };
        assert!(config.tariff().is_none());

        config.daily_c = Some(50.0);
        let tariff = config.tariff().unwrap();
        assert!((tariff.daily_cost(10.0) - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_config_cutoff_defaults_inclusive() {
        let config = Config {
            start_date: Some(date(2024, 1, 1)),
            ..Default::default()
        };
        assert_eq!(
            config.cutoff(None),
            Some(StartCutoff::new(date(2024, 1, 1), true))
        );
    }

    #[test]
    fn test_config_cutoff_cli_override_wins() {
        let config = Config {
            start_date: Some(date(2024, 1, 1)),
            start_inclusive: Some(false),
            ..Default::default()
        };
        assert_eq!(
            config.cutoff(Some(date(2024, 6, 1))),
            Some(StartCutoff::new(date(2024, 6, 1), false))
        );
    }

    #[test]
    fn test_config_cutoff_absent() {
        assert!(Config::default().cutoff(None).is_none());
    }

    #[test]
    fn test_config_credentials_missing_password() {
        let config = Config {
            email: Some("me@example.com".to_string()),
            ..Default::default()
        };
        let err = config.credentials().unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: password is not set");
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials {
            email: "me@example.com".to_string(),
            password: "hunter2".to_string(),
        };
        let shown = format!("{creds:?}");
        assert!(shown.contains("me@example.com"));
        assert!(!shown.contains("hunter2"));
    }

    // ── Config loading ────────────────────────────────────────────────────────

    #[test]
    fn test_config_load_from_file() {
        let tmp = TempDir::new().expect("tempdir");
        let path = Config::path_in(tmp.path());
        std::fs::write(&path, "[DEFAULT]\ndaily_c = 98.5\n").expect("write");

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.daily_c, Some(98.5));
    }

    #[test]
    fn test_config_load_missing_explicit_file_fails() {
        let tmp = TempDir::new().expect("tempdir");
        let err = Config::load(Some(&tmp.path().join("nope"))).unwrap_err();
        assert!(matches!(err, JemenaError::FileRead { .. }));
    }

    #[test]
    fn test_config_path_in() {
        let path = Config::path_in(Path::new("/home/someone"));
        assert_eq!(path, PathBuf::from("/home/someone/.jemenarc"));
    }
}
