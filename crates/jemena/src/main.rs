mod bootstrap;

use anyhow::{Context, Result};
use jemena_core::formatting::{format_currency, format_kwh};
use jemena_core::settings::{Command, Config, Settings};
use jemena_data::aggregator::UsageAggregator;
use jemena_data::analysis::{load_usage_series, UsageSeries};
use jemena_runtime::portal::PortalClient;
use jemena_ui::app::App;
use jemena_ui::chart_spec::{self, ChartSpec};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("Jemena v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::debug!(
        "Command: {:?}, CSV: {}, Theme: {}",
        settings.command,
        settings.csv.display(),
        settings.theme
    );

    let config = Config::load(settings.config.as_deref())?;

    match settings.command {
        Command::Update => {
            let credentials = config.credentials()?;
            let client = PortalClient::production()?;
            let written = client
                .update(&credentials, &settings.csv)
                .await
                .with_context(|| format!("updating {}", settings.csv.display()))?;
            println!("Saved {} bytes to {}", written, settings.csv.display());
            bootstrap::wait_for_enter()?;
        }

        Command::Daily => {
            let series = load_series(&settings, &config)?;
            let tariff = config.tariff();
            if tariff.is_none() {
                tracing::info!("No tariff configured; cost panel omitted");
            }
            let daily = UsageAggregator::daily_totals(&series.samples, tariff.as_ref());
            let totals = UsageAggregator::calculate_totals(&daily);
            tracing::info!(
                "{} days, {}{}",
                totals.days,
                format_kwh(totals.total_usage),
                totals
                    .total_cost
                    .map(|c| format!(", {}", format_currency(c)))
                    .unwrap_or_default()
            );
            show(&settings, &chart_spec::daily_chart(&daily, tariff.as_ref()))?;
        }

        Command::Plot => {
            let series = load_series(&settings, &config)?;
            show(&settings, &chart_spec::raw_chart(&series.samples))?;
        }

        Command::Profile => {
            let series = load_series(&settings, &config)?;
            let profile = UsageAggregator::profile(&series.samples);
            if let Some(day) = profile.latest_day {
                tracing::info!("Profile averages {} slots; overlay {}", profile.average.len(), day);
            }
            show(
                &settings,
                &chart_spec::profile_chart(&profile.average, profile.latest_day, &profile.latest),
            )?;
        }
    }

    Ok(())
}

/// Run the load pipeline with the effective start-date cutoff.
fn load_series(settings: &Settings, config: &Config) -> Result<UsageSeries> {
    let cutoff = config.cutoff(settings.start_date);
    if let Some(c) = &cutoff {
        tracing::info!(
            "Using data from {}{}",
            c.date,
            if c.inclusive { "" } else { " (exclusive)" }
        );
    }

    let series = load_usage_series(&settings.csv, cutoff.as_ref())
        .with_context(|| format!("loading {}", settings.csv.display()))?;
    if series.is_empty() {
        tracing::warn!("No usage samples left to plot");
    }
    Ok(series)
}

/// Draw `spec` and wait for the user to dismiss it.
fn show(settings: &Settings, spec: &ChartSpec) -> Result<()> {
    App::new(&settings.theme).run_chart(spec)?;
    Ok(())
}
