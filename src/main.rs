//! `kitewatch` command-line entry point
//!
//! One invocation is one run: fetch the forecast, evaluate it, and send the
//! report if anything qualifies. Scheduling is left to cron or a timer.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

use kitewatch::config::KitewatchConfig;
use kitewatch::{
    EmailNotifier, ForecastSource, KitewatchError, Notifier, OpenWeatherClient, Pipeline, Result,
    StdoutNotifier, logging,
};

#[derive(Debug, Parser)]
#[command(
    name = "kitewatch",
    version,
    about = "Checks the local forecast for kiting windows and emails a summary"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "KITEWATCH_CONFIG", default_value = "kitewatch.toml")]
    config: PathBuf,

    /// Print the report to stdout instead of emailing it
    #[arg(long)]
    dry_run: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = KitewatchConfig::load_from_path(&cli.config)?;
    logging::init(&config.logging, cli.verbose)
        .map_err(|e| KitewatchError::config(format!("{e:#}")))?;

    let notifier: Box<dyn Notifier> = if cli.dry_run {
        Box::new(StdoutNotifier)
    } else {
        config.validate_email()?;
        Box::new(EmailNotifier::from_config(&config.email)?)
    };

    let client = OpenWeatherClient::new(&config.forecast)?;
    let forecast = client.fetch_forecast(&config.location).await?;
    info!(
        location = %forecast.location.name,
        coordinates = %forecast.location.format_coordinates(),
        timezone = %forecast.location.timezone,
        hourly = forecast.hourly.len(),
        daily = forecast.daily.len(),
        "Fetched forecast"
    );

    let pipeline = Pipeline::new(&config, &forecast.location);
    let Some(report) = pipeline.run_forecast(&forecast) else {
        info!("Nothing to report");
        return Ok(());
    };

    info!("Report:\n{report}");
    notifier.notify(&report)?;
    info!(entries = report.entries().len(), "Report delivered");
    Ok(())
}
