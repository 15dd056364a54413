mod cli;
mod config;
mod error;
mod logging;
mod models;
mod orchestrator;
mod scrapers;
mod sheet;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use config::Settings;
use orchestrator::Orchestrator;
use scrapers::browser::BrowserOptions;
use scrapers::{ChromeSessions, Navigator, Pacer};
use sheet::{CsvSheetSink, JsonLinesSink, SinkSet, XlsxSheetSink};
use std::time::Duration;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = cli.apply(Settings::load(&cli.settings).await?);

    let _log_guard = logging::init(&settings.log_level, settings.log_file.as_deref(), settings.log_retention_days)?;

    info!("⚽ xG Scout - xgscore.io collector");

    let tasks = match config::load_tasks(&cli.tasks).await {
        Ok(tasks) => tasks,
        Err(e) => {
            error!("Configuration unusable, nothing scraped: {e}");
            return Err(e.into());
        }
    };

    let pacer = Pacer::from_secs(settings.pause_min_secs, settings.pause_max_secs);
    let navigator =
        Navigator::new(&settings.landing_url, settings.wait_timeout(), pacer.clone()).context("Invalid landing URL")?;

    let sessions = ChromeSessions::new(BrowserOptions {
        headless: settings.headless,
        window_size: (settings.window_width, settings.window_height),
        idle_timeout: Duration::from_secs(settings.idle_browser_timeout_secs),
    });

    let mut sinks = SinkSet::default().with(XlsxSheetSink::new(&settings.output_dir));
    if settings.csv {
        sinks = sinks.with(CsvSheetSink::new(&settings.output_dir));
    }
    if settings.jsonl {
        sinks = sinks.with(JsonLinesSink::new(&settings.output_dir));
    }

    info!("Processing {} league task(s), output in {}", tasks.len(), settings.output_dir.display());

    // The browser API blocks; keep the whole traversal on one blocking worker.
    let report = tokio::task::spawn_blocking(move || Orchestrator::new(&sessions, navigator, &mut sinks).run(&tasks))
        .await
        .context("Scraper worker panicked")?;

    info!(
        "✅ Saved {} match(es), {} failed; {} gameweek(s) reached, {} skipped",
        report.matches_saved, report.matches_failed, report.gameweeks_reached, report.gameweeks_failed
    );
    debug!("Paused {} time(s) between page interactions", pacer.pauses_taken());

    Ok(())
}
