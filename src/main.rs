//! board-trend - record and chart the remaining work on a Trello board.
//!
//! Usage:
//!   board-trend [--add] [--est DAYS] [--config PATH]
//!
//! Intended to run once a week with `--add`; without it the charts are
//! regenerated from the existing trend file.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use board_trend::config::{self, Settings};
use board_trend::{Result, RunOptions, TrelloClient, TrendTracker};

const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Calculate a trend for a given Trello project.
#[derive(Parser, Debug)]
#[command(name = "board-trend", version)]
struct Cli {
    /// Add a datapoint to the data file
    #[arg(short, long)]
    add: bool,

    /// Days to reduce the remaining time by per week when generating the estimated graph
    #[arg(
        short,
        long,
        value_name = "DAYS",
        default_value_t = config::DEFAULT_WEEKLY_DECREMENT,
        allow_negative_numbers = true
    )]
    est: i64,

    /// Settings file (defaults to the platform config directory)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Board name, overriding the settings file
    #[arg(long, value_name = "NAME")]
    board: Option<String>,

    /// Render the charts without attaching them to the report card
    #[arg(long)]
    no_publish: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let options = RunOptions {
        add: cli.add,
        weekly_decrement: cli.est,
        publish: !cli.no_publish,
    };
    options.validate()?;

    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let settings = Settings::load(&config_path)?;
    let board = cli.board.as_deref().unwrap_or(&settings.project.board);

    let api = TrelloClient::new(&settings.api.key, &settings.api.token, HTTP_TIMEOUT)?;
    let mut tracker = TrendTracker::builder()
        .data_dir(&settings.project.data_dir)
        .unestimated_days(settings.project.unestimated_days)
        .build(api, board)?;
    tracker.run(&options)?;
    tracing::debug!("{}", tracker);
    Ok(())
}

fn setup_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
