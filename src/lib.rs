//! Remaining-work trend tracking for a Trello board.
//!
//! Pulls every card of one board, sums the days of work still remaining,
//! appends that total to a flat-file time series, and renders the series as
//! a chart with a least-squares trend line plus a projected burndown. The
//! charts are then attached to the board's report card.
//!
//! # Quick start
//!
//! ```no_run
//! use std::time::Duration;
//! use board_trend::{TrelloClient, TrendTracker};
//!
//! let api = TrelloClient::new("key", "token", Duration::from_secs(30)).unwrap();
//! let mut tracker = TrendTracker::builder()
//!     .data_dir("/var/lib/board-trend")
//!     .build(api, "My Project")
//!     .unwrap();
//!
//! tracker.initialize_cards().unwrap();
//! tracker.add_datapoint().unwrap();
//! tracker.generate_trend().unwrap();
//! tracker.generate_estimated_trend(4).unwrap();
//! tracker.publish().unwrap();
//! ```

pub mod aggregate;
pub mod chart;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod normalize;
pub mod projection;
pub mod publish;
pub mod render;
pub mod snapshot;
pub mod store;

pub use chart::TrendChart;
pub use client::{BoardApi, TrelloClient};
pub use error::{Result, TrendError};
pub use models::{Card, Status, TrendPoint};
pub use render::{Artifacts, ChartRenderer, TrendRenderer};
pub use snapshot::BoardSnapshot;
pub use store::TrendStore;

use std::fmt;
use std::path::{Path, PathBuf};

use models::RawCard;

// ---------------------------------------------------------------------------
// TrendTrackerBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`TrendTracker`].
///
/// Use [`TrendTracker::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](TrendTrackerBuilder::build) with a board client.
pub struct TrendTrackerBuilder {
    data_dir: PathBuf,
    output_dir: Option<PathBuf>,
    unestimated_days: f64,
    renderer: Option<Box<dyn TrendRenderer>>,
}

impl Default for TrendTrackerBuilder {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            output_dir: None,
            unestimated_days: config::DEFAULT_UNESTIMATED_DAYS,
            renderer: None,
        }
    }
}

impl TrendTrackerBuilder {
    /// Directory holding `trend.dat` and `estimate.dat`. Defaults to `.`.
    pub fn data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = path.as_ref().to_path_buf();
        self
    }

    /// Directory the chart artifacts are written to.
    ///
    /// Defaults to the data directory.
    pub fn output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Days counted for a card without a `remaining` estimate. Defaults to `1.0`.
    pub fn unestimated_days(mut self, days: f64) -> Self {
        self.unestimated_days = days;
        self
    }

    /// Replace the default [`ChartRenderer`].
    pub fn renderer<R: TrendRenderer + 'static>(mut self, renderer: R) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    /// Resolve the board named `board` and build the tracker.
    ///
    /// Fetches the board's custom field, label and list definitions; cards are
    /// not loaded until [`TrendTracker::initialize_cards`].
    pub fn build<A: BoardApi>(self, api: A, board: &str) -> Result<TrendTracker<A>> {
        if !self.unestimated_days.is_finite() || self.unestimated_days < 0.0 {
            return Err(TrendError::InvalidArgument(format!(
                "unestimated_days must be a non-negative number, got {}",
                self.unestimated_days
            )));
        }
        let snapshot = BoardSnapshot::load(&api, board)?;
        let output_dir = self.output_dir.unwrap_or_else(|| self.data_dir.clone());
        Ok(TrendTracker {
            api,
            snapshot,
            cards: Vec::new(),
            report_card: None,
            trend: TrendStore::new(self.data_dir.join(config::TREND_FILE)),
            estimate: TrendStore::new(self.data_dir.join(config::ESTIMATE_FILE)),
            output_dir,
            unestimated_days: self.unestimated_days,
            renderer: self
                .renderer
                .unwrap_or_else(|| Box::new(ChartRenderer::default())),
        })
    }
}

// ---------------------------------------------------------------------------
// RunOptions
// ---------------------------------------------------------------------------

/// What a single [`TrendTracker::run`] does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Append today's total before charting.
    pub add: bool,
    /// Days taken off the remaining total per projected week.
    pub weekly_decrement: i64,
    /// Attach the charts to the report card.
    pub publish: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            add: false,
            weekly_decrement: config::DEFAULT_WEEKLY_DECREMENT,
            publish: true,
        }
    }
}

impl RunOptions {
    /// Reject options that would fail the run after the board was read.
    pub fn validate(&self) -> Result<()> {
        projection::validate_decrement(self.weekly_decrement)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TrendTracker
// ---------------------------------------------------------------------------

/// One run of the trend pipeline against a single board.
///
/// Owns the board snapshot and the normalized cards for the duration of the
/// run; the trend file is the only state that outlives it.
pub struct TrendTracker<A: BoardApi = TrelloClient> {
    api: A,
    snapshot: BoardSnapshot,
    cards: Vec<Card>,
    report_card: Option<RawCard>,
    trend: TrendStore,
    estimate: TrendStore,
    output_dir: PathBuf,
    unestimated_days: f64,
    renderer: Box<dyn TrendRenderer>,
}

impl TrendTracker<TrelloClient> {
    /// Create a new builder for configuring the tracker.
    pub fn builder() -> TrendTrackerBuilder {
        TrendTrackerBuilder::default()
    }
}

impl<A: BoardApi> TrendTracker<A> {
    // -- Accessors ---------------------------------------------------------

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn snapshot(&self) -> &BoardSnapshot {
        &self.snapshot
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// The full report card, once [`initialize_cards`](Self::initialize_cards) found one.
    pub fn report_card(&self) -> Option<&RawCard> {
        self.report_card.as_ref()
    }

    pub fn trend_store(&self) -> &TrendStore {
        &self.trend
    }

    pub fn estimate_store(&self) -> &TrendStore {
        &self.estimate
    }

    // -- Pipeline ------------------------------------------------------------

    /// The whole pipeline: load cards, optionally append today's total, chart
    /// both series, then optionally publish.
    ///
    /// Options are validated before any card is fetched.
    pub fn run(&mut self, options: &RunOptions) -> Result<()> {
        options.validate()?;
        self.initialize_cards()?;

        // Should happen weekly
        if options.add {
            self.add_datapoint()?;
        }

        self.generate_trend()?;
        self.generate_estimated_trend(options.weekly_decrement)?;
        if options.publish {
            self.publish()?;
        }
        Ok(())
    }

    /// Fetch and normalize every card, then locate the report card.
    pub fn initialize_cards(&mut self) -> Result<()> {
        self.cards = normalize::normalize_cards(&self.api, &self.snapshot)?;
        self.report_card =
            normalize::find_report_card(&self.api, &self.cards, config::REPORT_CARD_NAME)?;
        Ok(())
    }

    /// Days of work remaining across all loaded cards.
    pub fn total_remaining(&self) -> Result<f64> {
        aggregate::total_remaining(&self.cards, self.unestimated_days)
    }

    /// Append today's total to the trend file.
    pub fn add_datapoint(&self) -> Result<TrendPoint> {
        let total = self.total_remaining()?;
        self.trend.append_today(total)
    }

    /// Render the recorded trend as `figure.png` / `figure.html`.
    pub fn generate_trend(&self) -> Result<Artifacts> {
        tracing::info!("Gathering trend data...");
        let points = self.history()?;
        let title = format!("{} Trend", self.snapshot.name);
        self.render(&points, &title, config::TREND_CHART)
    }

    /// Project the trend to zero, rewrite the estimate file, and render it as
    /// `estimate.png` / `estimate.html`.
    pub fn generate_estimated_trend(&self, weekly_decrement: i64) -> Result<Artifacts> {
        tracing::info!("Generating estimated trend data...");
        let history = self.history()?;
        let series = projection::project(&history, weekly_decrement)?;
        self.estimate.overwrite(&series)?;

        let points = self.estimate.read()?;
        let title = format!("{} Estimated Trend", self.snapshot.name);
        self.render(&points, &title, config::ESTIMATE_CHART)
    }

    /// Attach the rendered charts to the report card, replacing old attachments.
    ///
    /// Returns `false` when the board has no report card.
    pub fn publish(&self) -> Result<bool> {
        let figure = self.output_dir.join(format!("{}.png", config::TREND_CHART));
        let estimate = self.output_dir.join(format!("{}.png", config::ESTIMATE_CHART));
        publish::publish(
            &self.api,
            self.report_card.as_ref(),
            &figure,
            &[estimate.as_path()],
        )
    }

    fn history(&self) -> Result<Vec<TrendPoint>> {
        let points = self.trend.read()?;
        if points.is_empty() {
            return Err(TrendError::EmptyHistory(self.trend.path().to_path_buf()));
        }
        Ok(points)
    }

    fn render(&self, points: &[TrendPoint], title: &str, name: &str) -> Result<Artifacts> {
        tracing::info!("Calculating trend line...");
        let chart = TrendChart::build(points, title)?;
        self.renderer.render(&chart, &self.output_dir.join(name))
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl<A: BoardApi> fmt::Display for TrendTracker<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TrendTracker(board={}, cards={}, trend={}, report_card={})",
            self.snapshot.name,
            self.cards.len(),
            self.trend.path().display(),
            self.report_card.is_some()
        )
    }
}
