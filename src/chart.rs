//! Chart input preparation: axis mapping, point status, trend line, ticks.
//!
//! [`TrendChart`] is everything a renderer needs, computed up front so the
//! renderer only has to draw.

use chrono::{Local, NaiveDate, TimeZone};
use serde::Serialize;

use crate::config;
use crate::error::{Result, TrendError};
use crate::models::{Status, TrendPoint};

// ---------------------------------------------------------------------------
// ChartPoint / Tick
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    /// Epoch seconds of local midnight on the point's date.
    pub x: i64,
    pub y: u64,
    pub status: Status,
}

/// A labelled x-axis position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub x: i64,
    pub label: String,
}

// ---------------------------------------------------------------------------
// TrendChart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct TrendChart {
    pub title: String,
    pub points: Vec<ChartPoint>,
    /// Least-squares trend line evaluated at each point's x.
    pub fitted: Vec<f64>,
    pub ticks: Vec<Tick>,
    /// Lower and upper bound of the y-axis.
    pub y_range: (f64, f64),
}

impl TrendChart {
    /// Prepare chart input from points in store order.
    pub fn build(points: &[TrendPoint], title: impl Into<String>) -> Result<Self> {
        if points.is_empty() {
            return Err(TrendError::InvalidArgument(
                "cannot chart an empty trend".into(),
            ));
        }

        let statuses = Status::sequence(points);
        let chart_points: Vec<ChartPoint> = points
            .iter()
            .zip(statuses)
            .map(|(p, status)| ChartPoint {
                x: local_midnight_epoch(p.date),
                y: p.value,
                status,
            })
            .collect();

        let xs: Vec<f64> = chart_points.iter().map(|p| p.x as f64).collect();
        let ys: Vec<f64> = chart_points.iter().map(|p| p.y as f64).collect();
        let (intercept, slope) = ols_fit(&xs, &ys);
        let fitted = xs.iter().map(|x| intercept + slope * x).collect();

        let y_max = points.iter().map(|p| p.value).max().unwrap_or(0);
        let margin = (y_max as f64 * config::Y_MARGIN_RATIO).trunc();

        Ok(Self {
            title: title.into(),
            ticks: month_ticks(points),
            points: chart_points,
            fitted,
            y_range: (-margin, y_max as f64 + margin),
        })
    }

    pub fn x_range(&self) -> (i64, i64) {
        let min = self.points.iter().map(|p| p.x).min().unwrap_or(0);
        let max = self.points.iter().map(|p| p.x).max().unwrap_or(0);
        (min, max)
    }

    pub fn points_with(&self, status: Status) -> impl Iterator<Item = &ChartPoint> {
        self.points.iter().filter(move |p| p.status == status)
    }
}

/// Epoch seconds of midnight local time on `date`.
///
/// When local midnight does not exist (a DST gap) the UTC midnight is used.
pub fn local_midnight_epoch(date: NaiveDate) -> i64 {
    let midnight = date.and_time(chrono::NaiveTime::MIN);
    match Local.from_local_datetime(&midnight).earliest() {
        Some(dt) => dt.timestamp(),
        None => midnight.and_utc().timestamp(),
    }
}

/// Ordinary least squares of `ys` on `xs` with an intercept; returns `(intercept, slope)`.
///
/// With fewer than two distinct x values the line is flat at the mean of `ys`.
pub fn ols_fit(xs: &[f64], ys: &[f64]) -> (f64, f64) {
    let n = xs.len().min(ys.len());
    if n == 0 {
        return (0.0, 0.0);
    }
    let x_mean = xs[..n].iter().sum::<f64>() / n as f64;
    let y_mean = ys[..n].iter().sum::<f64>() / n as f64;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (x, y) in xs[..n].iter().zip(&ys[..n]) {
        let dx = x - x_mean;
        sxy += dx * (y - y_mean);
        sxx += dx * dx;
    }
    if sxx == 0.0 {
        return (y_mean, 0.0);
    }
    let slope = sxy / sxx;
    (y_mean - slope * x_mean, slope)
}

/// One tick per month, at the first point falling in that month, labelled
/// like `January 2024`.
pub fn month_ticks(points: &[TrendPoint]) -> Vec<Tick> {
    let mut ticks: Vec<Tick> = Vec::new();
    for point in points {
        let label = point.date.format("%B %Y").to_string();
        if ticks.iter().all(|t| t.label != label) {
            ticks.push(Tick {
                x: local_midnight_epoch(point.date),
                label,
            });
        }
    }
    ticks
}
