//! Chart rendering: a PNG via `plotters` and an interactive HTML page via plotly.js.

use std::fs;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use serde_json::{json, Value};

use crate::chart::TrendChart;
use crate::config;
use crate::error::{Result, TrendError};
use crate::models::Status;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Files produced for one chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub image: PathBuf,
    pub document: PathBuf,
}

impl Artifacts {
    /// `<base>.png` and `<base>.html`.
    pub fn for_base(base: &Path) -> Self {
        Self {
            image: base.with_extension("png"),
            document: base.with_extension("html"),
        }
    }
}

/// Draws a prepared [`TrendChart`] to disk.
pub trait TrendRenderer {
    /// Write the chart artifacts named after `base` (no extension).
    fn render(&self, chart: &TrendChart, base: &Path) -> Result<Artifacts>;
}

// ---------------------------------------------------------------------------
// ChartRenderer
// ---------------------------------------------------------------------------

/// Default renderer: scatter of points coloured by status with a black trend line.
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self {
            width: config::CHART_WIDTH,
            height: config::CHART_HEIGHT,
        }
    }
}

impl TrendRenderer for ChartRenderer {
    fn render(&self, chart: &TrendChart, base: &Path) -> Result<Artifacts> {
        let artifacts = Artifacts::for_base(base);
        if let Some(parent) = base.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        tracing::info!("Exporting graph data...");
        self.draw_png(chart, &artifacts.image)?;
        fs::write(&artifacts.document, render_html(chart, self.width, self.height))?;
        tracing::info!(
            image = %artifacts.image.display(),
            document = %artifacts.document.display(),
            "Trend generation complete!"
        );
        Ok(artifacts)
    }
}

impl ChartRenderer {
    fn draw_png(&self, chart: &TrendChart, path: &Path) -> Result<()> {
        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let (x_min, x_max) = chart.x_range();
        let pad = ((x_max - x_min) / 50).max(86_400);
        let (y_min, y_max) = chart.y_range;
        let y_max = if y_max <= y_min { y_min + 1.0 } else { y_max };

        let mut ctx = ChartBuilder::on(&root)
            .caption(chart.title.as_str(), ("sans-serif", 40))
            .margin(30)
            .x_label_area_size(100)
            .y_label_area_size(80)
            .build_cartesian_2d((x_min - pad)..(x_max + pad), y_min..y_max)
            .map_err(render_err)?;

        // Month labels are drawn by hand at their first-seen positions.
        ctx.configure_mesh()
            .x_labels(0)
            .disable_x_mesh()
            .x_desc("Timeline")
            .y_desc("Days Remaining")
            .draw()
            .map_err(render_err)?;

        let tick_style = TextStyle::from(("sans-serif", 18).into_font()).color(&BLACK);
        for tick in &chart.ticks {
            let (px, py) = ctx.backend_coord(&(tick.x, y_min));
            root.draw(&PathElement::new(vec![(px, py), (px, py + 6)], &BLACK))
                .map_err(render_err)?;
            root.draw(&Text::new(tick.label.clone(), (px - 40, py + 12), tick_style.clone()))
                .map_err(render_err)?;
        }

        let radius = (config::MARKER_SIZE / 2 + 2) as i32;
        for status in Status::ALL {
            let color = hex_color(status.color());
            let points: Vec<(i64, f64)> = chart
                .points_with(status)
                .map(|p| (p.x, p.y as f64))
                .collect();
            if points.is_empty() {
                continue;
            }
            let shape = marker_vertices(status, radius);
            let legend_shape = shape.clone();
            ctx.draw_series(points.into_iter().map(move |(x, y)| {
                EmptyElement::at((x, y)) + Polygon::new(shape.clone(), color.filled())
            }))
            .map_err(render_err)?
            .label(status.legend())
            .legend(move |(x, y)| {
                EmptyElement::at((x, y)) + Polygon::new(legend_shape.clone(), color.filled())
            });
        }

        let line = chart
            .points
            .iter()
            .zip(&chart.fitted)
            .map(|(p, fitted)| (p.x, *fitted));
        ctx.draw_series(LineSeries::new(line, &BLACK))
            .map_err(render_err)?
            .label("Trend")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLACK));

        ctx.configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
        Ok(())
    }
}

/// Pixel outline of the marker for `status`, centred on the origin.
///
/// Mirrors the plotly symbols named by [`Status::symbol`]: a five-pointed
/// star, arrows pointing down and up, and a diamond. Pixel `y` grows downward.
pub fn marker_vertices(status: Status, radius: i32) -> Vec<(i32, i32)> {
    let r = radius;
    let shaft = (r / 3).max(1);
    match status {
        Status::Start => (0..10)
            .map(|i| {
                let reach = if i % 2 == 0 { r as f64 } else { r as f64 * 0.4 };
                let angle = std::f64::consts::PI * i as f64 / 5.0;
                (
                    (reach * angle.sin()).round() as i32,
                    (-reach * angle.cos()).round() as i32,
                )
            })
            .collect(),
        Status::Better => vec![
            (0, r),
            (-r, 0),
            (-shaft, 0),
            (-shaft, -r),
            (shaft, -r),
            (shaft, 0),
            (r, 0),
        ],
        Status::Worse => marker_vertices(Status::Better, radius)
            .into_iter()
            .map(|(x, y)| (x, -y))
            .collect(),
        Status::Same => vec![(0, -r), (r, 0), (0, r), (-r, 0)],
    }
}

/// Self-contained plotly.js page for the chart.
pub fn render_html(chart: &TrendChart, width: u32, height: u32) -> String {
    let mut traces: Vec<Value> = Status::ALL
        .iter()
        .filter_map(|status| {
            let (xs, ys): (Vec<i64>, Vec<u64>) =
                chart.points_with(*status).map(|p| (p.x, p.y)).unzip();
            if xs.is_empty() {
                return None;
            }
            Some(json!({
                "type": "scatter",
                "mode": "markers",
                "name": status.legend(),
                "x": xs,
                "y": ys,
                "marker": {
                    "color": status.color(),
                    "symbol": status.symbol(),
                    "size": config::MARKER_SIZE,
                },
            }))
        })
        .collect();

    traces.push(json!({
        "type": "scatter",
        "mode": "lines",
        "name": "Trend",
        "x": chart.points.iter().map(|p| p.x).collect::<Vec<_>>(),
        "y": chart.fitted,
        "line": { "width": 1 },
        "marker": { "color": "black" },
    }));

    let layout = json!({
        "title": { "text": chart.title },
        "width": width,
        "height": height,
        "xaxis": {
            "title": { "text": "Timeline" },
            "tickangle": 45,
            "tickmode": "array",
            "tickvals": chart.ticks.iter().map(|t| t.x).collect::<Vec<_>>(),
            "ticktext": chart.ticks.iter().map(|t| t.label.as_str()).collect::<Vec<_>>(),
        },
        "yaxis": {
            "title": { "text": "Days Remaining" },
            "range": [chart.y_range.0, chart.y_range.1],
        },
        "legend": { "title": { "text": "Status" } },
    });

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{cdn}"></script>
</head>
<body>
<div id="trend"></div>
<script>
Plotly.newPlot("trend", {traces}, {layout});
</script>
</body>
</html>
"#,
        title = escape_html(&chart.title),
        cdn = PLOTLY_CDN,
        traces = script_json(&Value::Array(traces)),
        layout = script_json(&layout),
    )
}

/// JSON safe to inline in a `<script>` element.
fn script_json(value: &Value) -> String {
    value.to_string().replace("</", "<\\/")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Parse `#RRGGBB`; anything else falls back to black.
fn hex_color(hex: &str) -> RGBColor {
    let digits = hex.trim_start_matches('#');
    let channel = |i: usize| {
        digits
            .get(i..i + 2)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .unwrap_or(0)
    };
    if digits.len() == 6 {
        RGBColor(channel(0), channel(2), channel(4))
    } else {
        BLACK
    }
}

fn render_err<E: std::fmt::Display>(e: E) -> TrendError {
    TrendError::Render(e.to_string())
}
