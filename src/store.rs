//! Flat-file trend store.
//!
//! One point per line, `YYYY-MM-DD = <integer>`. The trend file is append-only;
//! the estimate file is rewritten in full on every run. Lines that do not match
//! the pattern (blank lines, comments, garbage) are skipped when reading.

use std::fs::{self, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use regex::Regex;
use tempfile::NamedTempFile;

use crate::error::{Result, TrendError};
use crate::models::TrendPoint;

const POINT_PATTERN: &str =
    r"^(?P<year>\d+)-(?P<month>\d+)-(?P<day>\d+)\s*=\s*(?P<remaining>\d+)\s*$";

// ---------------------------------------------------------------------------
// TrendStore
// ---------------------------------------------------------------------------

/// A trend data file on disk.
#[derive(Debug, Clone)]
pub struct TrendStore {
    path: PathBuf,
}

impl TrendStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every point in the file, ordered by date.
    ///
    /// Points sharing a date keep their file order. A missing file reads as empty.
    pub fn read(&self) -> Result<Vec<TrendPoint>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&self.path)?;
        let mut points = parse_points(&text)?;
        points.sort_by_key(|p| p.date);
        Ok(points)
    }

    /// Append one point on its own line.
    pub fn append(&self, point: TrendPoint) -> Result<()> {
        let needs_newline = !ends_with_newline(&self.path)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        if needs_newline {
            writeln!(file)?;
        }
        writeln!(file, "{}", point)?;
        tracing::info!(path = %self.path.display(), "Added datapoint {}", point);
        Ok(())
    }

    /// Append today's total, truncated to whole days.
    pub fn append_today(&self, total: f64) -> Result<TrendPoint> {
        let point = TrendPoint::new(Local::now().date_naive(), whole_days(total));
        self.append(point)?;
        Ok(point)
    }

    /// Replace the whole file with `points`.
    ///
    /// Written to a temp file in the same directory and renamed into place, so
    /// readers never observe a half-written file.
    pub fn overwrite(&self, points: &[TrendPoint]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;
        let mut tmp = NamedTempFile::new_in(&dir)?;
        for point in points {
            writeln!(tmp, "{}", point)?;
        }
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| TrendError::Io(e.error))?;
        Ok(())
    }
}

/// Parse store text into points in file order, skipping lines that do not match.
pub fn parse_points(text: &str) -> Result<Vec<TrendPoint>> {
    let pattern = Regex::new(POINT_PATTERN)
        .map_err(|e| TrendError::InvalidArgument(format!("bad point pattern: {}", e)))?;

    let mut points = Vec::new();
    for line in text.lines() {
        let Some(caps) = pattern.captures(line) else {
            if !line.trim().is_empty() {
                tracing::debug!("Skipping unrecognized trend line: {:?}", line);
            }
            continue;
        };
        let date = caps["year"]
            .parse::<i32>()
            .ok()
            .zip(caps["month"].parse::<u32>().ok())
            .zip(caps["day"].parse::<u32>().ok())
            .and_then(|((y, m), d)| NaiveDate::from_ymd_opt(y, m, d));
        let value = caps["remaining"].parse::<u64>().ok();
        match (date, value) {
            (Some(date), Some(value)) => points.push(TrendPoint::new(date, value)),
            _ => tracing::debug!("Skipping out-of-range trend line: {:?}", line),
        }
    }
    Ok(points)
}

/// Truncate a day total toward zero; negative totals count as zero.
pub fn whole_days(total: f64) -> u64 {
    if total.is_finite() && total > 0.0 {
        total.trunc() as u64
    } else {
        0
    }
}

fn ends_with_newline(path: &Path) -> Result<bool> {
    let mut file = match fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(true),
        Err(e) => return Err(e.into()),
    };
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}
