use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TrendPoint: one (date, days remaining) observation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub value: u64,
}

impl TrendPoint {
    pub fn new(date: NaiveDate, value: u64) -> Self {
        Self { date, value }
    }
}

impl fmt::Display for TrendPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.date.format("%Y-%m-%d"), self.value)
    }
}

// ---------------------------------------------------------------------------
// Status: movement of a point relative to the one before it
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Start,
    Better,
    Worse,
    Same,
}

impl Status {
    pub const ALL: [Status; 4] = [Status::Start, Status::Better, Status::Same, Status::Worse];

    /// Derive one status per point, comparing each point only to its predecessor.
    pub fn sequence(points: &[TrendPoint]) -> Vec<Status> {
        let mut statuses = Vec::with_capacity(points.len());
        let mut previous: Option<u64> = None;
        for point in points {
            let status = match previous {
                None => Status::Start,
                Some(prev) if point.value < prev => Status::Better,
                Some(prev) if point.value > prev => Status::Worse,
                Some(_) => Status::Same,
            };
            statuses.push(status);
            previous = Some(point.value);
        }
        statuses
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Start => "start",
            Status::Better => "better",
            Status::Worse => "worse",
            Status::Same => "same",
        }
    }

    /// Legend text shown next to the marker.
    pub fn legend(&self) -> &'static str {
        match self {
            Status::Start => "Start",
            Status::Better => "Progress",
            Status::Same => "Stagnate",
            Status::Worse => "Regress",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Status::Start => "#000000",
            Status::Better => "#008450",
            Status::Same => "#EFB700",
            Status::Worse => "#B81D13",
        }
    }

    /// Plotly marker symbol name.
    pub fn symbol(&self) -> &'static str {
        match self {
            Status::Start => "star",
            Status::Better => "arrow-down",
            Status::Same => "diamond",
            Status::Worse => "arrow-up",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
