//! Weekly burndown projection.

use chrono::Days;

use crate::error::{Result, TrendError};
use crate::models::TrendPoint;

pub const DAYS_PER_STEP: u64 = 7;

/// Check a weekly decrement and return it as a step size.
///
/// A decrement of zero or less would never bring the value to zero.
pub fn validate_decrement(weekly_decrement: i64) -> Result<u64> {
    if weekly_decrement <= 0 {
        return Err(TrendError::InvalidDecrement(weekly_decrement));
    }
    Ok(weekly_decrement as u64)
}

/// Extend `history` week by week until the remaining work reaches zero.
///
/// Starting from the last point, each step moves the date forward seven days
/// and takes `weekly_decrement` days off the value, clamped at zero. The result
/// is the history followed by the projected points; the zero point is the last
/// one. A history already at zero gains no points.
///
/// `weekly_decrement` must be positive ([`TrendError::InvalidDecrement`]), and
/// the zero point must fall inside the calendar range `chrono` can represent.
pub fn project(history: &[TrendPoint], weekly_decrement: i64) -> Result<Vec<TrendPoint>> {
    let step = validate_decrement(weekly_decrement)?;
    let Some(last) = history.last() else {
        return Err(TrendError::InvalidArgument(
            "cannot project from an empty history".into(),
        ));
    };

    let steps = last.value.div_ceil(step);
    let out_of_range = || {
        TrendError::InvalidArgument(format!(
            "projecting {} at {} per week from {} runs past the last representable date",
            last.value, step, last.date
        ))
    };
    steps
        .checked_mul(DAYS_PER_STEP)
        .and_then(|days| last.date.checked_add_days(Days::new(days)))
        .ok_or_else(out_of_range)?;

    let mut series = Vec::with_capacity(history.len() + steps as usize);
    series.extend_from_slice(history);
    let mut date = last.date;
    let mut value = last.value;
    while value > 0 {
        date = date
            .checked_add_days(Days::new(DAYS_PER_STEP))
            .ok_or_else(out_of_range)?;
        value = value.saturating_sub(step);
        series.push(TrendPoint::new(date, value));
    }
    Ok(series)
}
