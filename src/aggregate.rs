//! Remaining-time aggregation over normalized cards.

use serde_json::Value;

use crate::config;
use crate::error::{Result, TrendError};
use crate::models::Card;

/// Days of work a single card contributes to the total.
///
/// Excluded cards contribute nothing. A card with a numeric `remaining` custom
/// field contributes that number; any other card contributes `unestimated_days`.
/// A `remaining.number` that cannot be read as a float fails the run.
pub fn remaining(card: &Card, unestimated_days: f64) -> Result<f64> {
    if card.exclude {
        return Ok(0.0);
    }
    match card.field(config::REMAINING_FIELD).and_then(|v| v.get("number")) {
        Some(number) => parse_number(number).ok_or_else(|| TrendError::InvalidNumber {
            card: card.name.clone(),
            value: number.to_string(),
        }),
        None => Ok(unestimated_days),
    }
}

/// Sum of [`remaining`] over every card.
pub fn total_remaining(cards: &[Card], unestimated_days: f64) -> Result<f64> {
    let mut total = 0.0;
    for card in cards {
        total += remaining(card, unestimated_days)?;
    }
    Ok(total)
}

/// Trello stores numbers as strings (`{"number": "2.5"}`); accept both forms.
fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}
