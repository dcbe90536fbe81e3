//! Card normalization and exclusion rules.
//!
//! Raw board cards are turned into [`Card`] records: identity and list are
//! copied, the exclusion flag is evaluated against the [`BoardSnapshot`], and
//! each known custom field value is stored under its lower-cased name.

use std::collections::HashSet;

use crate::client::BoardApi;
use crate::config;
use crate::error::Result;
use crate::models::{Card, RawCard};
use crate::snapshot::BoardSnapshot;

/// Cards processed between progress log lines.
const PROGRESS_EVERY: usize = 10;

// ---------------------------------------------------------------------------
// ExclusionRules
// ---------------------------------------------------------------------------

/// Label and list ids that take a card out of the remaining-work total.
///
/// A board with no label named `exclude` (or no list named `complete`) simply
/// never excludes cards that way.
#[derive(Debug, Clone, Default)]
pub struct ExclusionRules {
    exclude_labels: HashSet<String>,
    complete_lists: HashSet<String>,
}

impl ExclusionRules {
    /// Resolve the `exclude` label and `complete` list of the given board.
    pub fn resolve(snapshot: &BoardSnapshot) -> Self {
        Self {
            exclude_labels: snapshot
                .label_ids_named(config::EXCLUDE_LABEL)
                .into_iter()
                .map(String::from)
                .collect(),
            complete_lists: snapshot
                .list_ids_named(config::COMPLETE_LIST)
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }

    pub fn is_excluded(&self, card: &RawCard) -> bool {
        if card
            .labels
            .iter()
            .any(|label| self.exclude_labels.contains(&label.id))
        {
            return true;
        }
        self.complete_lists.contains(&card.id_list)
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Build a [`Card`] from a raw card and its custom field items.
///
/// Items whose field id is not defined on the board are ignored.
pub fn normalize_card<A: BoardApi + ?Sized>(
    api: &A,
    snapshot: &BoardSnapshot,
    rules: &ExclusionRules,
    raw: &RawCard,
) -> Result<Card> {
    let mut card = Card::new(&raw.id, &raw.name, &raw.id_list);
    card.exclude = rules.is_excluded(raw);

    for item in api.get_custom_field_items(&raw.id)? {
        if let Some(field) = snapshot.custom_fields.get(&item.id_custom_field) {
            card.fields.insert(field.to_lowercase(), item.value);
        }
    }
    Ok(card)
}

/// Fetch and normalize every card on the board, one card at a time.
///
/// Costs one custom-field request per card. Nothing is persisted here, so an
/// interrupted run starts over from scratch.
pub fn normalize_cards<A: BoardApi + ?Sized>(api: &A, snapshot: &BoardSnapshot) -> Result<Vec<Card>> {
    let rules = ExclusionRules::resolve(snapshot);
    let raw_cards = api.get_all_cards(&snapshot.id)?;
    tracing::info!("Total cards: {}", raw_cards.len());

    tracing::info!("Beginning card processing...");
    let mut cards = Vec::with_capacity(raw_cards.len());
    for raw in &raw_cards {
        cards.push(normalize_card(api, snapshot, &rules, raw)?);
        if cards.len() % PROGRESS_EVERY == 0 {
            tracing::info!("{} cards have been processed...", cards.len());
        }
    }
    Ok(cards)
}

/// Find the card named exactly `name` and re-fetch it in full.
pub fn find_report_card<A: BoardApi + ?Sized>(
    api: &A,
    cards: &[Card],
    name: &str,
) -> Result<Option<RawCard>> {
    match cards.iter().find(|c| c.name == name) {
        Some(card) => Ok(Some(api.get_card(&card.id)?)),
        None => Ok(None),
    }
}
