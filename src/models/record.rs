use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Card: normalized view of a board card for one run
// ---------------------------------------------------------------------------

/// A card as the trend pipeline sees it.
///
/// `fields` holds the card's custom field values keyed by the lower-cased
/// custom field name, e.g. `"remaining" -> {"number": "3"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub name: String,
    pub list: String,
    pub exclude: bool,
    #[serde(default)]
    pub fields: HashMap<String, serde_json::Value>,
}

impl Card {
    pub fn new(id: impl Into<String>, name: impl Into<String>, list: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            list: list.into(),
            exclude: false,
            fields: HashMap::new(),
        }
    }

    /// Look up a custom field value by name (case-insensitive).
    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.fields.get(&name.to_lowercase())
    }
}
