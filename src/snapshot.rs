//! Board snapshot: the id-to-name lookups for one board, built once per run.

use std::collections::HashMap;

use crate::client::BoardApi;
use crate::error::{Result, TrendError};

/// Immutable view of a board's definitions, taken at startup.
#[derive(Debug, Clone, Default)]
pub struct BoardSnapshot {
    pub id: String,
    pub name: String,
    /// Custom field id -> field name.
    pub custom_fields: HashMap<String, String>,
    /// Label id -> label name. Unnamed labels map to an empty string.
    pub labels: HashMap<String, String>,
    /// List id -> list name.
    pub lists: HashMap<String, String>,
}

impl BoardSnapshot {
    /// Resolve the board called `name` and fetch its field, label and list definitions.
    ///
    /// A board that cannot be found is fatal: [`TrendError::BoardNotFound`].
    pub fn load<A: BoardApi + ?Sized>(api: &A, name: &str) -> Result<Self> {
        tracing::info!("Requesting project board...");
        let board = api
            .get_board_with_name(name)?
            .ok_or_else(|| TrendError::BoardNotFound(name.to_string()))?;

        tracing::info!("Generating custom field definitions...");
        let custom_fields = api
            .get_custom_fields(&board.id)?
            .into_iter()
            .map(|f| (f.id, f.name))
            .collect();

        tracing::info!("Generating label definitions...");
        let labels = api
            .get_boards_labels(&board.id)?
            .into_iter()
            .map(|l| (l.id, l.name.unwrap_or_default()))
            .collect();

        tracing::info!("Generating list definitions...");
        let lists = api
            .get_boards_lists(&board.id)?
            .into_iter()
            .map(|l| (l.id, l.name))
            .collect();

        Ok(Self {
            id: board.id,
            name: board.name,
            custom_fields,
            labels,
            lists,
        })
    }

    /// Ids of every label whose name equals `name`, ignoring case.
    pub fn label_ids_named(&self, name: &str) -> Vec<&str> {
        ids_named(&self.labels, name)
    }

    /// Ids of every list whose name equals `name`, ignoring case.
    pub fn list_ids_named(&self, name: &str) -> Vec<&str> {
        ids_named(&self.lists, name)
    }
}

fn ids_named<'a>(map: &'a HashMap<String, String>, name: &str) -> Vec<&'a str> {
    let wanted = name.to_lowercase();
    map.iter()
        .filter(|(_, n)| n.to_lowercase() == wanted)
        .map(|(id, _)| id.as_str())
        .collect()
}
