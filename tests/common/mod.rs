//! Shared test fixtures for the board-trend integration tests.
//!
//! Provides `FakeBoard`, an in-memory `BoardApi` populated with a small sample
//! board, and `RecordingRenderer`, which captures charts instead of drawing them.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use board_trend::models::{
    Attachment, Board, BoardList, Checklist, CustomField, CustomFieldItem, Label, RawCard,
};
use board_trend::{Artifacts, BoardApi, Result, TrendChart, TrendError, TrendRenderer};
use chrono::NaiveDate;
use serde_json::json;

pub const BOARD_NAME: &str = "Project X";
pub const BOARD_ID: &str = "board-1";

/// A recorded `add_attachment` call.
#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    pub card_id: String,
    pub path: PathBuf,
    pub cover: bool,
}

#[derive(Default)]
pub struct FakeBoard {
    pub boards: Vec<Board>,
    pub custom_fields: Vec<CustomField>,
    pub labels: Vec<Label>,
    pub lists: Vec<BoardList>,
    pub cards: Vec<RawCard>,
    pub field_items: HashMap<String, Vec<CustomFieldItem>>,
    pub attachments: RefCell<HashMap<String, Vec<Attachment>>>,
    pub uploads: RefCell<Vec<Upload>>,
    pub field_item_requests: RefCell<Vec<String>>,
}

pub fn board(id: &str, name: &str) -> Board {
    Board {
        id: id.into(),
        name: name.into(),
        closed: false,
        url: None,
    }
}

pub fn label(id: &str, name: &str) -> Label {
    Label {
        id: id.into(),
        name: Some(name.into()),
        color: None,
    }
}

pub fn list(id: &str, name: &str) -> BoardList {
    BoardList {
        id: id.into(),
        name: name.into(),
        closed: false,
    }
}

pub fn field(id: &str, name: &str) -> CustomField {
    CustomField {
        id: id.into(),
        name: name.into(),
        type_field: Some("number".into()),
    }
}

pub fn raw_card(id: &str, name: &str, list: &str, labels: Vec<Label>) -> RawCard {
    RawCard {
        id: id.into(),
        name: name.into(),
        id_list: list.into(),
        labels,
    }
}

pub fn item(field_id: &str, value: serde_json::Value) -> CustomFieldItem {
    CustomFieldItem {
        id: None,
        id_custom_field: field_id.into(),
        value,
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Sample board whose cards add up to 8.5 remaining days:
///
/// | card           | list     | label   | remaining | counts |
/// |----------------|----------|---------|-----------|--------|
/// | Design         | To Do    |         | 3         | 3      |
/// | Build          | Doing    |         | "2.5"     | 2.5    |
/// | Docs           | To Do    |         | -         | 1      |
/// | Shipped        | Complete |         | 5         | 0      |
/// | Spike          | To Do    | Exclude | 4         | 0      |
/// | Weekly Report  | Doing    |         | -         | 1      |
/// | Stray          | Doing    |         | (unknown) | 1      |
pub fn sample_board() -> FakeBoard {
    let mut field_items = HashMap::new();
    field_items.insert(
        "card-1".to_string(),
        vec![
            item("cf-remaining", json!({"number": "3"})),
            item("cf-owner", json!({"text": "alice"})),
        ],
    );
    field_items.insert(
        "card-2".to_string(),
        vec![item("cf-remaining", json!({"number": "2.5"}))],
    );
    field_items.insert(
        "card-4".to_string(),
        vec![item("cf-remaining", json!({"number": "5"}))],
    );
    field_items.insert(
        "card-5".to_string(),
        vec![item("cf-remaining", json!({"number": "4"}))],
    );
    field_items.insert(
        "card-7".to_string(),
        vec![item("cf-deleted", json!({"number": "40"}))],
    );

    let mut attachments = HashMap::new();
    attachments.insert(
        "card-6".to_string(),
        vec![
            Attachment {
                id: "att-old-1".into(),
                name: Some("figure.png".into()),
                url: None,
            },
            Attachment {
                id: "att-old-2".into(),
                name: Some("estimate.png".into()),
                url: None,
            },
        ],
    );

    FakeBoard {
        boards: vec![board("board-0", "Other"), board(BOARD_ID, BOARD_NAME)],
        custom_fields: vec![field("cf-remaining", "Remaining"), field("cf-owner", "Owner")],
        labels: vec![label("lbl-exclude", "Exclude"), label("lbl-bug", "Bug")],
        lists: vec![
            list("list-todo", "To Do"),
            list("list-doing", "Doing"),
            list("list-done", "Complete"),
        ],
        cards: vec![
            raw_card("card-1", "Design", "list-todo", vec![label("lbl-bug", "Bug")]),
            raw_card("card-2", "Build", "list-doing", vec![]),
            raw_card("card-3", "Docs", "list-todo", vec![]),
            raw_card("card-4", "Shipped", "list-done", vec![]),
            raw_card("card-5", "Spike", "list-todo", vec![label("lbl-exclude", "Exclude")]),
            raw_card("card-6", "Weekly Report", "list-doing", vec![]),
            raw_card("card-7", "Stray", "list-doing", vec![]),
        ],
        field_items,
        attachments: RefCell::new(attachments),
        uploads: RefCell::new(Vec::new()),
        field_item_requests: RefCell::new(Vec::new()),
    }
}

impl FakeBoard {
    fn card(&self, card_id: &str) -> Result<RawCard> {
        self.cards
            .iter()
            .find(|c| c.id == card_id)
            .cloned()
            .ok_or_else(|| TrendError::Api {
                endpoint: format!("cards/{}", card_id),
                reason: "HTTP 404 Not Found: invalid id".into(),
            })
    }
}

impl BoardApi for FakeBoard {
    fn get_board_with_name(&self, name: &str) -> Result<Option<Board>> {
        Ok(self.boards.iter().find(|b| b.name == name).cloned())
    }

    fn get_board(&self, board_id: &str) -> Result<Board> {
        self.boards
            .iter()
            .find(|b| b.id == board_id)
            .cloned()
            .ok_or_else(|| TrendError::BoardNotFound(board_id.into()))
    }

    fn get_custom_fields(&self, _board_id: &str) -> Result<Vec<CustomField>> {
        Ok(self.custom_fields.clone())
    }

    fn get_boards_labels(&self, _board_id: &str) -> Result<Vec<Label>> {
        Ok(self.labels.clone())
    }

    fn get_boards_lists(&self, _board_id: &str) -> Result<Vec<BoardList>> {
        Ok(self.lists.clone())
    }

    fn get_list(&self, list_id: &str) -> Result<BoardList> {
        self.lists
            .iter()
            .find(|l| l.id == list_id)
            .cloned()
            .ok_or_else(|| TrendError::InvalidArgument(list_id.into()))
    }

    fn get_all_cards(&self, _board_id: &str) -> Result<Vec<RawCard>> {
        Ok(self.cards.clone())
    }

    fn get_card(&self, card_id: &str) -> Result<RawCard> {
        self.card(card_id)
    }

    fn get_custom_field_items(&self, card_id: &str) -> Result<Vec<CustomFieldItem>> {
        self.field_item_requests.borrow_mut().push(card_id.to_string());
        Ok(self.field_items.get(card_id).cloned().unwrap_or_default())
    }

    fn get_card_checklists(&self, _card_id: &str) -> Result<Vec<Checklist>> {
        Ok(Vec::new())
    }

    fn get_all_attachments(&self, card_id: &str) -> Result<Vec<Attachment>> {
        Ok(self
            .attachments
            .borrow()
            .get(card_id)
            .cloned()
            .unwrap_or_default())
    }

    fn delete_attachment(&self, card_id: &str, attachment_id: &str) -> Result<()> {
        if let Some(list) = self.attachments.borrow_mut().get_mut(card_id) {
            list.retain(|a| a.id != attachment_id);
        }
        Ok(())
    }

    fn add_attachment(&self, card_id: &str, path: &Path, cover: bool) -> Result<Attachment> {
        let mut uploads = self.uploads.borrow_mut();
        uploads.push(Upload {
            card_id: card_id.into(),
            path: path.to_path_buf(),
            cover,
        });
        let attachment = Attachment {
            id: format!("att-new-{}", uploads.len()),
            name: path.file_name().map(|n| n.to_string_lossy().into_owned()),
            url: None,
        };
        self.attachments
            .borrow_mut()
            .entry(card_id.to_string())
            .or_default()
            .push(attachment.clone());
        Ok(attachment)
    }

    fn update_card(&self, card_id: &str, item: &str, value: &str) -> Result<RawCard> {
        let mut card = self.card(card_id)?;
        if item == "name" {
            card.name = value.to_string();
        }
        Ok(card)
    }

    fn update_card_custom_field(
        &self,
        _card_id: &str,
        _field_id: &str,
        value: serde_json::Value,
    ) -> Result<serde_json::Value> {
        Ok(json!({ "value": value }))
    }
}

/// Renderer that keeps every chart it is asked to draw.
#[derive(Clone, Default)]
pub struct RecordingRenderer {
    pub charts: Rc<RefCell<Vec<(TrendChart, PathBuf)>>>,
}

impl TrendRenderer for RecordingRenderer {
    fn render(&self, chart: &TrendChart, base: &Path) -> Result<Artifacts> {
        self.charts
            .borrow_mut()
            .push((chart.clone(), base.to_path_buf()));
        Ok(Artifacts::for_base(base))
    }
}
