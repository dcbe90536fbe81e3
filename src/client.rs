//! Trello REST client.
//!
//! [`BoardApi`] is the seam the trend pipeline talks to; [`TrelloClient`] is the
//! blocking HTTP implementation. Every call is made exactly once and returns a
//! [`Result`]: a response that is not valid structured data is logged and turned
//! into [`TrendError::Api`] instead of being passed on as "no data".

use std::path::Path;
use std::time::Duration;

use reqwest::blocking::{multipart, Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::config;
use crate::error::{Result, TrendError};
use crate::models::{
    Attachment, Board, BoardList, Checklist, CustomField, CustomFieldItem, Label, RawCard,
};

// ---------------------------------------------------------------------------
// BoardApi
// ---------------------------------------------------------------------------

/// Operations the trend pipeline needs from the task-board service.
pub trait BoardApi {
    /// Find one of the current member's boards by exact name.
    fn get_board_with_name(&self, name: &str) -> Result<Option<Board>>;

    fn get_board(&self, board_id: &str) -> Result<Board>;

    fn get_custom_fields(&self, board_id: &str) -> Result<Vec<CustomField>>;

    fn get_boards_labels(&self, board_id: &str) -> Result<Vec<Label>>;

    fn get_boards_lists(&self, board_id: &str) -> Result<Vec<BoardList>>;

    fn get_list(&self, list_id: &str) -> Result<BoardList>;

    fn get_all_cards(&self, board_id: &str) -> Result<Vec<RawCard>>;

    fn get_card(&self, card_id: &str) -> Result<RawCard>;

    fn get_custom_field_items(&self, card_id: &str) -> Result<Vec<CustomFieldItem>>;

    fn get_card_checklists(&self, card_id: &str) -> Result<Vec<Checklist>>;

    fn get_all_attachments(&self, card_id: &str) -> Result<Vec<Attachment>>;

    fn delete_attachment(&self, card_id: &str, attachment_id: &str) -> Result<()>;

    /// Upload a local file as an attachment, optionally making it the card cover.
    fn add_attachment(&self, card_id: &str, path: &Path, cover: bool) -> Result<Attachment>;

    /// Set a single top-level card attribute, e.g. `("name", "New title")`.
    fn update_card(&self, card_id: &str, item: &str, value: &str) -> Result<RawCard>;

    /// Replace the value of one custom field on a card.
    fn update_card_custom_field(
        &self,
        card_id: &str,
        field_id: &str,
        value: serde_json::Value,
    ) -> Result<serde_json::Value>;
}

// ---------------------------------------------------------------------------
// TrelloClient
// ---------------------------------------------------------------------------

/// Blocking [`BoardApi`] implementation backed by `reqwest`.
///
/// The API key and token are sent as query parameters on every request.
pub struct TrelloClient {
    base_url: String,
    key: String,
    token: String,
    client: Client,
}

impl TrelloClient {
    /// Create a client against the public Trello API.
    pub fn new(key: impl Into<String>, token: impl Into<String>, timeout: Duration) -> Result<Self> {
        Self::with_base_url(config::API_BASE, key, token, timeout)
    }

    /// Create a client against a custom API root (without trailing slash).
    pub fn with_base_url(
        base_url: impl Into<String>,
        key: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            key: key.into(),
            token: token.into(),
            client,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    fn auth(&self, request: RequestBuilder) -> RequestBuilder {
        request.query(&[("key", self.key.as_str()), ("token", self.token.as_str())])
    }

    fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let request = self.auth(self.client.get(self.url(endpoint)));
        self.send(endpoint, request)
    }

    /// Send a request and decode the JSON body.
    ///
    /// Transport failures surface as [`TrendError::Http`]; non-success statuses
    /// and undecodable bodies as [`TrendError::Api`].
    fn send<T: DeserializeOwned>(&self, endpoint: &str, request: RequestBuilder) -> Result<T> {
        tracing::debug!(endpoint, "board API request");
        let resp = request.send()?;
        let status = resp.status();
        let body = resp.text()?;
        if !status.is_success() {
            tracing::error!(endpoint, %status, "board API request failed");
            return Err(TrendError::Api {
                endpoint: endpoint.to_string(),
                reason: format!("HTTP {}: {}", status, snippet(&body)),
            });
        }
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(endpoint, error = %e, "failed to parse board API response");
            TrendError::Api {
                endpoint: endpoint.to_string(),
                reason: format!("invalid JSON ({}): {}", e, snippet(&body)),
            }
        })
    }
}

/// First line of a response body, capped for log output.
fn snippet(body: &str) -> String {
    let line = body.lines().next().unwrap_or("");
    if line.chars().count() > 120 {
        let cut: String = line.chars().take(120).collect();
        format!("{}...", cut)
    } else {
        line.to_string()
    }
}

impl BoardApi for TrelloClient {
    fn get_board_with_name(&self, name: &str) -> Result<Option<Board>> {
        let boards: Vec<Board> = self.get("members/me/boards")?;
        Ok(boards.into_iter().find(|b| b.name == name))
    }

    fn get_board(&self, board_id: &str) -> Result<Board> {
        self.get(&format!("boards/{}", board_id))
    }

    fn get_custom_fields(&self, board_id: &str) -> Result<Vec<CustomField>> {
        self.get(&format!("boards/{}/customFields", board_id))
    }

    fn get_boards_labels(&self, board_id: &str) -> Result<Vec<Label>> {
        self.get(&format!("boards/{}/labels", board_id))
    }

    fn get_boards_lists(&self, board_id: &str) -> Result<Vec<BoardList>> {
        self.get(&format!("boards/{}/lists", board_id))
    }

    fn get_list(&self, list_id: &str) -> Result<BoardList> {
        self.get(&format!("lists/{}", list_id))
    }

    fn get_all_cards(&self, board_id: &str) -> Result<Vec<RawCard>> {
        self.get(&format!("boards/{}/cards", board_id))
    }

    fn get_card(&self, card_id: &str) -> Result<RawCard> {
        self.get(&format!("cards/{}", card_id))
    }

    fn get_custom_field_items(&self, card_id: &str) -> Result<Vec<CustomFieldItem>> {
        self.get(&format!("cards/{}/customFieldItems", card_id))
    }

    fn get_card_checklists(&self, card_id: &str) -> Result<Vec<Checklist>> {
        self.get(&format!("cards/{}/checklists", card_id))
    }

    fn get_all_attachments(&self, card_id: &str) -> Result<Vec<Attachment>> {
        self.get(&format!("cards/{}/attachments", card_id))
    }

    fn delete_attachment(&self, card_id: &str, attachment_id: &str) -> Result<()> {
        let endpoint = format!("cards/{}/attachments/{}", card_id, attachment_id);
        let request = self.auth(self.client.delete(self.url(&endpoint)));
        let _: serde_json::Value = self.send(&endpoint, request)?;
        Ok(())
    }

    fn add_attachment(&self, card_id: &str, path: &Path, cover: bool) -> Result<Attachment> {
        let endpoint = format!("cards/{}/attachments", card_id);
        let form = multipart::Form::new().file("file", path)?;
        let request = self
            .auth(self.client.post(self.url(&endpoint)))
            .query(&[("setCover", if cover { "true" } else { "false" })])
            .multipart(form);
        self.send(&endpoint, request)
    }

    fn update_card(&self, card_id: &str, item: &str, value: &str) -> Result<RawCard> {
        let endpoint = format!("cards/{}", card_id);
        let request = self
            .auth(self.client.put(self.url(&endpoint)))
            .query(&[(item, value)]);
        self.send(&endpoint, request)
    }

    fn update_card_custom_field(
        &self,
        card_id: &str,
        field_id: &str,
        value: serde_json::Value,
    ) -> Result<serde_json::Value> {
        let endpoint = format!("cards/{}/customField/{}/item", card_id, field_id);
        let body = serde_json::json!({
            "value": value,
            "key": self.key,
            "token": self.token,
        });
        let request = self.client.put(self.url(&endpoint)).json(&body);
        self.send(&endpoint, request)
    }
}
