//! Work-board address source.
//!
//! Fetches items from a board via its GraphQL API. The pipeline only needs
//! "give me N address-like strings", so the response is reduced to
//! identifier + label + text columns; everything else the board returns is
//! ignored.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::boundary::{AddressSource, BoardColumn, BoardItem, BoundaryError, BoundaryResult};
use crate::config::BoardConfig;

const ITEMS_QUERY: &str = "\
query ($board_id: [ID!], $limit: Int) {
    boards(ids: $board_id) {
        name
        items_page(limit: $limit) {
            items {
                id
                name
                column_values {
                    id
                    text
                }
            }
        }
    }
}";

pub struct BoardClient {
    client: reqwest::Client,
    api_url: String,
    api_token: String,
}

impl BoardClient {
    pub fn new(config: &BoardConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            api_url: config.api_url.clone(),
            api_token: config.api_token.clone(),
        }
    }
}

#[async_trait]
impl AddressSource for BoardClient {
    async fn fetch_items(&self, board_id: &str, limit: usize) -> BoundaryResult<Vec<BoardItem>> {
        let payload = json!({
            "query": ITEMS_QUERY,
            "variables": { "board_id": [board_id], "limit": limit },
        });

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BoundaryError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body: Value = response.json().await?;

        if let Some(errors) = body.get("errors") {
            // GraphQL-level errors come back with a 200; degrade to empty
            warn!("board API returned errors: {}", errors);
            return Ok(Vec::new());
        }

        let items = body
            .pointer("/data/boards/0/items_page/items")
            .and_then(Value::as_array)
            .map(|raw| raw.iter().map(parse_item).collect::<Vec<_>>())
            .unwrap_or_default();

        debug!("board {} returned {} items", board_id, items.len());
        Ok(items)
    }
}

fn parse_item(raw: &Value) -> BoardItem {
    let columns = raw
        .get("column_values")
        .and_then(Value::as_array)
        .map(|cols| {
            cols.iter()
                .map(|col| BoardColumn {
                    id: text_field(col, "id"),
                    text: text_field(col, "text"),
                })
                .collect()
        })
        .unwrap_or_default();

    BoardItem {
        id: text_field(raw, "id"),
        name: text_field(raw, "name"),
        columns,
    }
}

/// Board identifiers sometimes come back as numbers instead of strings.
fn text_field(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        _ => String::new(),
    }
}
