use std::sync::Arc;

use review_flow_shared::CommentRecord;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::SheetConfig;

/// Bounded range of the comment tab; the workflow appends rows, we never
/// expect to outgrow this window.
const COMMENT_RANGE: &str = "A1:G10000";

/// The tabular store could not be read. Callers decide whether to retry;
/// this client never does.
#[derive(Debug, Clone, Error)]
pub enum UpstreamError {
    #[error("tabular store is not configured: {0}")]
    NotConfigured(&'static str),
    #[error("tabular store request failed: {0}")]
    Transport(String),
    #[error("tabular store returned status {status}: {message}")]
    Store { status: u16, message: String },
    #[error("tabular store payload was malformed: {0}")]
    Malformed(String),
}

/// Values-API payload: a rectangular slice of cells. Cells can come back as
/// numbers for numeric-looking columns, so they are coerced later.
#[derive(Debug, Deserialize)]
struct ValuesResponse {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Read-only client for the external tabular store.
#[derive(Clone)]
pub struct SheetClient {
    inner: Arc<SheetClientInner>,
}

struct SheetClientInner {
    client: reqwest::Client,
    config: SheetConfig,
}

impl SheetClient {
    pub fn new(client: reqwest::Client, config: SheetConfig) -> Self {
        Self {
            inner: Arc::new(SheetClientInner {
                client,
                config,
            }),
        }
    }

    /// One bounded range read of the comment tab, parsed into records.
    /// Row 0 is a header and is skipped unconditionally; columns are
    /// positional. Rows with an empty first cell are dropped, not errors.
    pub async fn fetch_comment_rows(&self) -> Result<Vec<CommentRecord>, UpstreamError> {
        let range = format!("'{}'!{}", self.inner.config.comments_tab, COMMENT_RANGE);
        let rows = self.fetch_range(&range).await?;
        tracing::debug!(rows = rows.len(), "comment tab read");
        Ok(parse_comment_rows(&rows))
    }

    /// Raw grid slice of the product tab, for catalog lookups and the
    /// data-grid preview. Columns A–BA, capped at `max_rows`.
    pub async fn fetch_product_rows(
        &self,
        max_rows: usize,
    ) -> Result<Vec<Vec<String>>, UpstreamError> {
        let range = format!("'{}'!A1:BA{}", self.inner.config.product_tab, max_rows);
        let rows = self.fetch_range(&range).await?;
        Ok(rows
            .iter()
            .map(|row| (0..row.len()).map(|idx| cell_string(row, idx)).collect())
            .collect())
    }

    async fn fetch_range(&self, range: &str) -> Result<Vec<Vec<Value>>, UpstreamError> {
        let sheet_id = self
            .inner
            .config
            .sheet_id
            .as_deref()
            .ok_or(UpstreamError::NotConfigured("SHEET_ID is not set"))?;

        let mut url = format!(
            "{}/{}/values/{}",
            self.inner.config.api_base,
            urlencoding::encode(sheet_id),
            urlencoding::encode(range)
        );
        if let Some(key) = self.inner.config.api_key.as_deref() {
            url.push_str("?key=");
            url.push_str(&urlencoding::encode(key));
        }

        let response = self
            .inner
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| UpstreamError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Store {
                status: status.as_u16(),
                message,
            });
        }

        let payload: ValuesResponse = response
            .json()
            .await
            .map_err(|err| UpstreamError::Malformed(err.to_string()))?;
        Ok(payload.values)
    }
}

/// Positional comment columns:
/// `id, product_id, section, current_text, comment, page_url, time_stamp`.
fn parse_comment_rows(rows: &[Vec<Value>]) -> Vec<CommentRecord> {
    rows.iter()
        .skip(1) // header
        .filter_map(|row| parse_comment_row(row))
        .collect()
}

fn parse_comment_row(row: &[Value]) -> Option<CommentRecord> {
    let id = cell_string(row, 0);
    if id.is_empty() {
        return None;
    }
    Some(CommentRecord {
        id,
        product_id: cell_string(row, 1),
        section: cell_string(row, 2),
        current_text: cell_string(row, 3),
        comment: cell_string(row, 4),
        page_url: cell_string(row, 5),
        time_stamp: cell_string(row, 6),
    })
}

/// A missing or non-string cell degrades to the empty string; one odd cell
/// must never sink the whole read.
fn cell_string(row: &[Value], idx: usize) -> String {
    match row.get(idx) {
        Some(Value::String(text)) => text.trim().to_string(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn rows(raw: serde_json::Value) -> Vec<Vec<Value>> {
        serde_json::from_value(raw).expect("test rows")
    }

    #[test]
    fn header_row_is_always_skipped() {
        let parsed = parse_comment_rows(&rows(json!([
            ["id", "product_id", "section", "current_text", "comment", "page_url", "time_stamp"],
            ["1", "P1", "name", "Old", "hi", "http://x", "2024-01-01T00:00:00Z"],
        ])));
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].id, "1");
        assert_eq!(parsed[0].comment, "hi");
    }

    #[test]
    fn rows_with_empty_id_are_dropped() {
        let parsed = parse_comment_rows(&rows(json!([
            ["id", "product_id", "section"],
            ["", "P1", "name", "x", "y", "z", "w"],
            ["2", "P1", "x", "", "", "", ""],
        ])));
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].id, "2");
    }

    #[test]
    fn short_and_mistyped_cells_default_to_empty_strings() {
        let parsed = parse_comment_rows(&rows(json!([
            ["header"],
            ["3", 42, null, ["not", "a", "cell"]],
        ])));
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].product_id, "42");
        assert_eq!(parsed[0].section, "");
        assert_eq!(parsed[0].current_text, "");
        assert_eq!(parsed[0].time_stamp, "");
    }

    #[test]
    fn cells_are_trimmed() {
        let parsed = parse_comment_rows(&rows(json!([
            ["header"],
            ["  4  ", " P1 ", " name ", "", " hello ", "", ""],
        ])));
        assert_eq!(parsed[0].id, "4");
        assert_eq!(parsed[0].product_id, "P1");
        assert_eq!(parsed[0].comment, "hello");
    }
}
