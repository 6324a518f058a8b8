//! Cursor pagination for controller collections

use super::client::CloudClient;
use crate::error::Result;
use serde_json::Value;

/// Upper bound on pages read from one collection
pub const MAX_PAGES: usize = 100;

/// Read every page of a controller collection. `base_url` may already carry
/// query parameters; the `start` cursor of `next_url` is appended per page.
pub async fn list_all_pages(client: &CloudClient, base_url: &str) -> Result<Vec<Value>> {
    let mut all_items = Vec::new();
    let mut start: Option<String> = None;

    for _ in 0..MAX_PAGES {
        let url = match &start {
            Some(start) => with_query(base_url, "start", start),
            None => base_url.to_string(),
        };
        let response = client.get(&url).await?;

        if let Some(items) = response.get("resources").and_then(|v| v.as_array()) {
            all_items.extend(items.iter().cloned());
        }

        start = response
            .get("next_url")
            .and_then(|v| v.as_str())
            .and_then(start_cursor);
        if start.is_none() {
            break;
        }
    }

    Ok(all_items)
}

/// Extract the `start` query parameter from a (possibly relative) next_url
pub fn start_cursor(next_url: &str) -> Option<String> {
    let parsed = url::Url::parse(next_url)
        .or_else(|_| url::Url::parse("http://localhost").and_then(|base| base.join(next_url)))
        .ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "start")
        .map(|(_, value)| value.into_owned())
}

pub fn with_query(url: &str, key: &str, value: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}={}", url, separator, key, urlencoding::encode(value))
}
