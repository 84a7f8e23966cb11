use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single news item as served by the gateway and kept in history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Article {
    pub source: Option<String>,
    pub author: Option<String>,
    pub title: String,
    pub description: String,
    pub url: String,
    pub url_to_image: String,
    pub published_at: String,
    pub content: String,
}

/// One page of articles shown together.
pub type Batch = Vec<Article>;

impl Article {
    /// Builds an article out of a loosely shaped provider item.
    ///
    /// Missing or null fields become `None` for `source`/`author` and empty
    /// strings for text. `source` is read from `{ "name": .. }` or taken as is
    /// when already a string.
    pub fn from_raw(raw: &Value) -> Self {
        let text = |key: &str| non_empty(raw.get(key)).unwrap_or_default();
        let source = match raw.get("source") {
            Some(Value::Object(obj)) => non_empty(obj.get("name")),
            other => non_empty(other),
        };

        Self {
            source,
            author: non_empty(raw.get("author")),
            title: text("title"),
            description: text("description"),
            url: text("url"),
            url_to_image: text("urlToImage"),
            published_at: text("publishedAt"),
            content: text("content"),
        }
    }

    pub fn normalized_title(&self) -> String {
        normalize_title(&self.title)
    }
}

fn non_empty(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Comparison key for titles: trimmed and lower-cased.
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}
