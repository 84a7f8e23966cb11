use std::collections::HashSet;
use std::sync::Arc;

use gs_core::{leading_int, normalize_title, Article, Batch};
use serde_json::Value;
use tracing::warn;

use crate::KeyValueStore;

pub const SEEN_TITLES_KEY: &str = "gs.news.titles";
pub const HISTORY_KEY: &str = "gs.news.history";
pub const POSITION_KEY: &str = "gs.news.history.idx";

/// Append-only log of shown batches, the current position in it, and the
/// titles seen so far.
///
/// Every entry is persisted under its own key. Storage failures never leave
/// this type: reads fall back to empty/default values and writes are dropped
/// with a warning.
#[derive(Clone)]
pub struct BatchHistoryStore {
    store: Arc<dyn KeyValueStore>,
}

impl BatchHistoryStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    async fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to read {}: {}", key, e);
                None
            }
        }
    }

    async fn read_array(&self, key: &str) -> Vec<Value> {
        let Some(raw) = self.read(key).await else {
            return Vec::new();
        };
        match serde_json::from_str(&raw) {
            Ok(Value::Array(items)) => items,
            Ok(_) => Vec::new(),
            Err(e) => {
                warn!("Ignoring corrupt {}: {}", key, e);
                Vec::new()
            }
        }
    }

    async fn write(&self, key: &str, value: String) {
        if let Err(e) = self.store.set(key, &value).await {
            warn!("Failed to persist {}: {}", key, e);
        }
    }

    pub async fn get_history(&self) -> Vec<Batch> {
        self.read_array(HISTORY_KEY)
            .await
            .iter()
            .map(|batch| match batch {
                Value::Array(items) => items.iter().map(Article::from_raw).collect(),
                _ => Batch::new(),
            })
            .collect()
    }

    async fn set_history(&self, history: &[Batch]) {
        match serde_json::to_string(history) {
            Ok(raw) => self.write(HISTORY_KEY, raw).await,
            Err(e) => warn!("Failed to encode history: {}", e),
        }
    }

    /// Pushes `batch` to the end of history and makes it current.
    pub async fn append_batch(&self, batch: Batch) -> usize {
        let mut history = self.get_history().await;
        history.push(batch);
        self.set_history(&history).await;

        let position = history.len() - 1;
        self.set_position(position).await;
        position
    }

    pub async fn get_position(&self) -> usize {
        self.read(POSITION_KEY)
            .await
            .and_then(|raw| leading_int(&raw))
            .and_then(|v| usize::try_from(v).ok())
            .unwrap_or(0)
    }

    pub async fn set_position(&self, position: usize) {
        self.write(POSITION_KEY, position.to_string()).await;
    }

    pub async fn get_seen_titles(&self) -> Vec<String> {
        self.read_array(SEEN_TITLES_KEY)
            .await
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) if !s.is_empty() => Some(s),
                _ => None,
            })
            .collect()
    }

    pub async fn set_seen_titles(&self, titles: &[String]) {
        let titles: Vec<&String> = titles.iter().filter(|t| !t.is_empty()).collect();
        match serde_json::to_string(&titles) {
            Ok(raw) => self.write(SEEN_TITLES_KEY, raw).await,
            Err(e) => warn!("Failed to encode seen titles: {}", e),
        }
    }

    /// Merges the batch's titles into the seen list. Titles are compared in
    /// normalized form; the first spelling seen is the one kept.
    pub async fn record_shown(&self, batch: &[Article]) {
        let mut seen = self.get_seen_titles().await;
        let mut known: HashSet<String> = seen.iter().map(|t| normalize_title(t)).collect();
        let before = seen.len();

        for article in batch {
            let normalized = article.normalized_title();
            if !normalized.is_empty() && known.insert(normalized) {
                seen.push(article.title.clone());
            }
        }

        if seen.len() != before {
            self.set_seen_titles(&seen).await;
        }
    }

    /// Forgets history, position and seen titles.
    pub async fn reset(&self) {
        for key in [HISTORY_KEY, POSITION_KEY, SEEN_TITLES_KEY] {
            if let Err(e) = self.store.remove(key).await {
                warn!("Failed to clear {}: {}", key, e);
            }
        }
    }
}
