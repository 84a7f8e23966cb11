use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::types::{normalize_title, Article, Batch};

/// Most articles a single batch may hold.
pub const MAX_BATCH_SIZE: usize = 4;

/// Shortest body text (content, else description) worth surfacing.
pub const MIN_TEXT_CHARS: usize = 20;

lazy_static! {
    static ref TRUNCATION_SUFFIX: Regex = Regex::new(r"(?i)\s*\[\+\d+\s+chars\]$").unwrap();
    static ref LEADING_INT: Regex = Regex::new(r"^\s*([+-]?[0-9]+)").unwrap();
}

/// Reads the integer at the start of `raw`, ignoring whatever follows it, so
/// `"2abc"` is 2 and `"abc"` is `None`. Values outside `i64` are `None`.
pub fn leading_int(raw: &str) -> Option<i64> {
    LEADING_INT.captures(raw)?.get(1)?.as_str().parse().ok()
}

/// Normalized titles that must not be served again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcludeSet(HashSet<String>);

impl ExcludeSet {
    pub fn new<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            titles
                .into_iter()
                .map(|t| normalize_title(t.as_ref()))
                .filter(|t| !t.is_empty())
                .collect(),
        )
    }

    /// Parses the `exclude` query value: a JSON array of titles, falling back
    /// to a comma-separated list when the value is not JSON.
    pub fn parse(raw: &str) -> Self {
        Self::new(parse_exclude_list(raw))
    }

    pub fn contains(&self, title: &str) -> bool {
        self.0.contains(&normalize_title(title))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Splits an `exclude` value into raw titles without normalizing them.
pub fn parse_exclude_list(raw: &str) -> Vec<String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Ok(_) => Vec::new(),
        Err(_) => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
    }
}

/// Removes every trailing `[+N chars]` marker from article content.
pub fn strip_truncation_suffix(content: &str) -> String {
    let mut stripped = content;
    while let Some(m) = TRUNCATION_SUFFIX.find(stripped) {
        stripped = &stripped[..m.start()];
    }
    stripped.to_string()
}

fn has_enough_text(article: &Article) -> bool {
    let text = if article.content.is_empty() {
        &article.description
    } else {
        &article.content
    };
    text.trim().chars().count() >= MIN_TEXT_CHARS
}

/// Cleans a raw provider article list into at most [`MAX_BATCH_SIZE`]
/// articles, keeping their relative order.
pub fn filter_articles(raw: &[Value], exclude: &ExcludeSet) -> Batch {
    let mut titles = HashSet::new();

    raw.iter()
        .map(|item| {
            let mut article = Article::from_raw(item);
            article.content = strip_truncation_suffix(&article.content);
            article
        })
        .filter(has_enough_text)
        .filter(|a| !a.title.is_empty() && !exclude.contains(&a.title))
        .filter(|a| titles.insert(a.normalized_title()))
        .take(MAX_BATCH_SIZE)
        .collect()
}
